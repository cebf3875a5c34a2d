//! Row sample seam.
//!
//! The bootstrap draw itself happens upstream; this layer only needs to know
//! how often each original row survived it.

use crate::membership_error::{MembershipError, check_index};

/// Per-original-row survival counts produced by a sampling step.
pub trait RowSample {
    /// Number of rows in the original (unsampled) table.
    fn row_count(&self) -> usize;

    /// How many times original row `original` was drawn (possibly 0).
    fn count_of(&self, original: usize) -> u32;

    /// Sum of all counts.
    fn total_weight(&self) -> u64 {
        (0..self.row_count()).map(|r| u64::from(self.count_of(r))).sum()
    }
}

/// Dense vector of survival counts, indexed by original row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SampleCounts {
    counts: Vec<u32>,
}

impl SampleCounts {
    /// Wrap precomputed counts.
    pub fn new(counts: Vec<u32>) -> Self {
        Self { counts }
    }

    /// Every row of the table exactly once (no sampling).
    pub fn all_rows(row_count: usize) -> Self {
        Self {
            counts: vec![1; row_count],
        }
    }

    /// Tally a multiset of drawn original rows.
    ///
    /// # Errors
    /// `IndexOutOfRange` if a draw is `>= row_count`.
    pub fn from_draws<I>(row_count: usize, draws: I) -> Result<Self, MembershipError>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut counts = vec![0u32; row_count];
        for r in draws {
            check_index(r, row_count)?;
            counts[r] = counts[r].saturating_add(1);
        }
        Ok(Self { counts })
    }

    /// Counts indexed by original row.
    #[inline]
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }
}

impl RowSample for SampleCounts {
    #[inline]
    fn row_count(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    fn count_of(&self, original: usize) -> u32 {
        self.counts.get(original).copied().unwrap_or(0)
    }
}
