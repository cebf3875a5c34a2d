//! RowIndexManager: per-column bijection between original row positions and
//! column-sorted positions.
//!
//! Built once per trainer run from the full (unsampled) column orders and
//! shared read-only by every [`RootRowMemberships`] of that run.
//!
//! [`RootRowMemberships`]: crate::memberships::root::RootRowMemberships

use crate::data::sorted_columns::SortedColumnSource;
use crate::debug_invariants::DebugInvariants;
use crate::membership_error::{MembershipError, check_index, to_u32};

/// Both directions of every column's sort permutation.
///
/// # Invariants
/// - For every column `c`, `original_positions[c]` and
///   `positions_in_column[c]` are mutually inverse permutations of
///   `0..row_count`.
#[derive(Clone, Debug)]
pub struct RowIndexManager {
    row_count: usize,
    /// `original_positions[c][column_pos] = original`
    original_positions: Vec<Box<[u32]>>,
    /// `positions_in_column[c][original] = column_pos`
    positions_in_column: Vec<Box<[u32]>>,
}

impl RowIndexManager {
    /// Invert every column order of `source`.
    ///
    /// # Errors
    /// * `InternalOverflow` if the table has more than `u32::MAX` rows.
    /// * `Construction` if a column order has the wrong length, references a
    ///   row outside the table, or lists a row twice.
    pub fn build<S>(source: &S) -> Result<Self, MembershipError>
    where
        S: SortedColumnSource + Sync + ?Sized,
    {
        let row_count = source.row_count();
        to_u32(row_count, "table row count exceeds u32 index space")?;
        let n_cols = source.column_count();

        #[cfg(feature = "rayon")]
        let inverted: Result<Vec<_>, MembershipError> = {
            use rayon::prelude::*;
            (0..n_cols)
                .into_par_iter()
                .map(|c| invert_column(c, source.sorted_original_positions(c), row_count))
                .collect()
        };
        #[cfg(not(feature = "rayon"))]
        let inverted: Result<Vec<_>, MembershipError> = (0..n_cols)
            .map(|c| invert_column(c, source.sorted_original_positions(c), row_count))
            .collect();

        let (original_positions, positions_in_column) = inverted?.into_iter().unzip();
        let manager = Self {
            row_count,
            original_positions,
            positions_in_column,
        };
        manager.debug_assert_invariants();
        log::debug!("row index manager built: {row_count} rows, {n_cols} columns");
        Ok(manager)
    }

    /// Number of rows in the full table.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of attribute columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.original_positions.len()
    }

    #[inline]
    fn check_column(&self, column: usize) -> Result<(), MembershipError> {
        if column < self.column_count() {
            Ok(())
        } else {
            Err(MembershipError::ColumnOutOfRange {
                column,
                columns: self.column_count(),
            })
        }
    }

    /// `array[original] = column position` for `column`.
    pub fn positions_in_column(&self, column: usize) -> Result<&[u32], MembershipError> {
        self.check_column(column)?;
        Ok(&self.positions_in_column[column])
    }

    /// `array[column position] = original` for `column`.
    pub fn original_positions(&self, column: usize) -> Result<&[u32], MembershipError> {
        self.check_column(column)?;
        Ok(&self.original_positions[column])
    }

    /// Column position of original row `original` in `column`.
    pub fn position_in_column(&self, column: usize, original: usize) -> Result<usize, MembershipError> {
        let positions = self.positions_in_column(column)?;
        check_index(original, positions.len())?;
        Ok(positions[original] as usize)
    }

    /// Original row found at `column_pos` in `column`'s order.
    pub fn original_position(&self, column: usize, column_pos: usize) -> Result<usize, MembershipError> {
        let originals = self.original_positions(column)?;
        check_index(column_pos, originals.len())?;
        Ok(originals[column_pos] as usize)
    }
}

fn invert_column(
    column: usize,
    order: &[u32],
    row_count: usize,
) -> Result<(Box<[u32]>, Box<[u32]>), MembershipError> {
    if order.len() != row_count {
        return Err(MembershipError::Construction(format!(
            "column {column} lists {} rows, table has {row_count}",
            order.len()
        )));
    }
    // u32::MAX is never a valid position since row_count <= u32::MAX.
    let mut positions = vec![u32::MAX; row_count];
    for (pos, &original) in order.iter().enumerate() {
        let slot = positions.get_mut(original as usize).ok_or_else(|| {
            MembershipError::Construction(format!(
                "column {column} references row {original}, table has {row_count}"
            ))
        })?;
        if *slot != u32::MAX {
            return Err(MembershipError::Construction(format!(
                "column {column} lists row {original} twice"
            )));
        }
        *slot = pos as u32;
    }
    Ok((order.into(), positions.into_boxed_slice()))
}

impl DebugInvariants for RowIndexManager {
    fn validate_invariants(&self) -> Result<(), MembershipError> {
        for (c, (originals, positions)) in self
            .original_positions
            .iter()
            .zip(&self.positions_in_column)
            .enumerate()
        {
            if originals.len() != self.row_count || positions.len() != self.row_count {
                return Err(MembershipError::Construction(format!(
                    "column {c} arrays do not cover {} rows",
                    self.row_count
                )));
            }
            for (pos, &original) in originals.iter().enumerate() {
                if positions.get(original as usize).copied() != Some(pos as u32) {
                    return Err(MembershipError::Construction(format!(
                        "column {c}: position {pos} and row {original} are not inverse"
                    )));
                }
            }
        }
        Ok(())
    }
}
