//! Compact per-row bootstrap weights.

use crate::config::WeightEncoding;
use crate::membership_error::{MembershipError, check_index};

/// Weight of every row surviving sampling, in root-local order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WeightContainer {
    /// One byte per row.
    Byte(Box<[u8]>),
    /// Four bytes per row.
    Wide(Box<[u32]>),
}

impl WeightContainer {
    /// Encode `weights` with `encoding`.
    ///
    /// # Errors
    /// `WeightOverflow` for the first weight that does not fit `encoding`.
    pub fn from_weights(weights: &[u32], encoding: WeightEncoding) -> Result<Self, MembershipError> {
        match encoding {
            WeightEncoding::Byte => weights
                .iter()
                .enumerate()
                .map(|(row, &w)| {
                    u8::try_from(w).map_err(|_| MembershipError::WeightOverflow {
                        row,
                        weight: w,
                        max: encoding.max_weight(),
                    })
                })
                .collect::<Result<Box<[u8]>, _>>()
                .map(WeightContainer::Byte),
            WeightEncoding::Wide => Ok(WeightContainer::Wide(weights.into())),
        }
    }

    /// Encoding chosen at construction.
    #[inline]
    pub fn encoding(&self) -> WeightEncoding {
        match self {
            WeightContainer::Byte(_) => WeightEncoding::Byte,
            WeightContainer::Wide(_) => WeightEncoding::Wide,
        }
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            WeightContainer::Byte(w) => w.len(),
            WeightContainer::Wide(w) => w.len(),
        }
    }

    /// Whether no row survived sampling.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Weight of root-local row `local`.
    #[inline]
    pub fn weight(&self, local: usize) -> Result<u32, MembershipError> {
        check_index(local, self.len())?;
        Ok(self.get(local))
    }

    /// Weight of `local`; callers guarantee `local < len()`.
    #[inline]
    pub(crate) fn get(&self, local: usize) -> u32 {
        match self {
            WeightContainer::Byte(w) => u32::from(w[local]),
            WeightContainer::Wide(w) => w[local],
        }
    }

    /// All weights in root-local order.
    pub fn all_weights(&self) -> Vec<u32> {
        match self {
            WeightContainer::Byte(w) => w.iter().map(|&x| u32::from(x)).collect(),
            WeightContainer::Wide(w) => w.to_vec(),
        }
    }

    /// Sum of all weights.
    pub fn total(&self) -> u64 {
        match self {
            WeightContainer::Byte(w) => w.iter().map(|&x| u64::from(x)).sum(),
            WeightContainer::Wide(w) => w.iter().map(|&x| u64::from(x)).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_encoding_round_trips_small_counts() {
        let w = WeightContainer::from_weights(&[2, 1, 3, 1, 2], WeightEncoding::Byte).unwrap();
        assert_eq!(w.encoding(), WeightEncoding::Byte);
        assert_eq!(w.weight(2), Ok(3));
        assert_eq!(w.all_weights(), vec![2, 1, 3, 1, 2]);
        assert_eq!(w.total(), 9);
    }

    #[test]
    fn byte_encoding_rejects_large_counts() {
        assert_eq!(
            WeightContainer::from_weights(&[1, 256], WeightEncoding::Byte),
            Err(MembershipError::WeightOverflow {
                row: 1,
                weight: 256,
                max: 255
            })
        );
        let wide = WeightContainer::from_weights(&[1, 256], WeightEncoding::Wide).unwrap();
        assert_eq!(wide.weight(1), Ok(256));
    }

    #[test]
    fn weight_out_of_range() {
        let w = WeightContainer::from_weights(&[1], WeightEncoding::Wide).unwrap();
        assert_eq!(
            w.weight(1),
            Err(MembershipError::IndexOutOfRange { index: 1, len: 1 })
        );
    }
}
