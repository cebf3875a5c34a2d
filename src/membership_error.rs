//! MembershipError: Unified error type for tree-memberships public APIs
//!
//! Every variant describes a broken caller contract or malformed upstream
//! data. None of them is a transient condition; callers abort the current
//! node (or the whole run) instead of retrying.

use thiserror::Error;

/// Unified error type for membership-indexing operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MembershipError {
    /// A row index (root-local, node-local or original) was `>= len`.
    #[error("index {index} out of range for {len} rows")]
    IndexOutOfRange { index: usize, len: usize },
    /// A column index was `>= columns`.
    #[error("column {column} out of range for {columns} columns")]
    ColumnOutOfRange { column: usize, columns: usize },
    /// A cursor accessor was called while the cursor is before its first row.
    #[error("cursor accessed while positioned before the first row")]
    InvalidCursorState,
    /// A row count or mask cardinality does not fit the `u32` index storage.
    #[error("internal overflow: {0}")]
    InternalOverflow(&'static str),
    /// A row multiplicity does not fit the configured weight encoding.
    #[error("weight {weight} of row {row} exceeds the encoding maximum {max}")]
    WeightOverflow { row: usize, weight: u32, max: u32 },
    /// Upstream sample or column data is inconsistent.
    #[error("construction error: {0}")]
    Construction(String),
}

/// Return `Ok(())` iff `index < len`.
#[inline]
pub(crate) fn check_index(index: usize, len: usize) -> Result<(), MembershipError> {
    if index < len {
        Ok(())
    } else {
        Err(MembershipError::IndexOutOfRange { index, len })
    }
}

/// Narrow a count to the `u32` storage used for all index arrays.
#[inline]
pub(crate) fn to_u32(n: usize, what: &'static str) -> Result<u32, MembershipError> {
    u32::try_from(n).map_err(|_| MembershipError::InternalOverflow(what))
}
