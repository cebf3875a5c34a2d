//! Cursor over a node's rows in one column's sorted order.
//!
//! A cursor starts [`CursorState::BeforeStart`]. `next` moves to the row with
//! the next higher column position; when no such row exists it returns
//! `false` and stays where it is. Row accessors are only meaningful while
//! positioned and return [`MembershipError::InvalidCursorState`] otherwise.

use std::ops::{Bound, RangeBounds};

use fixedbitset::FixedBitSet;

use crate::membership_error::MembershipError;

/// Position of a cursor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CursorState {
    /// Initial state, and the state after `reset` or `previous` from the first row.
    #[default]
    BeforeStart,
    /// At the `p`-th row (0-based) of the cursor's ascending column order.
    Positioned(usize),
}

impl CursorState {
    /// Ordinal of the current row.
    #[inline]
    pub fn position(self) -> Result<usize, MembershipError> {
        match self {
            CursorState::BeforeStart => Err(MembershipError::InvalidCursorState),
            CursorState::Positioned(p) => Ok(p),
        }
    }
}

/// Resettable cursor over a row subset ordered by ascending column position.
pub trait ColumnMemberships: Send + std::fmt::Debug {
    /// Number of rows in the subset, independent of the cursor position.
    fn size(&self) -> usize;

    fn state(&self) -> CursorState;

    /// Advance to the next row. Returns `false`, leaving the cursor
    /// unchanged, if there is none.
    fn next(&mut self) -> bool;

    /// Scan forward from the current row (exclusive; from the first row when
    /// `BeforeStart`) to the first row whose column position is
    /// `>= column_position`. On failure returns `false` and leaves the cursor
    /// on the last row examined.
    fn next_index_from(&mut self, column_position: usize) -> bool;

    /// Step back one row. From the first row, moves to `BeforeStart` and
    /// returns `false`.
    fn previous(&mut self) -> bool;

    /// Jump to the last row. Returns `false` if the subset is empty.
    fn go_to_last(&mut self) -> bool;

    /// Return to `BeforeStart`.
    fn reset(&mut self);

    /// Bootstrap weight of the current row.
    fn row_weight(&self) -> Result<u32, MembershipError>;

    /// Original table row of the current row.
    fn original_index(&self) -> Result<usize, MembershipError>;

    /// Position of the current row in the full (unsampled) column order.
    fn index_in_column(&self) -> Result<usize, MembershipError>;

    /// Node-local index of the current row in the node view that produced
    /// this cursor.
    fn index_in_data_memberships(&self) -> Result<usize, MembershipError>;
}

/// Node-local mask of the rows whose column position lies in `range`.
///
/// Resets `cursor` before and after the scan. `node_rows` sizes the mask;
/// pass the row count of the node view the cursor came from.
pub fn column_range_mask<C, R>(
    cursor: &mut C,
    node_rows: usize,
    range: R,
) -> Result<FixedBitSet, MembershipError>
where
    C: ColumnMemberships + ?Sized,
    R: RangeBounds<usize>,
{
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let mut mask = FixedBitSet::with_capacity(node_rows);
    cursor.reset();
    if cursor.next_index_from(start) {
        loop {
            if !range.contains(&cursor.index_in_column()?) {
                break;
            }
            let local = cursor.index_in_data_memberships()?;
            if local >= mask.len() {
                mask.grow(local + 1);
            }
            mask.insert(local);
            if !cursor.next() {
                break;
            }
        }
    }
    cursor.reset();
    Ok(mask)
}
