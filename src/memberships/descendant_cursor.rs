//! Cursor over a descendant node's rows of one column.
//!
//! Shares the root's cached [`ColumnIndex`] and walks only the set bits of a
//! mask over its restricted positions; the sorted arrays are never copied.

use std::sync::Arc;

use crate::membership_error::MembershipError;
use crate::memberships::NodeRows;
use crate::memberships::column_index::ColumnIndex;
use crate::memberships::cursor::{ColumnMemberships, CursorState};
use crate::memberships::ranked_mask::RankedMask;
use crate::memberships::root::RootRowMemberships;

/// A column entry filtered down to one node's rows.
#[derive(Clone, Debug)]
pub struct FilteredColumn {
    pub(crate) index: Arc<ColumnIndex>,
    /// Restricted positions belonging to the node.
    pub(crate) mask: Arc<RankedMask>,
}

impl FilteredColumn {
    pub(crate) fn new(index: Arc<ColumnIndex>, rows: &NodeRows) -> Result<Self, MembershipError> {
        let mask = index.restricted_mask(rows.root_locals())?;
        Ok(Self {
            index,
            mask: Arc::new(mask),
        })
    }
}

/// Cursor over the set bits of a [`FilteredColumn`].
#[derive(Clone, Debug)]
pub struct DescendantColumnMemberships {
    root: Arc<RootRowMemberships>,
    filtered: FilteredColumn,
    rows: NodeRows,
    state: CursorState,
    /// Restricted position of the current row; meaningful while positioned.
    bit: usize,
}

impl DescendantColumnMemberships {
    pub(crate) fn new(root: Arc<RootRowMemberships>, filtered: FilteredColumn, rows: NodeRows) -> Self {
        Self {
            root,
            filtered,
            rows,
            state: CursorState::BeforeStart,
            bit: 0,
        }
    }

    #[inline]
    pub fn column(&self) -> usize {
        self.filtered.index.column()
    }

    #[inline]
    fn current_bit(&self) -> Result<usize, MembershipError> {
        self.state.position().map(|_| self.bit)
    }

    #[inline]
    fn root_local(&self) -> Result<usize, MembershipError> {
        Ok(self.filtered.index.root_local(self.current_bit()?))
    }

    #[inline]
    fn scan_from(&self) -> (usize, usize) {
        match self.state {
            CursorState::BeforeStart => (0, 0),
            CursorState::Positioned(p) => (p + 1, self.bit + 1),
        }
    }
}

impl ColumnMemberships for DescendantColumnMemberships {
    #[inline]
    fn size(&self) -> usize {
        self.filtered.mask.count()
    }

    #[inline]
    fn state(&self) -> CursorState {
        self.state
    }

    fn next(&mut self) -> bool {
        let (ordinal, from) = self.scan_from();
        match self.filtered.mask.next_one(from) {
            Some(bit) => {
                self.bit = bit;
                self.state = CursorState::Positioned(ordinal);
                true
            }
            None => false,
        }
    }

    fn next_index_from(&mut self, column_position: usize) -> bool {
        let (mut ordinal, mut from) = self.scan_from();
        while let Some(bit) = self.filtered.mask.next_one(from) {
            self.bit = bit;
            self.state = CursorState::Positioned(ordinal);
            if self.filtered.index.column_position(bit) >= column_position {
                return true;
            }
            ordinal += 1;
            from = bit + 1;
        }
        false
    }

    fn previous(&mut self) -> bool {
        if let CursorState::Positioned(p) = self.state {
            if p > 0 {
                if let Some(bit) = self.filtered.mask.prev_one(self.bit) {
                    self.bit = bit;
                    self.state = CursorState::Positioned(p - 1);
                    return true;
                }
            }
        }
        self.state = CursorState::BeforeStart;
        false
    }

    fn go_to_last(&mut self) -> bool {
        let mask = &self.filtered.mask;
        match mask.prev_one(mask.len()) {
            Some(bit) => {
                self.bit = bit;
                self.state = CursorState::Positioned(mask.count() - 1);
                true
            }
            None => false,
        }
    }

    #[inline]
    fn reset(&mut self) {
        self.state = CursorState::BeforeStart;
    }

    fn row_weight(&self) -> Result<u32, MembershipError> {
        self.root.row_weight(self.root_local()?)
    }

    fn original_index(&self) -> Result<usize, MembershipError> {
        self.root.original_index(self.root_local()?)
    }

    fn index_in_column(&self) -> Result<usize, MembershipError> {
        Ok(self.filtered.index.column_position(self.current_bit()?))
    }

    fn index_in_data_memberships(&self) -> Result<usize, MembershipError> {
        Ok(self.rows.node_local_of(self.root_local()?))
    }
}
