//! Cursor over all root rows of one column.

use std::sync::Arc;

use crate::membership_error::MembershipError;
use crate::memberships::column_index::ColumnIndex;
use crate::memberships::cursor::{ColumnMemberships, CursorState};
use crate::memberships::root::RootRowMemberships;

/// Walks a cached [`ColumnIndex`] directly; every restricted position is a
/// member, so all moves are O(1) and `next_index_from` is a binary search.
#[derive(Clone, Debug)]
pub struct RootColumnMemberships {
    root: Arc<RootRowMemberships>,
    index: Arc<ColumnIndex>,
    state: CursorState,
}

impl RootColumnMemberships {
    pub(crate) fn new(root: Arc<RootRowMemberships>, index: Arc<ColumnIndex>) -> Self {
        Self {
            root,
            index,
            state: CursorState::BeforeStart,
        }
    }

    #[inline]
    pub fn column(&self) -> usize {
        self.index.column()
    }

    #[inline]
    fn root_local(&self) -> Result<usize, MembershipError> {
        Ok(self.index.root_local(self.state.position()?))
    }
}

impl ColumnMemberships for RootColumnMemberships {
    #[inline]
    fn size(&self) -> usize {
        self.index.len()
    }

    #[inline]
    fn state(&self) -> CursorState {
        self.state
    }

    fn next(&mut self) -> bool {
        let next = match self.state {
            CursorState::BeforeStart => 0,
            CursorState::Positioned(p) => p + 1,
        };
        if next < self.size() {
            self.state = CursorState::Positioned(next);
            true
        } else {
            false
        }
    }

    fn next_index_from(&mut self, column_position: usize) -> bool {
        let start = match self.state {
            CursorState::BeforeStart => 0,
            CursorState::Positioned(p) => p + 1,
        };
        let size = self.size();
        if start >= size {
            return false;
        }
        let found = start
            + self.index.column_positions()[start..]
                .partition_point(|&c| (c as usize) < column_position);
        if found < size {
            self.state = CursorState::Positioned(found);
            true
        } else {
            self.state = CursorState::Positioned(size - 1);
            false
        }
    }

    fn previous(&mut self) -> bool {
        match self.state {
            CursorState::Positioned(p) if p > 0 => {
                self.state = CursorState::Positioned(p - 1);
                true
            }
            _ => {
                self.state = CursorState::BeforeStart;
                false
            }
        }
    }

    fn go_to_last(&mut self) -> bool {
        match self.size() {
            0 => false,
            n => {
                self.state = CursorState::Positioned(n - 1);
                true
            }
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
        Ok(self.index.column_position(self.state.position()?))
    }

    fn index_in_data_memberships(&self) -> Result<usize, MembershipError> {
        self.root_local()
    }
}
