//! The root itself as a node view (node-local index == root-local index).

use std::sync::Arc;

use fixedbitset::FixedBitSet;

use crate::membership_error::{MembershipError, check_index};
use crate::memberships::DataMemberships;
use crate::memberships::cursor::ColumnMemberships;
use crate::memberships::root::RootRowMemberships;

/// Node view covering every row of a root. Column requests go straight to
/// the root's shared cache.
#[derive(Clone, Debug)]
pub struct RootDataMemberships {
    root: Arc<RootRowMemberships>,
}

impl RootDataMemberships {
    pub fn new(root: Arc<RootRowMemberships>) -> Self {
        Self { root }
    }
}

impl From<Arc<RootRowMemberships>> for RootDataMemberships {
    fn from(root: Arc<RootRowMemberships>) -> Self {
        Self::new(root)
    }
}

impl DataMemberships for RootDataMemberships {
    #[inline]
    fn root(&self) -> &Arc<RootRowMemberships> {
        &self.root
    }

    #[inline]
    fn row_count(&self) -> usize {
        self.root.row_count()
    }

    #[inline]
    fn root_local_index(&self, index: usize) -> Result<usize, MembershipError> {
        check_index(index, self.root.row_count())?;
        Ok(index)
    }

    fn root_local_indices(&self) -> Box<dyn Iterator<Item = usize> + '_> {
        Box::new(0..self.root.row_count())
    }

    fn row_weights(&self) -> Vec<u32> {
        self.root.all_row_weights()
    }

    fn column_memberships(&self, column: usize) -> Result<Box<dyn ColumnMemberships>, MembershipError> {
        Ok(Box::new(self.root.column_memberships(column)?))
    }

    fn create_child_memberships(
        &self,
        mask: &FixedBitSet,
    ) -> Result<Box<dyn DataMemberships>, MembershipError> {
        self.root.create_descendant_memberships(mask)
    }
}
