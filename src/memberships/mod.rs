//! Node views over a root's rows, and the cursors they hand out.
//!
//! Three coordinate systems meet here:
//! - *original index*: a row's position in the input table,
//! - *root-local index*: its position among the root's sampled rows,
//! - *node-local index*: its position among one node's rows.
//!
//! Node-local order is always ascending root-local order, which is in turn
//! ascending original order. Every view translates node-local to root-local
//! in one step; no view refers to its parent.

pub mod bitset;
pub mod cache;
pub mod column_index;
pub mod cursor;
pub mod descendant_cursor;
pub mod index_array;
pub mod ranked_mask;
pub mod root;
pub mod root_cursor;
pub mod root_data;

use std::sync::Arc;

use fixedbitset::FixedBitSet;
use itertools::{Either, Itertools};

use crate::membership_error::{MembershipError, check_index};
use crate::memberships::cursor::ColumnMemberships;
use crate::memberships::ranked_mask::RankedMask;
use crate::memberships::root::RootRowMemberships;

/// Per-node view of a row subset.
pub trait DataMemberships: Send + Sync + std::fmt::Debug {
    /// The root every index of this view resolves through.
    fn root(&self) -> &Arc<RootRowMemberships>;

    /// Number of rows at this node.
    fn row_count(&self) -> usize;

    /// Number of rows at the sampled root of the tree, including when this
    /// view hangs off a promoted root.
    fn row_count_in_root(&self) -> usize {
        self.root().tree_row_count()
    }

    /// Root-local index of node-local row `index`.
    fn root_local_index(&self, index: usize) -> Result<usize, MembershipError>;

    /// Root-local indices of all rows, in node-local order.
    fn root_local_indices(&self) -> Box<dyn Iterator<Item = usize> + '_>;

    /// Bootstrap weight of node-local row `index`.
    fn row_weight(&self, index: usize) -> Result<u32, MembershipError> {
        self.root().row_weight(self.root_local_index(index)?)
    }

    /// Original table row of node-local row `index`.
    fn original_index(&self, index: usize) -> Result<usize, MembershipError> {
        self.root().original_index(self.root_local_index(index)?)
    }

    /// Weights in node-local order.
    fn row_weights(&self) -> Vec<u32> {
        let weights = self.root().weights();
        self.root_local_indices().map(|r| weights.get(r)).collect()
    }

    /// Original indices in node-local order.
    fn original_indices(&self) -> Vec<usize> {
        let originals = self.root().original_indices();
        self.root_local_indices()
            .map(|r| originals[r] as usize)
            .collect()
    }

    /// Fresh cursor over this node's rows in `column`'s sorted order.
    ///
    /// The underlying filtered column is computed once per view and column;
    /// repeated calls return independent cursors over the same data.
    fn column_memberships(&self, column: usize) -> Result<Box<dyn ColumnMemberships>, MembershipError>;

    /// View over the rows of this node whose node-local bit is set in `mask`.
    ///
    /// Always built directly against the root.
    ///
    /// # Errors
    /// `IndexOutOfRange` if `mask` sets a bit `>= row_count()`.
    fn create_child_memberships(
        &self,
        mask: &FixedBitSet,
    ) -> Result<Box<dyn DataMemberships>, MembershipError>;
}

/// A node's rows in root-local coordinates.
#[derive(Clone, Debug)]
pub enum NodeRows {
    /// Bit mask over root-local indices.
    Mask(Arc<RankedMask>),
    /// Ascending root-local indices.
    Indices(Arc<[u32]>),
}

impl NodeRows {
    /// Index-array rows, checked to be strictly ascending.
    ///
    /// # Errors
    /// `Construction` on a repeated or out-of-order index.
    pub fn from_indices(indices: impl Into<Arc<[u32]>>) -> Result<Self, MembershipError> {
        let rows = NodeRows::Indices(indices.into());
        rows.check_ascending()?;
        Ok(rows)
    }

    /// Check that every row lies below `root_len` and, for index arrays, that
    /// the indices are strictly ascending.
    pub fn validate(&self, root_len: usize) -> Result<(), MembershipError> {
        self.check_ascending()?;
        let last = match self {
            NodeRows::Mask(m) => m.ones().last(),
            NodeRows::Indices(ix) => ix.last().map(|&r| r as usize),
        };
        match last {
            Some(r) => check_index(r, root_len),
            None => Ok(()),
        }
    }

    fn check_ascending(&self) -> Result<(), MembershipError> {
        let NodeRows::Indices(ix) = self else {
            return Ok(());
        };
        match ix.iter().tuple_windows().position(|(a, b)| a >= b) {
            Some(k) => Err(MembershipError::Construction(format!(
                "row indices not strictly ascending at {}: {} then {}",
                k + 1,
                ix[k],
                ix[k + 1]
            ))),
            None => Ok(()),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            NodeRows::Mask(m) => m.count(),
            NodeRows::Indices(ix) => ix.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Root-local indices in ascending order.
    pub fn root_locals(&self) -> impl Iterator<Item = usize> + '_ {
        match self {
            NodeRows::Mask(m) => Either::Left(m.ones()),
            NodeRows::Indices(ix) => Either::Right(ix.iter().map(|&r| r as usize)),
        }
    }

    /// Root-local index of node-local row `index`.
    pub fn root_local(&self, index: usize) -> Result<usize, MembershipError> {
        let found = match self {
            NodeRows::Mask(m) => m.select(index),
            NodeRows::Indices(ix) => ix.get(index).map(|&r| r as usize),
        };
        found.ok_or(MembershipError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    /// Node-local index of a root-local row that belongs to the node.
    pub fn node_local_of(&self, root_local: usize) -> usize {
        match self {
            NodeRows::Mask(m) => m.rank(root_local),
            NodeRows::Indices(ix) => match ix.binary_search(&(root_local as u32)) {
                Ok(i) | Err(i) => i,
            },
        }
    }
}

/// Map a node-local `mask` to a root-local bit set through `to_root`.
pub(crate) fn translate_mask<F>(
    mask: &FixedBitSet,
    node_len: usize,
    root_len: usize,
    to_root: F,
) -> Result<FixedBitSet, MembershipError>
where
    F: Fn(usize) -> Option<usize>,
{
    let mut rows = FixedBitSet::with_capacity(root_len);
    for k in mask.ones() {
        let out_of_range = MembershipError::IndexOutOfRange {
            index: k,
            len: node_len,
        };
        if k >= node_len {
            return Err(out_of_range);
        }
        let r = to_root(k).ok_or(out_of_range)?;
        rows.insert(r);
    }
    Ok(rows)
}
