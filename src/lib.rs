//! # tree-memberships
//!
//! tree-memberships is the row/column membership-indexing layer used while
//! growing decision trees in a tree-ensemble trainer. At every node, split
//! search must scan each candidate column in its globally sorted order, but
//! only over the rows that reached that node. This crate provides that view
//! without ever re-sorting a column.
//!
//! ## Features
//! - [`RowIndexManager`](data::RowIndexManager): per-column bijection between
//!   original row positions and sorted positions, built once per run.
//! - [`RootRowMemberships`](memberships::root::RootRowMemberships): the
//!   sampled row universe of one tree, with weights and a single-flight,
//!   evictable cache of column entries shared across threads.
//! - [`ColumnMemberships`](memberships::cursor::ColumnMemberships) cursors
//!   with forward, backward and seek moves.
//! - Dense (bit mask) and sparse (index array) node views, both resolving
//!   indices through the root in one hop.
//!
//! ## Usage
//!
//! ```rust
//! # fn try_main() -> Result<(), tree_memberships::membership_error::MembershipError> {
//! use std::sync::Arc;
//! use fixedbitset::FixedBitSet;
//! use tree_memberships::prelude::*;
//!
//! let columns = SortedColumns::from_numeric(&[vec![5.0, 2.0, 9.0, 1.0, 7.0]])?;
//! let manager = Arc::new(RowIndexManager::build(&columns)?);
//! let sample = SampleCounts::new(vec![2, 1, 3, 1, 2]);
//! let root = RootRowMemberships::new(&sample, manager, MembershipsConfig::default())?;
//!
//! let mut left = FixedBitSet::with_capacity(5);
//! left.extend([0, 1, 3]);
//! let child = RootDataMemberships::new(root).create_child_memberships(&left)?;
//! let mut cursor = child.column_memberships(0)?;
//! let mut order = Vec::new();
//! while cursor.next() {
//!     order.push(cursor.original_index()?);
//! }
//! assert_eq!(order, vec![3, 1, 0]);
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```
//!
//! ## Determinism
//!
//! Column entries are pure functions of the root's rows and the column
//! order; an evicted entry is recomputed bit-for-bit identical.

pub mod config;
pub mod data;
pub mod debug_invariants;
pub mod membership_error;
pub mod memberships;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::config::{DescendantLayout, MembershipsConfig, WeightEncoding};
    pub use crate::data::{
        RowIndexManager, RowSample, SampleCounts, SortedColumnSource, SortedColumns,
        WeightContainer,
    };
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::membership_error::MembershipError;
    pub use crate::memberships::bitset::BitSetMemberships;
    pub use crate::memberships::cache::{ColumnIndexCache, EvictCache};
    pub use crate::memberships::cursor::{ColumnMemberships, CursorState, column_range_mask};
    pub use crate::memberships::index_array::IndexArrayMemberships;
    pub use crate::memberships::root::RootRowMemberships;
    pub use crate::memberships::root_data::RootDataMemberships;
    pub use crate::memberships::{DataMemberships, NodeRows};
}
