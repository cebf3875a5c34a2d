//! RootRowMemberships: the row universe of one tree-growth context.
//!
//! Holds the ascending original indices of every row that survived sampling,
//! their weights, and the shared column cache. Every node view, however deep,
//! translates its rows through this object in a single hop.

use std::sync::{Arc, Weak};

use fixedbitset::FixedBitSet;
use itertools::Itertools;

use crate::config::MembershipsConfig;
use crate::data::row_index_manager::RowIndexManager;
use crate::data::row_sample::RowSample;
use crate::data::weights::WeightContainer;
use crate::debug_invariants::DebugInvariants;
use crate::membership_error::{MembershipError, check_index, to_u32};
use crate::memberships::bitset::BitSetMemberships;
use crate::memberships::cache::{ColumnIndexCache, EvictCache};
use crate::memberships::column_index::ColumnIndex;
use crate::memberships::descendant_cursor::{DescendantColumnMemberships, FilteredColumn};
use crate::memberships::index_array::IndexArrayMemberships;
use crate::memberships::ranked_mask::RankedMask;
use crate::memberships::root_cursor::RootColumnMemberships;
use crate::memberships::root_data::RootDataMemberships;
use crate::memberships::{DataMemberships, NodeRows, translate_mask};

/// Row universe shared by all node views of one tree (or of several trees
/// drawing from the same sample).
///
/// # Invariants
/// - `original_indices` is strictly ascending.
/// - `weights.len() == original_indices.len()` and every weight is positive.
/// - `row_count() <= tree_row_count()`.
///
/// Read-only after construction except for the lazily filled column cache,
/// which is safe to use from many threads at once.
#[derive(Debug)]
pub struct RootRowMemberships {
    /// `original_indices[root_local] = original`
    original_indices: Box<[u32]>,
    weights: WeightContainer,
    manager: Arc<RowIndexManager>,
    cache: ColumnIndexCache,
    config: MembershipsConfig,
    /// Rows of the sampled root this one was (transitively) promoted from.
    tree_rows: usize,
    lineage: Option<Lineage>,
}

/// Link from a promoted root back to the root it was carved out of.
#[derive(Debug)]
pub(crate) struct Lineage {
    parent: Weak<RootRowMemberships>,
    /// `parent_locals[local]` = parent-root-local index of row `local`.
    parent_locals: Box<[u32]>,
}

static_assertions::assert_impl_all!(RootRowMemberships: Send, Sync);

impl RootRowMemberships {
    /// Build the root from a row sample; rows drawn zero times are dropped.
    ///
    /// # Errors
    /// * `Construction` if the sample and the index manager disagree on the
    ///   table row count, or the config is invalid.
    /// * `WeightOverflow` if a count does not fit the configured encoding.
    pub fn new<S>(
        sample: &S,
        manager: Arc<RowIndexManager>,
        config: MembershipsConfig,
    ) -> Result<Arc<Self>, MembershipError>
    where
        S: RowSample + ?Sized,
    {
        if sample.row_count() != manager.row_count() {
            return Err(MembershipError::Construction(format!(
                "sample covers {} rows, index manager {}",
                sample.row_count(),
                manager.row_count()
            )));
        }
        let (original_indices, weights): (Vec<u32>, Vec<u32>) = (0..sample.row_count())
            .filter_map(|r| match sample.count_of(r) {
                0 => None,
                w => Some((r as u32, w)),
            })
            .unzip();
        let tree_rows = original_indices.len();
        Self::from_parts(original_indices, &weights, manager, config, tree_rows, None)
    }

    /// Build a root from explicit ascending original indices and weights.
    pub(crate) fn from_parts(
        original_indices: Vec<u32>,
        weights: &[u32],
        manager: Arc<RowIndexManager>,
        config: MembershipsConfig,
        tree_rows: usize,
        lineage: Option<Lineage>,
    ) -> Result<Arc<Self>, MembershipError> {
        config.validate()?;
        to_u32(original_indices.len(), "root row count exceeds u32 index space")?;
        if weights.len() != original_indices.len() {
            return Err(MembershipError::Construction(format!(
                "{} weights for {} rows",
                weights.len(),
                original_indices.len()
            )));
        }
        let weights = WeightContainer::from_weights(weights, config.weight_encoding)?;
        let root = Self {
            original_indices: original_indices.into_boxed_slice(),
            weights,
            manager,
            cache: ColumnIndexCache::new(config.retained_columns),
            config,
            tree_rows,
            lineage,
        };
        root.debug_assert_invariants();
        Ok(Arc::new(root))
    }

    /// Promote `node` to a root of its own: same rows, same weights, same
    /// index manager, fresh cache scoped to just those rows.
    ///
    /// Node-local indices of `node` equal root-local indices of the result,
    /// since both enumerate the rows in ascending original order. The result
    /// keeps reporting the sampled tree's row count from `row_count_in_root`,
    /// and derives its column entries from the parent's while the parent is
    /// alive.
    pub fn reroot(node: &dyn DataMemberships) -> Result<RootDataMemberships, MembershipError> {
        let parent = node.root();
        let parent_locals: Box<[u32]> = node.root_local_indices().map(|r| r as u32).collect();
        let original_indices = parent_locals
            .iter()
            .map(|&r| parent.original_indices[r as usize])
            .collect();
        let new_root = Self::from_parts(
            original_indices,
            &node.row_weights(),
            Arc::clone(&parent.manager),
            parent.config.clone(),
            parent.tree_rows,
            Some(Lineage {
                parent: Arc::downgrade(parent),
                parent_locals,
            }),
        )?;
        log::debug!(
            "re-rooted node of {} rows (parent root {} rows)",
            new_root.row_count(),
            parent.row_count()
        );
        Ok(RootDataMemberships::new(new_root))
    }

    /// Number of rows that survived sampling.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.original_indices.len()
    }

    /// Number of rows of the sampled root at the top of the tree. Equals
    /// `row_count()` unless this root was promoted from a descendant.
    #[inline]
    pub fn tree_row_count(&self) -> usize {
        self.tree_rows
    }

    /// Bootstrap weight of root-local row `local`.
    #[inline]
    pub fn row_weight(&self, local: usize) -> Result<u32, MembershipError> {
        self.weights.weight(local)
    }

    /// Original table row of root-local row `local`.
    #[inline]
    pub fn original_index(&self, local: usize) -> Result<usize, MembershipError> {
        check_index(local, self.row_count())?;
        Ok(self.original_indices[local] as usize)
    }

    /// All weights in root-local order.
    pub fn all_row_weights(&self) -> Vec<u32> {
        self.weights.all_weights()
    }

    /// Ascending original indices, indexed by root-local index.
    #[inline]
    pub fn original_indices(&self) -> &[u32] {
        &self.original_indices
    }

    #[inline]
    pub fn weights(&self) -> &WeightContainer {
        &self.weights
    }

    #[inline]
    pub fn config(&self) -> &MembershipsConfig {
        &self.config
    }

    #[inline]
    pub fn row_index_manager(&self) -> &Arc<RowIndexManager> {
        &self.manager
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.manager.column_count()
    }

    #[inline]
    pub fn cache(&self) -> &ColumnIndexCache {
        &self.cache
    }

    /// Cached column entry for `column`, computed on first request.
    pub fn column_index(&self, column: usize) -> Result<Arc<ColumnIndex>, MembershipError> {
        if column >= self.column_count() {
            return Err(MembershipError::ColumnOutOfRange {
                column,
                columns: self.column_count(),
            });
        }
        self.cache.get_or_load(column, || match &self.lineage {
            Some(lineage) => match lineage.parent.upgrade() {
                Some(parent) => {
                    ColumnIndex::restrict(&*parent.column_index(column)?, &lineage.parent_locals)
                }
                None => ColumnIndex::load(column, &self.original_indices, &self.manager),
            },
            None => ColumnIndex::load(column, &self.original_indices, &self.manager),
        })
    }

    /// Cursor over all root rows of `column`.
    pub fn column_memberships(
        self: &Arc<Self>,
        column: usize,
    ) -> Result<RootColumnMemberships, MembershipError> {
        let index = self.column_index(column)?;
        Ok(RootColumnMemberships::new(Arc::clone(self), index))
    }

    /// Filter `column`'s cached entry down to `rows`.
    pub(crate) fn filter_column(
        &self,
        column: usize,
        rows: &NodeRows,
    ) -> Result<FilteredColumn, MembershipError> {
        FilteredColumn::new(self.column_index(column)?, rows)
    }

    /// Cursor over `column` restricted to `rows` (a mask or an ascending
    /// array of root-local indices).
    ///
    /// # Errors
    /// * `Construction` if an index array is not strictly ascending.
    /// * `IndexOutOfRange` if `rows` names a row `>= row_count()`.
    pub fn descendant_column_memberships(
        self: &Arc<Self>,
        column: usize,
        rows: NodeRows,
    ) -> Result<DescendantColumnMemberships, MembershipError> {
        rows.validate(self.row_count())?;
        let filtered = self.filter_column(column, &rows)?;
        Ok(DescendantColumnMemberships::new(Arc::clone(self), filtered, rows))
    }

    /// Node view over exactly the root-local rows set in `mask`.
    ///
    /// # Errors
    /// `IndexOutOfRange` if `mask` sets a bit `>= row_count()`.
    pub fn create_descendant_memberships(
        self: &Arc<Self>,
        mask: &FixedBitSet,
    ) -> Result<Box<dyn DataMemberships>, MembershipError> {
        let n = self.row_count();
        let rows = translate_mask(mask, n, n, Some)?;
        self.build_child(rows)
    }

    /// Pick the representation for a child over root-local `rows`.
    pub(crate) fn build_child(
        self: &Arc<Self>,
        rows: FixedBitSet,
    ) -> Result<Box<dyn DataMemberships>, MembershipError> {
        let rows = RankedMask::new(rows)?;
        let count = rows.count();
        let total = self.row_count();

        if let Some(threshold) = self.config.reroot_below {
            if count > 0 && (count as f64) < threshold * total as f64 {
                let child = BitSetMemberships::new(Arc::clone(self), Arc::new(rows));
                return Ok(Box::new(Self::reroot(&child)?));
            }
        }
        if self.config.descendant_layout.prefers_sparse(count, total) {
            let indices: Arc<[u32]> = rows.ones().map(|r| r as u32).collect();
            Ok(Box::new(IndexArrayMemberships::new(Arc::clone(self), indices)))
        } else {
            Ok(Box::new(BitSetMemberships::new(Arc::clone(self), Arc::new(rows))))
        }
    }
}

impl EvictCache for RootRowMemberships {
    fn evict_all(&self) {
        self.cache.evict_all();
    }
}

impl DebugInvariants for RootRowMemberships {
    fn validate_invariants(&self) -> Result<(), MembershipError> {
        if let Some((a, b)) = self
            .original_indices
            .iter()
            .tuple_windows()
            .find(|(a, b)| a >= b)
        {
            return Err(MembershipError::Construction(format!(
                "original indices not strictly ascending: {a} then {b}"
            )));
        }
        if let Some(&last) = self.original_indices.last() {
            check_index(last as usize, self.manager.row_count())?;
        }
        if self.weights.len() != self.original_indices.len() {
            return Err(MembershipError::Construction(format!(
                "{} weights for {} rows",
                self.weights.len(),
                self.original_indices.len()
            )));
        }
        if self.row_count() > self.tree_rows {
            return Err(MembershipError::Construction(format!(
                "root of {} rows claims a tree of {}",
                self.row_count(),
                self.tree_rows
            )));
        }
        if let Some(row) = (0..self.weights.len()).find(|&r| self.weights.get(r) == 0) {
            return Err(MembershipError::Construction(format!(
                "root row {row} has zero weight"
            )));
        }
        Ok(())
    }
}
