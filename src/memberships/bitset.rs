//! Dense node view: a bit mask over root-local indices.
//!
//! Suited to nodes just below a split of a large node, where most root rows
//! are still present. Node-local lookups go through the mask's rank
//! directory, so no explicit index array is ever materialized.

use std::sync::Arc;

use fixedbitset::FixedBitSet;
use once_cell::sync::OnceCell;

use crate::membership_error::MembershipError;
use crate::memberships::cursor::ColumnMemberships;
use crate::memberships::descendant_cursor::{DescendantColumnMemberships, FilteredColumn};
use crate::memberships::ranked_mask::RankedMask;
use crate::memberships::root::RootRowMemberships;
use crate::memberships::{DataMemberships, NodeRows, translate_mask};

#[derive(Debug)]
pub struct BitSetMemberships {
    root: Arc<RootRowMemberships>,
    rows: Arc<RankedMask>,
    columns: Box<[OnceCell<FilteredColumn>]>,
}

impl BitSetMemberships {
    /// `rows` must be a mask of length `root.row_count()`.
    pub(crate) fn new(root: Arc<RootRowMemberships>, rows: Arc<RankedMask>) -> Self {
        debug_assert_eq!(rows.len(), root.row_count());
        let columns = (0..root.column_count()).map(|_| OnceCell::new()).collect();
        Self {
            root,
            rows,
            columns,
        }
    }

    /// The node's rows as a root-local mask.
    #[inline]
    pub fn mask(&self) -> &RankedMask {
        &self.rows
    }
}

impl DataMemberships for BitSetMemberships {
    #[inline]
    fn root(&self) -> &Arc<RootRowMemberships> {
        &self.root
    }

    #[inline]
    fn row_count(&self) -> usize {
        self.rows.count()
    }

    fn root_local_index(&self, index: usize) -> Result<usize, MembershipError> {
        self.rows
            .select(index)
            .ok_or(MembershipError::IndexOutOfRange {
                index,
                len: self.row_count(),
            })
    }

    fn root_local_indices(&self) -> Box<dyn Iterator<Item = usize> + '_> {
        Box::new(self.rows.ones())
    }

    fn column_memberships(&self, column: usize) -> Result<Box<dyn ColumnMemberships>, MembershipError> {
        let cell = self
            .columns
            .get(column)
            .ok_or(MembershipError::ColumnOutOfRange {
                column,
                columns: self.columns.len(),
            })?;
        let rows = NodeRows::Mask(Arc::clone(&self.rows));
        let filtered = cell
            .get_or_try_init(|| self.root.filter_column(column, &rows))?
            .clone();
        Ok(Box::new(DescendantColumnMemberships::new(
            Arc::clone(&self.root),
            filtered,
            rows,
        )))
    }

    fn create_child_memberships(
        &self,
        mask: &FixedBitSet,
    ) -> Result<Box<dyn DataMemberships>, MembershipError> {
        let rows = translate_mask(mask, self.row_count(), self.root.row_count(), |k| {
            self.rows.select(k)
        })?;
        self.root.build_child(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DescendantLayout, MembershipsConfig};
    use crate::data::row_index_manager::RowIndexManager;
    use crate::data::row_sample::SampleCounts;
    use crate::data::sorted_columns::SortedColumns;

    fn dense_root(values: Vec<f64>, weights: Vec<u32>) -> Arc<RootRowMemberships> {
        let manager =
            RowIndexManager::build(&SortedColumns::from_numeric(&[values]).unwrap()).unwrap();
        let cfg = MembershipsConfig {
            descendant_layout: DescendantLayout::Dense,
            ..Default::default()
        };
        RootRowMemberships::new(&SampleCounts::new(weights), Arc::new(manager), cfg).unwrap()
    }

    fn mask_of(len: usize, ones: &[usize]) -> FixedBitSet {
        let mut m = FixedBitSet::with_capacity(len);
        for &i in ones {
            m.insert(i);
        }
        m
    }

    #[test]
    fn lookups_follow_the_mask() {
        let root = dense_root(vec![5.0, 2.0, 9.0, 1.0, 7.0], vec![2, 1, 3, 1, 2]);
        let child = root
            .create_descendant_memberships(&mask_of(5, &[0, 1, 3]))
            .unwrap();
        assert_eq!(child.row_count(), 3);
        assert_eq!(child.row_count_in_root(), 5);
        assert_eq!(child.original_indices(), vec![0, 1, 3]);
        assert_eq!(child.row_weights(), vec![2, 1, 1]);
        assert_eq!(child.original_index(2), Ok(3));
        assert_eq!(
            child.row_weight(3),
            Err(MembershipError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn grandchild_resolves_against_root() {
        let root = dense_root(vec![5.0, 2.0, 9.0, 1.0, 7.0, 4.0], vec![1; 6]);
        let child = root
            .create_descendant_memberships(&mask_of(6, &[1, 2, 4, 5]))
            .unwrap();
        // node-local 1 and 3 -> root-local 2 and 5
        let grandchild = child.create_child_memberships(&mask_of(4, &[1, 3])).unwrap();
        assert!(Arc::ptr_eq(grandchild.root(), &root));
        assert_eq!(grandchild.original_indices(), vec![2, 5]);
        assert!(child.create_child_memberships(&mask_of(5, &[4])).is_err());
    }

    #[test]
    fn column_cursor_reports_node_local_indices() {
        let root = dense_root(vec![5.0, 2.0, 9.0, 1.0, 7.0, 4.0], vec![1; 6]);
        let child = root
            .create_descendant_memberships(&mask_of(6, &[0, 2, 3, 5]))
            .unwrap();
        let mut cursor = child.column_memberships(0).unwrap();
        let mut seen = Vec::new();
        while cursor.next() {
            seen.push((
                cursor.original_index().unwrap(),
                cursor.index_in_data_memberships().unwrap(),
            ));
        }
        // column order: 3 (1.0), 5 (4.0), 0 (5.0), 2 (9.0)
        assert_eq!(seen, vec![(3, 2), (5, 3), (0, 0), (2, 1)]);
        assert!(matches!(
            child.column_memberships(1),
            Err(MembershipError::ColumnOutOfRange { .. })
        ));
    }
}
