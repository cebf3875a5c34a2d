//! Sparse node view: an explicit ascending array of root-local indices.
//!
//! Deep in a tree, nodes hold few rows and O(1) lookups are worth the
//! four bytes per row.

use std::sync::Arc;

use fixedbitset::FixedBitSet;
use once_cell::sync::OnceCell;

use crate::membership_error::MembershipError;
use crate::memberships::cursor::ColumnMemberships;
use crate::memberships::descendant_cursor::{DescendantColumnMemberships, FilteredColumn};
use crate::memberships::root::RootRowMemberships;
use crate::memberships::{DataMemberships, NodeRows, translate_mask};

#[derive(Debug)]
pub struct IndexArrayMemberships {
    root: Arc<RootRowMemberships>,
    /// `rows[node_local] = root_local`, ascending.
    rows: Arc<[u32]>,
    columns: Box<[OnceCell<FilteredColumn>]>,
}

impl IndexArrayMemberships {
    pub(crate) fn new(root: Arc<RootRowMemberships>, rows: Arc<[u32]>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0] < w[1]));
        let columns = (0..root.column_count()).map(|_| OnceCell::new()).collect();
        Self {
            root,
            rows,
            columns,
        }
    }

    /// Root-local indices in node-local order.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.rows
    }
}

impl DataMemberships for IndexArrayMemberships {
    #[inline]
    fn root(&self) -> &Arc<RootRowMemberships> {
        &self.root
    }

    #[inline]
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    fn root_local_index(&self, index: usize) -> Result<usize, MembershipError> {
        self.rows
            .get(index)
            .map(|&r| r as usize)
            .ok_or(MembershipError::IndexOutOfRange {
                index,
                len: self.rows.len(),
            })
    }

    fn root_local_indices(&self) -> Box<dyn Iterator<Item = usize> + '_> {
        Box::new(self.rows.iter().map(|&r| r as usize))
    }

    fn column_memberships(&self, column: usize) -> Result<Box<dyn ColumnMemberships>, MembershipError> {
        let cell = self
            .columns
            .get(column)
            .ok_or(MembershipError::ColumnOutOfRange {
                column,
                columns: self.columns.len(),
            })?;
        let rows = NodeRows::Indices(Arc::clone(&self.rows));
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
        let rows = translate_mask(mask, self.rows.len(), self.root.row_count(), |k| {
            self.rows.get(k).map(|&r| r as usize)
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

    fn sparse_root() -> Arc<RootRowMemberships> {
        let values = vec![5.0, 2.0, 9.0, 1.0, 7.0, 4.0, 8.0];
        let manager =
            RowIndexManager::build(&SortedColumns::from_numeric(&[values]).unwrap()).unwrap();
        let cfg = MembershipsConfig {
            descendant_layout: DescendantLayout::Sparse,
            ..Default::default()
        };
        // original 2 is not sampled: root-local 0..6 = originals 0,1,3,4,5,6
        let sample = SampleCounts::new(vec![1, 2, 0, 1, 1, 3, 1]);
        RootRowMemberships::new(&sample, Arc::new(manager), cfg).unwrap()
    }

    fn mask_of(len: usize, ones: &[usize]) -> FixedBitSet {
        let mut m = FixedBitSet::with_capacity(len);
        for &i in ones {
            m.insert(i);
        }
        m
    }

    #[test]
    fn indices_are_root_local() {
        let root = sparse_root();
        let child = root
            .create_descendant_memberships(&mask_of(6, &[1, 4, 5]))
            .unwrap();
        assert_eq!(child.row_count(), 3);
        assert_eq!(child.original_indices(), vec![1, 5, 6]);
        assert_eq!(child.row_weights(), vec![2, 3, 1]);
        assert_eq!(child.row_weight(1), Ok(3));
    }

    #[test]
    fn column_cursor_walks_backwards_too() {
        let root = sparse_root();
        let child = root
            .create_descendant_memberships(&mask_of(6, &[0, 1, 3, 5]))
            .unwrap();
        let mut cursor = child.column_memberships(0).unwrap();
        // originals 0 (5.0), 1 (2.0), 4 (7.0), 6 (8.0) -> order 1, 0, 4, 6
        assert!(cursor.go_to_last());
        let mut back = vec![cursor.original_index().unwrap()];
        while cursor.previous() {
            back.push(cursor.original_index().unwrap());
        }
        assert_eq!(back, vec![6, 4, 0, 1]);
        assert_eq!(
            cursor.original_index(),
            Err(MembershipError::InvalidCursorState)
        );
    }

    #[test]
    fn empty_child_has_empty_cursor() {
        let root = sparse_root();
        let child = root
            .create_descendant_memberships(&FixedBitSet::with_capacity(6))
            .unwrap();
        assert_eq!(child.row_count(), 0);
        let mut cursor = child.column_memberships(0).unwrap();
        assert_eq!(cursor.size(), 0);
        assert!(!cursor.next());
        assert!(!cursor.go_to_last());
        assert!(child.create_child_memberships(&FixedBitSet::new()).is_ok());
    }
}
