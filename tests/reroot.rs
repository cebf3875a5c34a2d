mod util;

use std::sync::Arc;

use tree_memberships::prelude::*;
use util::{mask_of, root_from, scan};

fn table() -> Vec<Vec<f64>> {
    vec![
        vec![9.0, 3.0, 7.0, 1.0, 8.0, 2.0, 6.0, 0.0, 5.0, 4.0],
        vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0],
    ]
}

fn counts() -> Vec<u32> {
    vec![1, 2, 1, 3, 1, 1, 2, 1, 1, 2]
}

#[test]
fn small_child_becomes_its_own_root() {
    let config = MembershipsConfig {
        reroot_below: Some(0.5),
        ..Default::default()
    };
    let root = root_from(&table(), counts(), config);
    let plain = root_from(&table(), counts(), MembershipsConfig::default());
    let mask = mask_of(10, &[1, 4, 7, 8]);

    let rerooted = root.create_descendant_memberships(&mask).unwrap();
    let reference = plain.create_descendant_memberships(&mask).unwrap();

    assert!(!Arc::ptr_eq(rerooted.root(), &root));
    assert_eq!(rerooted.root().row_count(), 4);
    // Still measured against the sampled tree, not the promoted root.
    assert_eq!(rerooted.row_count_in_root(), 10);
    assert_eq!(reference.row_count_in_root(), 10);
    assert_eq!(rerooted.original_indices(), reference.original_indices());
    assert_eq!(rerooted.row_weights(), reference.row_weights());
    for column in 0..2 {
        let mut a = rerooted.column_memberships(column).unwrap();
        let mut b = reference.column_memberships(column).unwrap();
        assert_eq!(scan(a.as_mut()), scan(b.as_mut()));
    }
    // The new root only caches columns over its own four rows.
    assert_eq!(rerooted.root().column_index(0).unwrap().len(), 4);
}

#[test]
fn large_child_stays_under_the_root() {
    let config = MembershipsConfig {
        reroot_below: Some(0.2),
        ..Default::default()
    };
    let root = root_from(&table(), counts(), config);
    let child = root
        .create_descendant_memberships(&mask_of(10, &[0, 1, 2, 3, 4]))
        .unwrap();
    assert!(Arc::ptr_eq(child.root(), &root));
    // 1 of 10 rows is below the threshold.
    let grandchild = child.create_child_memberships(&mask_of(5, &[2])).unwrap();
    assert!(!Arc::ptr_eq(grandchild.root(), &root));
    assert_eq!(grandchild.original_indices(), vec![2]);
    assert_eq!(grandchild.row_count_in_root(), 10);
}

#[test]
fn explicit_reroot_keeps_node_local_indices() {
    let root = root_from(&table(), counts(), MembershipsConfig::default());
    let child = root
        .create_descendant_memberships(&mask_of(10, &[0, 3, 5, 6, 9]))
        .unwrap();
    let promoted = RootRowMemberships::reroot(child.as_ref()).unwrap();
    assert_eq!(promoted.row_count(), child.row_count());
    assert_eq!(promoted.row_count_in_root(), 10);
    assert_eq!(promoted.root().tree_row_count(), 10);
    for i in 0..child.row_count() {
        assert_eq!(promoted.original_index(i), child.original_index(i));
        assert_eq!(promoted.row_weight(i), child.row_weight(i));
    }
    assert!(Arc::ptr_eq(
        promoted.root().row_index_manager(),
        root.row_index_manager()
    ));
}

#[test]
fn promoted_root_narrows_the_parent_columns() {
    let root = root_from(&table(), counts(), MembershipsConfig::default());
    let child = root
        .create_descendant_memberships(&mask_of(10, &[2, 3, 7, 9]))
        .unwrap();
    let promoted = RootRowMemberships::reroot(child.as_ref()).unwrap();
    for column in 0..2 {
        let mut a = promoted.column_memberships(column).unwrap();
        let mut b = child.column_memberships(column).unwrap();
        assert_eq!(scan(a.as_mut()), scan(b.as_mut()));
    }
    // Each column is loaded once for the parent; the promoted root narrows
    // that entry instead of walking the table again.
    assert_eq!(root.cache().computations(), 2);
    assert_eq!(promoted.root().cache().computations(), 2);
    assert_eq!(promoted.root().column_index(1).unwrap().len(), 4);
}

#[test]
fn promoted_root_outlives_its_parent() {
    let root = root_from(&table(), counts(), MembershipsConfig::default());
    let child = root
        .create_descendant_memberships(&mask_of(10, &[0, 5, 6]))
        .unwrap();
    let expected: Vec<_> = {
        let mut cursor = child.column_memberships(0).unwrap();
        scan(cursor.as_mut())
    };
    let promoted = RootRowMemberships::reroot(child.as_ref()).unwrap();
    drop(child);
    drop(root);

    let mut cursor = promoted.column_memberships(0).unwrap();
    assert_eq!(scan(cursor.as_mut()), expected);
    assert_eq!(promoted.row_count_in_root(), 10);
}
