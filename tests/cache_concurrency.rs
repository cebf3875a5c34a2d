mod util;

use std::sync::{Arc, Barrier};
use std::thread;

use tree_memberships::prelude::*;
use util::{mask_of, root_from, scan};

fn wide_table(rows: usize, columns: usize) -> Vec<Vec<f64>> {
    (0..columns)
        .map(|c| (0..rows).map(|r| ((r * 7919 + c * 31) % 1009) as f64).collect())
        .collect()
}

#[test]
fn concurrent_requests_compute_each_column_once() {
    let table = wide_table(2_000, 4);
    let root = root_from(&table, vec![1; 2_000], MembershipsConfig::default());
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let root = Arc::clone(&root);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let column = t % 4;
                let mut cursor = root.column_memberships(column).unwrap();
                (column, scan(&mut cursor))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(root.cache().computations(), 4);
    for (column, rows) in &results {
        let same_column = results.iter().find(|(c, _)| c == column).unwrap();
        assert_eq!(rows, &same_column.1);
    }
}

#[test]
fn threads_growing_disjoint_nodes_share_one_root() {
    let table = wide_table(500, 3);
    let root = root_from(&table, vec![2; 500], MembershipsConfig::default());
    let n = root.row_count();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let root = Arc::clone(&root);
            thread::spawn(move || {
                let ones: Vec<usize> = (0..n).filter(|r| r % 4 == t).collect();
                let node = root.create_descendant_memberships(&mask_of(n, &ones)).unwrap();
                let mut total = 0u64;
                for column in 0..3 {
                    let mut cursor = node.column_memberships(column).unwrap();
                    total += scan(cursor.as_mut())
                        .iter()
                        .map(|r| u64::from(r.3))
                        .sum::<u64>();
                }
                total
            })
        })
        .collect();

    let total: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 3 * 2 * 500);
    assert_eq!(root.cache().computations(), 3);
}

#[test]
fn eviction_under_pressure_is_invisible() {
    let table = wide_table(300, 2);
    let config = MembershipsConfig {
        retained_columns: 1,
        ..Default::default()
    };
    let root = root_from(&table, vec![1; 300], config);
    let mut first = root.column_memberships(0).unwrap();
    let before = scan(&mut first);
    drop(first);

    // Column 1 pushes column 0 out of retention; nothing else holds it.
    root.column_memberships(1).unwrap();
    assert!(!root.cache().is_resident(0));

    let mut again = root.column_memberships(0).unwrap();
    assert_eq!(scan(&mut again), before);
    assert_eq!(root.cache().computations(), 3);

    root.evict_all();
    assert_eq!(root.cache().retained_len(), 0);
    // The live cursor keeps its entry reachable.
    assert!(root.cache().is_resident(0));
}
