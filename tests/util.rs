#![allow(dead_code)]
use std::sync::Arc;

use fixedbitset::FixedBitSet;
use tree_memberships::prelude::*;

/// Root over numeric columns (indexed by original row) and per-row counts.
pub fn root_from(
    columns: &[Vec<f64>],
    counts: Vec<u32>,
    config: MembershipsConfig,
) -> Arc<RootRowMemberships> {
    let sorted = SortedColumns::from_numeric(columns).unwrap();
    let manager = Arc::new(RowIndexManager::build(&sorted).unwrap());
    RootRowMemberships::new(&SampleCounts::new(counts), manager, config).unwrap()
}

/// Config forcing one child layout.
pub fn layout(layout: DescendantLayout) -> MembershipsConfig {
    MembershipsConfig {
        descendant_layout: layout,
        ..Default::default()
    }
}

/// Mask of length `len` with `ones` set.
pub fn mask_of(len: usize, ones: &[usize]) -> FixedBitSet {
    let mut m = FixedBitSet::with_capacity(len);
    for &i in ones {
        m.insert(i);
    }
    m
}

/// One full forward scan: (original index, index in column, node-local index, weight).
pub fn scan(cursor: &mut dyn ColumnMemberships) -> Vec<(usize, usize, usize, u32)> {
    cursor.reset();
    let mut out = Vec::new();
    while cursor.next() {
        out.push((
            cursor.original_index().unwrap(),
            cursor.index_in_column().unwrap(),
            cursor.index_in_data_memberships().unwrap(),
            cursor.row_weight().unwrap(),
        ));
    }
    out
}
