//! Column-order seam.
//!
//! Columns are sorted once, upstream, over the full table. This layer only
//! consumes the resulting orders: for each column, the original row positions
//! listed in ascending value order.

use std::cmp::Ordering;

use crate::membership_error::{MembershipError, check_index, to_u32};

/// Source of per-column sorted row orders.
pub trait SortedColumnSource {
    /// Number of rows in the table.
    fn row_count(&self) -> usize;
    /// Number of attribute columns.
    fn column_count(&self) -> usize;
    /// Original row positions of `column` in ascending value order.
    ///
    /// Callers only pass `column < column_count()`.
    fn sorted_original_positions(&self, column: usize) -> &[u32];
}

/// In-memory sorted column orders.
#[derive(Clone, Debug, Default)]
pub struct SortedColumns {
    row_count: usize,
    orders: Vec<Vec<u32>>,
    /// Length of the non-missing prefix of each order.
    non_missing: Vec<usize>,
}

impl SortedColumns {
    /// Wrap explicit orders. Every order must list `row_count` rows; whether
    /// each is a permutation is checked when a
    /// [`RowIndexManager`](crate::data::row_index_manager::RowIndexManager)
    /// is built from it.
    pub fn new(row_count: usize, orders: Vec<Vec<u32>>) -> Result<Self, MembershipError> {
        to_u32(row_count, "table row count exceeds u32 index space")?;
        for (c, order) in orders.iter().enumerate() {
            if order.len() != row_count {
                return Err(MembershipError::Construction(format!(
                    "column {c} lists {} rows, table has {row_count}",
                    order.len()
                )));
            }
        }
        let non_missing = vec![row_count; orders.len()];
        Ok(Self {
            row_count,
            orders,
            non_missing,
        })
    }

    /// Sort numeric columns (indexed by original row) ascending.
    ///
    /// The sort is stable, so ties keep original row order. NaN marks a
    /// missing value; missing rows are placed after all present values.
    pub fn from_numeric(columns: &[Vec<f64>]) -> Result<Self, MembershipError> {
        let row_count = columns.first().map_or(0, Vec::len);
        let n = to_u32(row_count, "table row count exceeds u32 index space")?;
        let mut orders = Vec::with_capacity(columns.len());
        let mut non_missing = Vec::with_capacity(columns.len());
        for (c, values) in columns.iter().enumerate() {
            if values.len() != row_count {
                return Err(MembershipError::Construction(format!(
                    "column {c} has {} values, column 0 has {row_count}",
                    values.len()
                )));
            }
            let mut order: Vec<u32> = (0..n).collect();
            order.sort_by(|&a, &b| missing_last(values[a as usize], values[b as usize]));
            non_missing.push(values.iter().filter(|v| !v.is_nan()).count());
            orders.push(order);
        }
        Ok(Self {
            row_count,
            orders,
            non_missing,
        })
    }

    /// Number of leading column positions holding present (non-missing) values.
    pub fn non_missing_len(&self, column: usize) -> Result<usize, MembershipError> {
        check_index(column, self.orders.len()).map_err(|_| MembershipError::ColumnOutOfRange {
            column,
            columns: self.orders.len(),
        })?;
        Ok(self.non_missing[column])
    }
}

fn missing_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.total_cmp(&b),
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    }
}

impl SortedColumnSource for SortedColumns {
    #[inline]
    fn row_count(&self) -> usize {
        self.row_count
    }

    #[inline]
    fn column_count(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    fn sorted_original_positions(&self, column: usize) -> &[u32] {
        &self.orders[column]
    }
}
