//! Data module: row samples, sorted column orders, index manager and weights
#![warn(missing_docs)]

pub mod row_index_manager;
pub mod row_sample;
pub mod sorted_columns;
pub mod weights;

pub use row_index_manager::RowIndexManager;
pub use row_sample::{RowSample, SampleCounts};
pub use sorted_columns::{SortedColumnSource, SortedColumns};
pub use weights::WeightContainer;
