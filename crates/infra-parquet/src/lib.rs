// Shardform Infrastructure - Columnar File Adapters
// Implements: ColumnarStore, ReferenceSource, JobMaintenance

mod convert;
pub mod fixture;
mod maintenance_impl;
mod parquet_store;
mod reference;

pub use fixture::{FixtureError, ShardPlan};
pub use maintenance_impl::FsJobMaintenance;
pub use parquet_store::{FileFormat, ParquetStore};
pub use reference::FileReferenceSource;
