// Domain Layer - Pure data model and numeric transform logic

pub mod batch;
pub mod error;
pub mod job;
pub mod quantile;

// Re-exports
pub use batch::{Column, RowBatch};
pub use error::{FitError, TransformError};
pub use job::{ArtifactDirection, Job, JobId, Stage};
pub use quantile::{OutputDistribution, QuantileConfig, QuantileState};
