// Port Layer - Interfaces for external dependencies

pub mod columnar_store;
pub mod id_provider; // For deterministic testing
pub mod maintenance;
pub mod reference_source;
pub mod time_provider;

// Re-exports
pub use columnar_store::{ColumnarStore, StoreError};
pub use id_provider::IdProvider;
pub use maintenance::{JobMaintenance, JobStoreStats, MaintenanceConfig};
pub use reference_source::ReferenceSource;
pub use time_provider::TimeProvider;
