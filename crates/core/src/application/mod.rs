// Application Layer - Use Cases

pub mod engine;
pub mod job_store;
pub mod maintenance;
pub mod pipeline;
pub mod shutdown;

// Re-exports
pub use engine::TransformEngine;
pub use job_store::JobStore;
pub use maintenance::MaintenanceScheduler;
pub use pipeline::{PipelineService, TransformShardOutcome, TransformShardRequest};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
