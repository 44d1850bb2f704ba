//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use serde::{Deserialize, Serialize};

/// data.transform.v1 - Transform one shard
#[derive(Debug, Deserialize)]
pub struct TransformRequest {
    pub file_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransformResponse {
    pub job_id: String,
    pub transformed_file_path: String,
    pub inverse_transformed_file_path: String,
    pub rows_transformed: usize,
    /// e.g. "0.42 seconds"
    pub total_time_taken: String,
}

/// admin.stats.v1 - Daemon and data directory statistics
#[derive(Debug, Default, Deserialize)]
pub struct StatsRequest {
    // No parameters needed
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub jobs_started: u64,
    pub jobs_succeeded: u64,
    pub jobs_failed: u64,
    pub job_dirs: usize,
    pub data_dir_bytes: u64,
    pub uptime_seconds: u64,
}

/// admin.maintenance.v1 - Run job directory GC now
#[derive(Debug, Default, Deserialize)]
pub struct MaintenanceRequest {
    /// Overrides the configured retention
    #[serde(default)]
    pub retention_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceResponse {
    pub jobs_deleted: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
}
