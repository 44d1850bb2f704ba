//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC types from api-rpc crate.

use serde::{Deserialize, Serialize};

/// Request to transform one shard
#[derive(Debug, Clone, Serialize)]
pub struct TransformRequest {
    pub file_path: String,
}

/// Artifact paths produced for one job
#[derive(Debug, Clone, Deserialize)]
pub struct TransformResponse {
    pub job_id: String,
    pub transformed_file_path: String,
    pub inverse_transformed_file_path: String,
    pub rows_transformed: usize,
    pub total_time_taken: String,
}

/// Daemon statistics
#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    pub jobs_started: u64,
    pub jobs_succeeded: u64,
    pub jobs_failed: u64,
    pub job_dirs: usize,
    pub data_dir_bytes: u64,
    pub uptime_seconds: u64,
}

/// Request to run job directory GC
#[derive(Debug, Clone, Default, Serialize)]
pub struct MaintenanceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<i64>,
}

/// Result of a maintenance run
#[derive(Debug, Clone, Deserialize)]
pub struct MaintenanceResponse {
    pub jobs_deleted: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
}
