//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use serde::Serialize;
use shardform_core::domain::Stage;
use shardform_core::error::{AppError, ErrorKind};

/// RPC Error Codes
pub mod code {
    /// Bad input (unreadable or malformed shard, invalid params)
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const INTERNAL_ERROR: i32 = 5000;
    /// Filesystem failure while persisting or reloading artifacts
    pub const SYSTEM_ERROR: i32 = 5002;
}

/// Correlation data attached to job-scoped errors
#[derive(Debug, Serialize)]
pub struct ErrorData {
    pub job_id: String,
    pub stage: Stage,
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    let code = match err.kind() {
        ErrorKind::NotFound => code::NOT_FOUND,
        ErrorKind::ShardRead | ErrorKind::Validation => code::VALIDATION_ERROR,
        ErrorKind::ArtifactIo | ErrorKind::Io => code::SYSTEM_ERROR,
        ErrorKind::Fit
        | ErrorKind::NotFitted
        | ErrorKind::Transform
        | ErrorKind::Config
        | ErrorKind::Internal => code::INTERNAL_ERROR,
    };

    let data = match (err.job_id(), err.stage()) {
        (Some(job_id), Some(stage)) => Some(ErrorData {
            job_id: job_id.to_string(),
            stage,
        }),
        _ => None,
    };

    ErrorObjectOwned::owned(code, err.to_string(), data)
}

/// Invalid request parameters
pub fn validation_error(msg: impl Into<String>) -> ErrorObjectOwned {
    to_rpc_error(AppError::Validation(msg.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shardform_core::domain::TransformError;
    use shardform_core::port::StoreError;

    #[test]
    fn test_not_found_code() {
        let err = to_rpc_error(AppError::NotFound("File not found: /x.parquet".into()));
        assert_eq!(err.code(), code::NOT_FOUND);
        assert!(err.message().contains("/x.parquet"));
        assert!(err.data().is_none());
    }

    #[test]
    fn test_shard_read_carries_job_and_stage() {
        let err = to_rpc_error(AppError::ShardRead {
            job_id: "job-1".into(),
            source: StoreError::format("/s.parquet", "bad magic"),
        });
        assert_eq!(err.code(), code::VALIDATION_ERROR);

        let data: serde_json::Value = serde_json::from_str(err.data().unwrap().get()).unwrap();
        assert_eq!(data["job_id"], "job-1");
        assert_eq!(data["stage"], "read_shard");
    }

    #[test]
    fn test_transform_is_internal() {
        let err = to_rpc_error(AppError::Transform {
            job_id: "job-2".into(),
            stage: Stage::InverseTransform,
            source: TransformError::EmptyBatch,
        });
        assert_eq!(err.code(), code::INTERNAL_ERROR);
        let data: serde_json::Value = serde_json::from_str(err.data().unwrap().get()).unwrap();
        assert_eq!(data["stage"], "inverse_transform");
    }

    #[test]
    fn test_artifact_io_is_system_error() {
        let err = to_rpc_error(AppError::ArtifactIo {
            job_id: "job-3".into(),
            stage: Stage::ReadArtifact,
            source: StoreError::format("/t.parquet", "truncated"),
        });
        assert_eq!(err.code(), code::SYSTEM_ERROR);
    }
}
