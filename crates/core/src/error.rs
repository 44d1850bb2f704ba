// Central Error Type for the Application

use crate::domain::{FitError, JobId, Stage, TransformError};
use crate::port::StoreError;
use thiserror::Error;

/// Application-level error type
///
/// Job-scoped variants carry the job id and the stage so a failure can be
/// matched to the job's directory on disk.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("job {job_id} [fit]: reference dataset unreadable: {source}")]
    ReferenceUnreadable {
        job_id: JobId,
        #[source]
        source: StoreError,
    },

    #[error("job {job_id} [fit]: {source}")]
    Fit {
        job_id: JobId,
        #[source]
        source: FitError,
    },

    #[error("job {job_id} [{stage}]: called before fit")]
    NotFitted { job_id: JobId, stage: Stage },

    #[error("job {job_id} [{stage}]: {source}")]
    Transform {
        job_id: JobId,
        stage: Stage,
        #[source]
        source: TransformError,
    },

    #[error("job {job_id} [read_shard]: {source}")]
    ShardRead {
        job_id: JobId,
        #[source]
        source: StoreError,
    },

    #[error("job {job_id} [{stage}]: artifact I/O failed: {source}")]
    ArtifactIo {
        job_id: JobId,
        stage: Stage,
        #[source]
        source: StoreError,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse error classification (what the RPC layer maps to codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Fit,
    NotFitted,
    Transform,
    ShardRead,
    ArtifactIo,
    Validation,
    NotFound,
    Config,
    Io,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::ReferenceUnreadable { .. } | AppError::Fit { .. } => ErrorKind::Fit,
            AppError::NotFitted { .. } => ErrorKind::NotFitted,
            AppError::Transform { .. } => ErrorKind::Transform,
            AppError::ShardRead { .. } => ErrorKind::ShardRead,
            AppError::ArtifactIo { .. } => ErrorKind::ArtifactIo,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Config(_) => ErrorKind::Config,
            AppError::Io(_) => ErrorKind::Io,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Job the error belongs to, if any
    pub fn job_id(&self) -> Option<&str> {
        match self {
            AppError::ReferenceUnreadable { job_id, .. }
            | AppError::Fit { job_id, .. }
            | AppError::NotFitted { job_id, .. }
            | AppError::Transform { job_id, .. }
            | AppError::ShardRead { job_id, .. }
            | AppError::ArtifactIo { job_id, .. } => Some(job_id),
            _ => None,
        }
    }

    /// Pipeline stage the error was raised in, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            AppError::ReferenceUnreadable { .. } | AppError::Fit { .. } => Some(Stage::Fit),
            AppError::ShardRead { .. } => Some(Stage::ReadShard),
            AppError::NotFitted { stage, .. }
            | AppError::Transform { stage, .. }
            | AppError::ArtifactIo { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
