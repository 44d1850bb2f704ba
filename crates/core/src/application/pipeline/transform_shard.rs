// Transform Shard Use Case

use crate::application::engine::TransformEngine;
use crate::application::job_store::JobStore;
use crate::config::TransformSettings;
use crate::domain::{JobId, RowBatch, Stage, TransformError};
use crate::error::{AppError, Result};
use crate::port::{ColumnarStore, ReferenceSource, StoreError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, info_span, warn};

/// Transform request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformShardRequest {
    pub file_path: PathBuf,
}

/// Paths and timing of a completed job
#[derive(Debug, Clone, Serialize)]
pub struct TransformShardOutcome {
    pub job_id: JobId,
    pub transformed_file_path: PathBuf,
    pub inverse_transformed_file_path: PathBuf,
    pub rows_transformed: usize,
    pub total_time: Duration,
}

impl TransformShardOutcome {
    /// Wall-clock time as reported to clients, e.g. "0.42 seconds"
    pub fn total_time_taken(&self) -> String {
        format!("{:.2} seconds", self.total_time.as_secs_f64())
    }
}

/// Execute the per-job pipeline (blocking)
///
/// fit -> read shard -> truncate -> transform -> reload -> inverse_transform
///
/// # Arguments
///
/// * `settings` - Row limit and quantile parameters
/// * `jobs` - Job allocator (fresh ID per call)
/// * `reference` - Reference dataset the engine fits on
/// * `store` - Shard reader and artifact writer
/// * `req` - Transform request
pub fn execute(
    settings: &TransformSettings,
    jobs: &JobStore,
    reference: Arc<dyn ReferenceSource>,
    store: Arc<dyn ColumnarStore>,
    req: TransformShardRequest,
) -> Result<TransformShardOutcome> {
    let file_path = req.file_path;
    info!(file_path = %file_path.display(), "Received transform request");

    if !store.exists(&file_path) {
        warn!(file_path = %file_path.display(), "File not found");
        return Err(AppError::NotFound(format!(
            "File not found: {}",
            file_path.display()
        )));
    }

    let start = Instant::now();

    let job = jobs.new_job();
    let span = info_span!("job", job_id = %job.id);
    let _enter = span.enter();

    let mut engine = TransformEngine::new(job, settings.quantile, reference, store.clone());
    let job_id = engine.job().id.clone();
    info!(output_root = %engine.job().output_root.display(), "Initialized transformer");

    engine.fit()?;

    let shard = read_shard(store.as_ref(), &file_path, &job_id)?;
    info!(rows = shard.num_rows(), columns = shard.num_columns(), "Shard read");

    let window = if shard.num_rows() > settings.row_limit {
        info!(
            rows = shard.num_rows(),
            row_limit = settings.row_limit,
            "Truncating shard to row limit"
        );
        shard.head(settings.row_limit)
    } else {
        shard
    };

    let transformed_file_path = engine.transform(&window)?;
    info!(path = %transformed_file_path.display(), "Data transformed");

    let transformed = store
        .read_batch(&transformed_file_path)
        .map_err(|source| AppError::ArtifactIo {
            job_id: job_id.clone(),
            stage: Stage::ReadArtifact,
            source,
        })?;
    let inverse_transformed_file_path = engine.inverse_transform(&transformed)?;
    info!(path = %inverse_transformed_file_path.display(), "Inverse transformation completed");

    let total_time = start.elapsed();
    info!(
        total_time_secs = total_time.as_secs_f64(),
        rows = window.num_rows(),
        "Job finished"
    );

    Ok(TransformShardOutcome {
        job_id,
        transformed_file_path,
        inverse_transformed_file_path,
        rows_transformed: window.num_rows(),
        total_time,
    })
}

fn read_shard(
    store: &dyn ColumnarStore,
    path: &std::path::Path,
    job_id: &str,
) -> Result<RowBatch> {
    store.read_batch(path).map_err(|err| match err {
        StoreError::NonNumeric { column, dtype, .. } => AppError::Transform {
            job_id: job_id.to_string(),
            stage: Stage::ReadShard,
            source: TransformError::NonNumeric { column, dtype },
        },
        source => AppError::ShardRead {
            job_id: job_id.to_string(),
            source,
        },
    })
}
