//! RPC Method Handlers
//!
//! Implements the business logic for each JSON-RPC method.

use crate::error::{to_rpc_error, validation_error};
use crate::types::{
    MaintenanceRequest, MaintenanceResponse, StatsRequest, StatsResponse, TransformRequest,
    TransformResponse,
};
use jsonrpsee::types::ErrorObjectOwned;
use shardform_core::application::{PipelineService, TransformShardRequest};
use shardform_core::port::{JobMaintenance, MaintenanceConfig};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    pipeline: PipelineService,
    maintenance: Arc<dyn JobMaintenance>,
    maintenance_config: MaintenanceConfig,
    jobs_started: AtomicU64,
    jobs_succeeded: AtomicU64,
    jobs_failed: AtomicU64,
    start_time: std::time::Instant,
}

impl RpcHandler {
    pub fn new(
        pipeline: PipelineService,
        maintenance: Arc<dyn JobMaintenance>,
        maintenance_config: MaintenanceConfig,
    ) -> Self {
        Self {
            pipeline,
            maintenance,
            maintenance_config,
            jobs_started: AtomicU64::new(0),
            jobs_succeeded: AtomicU64::new(0),
            jobs_failed: AtomicU64::new(0),
            start_time: std::time::Instant::now(),
        }
    }

    /// data.transform.v1
    pub async fn transform(
        &self,
        params: TransformRequest,
    ) -> Result<TransformResponse, ErrorObjectOwned> {
        if params.file_path.trim().is_empty() {
            return Err(validation_error("file_path must not be empty"));
        }

        self.jobs_started.fetch_add(1, Ordering::Relaxed);

        let req = TransformShardRequest {
            file_path: PathBuf::from(params.file_path),
        };

        match self.pipeline.run(req).await {
            Ok(outcome) => {
                self.jobs_succeeded.fetch_add(1, Ordering::Relaxed);
                Ok(TransformResponse {
                    total_time_taken: outcome.total_time_taken(),
                    job_id: outcome.job_id,
                    transformed_file_path: outcome.transformed_file_path.display().to_string(),
                    inverse_transformed_file_path: outcome
                        .inverse_transformed_file_path
                        .display()
                        .to_string(),
                    rows_transformed: outcome.rows_transformed,
                })
            }
            Err(e) => {
                self.jobs_failed.fetch_add(1, Ordering::Relaxed);
                error!(
                    job_id = e.job_id().unwrap_or("-"),
                    stage = ?e.stage(),
                    error = %e,
                    "Transform request failed"
                );
                Err(to_rpc_error(e))
            }
        }
    }

    /// admin.stats.v1
    pub async fn stats(&self, _params: StatsRequest) -> Result<StatsResponse, ErrorObjectOwned> {
        let store = self.maintenance.get_stats().await.map_err(to_rpc_error)?;

        Ok(StatsResponse {
            jobs_started: self.jobs_started.load(Ordering::Relaxed),
            jobs_succeeded: self.jobs_succeeded.load(Ordering::Relaxed),
            jobs_failed: self.jobs_failed.load(Ordering::Relaxed),
            job_dirs: store.job_dirs,
            data_dir_bytes: store.total_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
        })
    }

    /// admin.maintenance.v1
    pub async fn maintenance(
        &self,
        params: MaintenanceRequest,
    ) -> Result<MaintenanceResponse, ErrorObjectOwned> {
        let retention_days = params
            .retention_days
            .unwrap_or(self.maintenance_config.retention_days);
        if retention_days < 0 {
            return Err(validation_error(format!(
                "retention_days must be >= 0, got {}",
                retention_days
            )));
        }

        let before = self.maintenance.get_stats().await.map_err(to_rpc_error)?;
        let jobs_deleted = self
            .maintenance
            .gc_jobs(retention_days)
            .await
            .map_err(to_rpc_error)?;
        let after = self.maintenance.get_stats().await.map_err(to_rpc_error)?;

        info!(
            retention_days = retention_days,
            jobs_deleted = jobs_deleted,
            bytes_before = before.total_bytes,
            bytes_after = after.total_bytes,
            "Manual maintenance completed"
        );

        Ok(MaintenanceResponse {
            jobs_deleted,
            bytes_before: before.total_bytes,
            bytes_after: after.total_bytes,
        })
    }
}
