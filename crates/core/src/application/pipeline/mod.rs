// Transform Pipeline Service - request -> job -> artifacts

pub mod transform_shard;

pub use transform_shard::{TransformShardOutcome, TransformShardRequest};

use crate::application::job_store::JobStore;
use crate::config::TransformSettings;
use crate::error::{AppError, Result};
use crate::port::{ColumnarStore, IdProvider, ReferenceSource};
use std::sync::Arc;

/// Pipeline service shared by all request handlers
///
/// Cheap to clone; each `run` builds its own engine, so concurrent
/// requests share nothing mutable.
#[derive(Clone)]
pub struct PipelineService {
    settings: Arc<TransformSettings>,
    jobs: JobStore,
    reference: Arc<dyn ReferenceSource>,
    store: Arc<dyn ColumnarStore>,
}

impl PipelineService {
    pub fn new(
        settings: TransformSettings,
        id_provider: Arc<dyn IdProvider>,
        reference: Arc<dyn ReferenceSource>,
        store: Arc<dyn ColumnarStore>,
    ) -> Self {
        let jobs = JobStore::new(settings.data_dir.clone(), id_provider);
        Self {
            settings: Arc::new(settings),
            jobs,
            reference,
            store,
        }
    }

    pub fn settings(&self) -> &TransformSettings {
        &self.settings
    }

    /// Run the pipeline on the calling thread
    pub fn execute(&self, req: TransformShardRequest) -> Result<TransformShardOutcome> {
        transform_shard::execute(
            &self.settings,
            &self.jobs,
            self.reference.clone(),
            self.store.clone(),
            req,
        )
    }

    /// Run the pipeline on the blocking pool
    ///
    /// Fitting and columnar I/O are CPU/disk bound and must not stall the
    /// async runtime.
    pub async fn run(&self, req: TransformShardRequest) -> Result<TransformShardOutcome> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.execute(req))
            .await
            .map_err(|e| AppError::Internal(format!("transform task failed: {}", e)))?
    }
}
