// Transform Engine - fit / transform / inverse_transform for one job

use crate::domain::{
    ArtifactDirection, Job, QuantileConfig, QuantileState, RowBatch, Stage, TransformError,
};
use crate::error::{AppError, Result};
use crate::port::{ColumnarStore, ReferenceSource};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

type Mapping = fn(&QuantileState, &RowBatch) -> std::result::Result<RowBatch, TransformError>;

/// Per-job transform engine
///
/// Owns its fitted state exclusively; nothing is shared between engines.
/// The engine processes whatever batch it receives and applies no row limit
/// of its own: truncation to the configured Row Limit is the caller's job.
pub struct TransformEngine {
    job: Job,
    config: QuantileConfig,
    reference: Arc<dyn ReferenceSource>,
    store: Arc<dyn ColumnarStore>,
    state: Option<QuantileState>,
}

impl TransformEngine {
    pub fn new(
        job: Job,
        config: QuantileConfig,
        reference: Arc<dyn ReferenceSource>,
        store: Arc<dyn ColumnarStore>,
    ) -> Self {
        Self {
            job,
            config,
            reference,
            store,
            state: None,
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&QuantileState> {
        self.state.as_ref()
    }

    /// Fit against the reference dataset.
    ///
    /// Calling it again re-derives the state from scratch; a failed fit
    /// leaves the engine unfitted.
    pub fn fit(&mut self) -> Result<()> {
        self.state = None;

        let reference = self
            .reference
            .load()
            .map_err(|source| AppError::ReferenceUnreadable {
                job_id: self.job.id.clone(),
                source,
            })?;

        let state =
            QuantileState::fit(&reference, &self.config).map_err(|source| AppError::Fit {
                job_id: self.job.id.clone(),
                source,
            })?;

        info!(
            job_id = %self.job.id,
            reference = %self.reference.location(),
            rows = reference.num_rows(),
            columns = reference.num_columns(),
            n_quantiles = state.n_quantiles(),
            output = %state.output_distribution(),
            "Transformer fitted"
        );

        self.state = Some(state);
        Ok(())
    }

    /// Transform `rows` and persist them as the job's transformed artifact
    pub fn transform(&self, rows: &RowBatch) -> Result<PathBuf> {
        self.apply(
            rows,
            Stage::Transform,
            ArtifactDirection::Transformed,
            QuantileState::transform,
        )
    }

    /// Inverse-transform `rows` and persist them as the job's inverse artifact
    pub fn inverse_transform(&self, rows: &RowBatch) -> Result<PathBuf> {
        self.apply(
            rows,
            Stage::InverseTransform,
            ArtifactDirection::InverseTransformed,
            QuantileState::inverse_transform,
        )
    }

    fn apply(
        &self,
        rows: &RowBatch,
        stage: Stage,
        direction: ArtifactDirection,
        mapping: Mapping,
    ) -> Result<PathBuf> {
        // Checked before anything touches the filesystem
        let state = self.state.as_ref().ok_or_else(|| AppError::NotFitted {
            job_id: self.job.id.clone(),
            stage,
        })?;

        let output = mapping(state, rows).map_err(|source| AppError::Transform {
            job_id: self.job.id.clone(),
            stage,
            source,
        })?;

        let path = self.job.artifact_path(direction);
        self.store
            .write_batch(&path, &output)
            .map_err(|source| AppError::ArtifactIo {
                job_id: self.job.id.clone(),
                stage,
                source,
            })?;

        debug!(
            job_id = %self.job.id,
            stage = %stage,
            rows = output.num_rows(),
            path = %path.display(),
            "Artifact written"
        );

        Ok(path)
    }
}
