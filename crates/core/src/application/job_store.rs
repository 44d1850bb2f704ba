// Job Store - isolated output namespace per request

use crate::domain::{ArtifactDirection, Job};
use crate::port::IdProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Allocates jobs under a shared base directory.
///
/// Isolation comes from unique IDs alone: every job gets `base_dir/<uuid>`,
/// so concurrent jobs need no locking. Directories are created lazily by
/// the first artifact write, never here.
#[derive(Clone)]
pub struct JobStore {
    base_dir: PathBuf,
    id_provider: Arc<dyn IdProvider>,
}

impl JobStore {
    pub fn new(base_dir: impl Into<PathBuf>, id_provider: Arc<dyn IdProvider>) -> Self {
        Self {
            base_dir: base_dir.into(),
            id_provider,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Allocate a fresh job (no filesystem access)
    pub fn new_job(&self) -> Job {
        Job::new(self.id_provider.generate_id(), &self.base_dir)
    }

    /// Deterministic artifact location for a job and direction
    pub fn artifact_path(job: &Job, direction: ArtifactDirection) -> PathBuf {
        job.artifact_path(direction)
    }
}
