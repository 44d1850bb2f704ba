// Job Domain Model

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Job ID (UUID v4)
pub type JobId = String;

/// Artifact direction (one persisted file per direction per job)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactDirection {
    Transformed,
    InverseTransformed,
}

impl ArtifactDirection {
    /// Fixed file name inside the job's output root
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactDirection::Transformed => "transformed.parquet",
            ArtifactDirection::InverseTransformed => "inverse_transformed.parquet",
        }
    }
}

impl std::fmt::Display for ArtifactDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactDirection::Transformed => write!(f, "transformed"),
            ArtifactDirection::InverseTransformed => write!(f, "inverse_transformed"),
        }
    }
}

/// Pipeline stage (used to tag errors and log lines)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fit,
    ReadShard,
    Transform,
    ReadArtifact,
    InverseTransform,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Fit => write!(f, "fit"),
            Stage::ReadShard => write!(f, "read_shard"),
            Stage::Transform => write!(f, "transform"),
            Stage::ReadArtifact => write!(f, "read_artifact"),
            Stage::InverseTransform => write!(f, "inverse_transform"),
        }
    }
}

/// Job Entity
///
/// One per request. The output root is never shared across jobs and is not
/// created until the first artifact is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub output_root: PathBuf,
}

impl Job {
    /// Create a job rooted at `base_dir/id`
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected, not generated)
    /// * `base_dir` - Shared data directory
    pub fn new(id: impl Into<String>, base_dir: impl AsRef<Path>) -> Self {
        let id = id.into();
        let output_root = base_dir.as_ref().join(&id);
        Self { id, output_root }
    }

    /// Artifact path for a direction (pure, deterministic)
    pub fn artifact_path(&self, direction: ArtifactDirection) -> PathBuf {
        self.output_root.join(direction.file_name())
    }
}
