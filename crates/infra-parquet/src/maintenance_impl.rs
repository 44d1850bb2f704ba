// Filesystem job directory maintenance
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shardform_core::error::Result;
use shardform_core::port::{JobMaintenance, JobStoreStats, TimeProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Directories modified this recently belong to jobs that may still be running
const IN_FLIGHT_GRACE_MS: i64 = 10 * 60 * 1000;

/// Oldest modification time (ms) that survives GC.
///
/// A retention too large to represent keeps everything.
fn gc_cutoff(now: i64, retention_days: i64) -> i64 {
    let retention_cutoff = retention_days
        .checked_mul(DAY_MS)
        .and_then(|retention_ms| now.checked_sub(retention_ms))
        .unwrap_or(i64::MIN);
    retention_cutoff.min(now.saturating_sub(IN_FLIGHT_GRACE_MS))
}

/// Job directory GC over DATA_DIR
///
/// Only direct children named like a UUID are treated as job directories;
/// anything else under DATA_DIR is left alone.
pub struct FsJobMaintenance {
    data_dir: PathBuf,
    time_provider: Arc<dyn TimeProvider>,
}

impl FsJobMaintenance {
    pub fn new(data_dir: impl Into<PathBuf>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            data_dir: data_dir.into(),
            time_provider,
        }
    }

    /// Job directories with their last modification time (ms since epoch)
    async fn job_dirs(&self) -> Result<Vec<(PathBuf, i64)>> {
        let mut entries = match fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut dirs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let is_job = name
                .to_str()
                .map(|n| uuid::Uuid::parse_str(n).is_ok())
                .unwrap_or(false);
            if !is_job || !entry.file_type().await?.is_dir() {
                continue;
            }

            let modified = entry.metadata().await?.modified()?;
            dirs.push((entry.path(), DateTime::<Utc>::from(modified).timestamp_millis()));
        }
        Ok(dirs)
    }
}

/// Total size of regular files under `root`
async fn dir_size(root: &Path) -> Result<u64> {
    let mut total = 0;
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                total += entry.metadata().await?.len();
            }
        }
    }
    Ok(total)
}

#[async_trait]
impl JobMaintenance for FsJobMaintenance {
    async fn gc_jobs(&self, retention_days: i64) -> Result<usize> {
        let now = self.time_provider.now_millis();
        let cutoff_time = gc_cutoff(now, retention_days);

        info!(
            data_dir = %self.data_dir.display(),
            retention_days = retention_days,
            cutoff_time = cutoff_time,
            "Running job directory GC"
        );

        let mut deleted = 0;
        for (path, modified) in self.job_dirs().await? {
            if modified >= cutoff_time {
                continue;
            }
            match fs::remove_dir_all(&path).await {
                Ok(()) => {
                    deleted += 1;
                    info!(path = %path.display(), "Deleted job directory");
                }
                Err(e) => {
                    // A concurrent GC may have removed it first
                    warn!(path = %path.display(), error = %e, "Failed to delete job directory");
                }
            }
        }

        info!(deleted_jobs = deleted, "Job directory GC completed");
        Ok(deleted)
    }

    async fn get_stats(&self) -> Result<JobStoreStats> {
        let dirs = self.job_dirs().await?;

        let mut total_bytes = 0;
        for (path, _) in &dirs {
            total_bytes += dir_size(path).await?;
        }

        Ok(JobStoreStats {
            job_dirs: dirs.len(),
            total_bytes,
        })
    }
}
