// Job directory maintenance port
// Job directories accumulate under DATA_DIR; nothing in the pipeline deletes them.
use crate::error::Result;
use async_trait::async_trait;

/// Disk usage of the data directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobStoreStats {
    pub job_dirs: usize,
    pub total_bytes: u64,
}

/// Maintenance configuration
#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    /// Keep job directories modified within this many days
    pub retention_days: i64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self { retention_days: 7 }
    }
}

/// Operations on the shared data directory
#[async_trait]
pub trait JobMaintenance: Send + Sync {
    /// Delete job directories older than the retention period
    ///
    /// Only directories named like a job ID are considered.
    ///
    /// # Returns
    /// Number of job directories deleted
    async fn gc_jobs(&self, retention_days: i64) -> Result<usize>;

    /// Count job directories and their total size
    async fn get_stats(&self) -> Result<JobStoreStats>;

    /// Run GC and report stats afterwards
    async fn run_full_maintenance(&self, config: &MaintenanceConfig) -> Result<JobStoreStats> {
        let deleted = self.gc_jobs(config.retention_days).await?;
        let stats = self.get_stats().await?;

        tracing::info!(
            deleted_jobs = deleted,
            remaining_jobs = stats.job_dirs,
            total_bytes = stats.total_bytes,
            "Maintenance completed"
        );

        Ok(stats)
    }
}
