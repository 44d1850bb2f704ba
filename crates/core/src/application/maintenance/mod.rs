// Maintenance Scheduler
// Periodic GC of expired job directories

use crate::application::shutdown::ShutdownToken;
use crate::port::{JobMaintenance, MaintenanceConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

/// Maintenance scheduler
///
/// Runs job directory GC in the background until shutdown
pub struct MaintenanceScheduler {
    maintenance: Arc<dyn JobMaintenance>,
    config: MaintenanceConfig,
    interval_hours: u64,
}

impl MaintenanceScheduler {
    /// Create a new maintenance scheduler
    ///
    /// # Arguments
    /// * `maintenance` - Maintenance implementation
    /// * `config` - Retention configuration
    /// * `interval_hours` - How often to run maintenance (hours, > 0)
    pub fn new(
        maintenance: Arc<dyn JobMaintenance>,
        config: MaintenanceConfig,
        interval_hours: u64,
    ) -> Self {
        Self {
            maintenance,
            config,
            interval_hours,
        }
    }

    /// Run maintenance loop (background task)
    ///
    /// The first tick fires immediately. Returns once `shutdown` is signalled.
    pub async fn run(self, mut shutdown: ShutdownToken) {
        info!(
            interval_hours = self.interval_hours,
            retention_days = self.config.retention_days,
            "Maintenance scheduler started"
        );

        let period = Duration::from_secs(self.interval_hours.max(1) * 3600);
        let mut tick = interval(period);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    info!("Running scheduled maintenance...");
                    match self.maintenance.run_full_maintenance(&self.config).await {
                        Ok(stats) => info!(
                            job_dirs = stats.job_dirs,
                            total_bytes = stats.total_bytes,
                            "Scheduled maintenance completed successfully"
                        ),
                        Err(e) => error!(error = %e, "Scheduled maintenance failed"),
                    }
                }
                _ = shutdown.wait() => {
                    info!("Maintenance scheduler stopped");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::shutdown::shutdown_channel;
    use crate::error::Result;
    use crate::port::JobStoreStats;
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        pub Maint {}
        #[async_trait]
        impl JobMaintenance for Maint {
            async fn gc_jobs(&self, retention_days: i64) -> Result<usize>;
            async fn get_stats(&self) -> Result<JobStoreStats>;
        }
    }

    #[tokio::test]
    async fn test_first_tick_gcs_with_configured_retention() {
        let (called_tx, mut called_rx) = tokio::sync::mpsc::unbounded_channel();
        let mut maint = MockMaint::new();
        maint
            .expect_gc_jobs()
            .withf(|days| *days == 3)
            .times(1)
            .returning(move |_| {
                let _ = called_tx.send(());
                Ok(2)
            });
        maint.expect_get_stats().times(1).returning(|| {
            Ok(JobStoreStats {
                job_dirs: 5,
                total_bytes: 1024,
            })
        });

        let scheduler =
            MaintenanceScheduler::new(Arc::new(maint), MaintenanceConfig { retention_days: 3 }, 1);
        let (tx, token) = shutdown_channel();
        let handle = tokio::spawn(scheduler.run(token));

        tokio::time::timeout(Duration::from_secs(5), called_rx.recv())
            .await
            .expect("first tick did not run maintenance");
        tx.shutdown();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let mut maint = MockMaint::new();
        maint.expect_gc_jobs().returning(|_| Ok(0));
        maint
            .expect_get_stats()
            .returning(|| Ok(JobStoreStats::default()));

        let scheduler =
            MaintenanceScheduler::new(Arc::new(maint), MaintenanceConfig::default(), 24);
        let (tx, token) = shutdown_channel();
        let handle = tokio::spawn(scheduler.run(token));

        tx.shutdown();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();
    }
}
