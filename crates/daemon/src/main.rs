//! Shardform Daemon - Main Entry Point
//! JSON-RPC server + optional job directory maintenance

mod logging;
mod settings;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

// Import workspace crates
use settings::DaemonSettings;
use shardform_api_rpc::RpcServer;
use shardform_core::application::{shutdown_channel, MaintenanceScheduler, PipelineService};
use shardform_core::port::id_provider::UuidProvider;
use shardform_core::port::time_provider::SystemTimeProvider;
use shardform_infra_parquet::{FileReferenceSource, FsJobMaintenance, ParquetStore};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let _log_guard = logging::init_logging()?;

    info!("Shardform daemon v{} starting...", VERSION);

    // 2. Load configuration
    let settings = DaemonSettings::load()?;
    let transform_settings = settings.transform_settings()?;

    info!(
        data_dir = %transform_settings.data_dir.display(),
        row_limit = transform_settings.row_limit,
        reference = %settings.reference_path.display(),
        n_quantiles = transform_settings.quantile.n_quantiles,
        output = %transform_settings.quantile.output_distribution,
        "Configuration loaded"
    );

    tokio::fs::create_dir_all(&transform_settings.data_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create data dir {}",
                transform_settings.data_dir.display()
            )
        })?;

    if !settings.reference_path.is_file() {
        // Not fatal: every job fails at fit until the file appears
        warn!(
            path = %settings.reference_path.display(),
            "Reference dataset not found"
        );
    }

    // 3. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let store = Arc::new(ParquetStore::new());
    let reference = Arc::new(FileReferenceSource::new(
        settings.reference_path.clone(),
        settings.reference_columns(),
    ));
    let maintenance = Arc::new(FsJobMaintenance::new(
        transform_settings.data_dir.clone(),
        time_provider,
    ));
    let pipeline = PipelineService::new(
        transform_settings,
        Arc::new(UuidProvider),
        reference,
        store,
    );

    // 4. Start JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_server = RpcServer::new(
        settings.rpc_config(),
        pipeline,
        maintenance.clone(),
        settings.maintenance_config(),
    );
    let (addr, rpc_handle) = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    // 5. Start Maintenance Scheduler (opt-in)
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let scheduler_handle = if settings.maintenance_interval_hours > 0 {
        info!("Starting maintenance scheduler...");
        let scheduler = MaintenanceScheduler::new(
            maintenance,
            settings.maintenance_config(),
            settings.maintenance_interval_hours,
        );
        Some(tokio::spawn(scheduler.run(shutdown_rx)))
    } else {
        info!("Maintenance scheduler disabled (maintenance_interval_hours = 0)");
        None
    };

    info!(addr = %addr, "System ready. Waiting for requests...");
    info!("Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 7. Graceful shutdown
    shutdown_tx.shutdown();
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;
    if let Some(handle) = scheduler_handle {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(5), handle).await;
    }

    info!("Shutdown complete.");

    Ok(())
}
