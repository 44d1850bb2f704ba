//! Daemon configuration
//!
//! Sources, later overriding earlier:
//! 1. built-in defaults
//! 2. `shardform.toml` in the working directory, or the file named by
//!    `SHARDFORM_CONFIG` (required when set)
//! 3. `SHARDFORM_*` environment variables (`SHARDFORM_ROW_LIMIT=500`, ...)

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use shardform_api_rpc::server::{DEFAULT_RPC_HOST, DEFAULT_RPC_PORT};
use shardform_api_rpc::RpcServerConfig;
use shardform_core::config::{TransformSettings, DEFAULT_TRANSFORM_ROW_LIMIT};
use shardform_core::domain::quantile::DEFAULT_N_QUANTILES;
use shardform_core::domain::{OutputDistribution, QuantileConfig};
use shardform_core::port::MaintenanceConfig;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "shardform.toml";
const DEFAULT_REFERENCE_PATH: &str = "Credit.csv";
const ENV_PREFIX: &str = "SHARDFORM";

/// Flat daemon settings
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonSettings {
    pub data_dir: PathBuf,
    pub row_limit: usize,
    pub reference_path: PathBuf,
    /// Comma-separated column names; empty means all columns
    #[serde(default)]
    pub reference_columns: Option<String>,
    pub n_quantiles: usize,
    pub output_distribution: OutputDistribution,
    pub rpc_host: String,
    pub rpc_port: u16,
    /// 0 disables the background scheduler
    pub maintenance_interval_hours: u64,
    pub retention_days: i64,
}

impl DaemonSettings {
    /// Load from the process environment
    pub fn load() -> Result<Self> {
        let explicit = std::env::var_os("SHARDFORM_CONFIG").map(PathBuf::from);
        Self::load_from(explicit.as_deref(), Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(config_file: Option<&Path>, env: Environment) -> Result<Self> {
        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .set_default("data_dir", default_data_dir().to_string_lossy().to_string())?
            .set_default("row_limit", DEFAULT_TRANSFORM_ROW_LIMIT as u64)?
            .set_default("reference_path", DEFAULT_REFERENCE_PATH)?
            .set_default("n_quantiles", DEFAULT_N_QUANTILES as u64)?
            .set_default("output_distribution", "normal")?
            .set_default("rpc_host", DEFAULT_RPC_HOST)?
            .set_default("rpc_port", DEFAULT_RPC_PORT as u64)?
            .set_default("maintenance_interval_hours", 0u64)?
            .set_default("retention_days", MaintenanceConfig::default().retention_days)?
            .add_source(file)
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to read configuration sources")?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn reference_columns(&self) -> Option<Vec<String>> {
        let columns: Vec<String> = self
            .reference_columns
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        (!columns.is_empty()).then_some(columns)
    }

    /// Validated transform settings for the pipeline
    pub fn transform_settings(&self) -> Result<TransformSettings> {
        let settings = TransformSettings {
            data_dir: self.data_dir.clone(),
            row_limit: self.row_limit,
            quantile: QuantileConfig {
                n_quantiles: self.n_quantiles,
                output_distribution: self.output_distribution,
            },
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn rpc_config(&self) -> RpcServerConfig {
        RpcServerConfig {
            host: self.rpc_host.clone(),
            port: self.rpc_port,
        }
    }

    pub fn maintenance_config(&self) -> MaintenanceConfig {
        MaintenanceConfig {
            retention_days: self.retention_days,
        }
    }
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("dev", "shardform", "shardform")
        .map(|dirs| dirs.data_dir().join("jobs"))
        .unwrap_or_else(|| PathBuf::from("data"))
}
