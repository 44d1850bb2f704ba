// Transform settings, built once at startup and passed explicitly

use crate::domain::QuantileConfig;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default cap on rows transformed per request
pub const DEFAULT_TRANSFORM_ROW_LIMIT: usize = 100_000;

/// Settings consumed by the pipeline and the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformSettings {
    /// Root for job output directories (DATA_DIR)
    pub data_dir: PathBuf,

    /// Maximum rows transformed per request (TRANSFORM_ROW_LIMIT)
    pub row_limit: usize,

    /// Quantile transform parameters
    pub quantile: QuantileConfig,
}

impl TransformSettings {
    pub fn new(data_dir: impl Into<PathBuf>, row_limit: usize) -> Self {
        Self {
            data_dir: data_dir.into(),
            row_limit,
            quantile: QuantileConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.row_limit == 0 {
            return Err(AppError::Config("row_limit must be at least 1".to_string()));
        }
        if self.quantile.n_quantiles < 2 {
            return Err(AppError::Config(format!(
                "n_quantiles must be at least 2, got {}",
                self.quantile.n_quantiles
            )));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("data_dir must not be empty".to_string()));
        }
        Ok(())
    }
}
