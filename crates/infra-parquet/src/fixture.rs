// Fixture generator - large sharded datasets from one source column

use crate::parquet_store::ParquetStore;
use shardform_core::domain::RowBatch;
use shardform_core::port::{ColumnarStore, StoreError};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("invalid shard plan: {0}")]
    InvalidPlan(String),

    #[error("source column '{0}' has no rows")]
    EmptyColumn(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What to generate
#[derive(Debug, Clone)]
pub struct ShardPlan {
    pub source: PathBuf,
    pub column: String,
    pub target_rows: usize,
    pub shard_size: usize,
    pub out_dir: PathBuf,
    /// Also write a `.csv` copy of each shard
    pub write_csv: bool,
}

impl ShardPlan {
    pub fn shard_count(&self) -> usize {
        if self.shard_size == 0 {
            return 0;
        }
        self.target_rows.div_ceil(self.shard_size)
    }

    /// Path of shard `index` (0-based) in the given extension
    pub fn shard_path(&self, index: usize, extension: &str) -> PathBuf {
        self.out_dir
            .join(format!("{}_Shard_{}.{}", self.column, index + 1, extension))
    }

    fn validate(&self) -> Result<(), FixtureError> {
        if self.target_rows == 0 {
            return Err(FixtureError::InvalidPlan("target_rows must be > 0".into()));
        }
        if self.shard_size == 0 {
            return Err(FixtureError::InvalidPlan("shard_size must be > 0".into()));
        }
        if self.column.is_empty() {
            return Err(FixtureError::InvalidPlan("column must not be empty".into()));
        }
        Ok(())
    }
}

/// Write the planned shards, calling `on_shard` after each one.
///
/// The source column is repeated cyclically so that the shards together
/// hold exactly `target_rows` rows; the last shard may be short.
pub fn generate(
    store: &ParquetStore,
    plan: &ShardPlan,
    mut on_shard: impl FnMut(usize, &[PathBuf]),
) -> Result<Vec<PathBuf>, FixtureError> {
    plan.validate()?;

    let source = store.read_columns(&plan.source, std::slice::from_ref(&plan.column))?;
    let values = source
        .into_columns()
        .into_iter()
        .next()
        .map(|c| c.values)
        .unwrap_or_default();
    if values.is_empty() {
        return Err(FixtureError::EmptyColumn(plan.column.clone()));
    }

    info!(
        source = %plan.source.display(),
        column = %plan.column,
        source_rows = values.len(),
        target_rows = plan.target_rows,
        shards = plan.shard_count(),
        "Generating shards"
    );

    let mut written = Vec::new();
    for index in 0..plan.shard_count() {
        let start = index * plan.shard_size;
        let end = (start + plan.shard_size).min(plan.target_rows);
        let shard: Vec<f64> = (start..end).map(|r| values[r % values.len()]).collect();
        let batch = RowBatch::single(plan.column.clone(), shard);

        let mut paths = vec![plan.shard_path(index, "parquet")];
        if plan.write_csv {
            paths.push(plan.shard_path(index, "csv"));
        }
        for path in &paths {
            store.write_batch(path, &batch)?;
        }

        on_shard(index, &paths);
        written.extend(paths);
    }

    Ok(written)
}
