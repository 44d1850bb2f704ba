//! Shared fixtures for the end-to-end tests

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shardform_core::application::PipelineService;
use shardform_core::config::TransformSettings;
use shardform_core::domain::RowBatch;
use shardform_core::port::id_provider::UuidProvider;
use shardform_core::port::ColumnarStore;
use shardform_infra_parquet::{FileReferenceSource, ParquetStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const COLUMN: &str = "Amount";

/// Temp workspace with a reference file, a shard and a data dir
pub struct Workspace {
    pub dir: TempDir,
    pub reference: PathBuf,
    pub data_dir: PathBuf,
}

impl Workspace {
    pub fn new(reference: RowBatch) -> Self {
        let dir = TempDir::new().unwrap();
        let reference_path = dir.path().join("Credit.parquet");
        ParquetStore::new()
            .write_batch(&reference_path, &reference)
            .unwrap();
        let data_dir = dir.path().join("jobs");

        Self {
            dir,
            reference: reference_path,
            data_dir,
        }
    }

    /// Write `batch` as a shard file next to the reference
    pub fn shard(&self, name: &str, batch: &RowBatch) -> PathBuf {
        let path = self.dir.path().join(name);
        ParquetStore::new().write_batch(&path, batch).unwrap();
        path
    }

    pub fn pipeline(&self, row_limit: usize) -> PipelineService {
        PipelineService::new(
            TransformSettings::new(&self.data_dir, row_limit),
            Arc::new(UuidProvider),
            Arc::new(FileReferenceSource::new(&self.reference, None)),
            Arc::new(ParquetStore::new()),
        )
    }
}

/// Uniform [0, 10000] reference, fixed seed
pub fn uniform_reference(rows: usize, seed: u64) -> RowBatch {
    let mut rng = StdRng::seed_from_u64(seed);
    RowBatch::single(
        COLUMN,
        (0..rows).map(|_| rng.gen_range(0.0..=10_000.0)).collect(),
    )
}

/// In-range shard values, kept away from the reference extremes
pub fn in_range_shard(rows: usize, seed: u64) -> RowBatch {
    let mut rng = StdRng::seed_from_u64(seed);
    RowBatch::single(
        COLUMN,
        (0..rows).map(|_| rng.gen_range(100.0..9_900.0)).collect(),
    )
}

pub fn read(path: impl AsRef<Path>) -> RowBatch {
    ParquetStore::new().read_batch(path.as_ref()).unwrap()
}

pub fn values(batch: &RowBatch) -> Vec<f64> {
    batch.columns()[0].values.clone()
}
