// Columnar Store Port
// Abstraction over reading shards and persisting artifacts

use crate::domain::RowBatch;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors (carry the file path for correlation)
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("malformed columnar data in {}: {message}", path.display())]
    Format { path: PathBuf, message: String },

    #[error("column '{column}' in {} is not numeric (found {dtype})", path.display())]
    NonNumeric {
        path: PathBuf,
        column: String,
        dtype: String,
    },

    #[error("column '{column}' not found in {}", path.display())]
    MissingColumn { path: PathBuf, column: String },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn format(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        StoreError::Format {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Columnar Store trait
///
/// Implementations:
/// - ParquetStore: Parquet/CSV on the local filesystem
/// - mocks::InMemoryStore: HashMap-backed (tests)
pub trait ColumnarStore: Send + Sync {
    /// Whether a file exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Read a whole file into a numeric batch
    ///
    /// # Errors
    /// - StoreError::NonNumeric if a column cannot be represented as f64
    fn read_batch(&self, path: &Path) -> Result<RowBatch, StoreError>;

    /// Persist a batch at `path`, creating parent directories.
    ///
    /// Either the complete file appears at `path` or nothing does.
    fn write_batch(&self, path: &Path, batch: &RowBatch) -> Result<(), StoreError>;
}

// ============================================================================
// In-memory Implementation for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// HashMap-backed store that counts writes
    #[derive(Default)]
    pub struct InMemoryStore {
        files: Mutex<HashMap<PathBuf, RowBatch>>,
        writes: AtomicUsize,
    }

    impl InMemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_file(self, path: impl Into<PathBuf>, batch: RowBatch) -> Self {
            self.files.lock().unwrap().insert(path.into(), batch);
            self
        }

        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        pub fn get(&self, path: &Path) -> Option<RowBatch> {
            self.files.lock().unwrap().get(path).cloned()
        }

        pub fn paths(&self) -> Vec<PathBuf> {
            let mut paths: Vec<_> = self.files.lock().unwrap().keys().cloned().collect();
            paths.sort();
            paths
        }
    }

    impl ColumnarStore for InMemoryStore {
        fn exists(&self, path: &Path) -> bool {
            self.files.lock().unwrap().contains_key(path)
        }

        fn read_batch(&self, path: &Path) -> Result<RowBatch, StoreError> {
            self.get(path).ok_or_else(|| {
                StoreError::io(
                    path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
                )
            })
        }

        fn write_batch(&self, path: &Path, batch: &RowBatch) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), batch.clone());
            Ok(())
        }
    }
}
