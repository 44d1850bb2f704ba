// File-backed reference dataset

use crate::parquet_store::ParquetStore;
use shardform_core::domain::RowBatch;
use shardform_core::port::{ColumnarStore, ReferenceSource, StoreError};
use std::path::{Path, PathBuf};

/// Reference dataset read from a Parquet or CSV file on every load.
///
/// With `columns` set, only those columns are read and they define the
/// fitted layout; otherwise every column must be numeric.
pub struct FileReferenceSource {
    path: PathBuf,
    columns: Option<Vec<String>>,
    store: ParquetStore,
}

impl FileReferenceSource {
    pub fn new(path: impl Into<PathBuf>, columns: Option<Vec<String>>) -> Self {
        Self {
            path: path.into(),
            columns: columns.filter(|c| !c.is_empty()),
            store: ParquetStore::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReferenceSource for FileReferenceSource {
    fn load(&self) -> Result<RowBatch, StoreError> {
        match &self.columns {
            Some(columns) => self.store.read_columns(&self.path, columns),
            None => self.store.read_batch(&self.path),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
