// Parquet/CSV implementation of ColumnarStore

use crate::convert;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use shardform_core::domain::RowBatch;
use shardform_core::port::{ColumnarStore, StoreError};
use std::fs::{self, File};
use std::io::{Seek, Write};
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::debug;

/// Rows sampled when inferring a CSV schema
const CSV_INFER_ROWS: usize = 1000;

/// On-disk format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Parquet,
    Csv,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self, StoreError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("parquet") => Ok(FileFormat::Parquet),
            Some("csv") => Ok(FileFormat::Csv),
            _ => Err(StoreError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Local filesystem store
///
/// Reads `.parquet` and `.csv` (header row required); writes either,
/// always through a temp file in the target directory that is renamed
/// into place.
#[derive(Debug, Clone, Default)]
pub struct ParquetStore;

impl ParquetStore {
    pub fn new() -> Self {
        Self
    }

    /// Read only `columns` (in that order) from `path`
    ///
    /// Unselected columns may hold any type.
    pub fn read_columns(&self, path: &Path, columns: &[String]) -> Result<RowBatch, StoreError> {
        self.read_projected(path, Some(columns))
    }

    fn read_projected(
        &self,
        path: &Path,
        projection: Option<&[String]>,
    ) -> Result<RowBatch, StoreError> {
        let (schema, batches) = match FileFormat::from_path(path)? {
            FileFormat::Parquet => read_parquet(path)?,
            FileFormat::Csv => read_csv(path)?,
        };
        let batch = convert::to_row_batch(path, &schema, &batches, projection)?;

        debug!(
            path = %path.display(),
            rows = batch.num_rows(),
            columns = batch.num_columns(),
            "Columnar file read"
        );
        Ok(batch)
    }
}

impl ColumnarStore for ParquetStore {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_batch(&self, path: &Path) -> Result<RowBatch, StoreError> {
        self.read_projected(path, None)
    }

    fn write_batch(&self, path: &Path, batch: &RowBatch) -> Result<(), StoreError> {
        let format = FileFormat::from_path(path)?;
        let record = convert::to_record_batch(batch).map_err(|e| StoreError::format(path, e))?;

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;

        // Readers never observe a partial file: write beside the target, then rename
        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| StoreError::io(parent, e))?;
        match format {
            FileFormat::Parquet => write_parquet(tmp.as_file_mut(), &record)
                .map_err(|e| StoreError::format(path, e))?,
            FileFormat::Csv => write_csv(tmp.as_file_mut(), &record)
                .map_err(|e| StoreError::format(path, e))?,
        }
        tmp.as_file_mut()
            .flush()
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(path)
            .map_err(|e| StoreError::io(path, e.error))?;

        debug!(
            path = %path.display(),
            rows = batch.num_rows(),
            "Columnar file written"
        );
        Ok(())
    }
}

fn read_parquet(path: &Path) -> Result<(Schema, Vec<RecordBatch>), StoreError> {
    let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| StoreError::format(path, e))?;
    let schema = builder.schema().as_ref().clone();
    let reader = builder.build().map_err(|e| StoreError::format(path, e))?;
    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError::format(path, e))?;
    Ok((schema, batches))
}

fn read_csv(path: &Path) -> Result<(Schema, Vec<RecordBatch>), StoreError> {
    let mut file = File::open(path).map_err(|e| StoreError::io(path, e))?;
    let format = Format::default().with_header(true);
    let (inferred, _) = format
        .infer_schema(&mut file, Some(CSV_INFER_ROWS))
        .map_err(|e| StoreError::format(path, e))?;
    file.rewind().map_err(|e| StoreError::io(path, e))?;

    let schema = widen_csv_schema(&inferred);
    let reader = arrow::csv::ReaderBuilder::new(Arc::new(schema.clone()))
        .with_format(format)
        .build(file)
        .map_err(|e| StoreError::format(path, e))?;
    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError::format(path, e))?;
    Ok((schema, batches))
}

/// Inference only samples the head of the file, so integer and all-empty
/// columns are parsed as Float64 to accept decimals further down.
fn widen_csv_schema(inferred: &Schema) -> Schema {
    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| {
            if convert::is_numeric(f.data_type()) {
                Field::new(f.name().clone(), DataType::Float64, true)
            } else {
                f.as_ref().clone()
            }
        })
        .collect();
    Schema::new(fields)
}

fn write_parquet(file: &mut File, record: &RecordBatch) -> Result<(), parquet::errors::ParquetError> {
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, record.schema(), Some(props))?;
    writer.write(record)?;
    writer.close()?;
    Ok(())
}

fn write_csv(file: &mut File, record: &RecordBatch) -> Result<(), arrow::error::ArrowError> {
    let mut writer = arrow::csv::WriterBuilder::new().with_header(true).build(file);
    writer.write(record)
}
