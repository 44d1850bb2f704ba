// Arrow <-> RowBatch conversion

use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use shardform_core::domain::{Column, RowBatch};
use shardform_core::port::StoreError;
use std::path::Path;
use std::sync::Arc;

/// Types accepted as feature columns
pub(crate) fn is_numeric(dtype: &DataType) -> bool {
    dtype.is_numeric() || matches!(dtype, DataType::Null)
}

/// Collect record batches into a column-major numeric batch.
///
/// `projection` restricts (and orders) the columns read; `None` reads all.
/// Nulls become NaN. Any selected non-numeric column is rejected.
pub(crate) fn to_row_batch(
    path: &Path,
    schema: &Schema,
    batches: &[RecordBatch],
    projection: Option<&[String]>,
) -> Result<RowBatch, StoreError> {
    let indices: Vec<usize> = match projection {
        None => (0..schema.fields().len()).collect(),
        Some(names) => names
            .iter()
            .map(|name| {
                schema
                    .index_of(name)
                    .map_err(|_| StoreError::MissingColumn {
                        path: path.to_path_buf(),
                        column: name.clone(),
                    })
            })
            .collect::<Result<_, _>>()?,
    };

    let mut columns = Vec::with_capacity(indices.len());
    for idx in indices {
        let field = schema.field(idx);
        if !is_numeric(field.data_type()) {
            return Err(StoreError::NonNumeric {
                path: path.to_path_buf(),
                column: field.name().clone(),
                dtype: field.data_type().to_string(),
            });
        }

        let mut values = Vec::new();
        for batch in batches {
            let floats = cast(batch.column(idx), &DataType::Float64)
                .map_err(|e| StoreError::format(path, e))?;
            let floats = floats
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| StoreError::format(path, "cast did not produce Float64"))?;
            values.extend(floats.iter().map(|v| v.unwrap_or(f64::NAN)));
        }
        columns.push(Column::new(field.name().clone(), values));
    }

    RowBatch::new(columns).map_err(|e| StoreError::format(path, e))
}

/// Build a Float64 record batch with one field per column
pub(crate) fn to_record_batch(batch: &RowBatch) -> Result<RecordBatch, ArrowError> {
    let fields: Vec<Field> = batch
        .columns()
        .iter()
        .map(|c| Field::new(c.name.clone(), DataType::Float64, true))
        .collect();
    let arrays: Vec<ArrayRef> = batch
        .columns()
        .iter()
        .map(|c| Arc::new(Float64Array::from(c.values.clone())) as ArrayRef)
        .collect();

    let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
    RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)
}
