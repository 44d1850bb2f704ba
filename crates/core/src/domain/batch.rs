// Row Batch - column-major numeric table

use super::error::TransformError;
use serde::{Deserialize, Serialize};

/// One named feature column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// 2-D numeric array: rows are observations, columns are features.
///
/// Stored column-major because every transform in this crate works one
/// column at a time. Null cells coming from storage are represented as NaN.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RowBatch {
    columns: Vec<Column>,
}

impl RowBatch {
    /// Build a batch, rejecting columns of unequal length
    pub fn new(columns: Vec<Column>) -> Result<Self, TransformError> {
        if let Some(first) = columns.first() {
            let expected = first.values.len();
            if let Some(bad) = columns.iter().find(|c| c.values.len() != expected) {
                return Err(TransformError::Ragged {
                    column: bad.name.clone(),
                    expected,
                    actual: bad.values.len(),
                });
            }
        }
        Ok(Self { columns })
    }

    /// Single-column convenience constructor
    pub fn single(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            columns: vec![Column::new(name, values)],
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Keep at most `limit` leading rows, preserving order
    pub fn head(&self, limit: usize) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.values.iter().take(limit).copied().collect()))
            .collect();
        Self { columns }
    }

    /// Row `i` as a vector of feature values
    pub fn row(&self, i: usize) -> Option<Vec<f64>> {
        if i >= self.num_rows() {
            return None;
        }
        Some(self.columns.iter().map(|c| c.values[i]).collect())
    }
}
