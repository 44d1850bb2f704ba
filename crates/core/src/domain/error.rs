// Domain Error Types (numeric contract violations, no job context)

use thiserror::Error;

/// Reference data could not produce a usable fitted state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("reference dataset has no columns")]
    NoColumns,

    #[error("reference dataset has no rows")]
    NoRows,

    #[error("reference column '{0}' has no finite values")]
    NoUsableValues(String),

    #[error("invalid quantile configuration: {0}")]
    InvalidConfig(String),
}

/// Row batch violates the fitted data contract
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("row batch is empty")]
    EmptyBatch,

    #[error("column count mismatch: fitted on {expected}, got {actual}")]
    ColumnCount { expected: usize, actual: usize },

    #[error("column {index} mismatch: fitted on '{expected}', got '{actual}'")]
    ColumnName {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("ragged batch: column '{column}' has {actual} rows, expected {expected}")]
    Ragged {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("column '{column}' is not numeric (found {dtype})")]
    NonNumeric { column: String, dtype: String },

    #[error("NaN in column '{column}' at row {row}")]
    NotANumber { column: String, row: usize },
}

