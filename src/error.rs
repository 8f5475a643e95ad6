// src/error.rs

use thiserror::Error;

/// Failures raised by the validation rules. Each variant names the
/// condition that was violated so callers can tell them apart.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing {0} from data")]
    MissingColumn(String),

    #[error("column {0} not available in passed data")]
    ColumnUnavailable(String),

    #[error("null values not allowed in {column} ({count} found)")]
    NullValues { column: String, count: usize },

    #[error("found non-float value {value:?} for {column} at row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("NAs found in {0}")]
    NullWinner(String),

    #[error("non-boolean value {value:?} in {column} at row {row}")]
    NonBoolean {
        column: String,
        row: usize,
        value: String,
    },

    #[error("more than one winner found in year {year} ({count} winners)")]
    DuplicateYearWinner { year: String, count: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to process score {0:?}")]
    UnrecognizedScore(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("merge on {key} increased rows from {before} to {after} (+{delta})")]
    MergeExpansion {
        key: String,
        before: usize,
        after: usize,
        delta: usize,
    },

    #[error("merge on {key} produced {actual} rows although {expected} left rows match once the key is trimmed and lowercased")]
    MergeShrink {
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("cannot convert {value:?} in {column} at row {row} to an integer")]
    NotInteger {
        column: String,
        row: usize,
        value: String,
    },

    #[error("column {column} has {found} values, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
