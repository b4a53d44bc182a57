use std::path::PathBuf;

use thiserror::Error;

/// Core error type shared across adlens crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The input file for a dataset does not exist.
    #[error("data unavailable: {dataset} dataset not found at {}", .path.display())]
    DataUnavailable { dataset: String, path: PathBuf },
    /// Contract columns absent from the CSV header.
    #[error("invalid dataset '{dataset}': missing columns: {}", .columns.join(", "))]
    MissingColumns {
        dataset: String,
        columns: Vec<String>,
    },
    /// A cell that cannot be parsed as its declared type.
    #[error(
        "invalid dataset '{dataset}': row {row}, column '{column}': {value:?} is not {expected}"
    )]
    InvalidValue {
        dataset: String,
        row: u64,
        column: String,
        value: String,
        expected: &'static str,
    },
    /// A field name that is not a column of the dataset.
    #[error("unknown field '{field}' in dataset '{dataset}'")]
    UnknownField { dataset: String, field: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenience alias for results returned by adlens crates.
pub type Result<T> = std::result::Result<T, Error>;
