//! Core contracts and helpers for adlens.
//!
//! This crate defines the dataset model (values, columns, records), the
//! fixed column contract of each input file, and CSV loading/export.

pub mod csv_io;
pub mod dataset;
pub mod error;
pub mod schema;
pub mod value;

pub use csv_io::{load_dataset, read_dataset, to_csv_string, write_csv};
pub use dataset::{Dataset, Record, filter_by};
pub use error::{Error, Result};
pub use schema::{Column, DatasetKind, FieldType};
pub use value::Value;
