//! Measurement persistence
//!
//! Stands in for the relational `mediciones` table: the report engine only
//! ever sees the record snapshot a query returns.

pub mod csv_store;

pub use csv_store::{format_csv_line, parse_measurements_csv, MeasurementStore, CSV_HEADER};

use std::path::PathBuf;
use thiserror::Error;

/// Failures reading or writing the measurement store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written
    #[error("cannot access data file {}: {source}", path.display())]
    Io {
        /// Backing file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// The header row lacks a required column
    #[error("data file header is missing the '{0}' column")]
    MissingColumn(String),
    /// A data row could not be parsed
    #[error("malformed data at line {line}: {message}")]
    Malformed {
        /// 1-based line number
        line: usize,
        /// What was wrong
        message: String,
    },
}
