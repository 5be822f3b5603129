//! CSV-backed measurement store
//!
//! One reading per line under a header row. Columns are located by header
//! name, so files with reordered columns or the device's Spanish column names
//! (`fecha`, `resistividad`, `salinidad`, `pureza`) load as well.

use super::StoreError;
use crate::core::models::{MeasurementRecord, TIMESTAMP_FORMAT};
use crate::core::range::ReportRange;
use crate::debug;
use chrono::NaiveDateTime;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Header written when a new data file is created
pub const CSV_HEADER: &str = "timestamp,temp,tds,ec,resistivity,salinity,purity,ph";

/// Column name aliases, in record field order
const COLUMNS: [(&str, &[&str]); 8] = [
    ("timestamp", &["timestamp", "fecha"]),
    ("temp", &["temp", "temperature"]),
    ("tds", &["tds"]),
    ("ec", &["ec"]),
    ("resistivity", &["resistivity", "resistividad"]),
    ("salinity", &["salinity", "salinidad"]),
    ("purity", &["purity", "pureza"]),
    ("ph", &["ph"]),
];

/// Measurement table persisted as a CSV file
#[derive(Debug, Clone)]
pub struct MeasurementStore {
    path: PathBuf,
}

impl MeasurementStore {
    /// Open a store backed by `path`. The file is created on first append.
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every stored record, ascending by timestamp.
    ///
    /// A missing file is an empty store.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, lacks a required column, or
    /// holds a malformed line.
    pub fn load_all(&self) -> Result<Vec<MeasurementRecord>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Data file {} does not exist yet", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        let mut records = parse_measurements_csv(&content)?;
        records.sort_by_key(|r| r.timestamp);
        debug!(
            "Loaded {} records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }

    /// Records whose timestamp lies inside `range` (inclusive), ascending.
    ///
    /// The result is a snapshot: later appends do not affect it.
    ///
    /// # Errors
    /// Propagates any error from [`load_all`](Self::load_all).
    pub fn query_range(&self, range: &ReportRange) -> Result<Vec<MeasurementRecord>, StoreError> {
        let mut records = self.load_all()?;
        records.retain(|r| range.contains(r.timestamp));
        Ok(records)
    }

    /// The newest `limit` records, returned oldest first for charting.
    ///
    /// # Errors
    /// Propagates any error from [`load_all`](Self::load_all).
    pub fn latest(&self, limit: usize) -> Result<Vec<MeasurementRecord>, StoreError> {
        let mut records = self.load_all()?;
        let skip = records.len().saturating_sub(limit);
        records.drain(..skip);
        Ok(records)
    }

    /// Append one record, creating the file (and its directory) when missing.
    ///
    /// # Errors
    /// Returns an error if the file or its directory cannot be written.
    pub fn append(&self, record: &MeasurementRecord) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let needs_header = fs::metadata(&self.path).map_or(true, |m| m.len() == 0);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;

        if needs_header {
            writeln!(file, "{CSV_HEADER}").map_err(io_err)?;
        }
        writeln!(file, "{}", format_csv_line(record)).map_err(io_err)?;
        Ok(())
    }
}

/// Parse CSV text (header row plus data rows) into records in file order.
///
/// Blank lines are skipped. Line numbers in errors are 1-based.
///
/// # Errors
/// Returns an error if a required column is missing or a row cannot be parsed.
pub fn parse_measurements_csv(content: &str) -> Result<Vec<MeasurementRecord>, StoreError> {
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header_line)) = lines.next() else {
        return Ok(Vec::new());
    };
    let header_line = header_line.trim_start_matches('\u{feff}');
    let headers = parse_csv_line(header_line);
    let indices = column_indices(&headers)?;

    lines
        .map(|(idx, line)| parse_record_line(line, &indices, idx + 1))
        .collect()
}

/// Format one record as a CSV data row in [`CSV_HEADER`] order
#[must_use]
pub fn format_csv_line(record: &MeasurementRecord) -> String {
    format!(
        "{},{},{},{},{},{},{},{}",
        record.timestamp.format(TIMESTAMP_FORMAT),
        record.temperature,
        record.total_dissolved_solids,
        record.electrical_conductivity,
        record.resistivity,
        record.salinity,
        record.purity,
        record.ph
    )
}

/// Parse a CSV line into fields
fn parse_csv_line(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

/// Resolve the position of every required column from the header row
fn column_indices(headers: &[&str]) -> Result<[usize; 8], StoreError> {
    let mut indices = [0; 8];
    for (slot, (canonical, aliases)) in indices.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| aliases.iter().any(|alias| h.eq_ignore_ascii_case(alias)))
            .ok_or_else(|| StoreError::MissingColumn(canonical.to_string()))?;
    }
    Ok(indices)
}

fn parse_record_line(
    line: &str,
    indices: &[usize; 8],
    line_no: usize,
) -> Result<MeasurementRecord, StoreError> {
    let fields = parse_csv_line(line);
    let field = |column: usize| -> Result<&str, StoreError> {
        fields
            .get(indices[column])
            .copied()
            .ok_or_else(|| StoreError::Malformed {
                line: line_no,
                message: format!("missing value for '{}'", COLUMNS[column].0),
            })
    };
    let number = |column: usize| -> Result<f64, StoreError> {
        let raw = field(column)?;
        raw.parse::<f64>().map_err(|_| StoreError::Malformed {
            line: line_no,
            message: format!("'{}' is not a number for '{}'", raw, COLUMNS[column].0),
        })
    };

    let raw_timestamp = field(0)?;
    let timestamp = NaiveDateTime::parse_from_str(raw_timestamp, TIMESTAMP_FORMAT).map_err(|_| {
        StoreError::Malformed {
            line: line_no,
            message: format!("'{raw_timestamp}' is not a YYYY-MM-DD HH:MM:SS timestamp"),
        }
    })?;

    Ok(MeasurementRecord {
        timestamp,
        temperature: number(1)?,
        total_dissolved_solids: number(2)?,
        electrical_conductivity: number(3)?,
        resistivity: number(4)?,
        salinity: number(5)?,
        purity: number(6)?,
        ph: number(7)?,
    })
}
