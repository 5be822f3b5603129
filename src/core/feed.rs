//! Live dashboard feed
//!
//! The dashboard polls for the most recent readings. It gets them either as
//! JSON for charting or as a fixed-width text table.

use crate::core::models::{MeasurementRecord, ParameterKey, PARAMETERS};
use serde::Serialize;

/// Dashboard timestamp format
const FEED_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Decimal places used by the dashboard for a parameter.
///
/// Resistivity values are large and drift slowly, so the dashboard shows four
/// decimals for it; everything else gets two.
#[must_use]
pub const fn dashboard_precision(key: ParameterKey) -> usize {
    match key {
        ParameterKey::Resistivity => 4,
        _ => 2,
    }
}

/// Format a value the way the dashboard displays it
#[must_use]
pub fn format_dashboard_value(key: ParameterKey, value: f64) -> String {
    format!("{value:.prec$}", prec = dashboard_precision(key))
}

/// JSON body served to polling clients
#[derive(Debug, Serialize)]
pub struct FeedSnapshot<'a> {
    /// Number of readings in `readings`
    pub count: usize,
    /// Readings, oldest first
    pub readings: &'a [MeasurementRecord],
}

/// Serialize readings for a polling client
///
/// # Errors
/// Returns an error if serialization fails.
pub fn feed_json(records: &[MeasurementRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&FeedSnapshot {
        count: records.len(),
        readings: records,
    })
}

/// One table line: the time column then one right-aligned cell per parameter
fn table_row(time: &str, cells: impl Iterator<Item = String>) -> String {
    let cells: String = cells.map(|cell| format!(" {cell:>14}")).collect();
    format!("{time:<20}{cells}\n")
}

/// Render readings as a text table, one row per reading
#[must_use]
pub fn feed_table(records: &[MeasurementRecord]) -> String {
    let mut out = table_row("Time", PARAMETERS.iter().map(|spec| spec.short_label()));
    out.push_str(&"-".repeat(20 + PARAMETERS.len() * 15));
    out.push('\n');

    for record in records {
        let time = record.timestamp.format(FEED_TIME_FORMAT).to_string();
        let values = PARAMETERS
            .iter()
            .map(|spec| format_dashboard_value(spec.key, spec.read(record)));
        out.push_str(&table_row(&time, values));
    }
    out
}
