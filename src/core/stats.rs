//! Per-parameter aggregate statistics over a measurement record set
//!
//! Values keep full `f64` precision here; rounding to two decimals happens only
//! when a report or the dashboard formats them.

use crate::core::models::{
    MeasurementRecord, ParameterKey, ParameterSpec, PARAMETERS, PARAMETER_COUNT,
};
use thiserror::Error;

/// Returned when asked to aggregate zero records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot aggregate an empty record set")]
pub struct EmptyRecordSet;

/// Mean, minimum and maximum of one parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterStats {
    /// Arithmetic mean
    pub mean: f64,
    /// Smallest value seen
    pub min: f64,
    /// Largest value seen
    pub max: f64,
}

/// Statistics for every tracked parameter, computed fresh per report
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateStats {
    count: usize,
    by_parameter: [ParameterStats; PARAMETER_COUNT],
}

impl AggregateStats {
    /// Number of records that were aggregated
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Statistics for one parameter
    #[must_use]
    pub const fn get(&self, key: ParameterKey) -> &ParameterStats {
        &self.by_parameter[key.index()]
    }

    /// Iterate parameters in schema order together with their statistics
    pub fn iter(&self) -> impl Iterator<Item = (&'static ParameterSpec, &ParameterStats)> + '_ {
        PARAMETERS.iter().zip(self.by_parameter.iter())
    }
}

/// Aggregate a non-empty record set into per-parameter mean/min/max.
///
/// The result does not depend on record order: values are summed in sorted
/// order with compensated summation, so any permutation of the same records
/// yields bit-identical statistics.
///
/// Non-finite inputs are not filtered. A NaN poisons the mean, min and max of
/// its parameter.
///
/// # Errors
///
/// Returns [`EmptyRecordSet`] if `records` is empty.
pub fn aggregate(records: &[MeasurementRecord]) -> Result<AggregateStats, EmptyRecordSet> {
    if records.is_empty() {
        return Err(EmptyRecordSet);
    }

    let by_parameter = PARAMETERS.each_ref().map(|spec| summarize(records, spec));

    Ok(AggregateStats {
        count: records.len(),
        by_parameter,
    })
}

#[allow(clippy::cast_precision_loss)]
fn summarize(records: &[MeasurementRecord], spec: &ParameterSpec) -> ParameterStats {
    let mut values: Vec<f64> = records.iter().map(|r| spec.read(r)).collect();
    values.sort_by(f64::total_cmp);

    let mut min = values[0];
    let mut max = values[0];
    let mut sum = 0.0;
    let mut compensation = 0.0;

    for &value in &values {
        if value.is_nan() || value < min {
            min = if min.is_nan() { min } else { value };
        }
        if value.is_nan() || value > max {
            max = if max.is_nan() { max } else { value };
        }

        // Neumaier summation
        let total = sum + value;
        if f64::abs(sum) >= f64::abs(value) {
            compensation += (sum - total) + value;
        } else {
            compensation += (value - total) + sum;
        }
        sum = total;
    }

    ParameterStats {
        mean: (sum + compensation) / values.len() as f64,
        min,
        max,
    }
}
