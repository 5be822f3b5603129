//! Inclusive time ranges for report and query requests

use crate::core::models::TIMESTAMP_FORMAT;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use thiserror::Error;

/// Human-readable range format used in report metadata
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Date-only input format
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Request-validation failures for a time range
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// A bound was not supplied
    #[error("missing range {0}: both start and end are required")]
    Missing(&'static str),
    /// A bound did not match an accepted format
    #[error("invalid timestamp '{value}': use YYYY-MM-DD or YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp {
        /// The rejected input
        value: String,
    },
    /// The start lies after the end
    #[error("range start {start} is after range end {end}")]
    Reversed {
        /// Parsed start
        start: NaiveDateTime,
        /// Parsed end
        end: NaiveDateTime,
    },
}

/// Which side of a range a bound sits on; decides how a bare date expands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Start,
    End,
}

/// A validated inclusive range, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRange {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl ReportRange {
    /// Build a range from parsed bounds
    ///
    /// # Errors
    /// Returns [`RangeError::Reversed`] if `start > end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse user-supplied bounds.
    ///
    /// Each bound is `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`. A bare start date
    /// means the first second of that day, a bare end date the last second.
    ///
    /// # Errors
    /// Returns a [`RangeError`] if a bound is missing, malformed, or the range
    /// is reversed.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, RangeError> {
        let start = start.ok_or(RangeError::Missing("start"))?;
        let end = end.ok_or(RangeError::Missing("end"))?;
        Self::new(parse_bound(start, Bound::Start)?, parse_bound(end, Bound::End)?)
    }

    /// First instant included in the range
    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Last instant included in the range
    #[must_use]
    pub const fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Whether `timestamp` falls inside the range (both ends inclusive)
    #[must_use]
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

impl fmt::Display for ReportRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format(DISPLAY_FORMAT),
            self.end.format(DISPLAY_FORMAT)
        )
    }
}

fn parse_bound(raw: &str, bound: Bound) -> Result<NaiveDateTime, RangeError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(RangeError::Missing(match bound {
            Bound::Start => "start",
            Bound::End => "end",
        }));
    }

    if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
        return Ok(timestamp);
    }

    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        RangeError::InvalidTimestamp {
            value: value.to_string(),
        }
    })?;
    let time = match bound {
        Bound::Start => NaiveTime::MIN,
        Bound::End => NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN),
    };
    Ok(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, s))
            .unwrap()
    }

    #[test]
    fn full_timestamps_are_kept_verbatim() {
        let range =
            ReportRange::parse(Some("2025-01-10 08:15:00"), Some("2025-01-10 17:45:30")).unwrap();
        assert_eq!(range.start(), at(2025, 1, 10, 8, 15, 0));
        assert_eq!(range.end(), at(2025, 1, 10, 17, 45, 30));
    }

    #[test]
    fn bare_dates_cover_whole_days() {
        let range = ReportRange::parse(Some("2025-01-10"), Some("2025-01-11")).unwrap();
        assert_eq!(range.start(), at(2025, 1, 10, 0, 0, 0));
        assert_eq!(range.end(), at(2025, 1, 11, 23, 59, 59));
        assert!(range.contains(at(2025, 1, 11, 23, 59, 59)));
        assert!(!range.contains(at(2025, 1, 12, 0, 0, 0)));
    }

    #[test]
    fn same_instant_is_a_valid_range() {
        let range =
            ReportRange::parse(Some("2025-01-10 08:00:00"), Some("2025-01-10 08:00:00")).unwrap();
        assert!(range.contains(at(2025, 1, 10, 8, 0, 0)));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = ReportRange::parse(Some("2025-02-01"), Some("2025-01-01")).unwrap_err();
        assert!(matches!(err, RangeError::Reversed { .. }));
    }

    #[test]
    fn malformed_and_missing_bounds_are_rejected() {
        assert_eq!(
            ReportRange::parse(Some("10/01/2025"), Some("2025-01-11")),
            Err(RangeError::InvalidTimestamp {
                value: "10/01/2025".to_string()
            })
        );
        assert_eq!(
            ReportRange::parse(None, Some("2025-01-11")),
            Err(RangeError::Missing("start"))
        );
        assert_eq!(
            ReportRange::parse(Some("2025-01-11"), Some("  ")),
            Err(RangeError::Missing("end"))
        );
    }

    #[test]
    fn display_uses_day_first_format() {
        let range = ReportRange::new(at(2025, 3, 4, 5, 6, 7), at(2025, 3, 5, 0, 0, 0)).unwrap();
        assert_eq!(range.to_string(), "04/03/2025 05:06:07 - 05/03/2025 00:00:00");
    }
}
