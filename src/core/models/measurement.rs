//! Measurement record model

use super::parameter::ParameterKey;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Storage and wire format for measurement timestamps (`YYYY-MM-DD HH:MM:SS`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One timestamped reading of all seven tracked water-quality parameters
///
/// Records are plain values: produced by ingestion or the store and only
/// read afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// When the reading was stored
    #[serde(with = "timestamp_serde")]
    pub timestamp: NaiveDateTime,
    /// Water temperature in °C
    pub temperature: f64,
    /// Total dissolved solids in ppm
    pub total_dissolved_solids: f64,
    /// Electrical conductivity in µS/cm
    pub electrical_conductivity: f64,
    /// Resistivity in ohm·cm
    pub resistivity: f64,
    /// Salinity in PSU
    pub salinity: f64,
    /// Purity percentage
    pub purity: f64,
    /// pH (dimensionless)
    pub ph: f64,
}

impl MeasurementRecord {
    /// Read the value of one tracked parameter
    #[must_use]
    pub const fn value(&self, key: ParameterKey) -> f64 {
        match key {
            ParameterKey::Temperature => self.temperature,
            ParameterKey::TotalDissolvedSolids => self.total_dissolved_solids,
            ParameterKey::ElectricalConductivity => self.electrical_conductivity,
            ParameterKey::Resistivity => self.resistivity,
            ParameterKey::Salinity => self.salinity,
            ParameterKey::Purity => self.purity,
            ParameterKey::Ph => self.ph,
        }
    }

    /// Timestamp in the storage format
    #[must_use]
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Serialize timestamps as `YYYY-MM-DD HH:MM:SS` instead of ISO-8601 with a `T`
mod timestamp_serde {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> MeasurementRecord {
        MeasurementRecord {
            timestamp: NaiveDate::from_ymd_opt(2025, 3, 14)
                .and_then(|d| d.and_hms_opt(9, 26, 53))
                .unwrap(),
            temperature: 21.5,
            total_dissolved_solids: 312.0,
            electrical_conductivity: 624.0,
            resistivity: 1602.5641,
            salinity: 0.31,
            purity: 96.8,
            ph: 7.2,
        }
    }

    #[test]
    fn value_reads_each_parameter() {
        let record = sample();
        assert!((record.value(ParameterKey::Temperature) - 21.5).abs() < f64::EPSILON);
        assert!((record.value(ParameterKey::Resistivity) - 1602.5641).abs() < f64::EPSILON);
        assert!((record.value(ParameterKey::Ph) - 7.2).abs() < f64::EPSILON);
    }

    #[test]
    fn json_uses_storage_timestamp_format() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"timestamp\":\"2025-03-14 09:26:53\""));

        let back: MeasurementRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
    }
}
