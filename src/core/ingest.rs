//! Validation of readings pushed by the sensor device
//!
//! The device posts one JSON object per reading. All seven values are required
//! and must be finite; the report engine relies on that guarantee and does not
//! re-check it.

use crate::core::models::MeasurementRecord;
use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;

/// Why a reading was refused
#[derive(Debug, Error)]
pub enum IngestError {
    /// The payload was not a JSON object of numbers
    #[error("invalid reading payload: {0}")]
    Json(#[from] serde_json::Error),
    /// One or more values were absent
    #[error("missing fields in reading: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    /// A value was NaN or infinite
    #[error("field '{0}' must be a finite number")]
    NonFinite(&'static str),
}

/// Raw reading as sent by the device.
///
/// Field names follow the firmware (`resistividad`, `salinidad`, `pureza`);
/// the English names are accepted too.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadingPayload {
    /// Temperature in °C
    pub temp: Option<f64>,
    /// Total dissolved solids in ppm
    pub tds: Option<f64>,
    /// Electrical conductivity in µS/cm
    pub ec: Option<f64>,
    /// Resistivity in ohm·cm
    #[serde(alias = "resistivity")]
    pub resistividad: Option<f64>,
    /// Salinity in PSU
    #[serde(alias = "salinity")]
    pub salinidad: Option<f64>,
    /// Purity percentage
    #[serde(alias = "purity")]
    pub pureza: Option<f64>,
    /// pH
    pub ph: Option<f64>,
}

impl ReadingPayload {
    /// Parse a JSON document into a payload without validating it
    ///
    /// # Errors
    /// Returns [`IngestError::Json`] if the text is not a JSON object with
    /// numeric (or null) fields.
    pub fn from_json(json: &str) -> Result<Self, IngestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the payload and stamp it with `received_at`.
    ///
    /// # Errors
    /// Returns [`IngestError::MissingFields`] listing every absent value, or
    /// [`IngestError::NonFinite`] for the first NaN or infinite value.
    pub fn into_record(self, received_at: NaiveDateTime) -> Result<MeasurementRecord, IngestError> {
        let fields = [
            ("temp", self.temp),
            ("tds", self.tds),
            ("ec", self.ec),
            ("resistividad", self.resistividad),
            ("salinidad", self.salinidad),
            ("pureza", self.pureza),
            ("ph", self.ph),
        ];

        let missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(IngestError::MissingFields(missing));
        }

        let mut values = [0.0; 7];
        for (slot, (name, value)) in values.iter_mut().zip(fields) {
            let value = value.unwrap_or_default();
            if !value.is_finite() {
                return Err(IngestError::NonFinite(name));
            }
            *slot = value;
        }
        let [temperature, total_dissolved_solids, electrical_conductivity, resistivity, salinity, purity, ph] =
            values;

        Ok(MeasurementRecord {
            timestamp: received_at,
            temperature,
            total_dissolved_solids,
            electrical_conductivity,
            resistivity,
            salinity,
            purity,
            ph,
        })
    }
}
