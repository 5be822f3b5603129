//! Data models for `AquaReport`

pub mod measurement;
pub mod parameter;

pub use measurement::{MeasurementRecord, TIMESTAMP_FORMAT};
pub use parameter::{ParameterKey, ParameterSpec, PARAMETERS, PARAMETER_COUNT};
