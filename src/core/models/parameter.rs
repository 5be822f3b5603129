//! Static schema of the tracked water-quality parameters
//!
//! The aggregator, the report tables and the dashboard feed all walk
//! [`PARAMETERS`]; nothing else lists the parameters by hand.

use super::measurement::MeasurementRecord;
use std::fmt;

/// Identifies one of the seven tracked parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParameterKey {
    /// Water temperature
    Temperature,
    /// Total dissolved solids
    TotalDissolvedSolids,
    /// Electrical conductivity
    ElectricalConductivity,
    /// Resistivity
    Resistivity,
    /// Salinity
    Salinity,
    /// Purity
    Purity,
    /// pH
    Ph,
}

impl ParameterKey {
    /// Position of this parameter in [`PARAMETERS`]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Static descriptor for this parameter
    #[must_use]
    pub fn spec(self) -> &'static ParameterSpec {
        &PARAMETERS[self.index()]
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().display_name)
    }
}

/// Descriptor of one tracked parameter
#[derive(Debug)]
pub struct ParameterSpec {
    /// Parameter identity
    pub key: ParameterKey,
    /// Full name used in the summary table
    pub display_name: &'static str,
    /// Unit suffix, `None` for dimensionless values
    pub unit: Option<&'static str>,
    /// Abbreviated label used in detail table headers
    pub short_name: &'static str,
    /// Reads the parameter out of a record
    pub accessor: fn(&MeasurementRecord) -> f64,
}

impl ParameterSpec {
    /// Read this parameter from a record
    #[must_use]
    pub fn read(&self, record: &MeasurementRecord) -> f64 {
        (self.accessor)(record)
    }

    /// `Name (unit)`, or just the name when there is no unit
    #[must_use]
    pub fn label(&self) -> String {
        Self::with_unit(self.display_name, self.unit)
    }

    /// Detail header label, e.g. `Temp (°C)`
    #[must_use]
    pub fn short_label(&self) -> String {
        Self::with_unit(self.short_name, self.unit)
    }

    fn with_unit(name: &str, unit: Option<&str>) -> String {
        unit.map_or_else(|| name.to_string(), |unit| format!("{name} ({unit})"))
    }
}

/// Number of tracked parameters
pub const PARAMETER_COUNT: usize = 7;

/// Every tracked parameter, in summary-table order
pub static PARAMETERS: [ParameterSpec; PARAMETER_COUNT] = [
    ParameterSpec {
        key: ParameterKey::Temperature,
        display_name: "Temperature",
        unit: Some("°C"),
        short_name: "Temp",
        accessor: |r: &MeasurementRecord| r.temperature,
    },
    ParameterSpec {
        key: ParameterKey::TotalDissolvedSolids,
        display_name: "TDS",
        unit: Some("ppm"),
        short_name: "TDS",
        accessor: |r: &MeasurementRecord| r.total_dissolved_solids,
    },
    ParameterSpec {
        key: ParameterKey::ElectricalConductivity,
        display_name: "Electrical Conductivity",
        unit: Some("µS/cm"),
        short_name: "EC",
        accessor: |r: &MeasurementRecord| r.electrical_conductivity,
    },
    ParameterSpec {
        key: ParameterKey::Resistivity,
        display_name: "Resistivity",
        unit: Some("ohm·cm"),
        short_name: "Resist",
        accessor: |r: &MeasurementRecord| r.resistivity,
    },
    ParameterSpec {
        key: ParameterKey::Salinity,
        display_name: "Salinity",
        unit: Some("PSU"),
        short_name: "Sal",
        accessor: |r: &MeasurementRecord| r.salinity,
    },
    ParameterSpec {
        key: ParameterKey::Purity,
        display_name: "Purity",
        unit: Some("%"),
        short_name: "Purity",
        accessor: |r: &MeasurementRecord| r.purity,
    },
    ParameterSpec {
        key: ParameterKey::Ph,
        display_name: "pH",
        unit: None,
        short_name: "pH",
        accessor: |r: &MeasurementRecord| r.ph,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_key() {
        for (i, spec) in PARAMETERS.iter().enumerate() {
            assert_eq!(spec.key.index(), i, "{} out of place", spec.display_name);
            assert_eq!(spec.key.spec().display_name, spec.display_name);
        }
    }

    #[test]
    fn labels_include_units_when_present() {
        assert_eq!(ParameterKey::Temperature.spec().label(), "Temperature (°C)");
        assert_eq!(ParameterKey::Resistivity.spec().short_label(), "Resist (ohm·cm)");
        assert_eq!(ParameterKey::Ph.spec().label(), "pH");
        assert_eq!(ParameterKey::Ph.spec().short_label(), "pH");
    }
}
