use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Physical quantity as reported by the instrument (value + unit)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureWithUnit {
    /// Numeric value in `unit`
    pub value: f64,
    /// Unit symbol, e.g. "m", "nm", "um"
    pub unit: String,
}

impl MeasureWithUnit {
    /// Create a new measure
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    /// Convert the measurement to micrometers
    pub fn to_um(&self) -> Result<f64, ConfigurationError> {
        to_micrometers(self.value, &self.unit)
    }
}

/// Convert a length to micrometers.
///
/// Accepts `um`/`µm` (passthrough), `nm` and `m`. Anything else is an error.
pub fn to_micrometers(value: f64, unit: &str) -> Result<f64, ConfigurationError> {
    match unit {
        // U+00B5 micro sign and U+03BC greek mu both show up in vendor files
        "um" | "\u{b5}m" | "\u{3bc}m" => Ok(value),
        "nm" => Ok(value / 1000.0),
        "m" => Ok(value * 1_000_000.0),
        other => Err(ConfigurationError::UnknownUnit(other.to_string())),
    }
}
