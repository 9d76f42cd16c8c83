//! Defines the hourly forecast variables understood by the weather grid
//! source.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hourly weather variables that can be requested from the forecast grid.
///
/// Each variable knows its upstream API parameter name and the column name it
/// is published under in tabular output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HourlyVariable {
    /// Air temperature 2 m above ground, in °C.
    #[serde(rename = "temperature_2m")]
    Temperature2m,
    /// Total hourly precipitation (rain, showers and snow), in mm.
    #[serde(rename = "precipitation")]
    Precipitation,
}

impl HourlyVariable {
    pub(crate) fn api_name(&self) -> &'static str {
        match self {
            HourlyVariable::Temperature2m => "temperature_2m",
            HourlyVariable::Precipitation => "precipitation",
        }
    }

    pub(crate) fn column_name(&self) -> &'static str {
        match self {
            HourlyVariable::Temperature2m => "temperature",
            HourlyVariable::Precipitation => "precipitation",
        }
    }
}

/// Allows formatting an `HourlyVariable` variant using its `api_name`.
///
/// # Examples
///
/// ```
/// use hydromet::HourlyVariable;
///
/// assert_eq!(format!("{}", HourlyVariable::Temperature2m), "temperature_2m");
/// assert_eq!(HourlyVariable::Precipitation.to_string(), "precipitation");
/// ```
impl fmt::Display for HourlyVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_name())
    }
}
