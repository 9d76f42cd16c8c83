//! Defines the geographic entities the pipelines operate on: coordinates,
//! meteorological stations, and gauged river reaches.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are represented as `f64` decimal degrees.
///
/// # Examples
///
/// ```
/// use hydromet::LatLon;
///
/// let pljevlja = LatLon(43.35, 19.36);
/// assert_eq!(pljevlja.0, 43.35); // Latitude
/// assert_eq!(pljevlja.1, 19.36); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°N {}°E", self.0, self.1)
    }
}

/// A meteorological station: the name its series are published under, plus
/// the exact coordinates weather is interpolated onto.
///
/// One record replaces the parallel name/latitude/longitude lists of older
/// deployments, so a station cannot lose its coordinates to an indexing slip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub location: LatLon,
}

impl Station {
    pub fn new(name: impl Into<String>, location: LatLon) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}

/// External river identifier: the LINKNO of the TDX-Hydro streams dataset
/// used by GEOGLOWS.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RiverId(pub u64);

impl fmt::Display for RiverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A gauged river reach: its external identifier and the name of the hydro
/// station its discharge is reported under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct River {
    pub id: RiverId,
    pub station: String,
}

impl River {
    pub fn new(id: u64, station: impl Into<String>) -> Self {
        Self {
            id: RiverId(id),
            station: station.into(),
        }
    }
}
