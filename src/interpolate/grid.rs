//! Snapping coordinates onto a fixed-resolution lattice.

use crate::types::station::LatLon;
use serde::{Deserialize, Serialize};

/// Grid spacing of the GFS forecast lattice, in degrees.
pub const GRID_RESOLUTION: f64 = 0.25;

/// Returns the nearest lower and upper lattice lines bracketing `value`.
///
/// Both returned values are multiples of `resolution`; they are equal when
/// `value` already lies on a lattice line.
///
/// # Examples
///
/// ```
/// use hydromet::closest_grid_lines;
///
/// assert_eq!(closest_grid_lines(43.35, 0.25), (43.25, 43.5));
/// assert_eq!(closest_grid_lines(43.25, 0.25), (43.25, 43.25));
/// ```
pub fn closest_grid_lines(value: f64, resolution: f64) -> (f64, f64) {
    let lower = (value / resolution).floor() * resolution;
    let upper = (value / resolution).ceil() * resolution;
    (lower, upper)
}

/// [`closest_grid_lines`] at the 0.25° GFS resolution.
pub fn closest_quarters(value: f64) -> (f64, f64) {
    closest_grid_lines(value, GRID_RESOLUTION)
}

/// The two lattice lines bracketing one axis value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub lower: f64,
    pub upper: f64,
}

impl AxisBounds {
    /// Brackets `value` between its nearest lattice lines.
    pub fn bracketing(value: f64, resolution: f64) -> Self {
        let (lower, upper) = closest_grid_lines(value, resolution);
        Self { lower, upper }
    }

    /// True when the value sat exactly on a lattice line.
    pub fn is_degenerate(&self) -> bool {
        self.lower == self.upper
    }

    pub fn span(&self) -> f64 {
        self.upper - self.lower
    }
}

/// The lattice cell enclosing a point: bracketing lines on both axes.
///
/// The named corner accessors fix the corner convention once for every
/// consumer. [`bilinear`](crate::bilinear) takes its corners from here and
/// from the equally named fields of [`CornerSeries`](crate::CornerSeries)
/// rather than a positional list, so grid snapping and interpolation cannot
/// disagree about which corner is which.
///
/// # Examples
///
/// ```
/// use hydromet::{GridCell, LatLon, GRID_RESOLUTION};
///
/// let cell = GridCell::enclosing(LatLon(43.35, 19.36), GRID_RESOLUTION);
/// assert_eq!(cell.south_west(), LatLon(43.25, 19.25));
/// assert_eq!(cell.north_east(), LatLon(43.5, 19.5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub lat: AxisBounds,
    pub lon: AxisBounds,
}

impl GridCell {
    /// Snaps `point` onto its enclosing cell of the given lattice resolution.
    pub fn enclosing(point: LatLon, resolution: f64) -> Self {
        Self {
            lat: AxisBounds::bracketing(point.0, resolution),
            lon: AxisBounds::bracketing(point.1, resolution),
        }
    }

    pub fn south_west(&self) -> LatLon {
        LatLon(self.lat.lower, self.lon.lower)
    }

    pub fn south_east(&self) -> LatLon {
        LatLon(self.lat.lower, self.lon.upper)
    }

    pub fn north_east(&self) -> LatLon {
        LatLon(self.lat.upper, self.lon.upper)
    }

    pub fn north_west(&self) -> LatLon {
        LatLon(self.lat.upper, self.lon.lower)
    }

    /// All four corners in the fixed order SW, SE, NE, NW.
    pub fn corners(&self) -> [LatLon; 4] {
        [
            self.south_west(),
            self.south_east(),
            self.north_east(),
            self.north_west(),
        ]
    }

    /// True when the point sat exactly on a lattice intersection and the cell
    /// collapsed to that single point.
    pub fn is_point(&self) -> bool {
        self.lat.is_degenerate() && self.lon.is_degenerate()
    }
}
