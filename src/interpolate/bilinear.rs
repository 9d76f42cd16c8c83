//! Bilinear interpolation over the four corners of a lattice cell.

use crate::interpolate::grid::GridCell;
use crate::interpolate::{round2, InterpolateError};
use crate::types::station::LatLon;

/// The four corner value series of a [`GridCell`], named after the corners
/// they were sampled at.
///
/// Naming the fields after [`GridCell`]'s corner accessors is what ties the
/// two halves of the contract together: there is no positional corner list
/// that could be passed in the wrong order.
#[derive(Debug, Clone, Copy)]
pub struct CornerSeries<'a> {
    pub south_west: &'a [f64],
    pub south_east: &'a [f64],
    pub north_west: &'a [f64],
    pub north_east: &'a [f64],
}

impl<'a> CornerSeries<'a> {
    fn all(&self) -> [&'a [f64]; 4] {
        [
            self.south_west,
            self.south_east,
            self.north_west,
            self.north_east,
        ]
    }
}

/// Estimates a value series at `query` from the four corners of `cell`.
///
/// Degenerate cells degrade gracefully, checked in this order: a cell
/// collapsed to a single point passes the south-west series through; a cell
/// collapsed in latitude interpolates linearly along longitude; a cell
/// collapsed in longitude interpolates linearly along latitude; otherwise
/// the full area-weighted bilinear formula applies. Inverted bounds still
/// compute correctly since the algebra is sign-symmetric.
///
/// Rounding to two decimals is part of this function's contract; NaN in a
/// participating corner propagates to that step of the output.
///
/// # Errors
///
/// [`InterpolateError::LengthMismatch`] when the four series lengths differ.
///
/// # Examples
///
/// ```
/// use hydromet::{bilinear, CornerSeries, GridCell, LatLon, GRID_RESOLUTION};
///
/// let cell = GridCell::enclosing(LatLon(43.0, 19.0), GRID_RESOLUTION);
/// let corners = CornerSeries {
///     south_west: &[0.0],
///     south_east: &[10.0],
///     north_west: &[20.0],
///     north_east: &[30.0],
/// };
/// // 43.0°N 19.0°E sits on the lattice, so the cell is the point itself and
/// // the south-west series passes through.
/// assert_eq!(bilinear(LatLon(43.0, 19.0), &cell, &corners).unwrap(), vec![0.0]);
/// ```
pub fn bilinear(
    query: LatLon,
    cell: &GridCell,
    corners: &CornerSeries,
) -> Result<Vec<f64>, InterpolateError> {
    let len = corners.south_west.len();
    for series in corners.all() {
        if series.len() != len {
            return Err(InterpolateError::LengthMismatch {
                expected: len,
                found: series.len(),
            });
        }
    }

    let LatLon(x, y) = query;
    let (x1, x2) = (cell.lat.lower, cell.lat.upper);
    let (y1, y2) = (cell.lon.lower, cell.lon.upper);
    let (t11, t12) = (corners.south_west, corners.south_east);
    let (t21, t22) = (corners.north_west, corners.north_east);

    let out = if x1 == x2 && y1 == y2 {
        t11.iter().map(|&v| round2(v)).collect()
    } else if x1 == x2 {
        (0..len)
            .map(|i| round2((t11[i] * (y2 - y) + t12[i] * (y - y1)) / (y2 - y1)))
            .collect()
    } else if y1 == y2 {
        (0..len)
            .map(|i| round2((t11[i] * (x2 - x) + t21[i] * (x - x1)) / (x2 - x1)))
            .collect()
    } else {
        let area = (x2 - x1) * (y2 - y1);
        (0..len)
            .map(|i| {
                let weighted = t11[i] * (x2 - x) * (y2 - y)
                    + t21[i] * (x - x1) * (y2 - y)
                    + t12[i] * (x2 - x) * (y - y1)
                    + t22[i] * (x - x1) * (y - y1);
                round2(weighted / area)
            })
            .collect()
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolate::grid::AxisBounds;

    fn cell(lat_lower: f64, lat_upper: f64, lon_lower: f64, lon_upper: f64) -> GridCell {
        GridCell {
            lat: AxisBounds {
                lower: lat_lower,
                upper: lat_upper,
            },
            lon: AxisBounds {
                lower: lon_lower,
                upper: lon_upper,
            },
        }
    }

    #[test]
    fn collapsed_cell_passes_south_west_through() {
        let cell = cell(43.25, 43.25, 19.5, 19.5);
        let corners = CornerSeries {
            south_west: &[10.567, -0.4],
            south_east: &[99.0, 99.0],
            north_west: &[99.0, 99.0],
            north_east: &[99.0, 99.0],
        };
        let out = bilinear(LatLon(43.25, 19.5), &cell, &corners).unwrap();
        // Passthrough still applies the two-decimal rounding rule.
        assert_eq!(out, vec![10.57, -0.4]);
    }

    #[test]
    fn latitude_degenerate_reduces_to_longitude_linear() {
        let cell = cell(5.0, 5.0, 0.0, 2.0);
        let corners = CornerSeries {
            south_west: &[10.0],
            south_east: &[20.0],
            north_west: &[77.0],
            north_east: &[77.0],
        };
        let out = bilinear(LatLon(5.0, 1.0), &cell, &corners).unwrap();
        assert_eq!(out, vec![15.0]);
    }

    #[test]
    fn longitude_degenerate_reduces_to_latitude_linear() {
        let cell = cell(0.0, 4.0, 7.0, 7.0);
        let corners = CornerSeries {
            south_west: &[8.0],
            south_east: &[77.0],
            north_west: &[16.0],
            north_east: &[77.0],
        };
        let out = bilinear(LatLon(1.0, 7.0), &cell, &corners).unwrap();
        assert_eq!(out, vec![10.0]);
    }

    #[test]
    fn full_bilinear_weights_by_opposite_area() {
        let cell = cell(42.75, 43.25, 18.75, 19.25);
        let corners = CornerSeries {
            south_west: &[0.0],
            south_east: &[10.0],
            north_west: &[20.0],
            north_east: &[30.0],
        };
        let out = bilinear(LatLon(43.0, 19.0), &cell, &corners).unwrap();
        // Cell midpoint: all four corners weigh equally.
        assert_eq!(out, vec![15.0]);
    }

    #[test]
    fn interpolates_whole_series_elementwise() {
        let cell = cell(42.75, 43.25, 18.75, 19.25);
        let corners = CornerSeries {
            south_west: &[0.0, 1.0],
            south_east: &[10.0, 1.0],
            north_west: &[20.0, 1.0],
            north_east: &[30.0, 1.0],
        };
        let out = bilinear(LatLon(43.0, 19.0), &cell, &corners).unwrap();
        assert_eq!(out, vec![15.0, 1.0]);
    }

    #[test]
    fn nan_corner_propagates_to_that_step() {
        let cell = cell(42.75, 43.25, 18.75, 19.25);
        let corners = CornerSeries {
            south_west: &[0.0, 0.0],
            south_east: &[10.0, 10.0],
            north_west: &[f64::NAN, 20.0],
            north_east: &[30.0, 30.0],
        };
        let out = bilinear(LatLon(43.0, 19.0), &cell, &corners).unwrap();
        assert!(out[0].is_nan());
        assert_eq!(out[1], 15.0);
    }

    #[test]
    fn inverted_bounds_still_compute() {
        // Same cell as the midpoint test with both axis pairs swapped; the
        // algebra is sign-symmetric so the result is unchanged.
        let cell = cell(43.25, 42.75, 19.25, 18.75);
        let corners = CornerSeries {
            south_west: &[30.0],
            south_east: &[20.0],
            north_west: &[10.0],
            north_east: &[0.0],
        };
        let out = bilinear(LatLon(43.0, 19.0), &cell, &corners).unwrap();
        assert_eq!(out, vec![15.0]);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let cell = cell(42.75, 43.25, 18.75, 19.25);
        let corners = CornerSeries {
            south_west: &[0.0, 1.0],
            south_east: &[10.0],
            north_west: &[20.0, 1.0],
            north_east: &[30.0, 1.0],
        };
        let err = bilinear(LatLon(43.0, 19.0), &cell, &corners).unwrap_err();
        assert_eq!(
            err,
            InterpolateError::LengthMismatch {
                expected: 2,
                found: 1
            }
        );
    }
}
