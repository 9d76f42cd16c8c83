//! Spatial interpolation of gridded scalar fields onto exact coordinates.
//!
//! Three routines cooperate here: [`grid`] snaps an arbitrary coordinate onto
//! the bracketing lines of a fixed-resolution lattice, [`idw`] estimates a
//! value series at a query point from any number of known sample points, and
//! [`bilinear`] does the same from exactly the four corners of a lattice
//! cell. All of them operate on whole time series at once and propagate
//! `f64::NAN` as the no-data marker instead of failing.

pub mod bilinear;
pub mod grid;
pub mod idw;

use thiserror::Error;

/// Structural precondition violations of the interpolation routines.
///
/// Degenerate geometry (coincident points, zero distances) is never an
/// error; those cases have defined results. These variants fire only when
/// the caller handed over inputs of the wrong shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterpolateError {
    #[error("At least one sample point is required")]
    NoSamplePoints,

    #[error("Value series lengths differ: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },
}

/// Rounds to two decimal places, halves away from zero.
///
/// This is the rounding every published value in this crate goes through:
/// [`bilinear`](bilinear::bilinear) applies it internally, callers of
/// [`idw`](idw::inverse_distance_weighting) apply it before persisting.
/// NaN passes through unchanged and the function is idempotent.
///
/// # Examples
///
/// ```
/// use hydromet::round2;
///
/// assert_eq!(round2(19.367), 19.37);
/// assert_eq!(round2(round2(19.367)), 19.37);
/// assert!(round2(f64::NAN).is_nan());
/// ```
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(15.004), 15.0);
        assert_eq!(round2(-2.718), -2.72);
    }

    #[test]
    fn rounds_halves_away_from_zero() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
    }

    #[test]
    fn rounding_is_idempotent() {
        for &v in &[7.25, -0.13, 19.367, 120.0] {
            assert_eq!(round2(round2(v)), round2(v));
        }
    }

    #[test]
    fn nan_passes_through() {
        assert!(round2(f64::NAN).is_nan());
    }
}
