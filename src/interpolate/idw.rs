//! Inverse-distance weighting over aligned value series.

use crate::interpolate::InterpolateError;
use crate::types::station::LatLon;

/// One known sample: a coordinate and the value series observed there.
///
/// All sample points of a single interpolation call must share the same
/// externally-defined time axis; the routines only validate that the series
/// lengths agree elementwise. `f64::NAN` entries mark missing measurements.
#[derive(Debug, Clone, Copy)]
pub struct SamplePoint<'a> {
    pub location: LatLon,
    pub values: &'a [f64],
}

/// Estimates a value series at `query` from the given sample points.
///
/// Weights decay with the inverse `power` of the Euclidean distance in
/// coordinate-degree space. The whole series is interpolated in one pass:
/// at each time step only the samples with a finite value at that step
/// contribute, so a point that is good at some hours and missing at others
/// contributes partially. Steps where no sample has data come out as NaN.
///
/// If a sample point coincides exactly with the query point, its series is
/// returned unchanged (NaNs preserved), ignoring every other sample —
/// geometry does not vary with time, so this short-circuit is global per
/// call. Negative or zero `power` is accepted unvalidated.
///
/// # Errors
///
/// [`InterpolateError::NoSamplePoints`] when `samples` is empty,
/// [`InterpolateError::LengthMismatch`] when the series lengths differ.
///
/// # Examples
///
/// ```
/// use hydromet::{inverse_distance_weighting, LatLon, SamplePoint};
///
/// let samples = [
///     SamplePoint { location: LatLon(1.0, 0.0), values: &[10.0] },
///     SamplePoint { location: LatLon(-1.0, 0.0), values: &[20.0] },
/// ];
/// let series = inverse_distance_weighting(LatLon(0.0, 0.0), &samples, 2.0).unwrap();
/// assert_eq!(series, vec![15.0]);
/// ```
pub fn inverse_distance_weighting(
    query: LatLon,
    samples: &[SamplePoint],
    power: f64,
) -> Result<Vec<f64>, InterpolateError> {
    let first = samples.first().ok_or(InterpolateError::NoSamplePoints)?;
    let len = first.values.len();
    for sample in samples {
        if sample.values.len() != len {
            return Err(InterpolateError::LengthMismatch {
                expected: len,
                found: sample.values.len(),
            });
        }
    }

    let distances: Vec<f64> = samples
        .iter()
        .map(|sample| distance(query, sample.location))
        .collect();

    // The query sits on a sample point: that sample wins outright, however
    // close or well-covered the others are.
    for (sample, &d) in samples.iter().zip(&distances) {
        if d == 0.0 {
            return Ok(sample.values.to_vec());
        }
    }

    let weights: Vec<f64> = distances.iter().map(|d| 1.0 / d.powf(power)).collect();

    let mut out = Vec::with_capacity(len);
    for step in 0..len {
        let mut weighted_sum = 0.0;
        let mut weight_sum = 0.0;
        for (sample, &weight) in samples.iter().zip(&weights) {
            let value = sample.values[step];
            if value.is_nan() {
                continue;
            }
            weighted_sum += weight * value;
            weight_sum += weight;
        }
        out.push(if weight_sum > 0.0 {
            weighted_sum / weight_sum
        } else {
            f64::NAN
        });
    }
    Ok(out)
}

/// Euclidean distance in coordinate-degree space, per contract not geodesic.
fn distance(a: LatLon, b: LatLon) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}
