//! Client for the Open-Meteo GFS forecast grid.
//!
//! One request fans out over any number of grid points (the pipelines ask
//! for the four corners of a station's lattice cell) and comes back as one
//! aligned hourly series per point and variable.

use crate::types::station::LatLon;
use crate::types::variable::HourlyVariable;
use crate::weather::error::WeatherSourceError;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use serde::Deserialize;
use std::collections::HashMap;

/// Public Open-Meteo endpoint; override it for tests or a self-hosted API.
pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com";

const MAX_RETRIES: u32 = 5;

/// The hourly series fetched for one grid point.
///
/// `location` is the coordinate the API reports for the point, which is the
/// one interpolation should trust — the served grid may be aligned slightly
/// differently from the requested lattice. All series share `time`.
#[derive(Debug, Clone)]
pub struct GridPointSeries {
    pub location: LatLon,
    pub time: Vec<DateTime<Utc>>,
    pub values: Vec<(HourlyVariable, Vec<f64>)>,
}

impl GridPointSeries {
    /// The values fetched for `variable`, if it was part of the request.
    pub fn series(&self, variable: HourlyVariable) -> Option<&[f64]> {
        self.values
            .iter()
            .find(|(v, _)| *v == variable)
            .map(|(_, series)| series.as_slice())
    }
}

/// HTTP client for the Open-Meteo forecast API, with transient-error
/// retries built into the session.
pub struct OpenMeteoClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_WEATHER_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(MAX_RETRIES);
        let client = ClientBuilder::new(reqwest::Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetches the hourly series for the given variables at every point, in
    /// one GET, covering `past_days` back and `forecast_days` ahead.
    ///
    /// The returned vector holds one entry per requested point, in request
    /// order; every entry carries every requested variable at the length of
    /// its time axis, with API nulls mapped to NaN. Anything else is an
    /// error.
    pub async fn hourly_grid(
        &self,
        points: &[LatLon],
        variables: &[HourlyVariable],
        past_days: u8,
        forecast_days: u8,
    ) -> Result<Vec<GridPointSeries>, WeatherSourceError> {
        let url = format!("{}/v1/gfs", self.base_url);
        let latitudes = join_values(points.iter().map(|p| p.0));
        let longitudes = join_values(points.iter().map(|p| p.1));
        let hourly = variables
            .iter()
            .map(|v| v.api_name())
            .collect::<Vec<_>>()
            .join(",");

        debug!(
            "Requesting {} hourly series for {} grid points from {}",
            variables.len(),
            points.len(),
            url
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", latitudes.as_str()),
                ("longitude", longitudes.as_str()),
                ("hourly", hourly.as_str()),
                ("past_days", past_days.to_string().as_str()),
                ("forecast_days", forecast_days.to_string().as_str()),
                ("timeformat", "unixtime"),
            ])
            .send()
            .await
            .map_err(|e| WeatherSourceError::Network(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    WeatherSourceError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    WeatherSourceError::Network(url, e.into())
                });
            }
        };

        let body: OneOrMany = response
            .json()
            .await
            .map_err(|e| WeatherSourceError::Decode(url, e))?;
        let raw = body.into_vec();

        if raw.len() != points.len() {
            return Err(WeatherSourceError::PointCountMismatch {
                requested: points.len(),
                received: raw.len(),
            });
        }

        raw.into_iter()
            .map(|point| point.into_series(variables))
            .collect()
    }
}

fn join_values(values: impl Iterator<Item = f64>) -> String {
    values
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// One point's slice of the API response. Unknown fields (units, elevation,
/// generation time) are ignored.
#[derive(Debug, Deserialize)]
struct PointResponse {
    latitude: f64,
    longitude: f64,
    hourly: HourlyBlock,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    /// Epoch seconds, thanks to `timeformat=unixtime`.
    time: Vec<i64>,
    #[serde(flatten)]
    series: HashMap<String, Vec<Option<f64>>>,
}

impl PointResponse {
    fn into_series(
        self,
        variables: &[HourlyVariable],
    ) -> Result<GridPointSeries, WeatherSourceError> {
        let location = LatLon(self.latitude, self.longitude);
        let time = self
            .hourly
            .time
            .iter()
            .map(|&seconds| {
                DateTime::from_timestamp(seconds, 0)
                    .ok_or(WeatherSourceError::InvalidTimestamp(seconds))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut series = self.hourly.series;
        let mut values = Vec::with_capacity(variables.len());
        for &variable in variables {
            let raw = series.remove(variable.api_name()).ok_or(
                WeatherSourceError::MissingVariable {
                    variable: variable.api_name(),
                    location,
                },
            )?;
            if raw.len() != time.len() {
                return Err(WeatherSourceError::SeriesLengthMismatch {
                    variable: variable.api_name(),
                    expected: time.len(),
                    found: raw.len(),
                });
            }
            let cleaned: Vec<f64> = raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
            values.push((variable, cleaned));
        }
        Ok(GridPointSeries {
            location,
            time,
            values,
        })
    }
}

/// The API answers with a bare object for a single requested point and with
/// an array for several.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<PointResponse>),
    One(Box<PointResponse>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<PointResponse> {
        match self {
            OneOrMany::Many(points) => points,
            OneOrMany::One(point) => vec![*point],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_POINTS: &str = r#"[
        {
            "latitude": 43.25, "longitude": 19.25, "elevation": 1450.0,
            "generationtime_ms": 0.3, "utc_offset_seconds": 0,
            "hourly_units": { "time": "unixtime", "temperature_2m": "°C" },
            "hourly": {
                "time": [1715126400, 1715130000],
                "temperature_2m": [10.4, null],
                "precipitation": [0.0, 1.2]
            }
        },
        {
            "latitude": 43.25, "longitude": 19.5, "elevation": 1301.0,
            "generationtime_ms": 0.2, "utc_offset_seconds": 0,
            "hourly_units": { "time": "unixtime", "temperature_2m": "°C" },
            "hourly": {
                "time": [1715126400, 1715130000],
                "temperature_2m": [11.0, 11.5],
                "precipitation": [0.2, 0.0]
            }
        }
    ]"#;

    fn requested() -> Vec<HourlyVariable> {
        vec![HourlyVariable::Temperature2m, HourlyVariable::Precipitation]
    }

    #[test]
    fn parses_point_array_with_nulls_as_nan() {
        let body: OneOrMany = serde_json::from_str(TWO_POINTS).unwrap();
        let points = body.into_vec();
        assert_eq!(points.len(), 2);

        let first = points.into_iter().next().unwrap();
        let series = first.into_series(&requested()).unwrap();
        assert_eq!(series.location, LatLon(43.25, 19.25));
        assert_eq!(series.time.len(), 2);
        assert_eq!(series.time[0].timestamp(), 1715126400);

        let temperature = series.series(HourlyVariable::Temperature2m).unwrap();
        assert_eq!(temperature[0], 10.4);
        assert!(temperature[1].is_nan());
        assert_eq!(
            series.series(HourlyVariable::Precipitation).unwrap(),
            &[0.0, 1.2]
        );
    }

    #[test]
    fn parses_single_point_object() {
        let single = r#"{
            "latitude": 44.0, "longitude": 19.0,
            "hourly": { "time": [1715126400], "temperature_2m": [9.9], "precipitation": [0.0] }
        }"#;
        let body: OneOrMany = serde_json::from_str(single).unwrap();
        assert_eq!(body.into_vec().len(), 1);
    }

    #[test]
    fn missing_variable_is_an_error() {
        let body = r#"{
            "latitude": 44.0, "longitude": 19.0,
            "hourly": { "time": [1715126400], "temperature_2m": [9.9] }
        }"#;
        let point: OneOrMany = serde_json::from_str(body).unwrap();
        let err = point
            .into_vec()
            .remove(0)
            .into_series(&requested())
            .unwrap_err();
        assert!(matches!(
            err,
            WeatherSourceError::MissingVariable {
                variable: "precipitation",
                ..
            }
        ));
    }

    #[test]
    fn misaligned_series_is_an_error() {
        let body = r#"{
            "latitude": 44.0, "longitude": 19.0,
            "hourly": {
                "time": [1715126400, 1715130000],
                "temperature_2m": [9.9],
                "precipitation": [0.0, 0.0]
            }
        }"#;
        let point: OneOrMany = serde_json::from_str(body).unwrap();
        let err = point
            .into_vec()
            .remove(0)
            .into_series(&requested())
            .unwrap_err();
        assert!(matches!(
            err,
            WeatherSourceError::SeriesLengthMismatch {
                variable: "temperature_2m",
                expected: 2,
                found: 1,
            }
        ));
    }

    #[test]
    fn joins_coordinates_for_the_query_string() {
        assert_eq!(
            join_values([43.25, 43.5, -7.0].into_iter()),
            "43.25,43.5,-7"
        );
    }
}
