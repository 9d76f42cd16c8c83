use crate::types::station::LatLon;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherSourceError {
    #[error("Network request failed for {0}")]
    Network(String, #[source] reqwest_middleware::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode forecast response from {0}")]
    Decode(String, #[source] reqwest::Error),

    #[error("Requested {requested} grid points but the response contains {received}")]
    PointCountMismatch { requested: usize, received: usize },

    #[error("Variable '{variable}' missing from the response for {location}")]
    MissingVariable {
        variable: &'static str,
        location: LatLon,
    },

    #[error("Series '{variable}' has {found} values but the time axis has {expected}")]
    SeriesLengthMismatch {
        variable: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Invalid epoch timestamp {0} in forecast response")]
    InvalidTimestamp(i64),
}
