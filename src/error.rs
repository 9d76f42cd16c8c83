use crate::discharge::error::DischargeError;
use crate::interpolate::InterpolateError;
use crate::sink::SinkError;
use crate::weather::error::WeatherSourceError;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HydrometError {
    #[error("No stations configured")]
    NoStations,

    #[error(transparent)]
    Weather(#[from] WeatherSourceError),

    #[error(transparent)]
    Discharge(#[from] DischargeError),

    #[error(transparent)]
    Interpolate(#[from] InterpolateError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("Failed assembling output table")]
    Polars(#[from] PolarsError),
}
