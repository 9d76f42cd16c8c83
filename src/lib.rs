//! Station weather forecasts and river discharge tables for fixed sets of
//! geographic stations.
//!
//! The crate fetches hourly forecasts from the Open-Meteo GFS grid,
//! interpolates them onto exact station coordinates ([`closest_grid_lines`],
//! [`inverse_distance_weighting`], [`bilinear`]), fetches river-discharge
//! products from GEOGLOWS, reshapes everything into tabular form, and writes
//! timestamped CSV files. [`Hydromet`] is the entry point; the interpolation
//! routines are usable on their own.

mod config;
mod discharge;
mod error;
mod hydromet;
mod interpolate;
mod reshape;
mod sink;
mod types;
mod weather;

pub use error::HydrometError;
pub use hydromet::Hydromet;

pub use config::{presets, DischargeConfig, ForecastConfig, InterpolationMethod};

pub use interpolate::bilinear::{bilinear, CornerSeries};
pub use interpolate::grid::{
    closest_grid_lines, closest_quarters, AxisBounds, GridCell, GRID_RESOLUTION,
};
pub use interpolate::idw::{inverse_distance_weighting, SamplePoint};
pub use interpolate::{round2, InterpolateError};

pub use types::forecast::{StationForecast, DATE_TIME_COL, STATION_COL};
pub use types::station::{LatLon, River, RiverId, Station};
pub use types::variable::HourlyVariable;

pub use weather::error::WeatherSourceError;
pub use weather::open_meteo::{GridPointSeries, OpenMeteoClient, DEFAULT_WEATHER_URL};

pub use discharge::error::DischargeError;
pub use discharge::geoglows::{DischargeProduct, GeoglowsClient, DEFAULT_DISCHARGE_URL};

pub use reshape::{reshape_discharge, TableShape};
pub use sink::{dated_file_name, CsvSink, SinkError};
