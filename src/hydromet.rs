//! The main entry point: one client owning both data-source collaborators
//! and the station-forecast orchestration between them.

use crate::config::{DischargeConfig, ForecastConfig, InterpolationMethod};
use crate::discharge::geoglows::{DischargeProduct, GeoglowsClient};
use crate::error::HydrometError;
use crate::interpolate::bilinear::{bilinear, CornerSeries};
use crate::interpolate::grid::{GridCell, GRID_RESOLUTION};
use crate::interpolate::idw::{inverse_distance_weighting, SamplePoint};
use crate::interpolate::round2;
use crate::reshape::reshape_discharge;
use crate::sink::{dated_file_name, CsvSink};
use crate::types::forecast::StationForecast;
use crate::types::station::{LatLon, River, RiverId, Station};
use crate::types::variable::HourlyVariable;
use crate::weather::error::WeatherSourceError;
use crate::weather::open_meteo::{GridPointSeries, OpenMeteoClient};
use bon::bon;
use chrono::Utc;
use log::{debug, info};
use polars::prelude::DataFrame;
use std::collections::HashMap;
use std::path::PathBuf;

/// The client struct for fetching station weather forecasts and river
/// discharge tables.
///
/// It owns one HTTP client per data source and runs the per-station
/// pipeline: snap the station onto its lattice cell, fetch the four corner
/// series in one call, interpolate onto the true coordinates, and assemble
/// the published table.
///
/// # Examples
///
/// ```rust
/// # use hydromet::{Hydromet, HydrometError, Station, LatLon};
/// # async fn run() -> Result<(), HydrometError> {
/// let client = Hydromet::new();
/// let pljevlja = Station::new("Pljevlja", LatLon(43.35, 19.36));
/// let forecast = client.station_forecast().station(&pljevlja).call().await?;
/// # Ok(())
/// # }
/// ```
pub struct Hydromet {
    weather: OpenMeteoClient,
    discharge: GeoglowsClient,
}

impl Default for Hydromet {
    fn default() -> Self {
        Self::new()
    }
}

#[bon]
impl Hydromet {
    /// A client against the public Open-Meteo and GEOGLOWS endpoints.
    pub fn new() -> Self {
        Self {
            weather: OpenMeteoClient::new(),
            discharge: GeoglowsClient::new(),
        }
    }

    /// A client against custom endpoints, for tests or self-hosted mirrors.
    pub fn with_base_urls(
        weather_url: impl Into<String>,
        discharge_url: impl Into<String>,
    ) -> Self {
        Self {
            weather: OpenMeteoClient::with_base_url(weather_url),
            discharge: GeoglowsClient::with_base_url(discharge_url),
        }
    }

    /// Fetches and interpolates the hourly forecast for one station.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.station(&Station)`: **Required.** The station whose coordinates
    ///   the forecast is interpolated onto.
    /// * `.variables(Vec<HourlyVariable>)`: Optional. Defaults to
    ///   temperature and precipitation.
    /// * `.past_days(u8)`: Optional. Defaults to `2`.
    /// * `.forecast_days(u8)`: Optional. Defaults to `7`.
    /// * `.method(InterpolationMethod)`: Optional. Defaults to IDW with
    ///   power 2 over the grid points the API actually served.
    ///
    /// # Errors
    ///
    /// Returns [`HydrometError::Weather`] for request, decode, and response
    /// shape problems, and [`HydrometError::Interpolate`] when the fetched
    /// series disagree in length.
    #[builder]
    pub async fn station_forecast(
        &self,
        station: &Station,
        variables: Option<Vec<HourlyVariable>>,
        past_days: Option<u8>,
        forecast_days: Option<u8>,
        method: Option<InterpolationMethod>,
    ) -> Result<StationForecast, HydrometError> {
        let variables = variables.unwrap_or_else(|| {
            vec![HourlyVariable::Temperature2m, HourlyVariable::Precipitation]
        });
        let past_days = past_days.unwrap_or(2);
        let forecast_days = forecast_days.unwrap_or(7);
        let method = method.unwrap_or_default();

        let cell = GridCell::enclosing(station.location, GRID_RESOLUTION);
        info!("Meteo station {}", station.name);
        info!("True coordinates {}", station.location);

        let points = self
            .weather
            .hourly_grid(&cell.corners(), &variables, past_days, forecast_days)
            .await?;
        debug!(
            "Coordinates of closest 4 points: {}",
            points
                .iter()
                .map(|p| p.location.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let time = points
            .first()
            .map(|point| point.time.clone())
            .unwrap_or_default();

        let mut values = Vec::with_capacity(variables.len());
        for &variable in &variables {
            let series =
                interpolate_variable(station.location, &cell, &points, variable, method)?;
            values.push((variable, series));
        }

        Ok(StationForecast {
            station: station.clone(),
            time,
            values,
        })
    }

    /// Fetches and interpolates every station of `config` and stacks the
    /// results into one table, stations in config order.
    pub async fn forecast_table(
        &self,
        config: &ForecastConfig,
    ) -> Result<DataFrame, HydrometError> {
        let mut out: Option<DataFrame> = None;
        for station in &config.stations {
            let forecast = self
                .station_forecast()
                .station(station)
                .variables(config.variables.clone())
                .past_days(config.past_days)
                .forecast_days(config.forecast_days)
                .method(config.method)
                .call()
                .await?;
            let frame = forecast.into_frame()?;
            out = Some(match out {
                None => frame,
                Some(mut acc) => {
                    acc.vstack_mut(&frame)?;
                    acc
                }
            });
        }
        out.ok_or(HydrometError::NoStations)
    }

    /// Runs the whole forecast pipeline and writes one dated CSV file.
    /// Returns the path of the written file.
    pub async fn forecast_to_csv(
        &self,
        config: &ForecastConfig,
    ) -> Result<PathBuf, HydrometError> {
        let table = self.forecast_table(config).await?;
        let sink = CsvSink::new(config.output_dir.clone());
        let file_name = dated_file_name(&config.file_prefix, Utc::now().date_naive());
        Ok(sink.write(table, &file_name).await?)
    }

    /// Fetches one discharge product for the given rivers and reshapes it
    /// into its published form.
    pub async fn discharge_table(
        &self,
        product: DischargeProduct,
        rivers: &[River],
    ) -> Result<DataFrame, HydrometError> {
        let ids: Vec<RiverId> = rivers.iter().map(|river| river.id).collect();
        let raw = self.discharge.product_table(product, &ids).await?;
        let names: HashMap<RiverId, String> = rivers
            .iter()
            .map(|river| (river.id, river.station.clone()))
            .collect();
        Ok(reshape_discharge(raw, product.shape(), &names)?)
    }

    /// Fetches every product of `config` and writes one CSV file per
    /// product. Returns the written paths in product order.
    pub async fn discharge_to_csv(
        &self,
        config: &DischargeConfig,
    ) -> Result<Vec<PathBuf>, HydrometError> {
        let sink = CsvSink::new(config.output_dir.clone());
        let run_date = Utc::now().date_naive();
        let mut paths = Vec::with_capacity(config.products.len());
        for &product in &config.products {
            let table = self.discharge_table(product, &config.rivers).await?;
            paths.push(sink.write(table, &product.file_name(run_date)).await?);
        }
        Ok(paths)
    }
}

/// Interpolates one variable's corner series onto the station coordinate.
///
/// IDW trusts the coordinates the API reported for each point, since the
/// served grid may be aligned slightly differently from the requested
/// lattice; bilinear works over the snapped cell geometry and relies on the
/// fixed SW, SE, NE, NW request order.
fn interpolate_variable(
    query: LatLon,
    cell: &GridCell,
    points: &[GridPointSeries],
    variable: HourlyVariable,
    method: InterpolationMethod,
) -> Result<Vec<f64>, HydrometError> {
    match method {
        InterpolationMethod::Idw { power } => {
            let samples = points
                .iter()
                .map(|point| {
                    Ok(SamplePoint {
                        location: point.location,
                        values: variable_series(point, variable)?,
                    })
                })
                .collect::<Result<Vec<_>, HydrometError>>()?;
            let series = inverse_distance_weighting(query, &samples, power)?;
            Ok(series.into_iter().map(round2).collect())
        }
        InterpolationMethod::Bilinear => {
            if points.len() != 4 {
                return Err(WeatherSourceError::PointCountMismatch {
                    requested: 4,
                    received: points.len(),
                }
                .into());
            }
            let corners = CornerSeries {
                south_west: variable_series(&points[0], variable)?,
                south_east: variable_series(&points[1], variable)?,
                north_east: variable_series(&points[2], variable)?,
                north_west: variable_series(&points[3], variable)?,
            };
            Ok(bilinear(query, cell, &corners)?)
        }
    }
}

fn variable_series(
    point: &GridPointSeries,
    variable: HourlyVariable,
) -> Result<&[f64], HydrometError> {
    point.series(variable).ok_or_else(|| {
        WeatherSourceError::MissingVariable {
            variable: variable.api_name(),
            location: point.location,
        }
        .into()
    })
}
