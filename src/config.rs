//! Run configuration for the forecast and discharge pipelines.
//!
//! Everything the pipelines used to pull from module-level globals lives in
//! these explicit, serializable structs: the station and river tables, the
//! request window, the interpolation method, and where output files go.

use crate::discharge::geoglows::DischargeProduct;
use crate::types::station::{River, Station};
use crate::types::variable::HourlyVariable;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How corner samples are combined onto the station coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    /// Inverse-distance weighting over the grid points the API actually
    /// served, with the given decay exponent.
    Idw { power: f64 },
    /// Area-weighted bilinear interpolation over the snapped lattice cell.
    Bilinear,
}

impl Default for InterpolationMethod {
    fn default() -> Self {
        InterpolationMethod::Idw { power: 2.0 }
    }
}

/// One weather-forecast run: which stations, which variables, how far back
/// and ahead, and where the CSV goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub stations: Vec<Station>,
    pub variables: Vec<HourlyVariable>,
    /// Days of past weather to include. The API accepts 0-92.
    pub past_days: u8,
    /// Days of forecast to include. The API accepts 1-16.
    pub forecast_days: u8,
    pub method: InterpolationMethod,
    pub output_dir: PathBuf,
    /// Output files are named `{file_prefix}_{YYYY-MM-DD}.csv`.
    pub file_prefix: String,
}

impl ForecastConfig {
    /// A config with the deployment defaults for the given stations:
    /// temperature and precipitation, 2 days back, 7 days ahead, IDW with
    /// power 2, output in the working directory under the `gfs` prefix.
    pub fn new(stations: Vec<Station>) -> Self {
        Self {
            stations,
            ..Self::default()
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            stations: Vec::new(),
            variables: vec![HourlyVariable::Temperature2m, HourlyVariable::Precipitation],
            past_days: 2,
            forecast_days: 7,
            method: InterpolationMethod::default(),
            output_dir: PathBuf::from("."),
            file_prefix: "gfs".to_string(),
        }
    }
}

/// One river-discharge run: which rivers, which products, where the CSVs go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DischargeConfig {
    pub rivers: Vec<River>,
    pub products: Vec<DischargeProduct>,
    pub output_dir: PathBuf,
}

impl DischargeConfig {
    /// A config fetching all four products for the given rivers into the
    /// working directory.
    pub fn new(rivers: Vec<River>) -> Self {
        Self {
            rivers,
            products: DischargeProduct::ALL.to_vec(),
            output_dir: PathBuf::from("."),
        }
    }
}

/// The Drina-basin deployment tables this crate was built for.
pub mod presets {
    use super::*;
    use crate::types::station::LatLon;

    /// The 24 meteorological stations of the Drina basin deployment.
    pub fn drina_basin_stations() -> Vec<Station> {
        [
            ("Pljevlja", 43.35, 19.36),
            ("Kolašin", 42.83, 19.52),
            ("Zlatibor", 43.74, 19.71),
            ("Sjenica", 43.27, 19.99),
            ("Višegrad", 43.80, 19.30),
            ("Foča", 43.52, 18.79),
            ("Plužine", 43.16, 18.85),
            ("Žabljak", 43.16, 19.12),
            ("Berane", 42.85, 19.88),
            ("Bijelo Polje", 43.04, 19.74),
            ("Plav", 42.60, 19.94),
            ("Rožaje", 42.84, 20.17),
            ("Mojkovac", 42.96, 19.58),
            ("Šavnik", 42.96, 19.10),
            ("Andrijevica", 42.73, 19.79),
            ("Loznica", 44.54, 19.23),
            ("Bijeljina", 44.76, 19.20),
            ("Čemerno", 43.26, 18.61),
            ("Han Pijesak", 44.09, 18.95),
            ("Kalinovik", 43.51, 18.45),
            ("Zvornik", 44.44, 19.15),
            ("Rudo", 43.62, 19.37),
            ("Sokolac", 43.93, 18.79),
            ("Goražde", 43.95, 19.57),
        ]
        .into_iter()
        .map(|(name, lat, lon)| Station::new(name, LatLon(lat, lon)))
        .collect()
    }

    /// The 9 gauged river reaches of the deployment, LINKNO ids paired with
    /// their hydro station names.
    pub fn drina_basin_rivers() -> Vec<River> {
        [
            (220252711, "Uvac"),
            (220249952, "Kokin Brod"),
            (220212799, "Bistrica"),
            (220227955, "Piva"),
            (220232074, "HS Prijepolje"),
            (220267840, "Potpeć"),
            (220302223, "Višegrad"),
            (220284319, "Bajina Bašta"),
            (220348963, "Zvornik"),
        ]
        .into_iter()
        .map(|(id, station)| River::new(id, station))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_defaults_match_the_deployment() {
        let config = ForecastConfig::new(presets::drina_basin_stations());
        assert_eq!(config.stations.len(), 24);
        assert_eq!(
            config.variables,
            [HourlyVariable::Temperature2m, HourlyVariable::Precipitation]
        );
        assert_eq!(config.past_days, 2);
        assert_eq!(config.forecast_days, 7);
        assert_eq!(config.method, InterpolationMethod::Idw { power: 2.0 });
        assert_eq!(config.file_prefix, "gfs");
    }

    #[test]
    fn discharge_defaults_cover_all_products() {
        let config = DischargeConfig::new(presets::drina_basin_rivers());
        assert_eq!(config.rivers.len(), 9);
        assert_eq!(config.products, DischargeProduct::ALL);
    }

    #[test]
    fn configs_round_trip_through_json() {
        let config = ForecastConfig::new(presets::drina_basin_stations());
        let json = serde_json::to_string(&config).unwrap();
        let back: ForecastConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        let config = DischargeConfig::new(presets::drina_basin_rivers());
        let json = serde_json::to_string(&config).unwrap();
        let back: DischargeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn method_serializes_with_its_knobs() {
        let json = serde_json::to_string(&InterpolationMethod::Idw { power: 2.0 }).unwrap();
        assert_eq!(json, r#"{"idw":{"power":2.0}}"#);
        assert_eq!(
            serde_json::to_string(&InterpolationMethod::Bilinear).unwrap(),
            r#""bilinear""#
        );
    }
}
