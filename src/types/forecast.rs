//! Contains the `StationForecast` structure holding one station's
//! interpolated hourly output and its conversion to tabular form.

use crate::types::station::Station;
use crate::types::variable::HourlyVariable;
use chrono::{DateTime, Utc};
use polars::prelude::*;

/// Canonical station column name of published tables.
pub const STATION_COL: &str = "meteo-station";
/// Canonical time column name of published tables.
pub const DATE_TIME_COL: &str = "date-time";

/// One station's interpolated hourly forecast.
///
/// `values` holds one rounded series per requested variable, each aligned
/// with `time`. `f64::NAN` entries mark hours with no valid data.
#[derive(Debug, Clone)]
pub struct StationForecast {
    pub station: Station,
    pub time: Vec<DateTime<Utc>>,
    pub values: Vec<(HourlyVariable, Vec<f64>)>,
}

impl StationForecast {
    /// Builds the tabular form: `meteo-station`, `date-time`, then one column
    /// per variable in request order. NaN entries become nulls so they
    /// serialize as empty CSV cells.
    pub fn into_frame(self) -> Result<DataFrame, PolarsError> {
        let height = self.time.len();

        let stations = Column::new(STATION_COL.into(), vec![self.station.name; height]);

        let stamps: Vec<i64> = self.time.iter().map(|t| t.timestamp_millis()).collect();
        let times = Series::new(DATE_TIME_COL.into(), stamps)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .into_column();

        let mut columns = vec![stations, times];
        for (variable, series) in self.values {
            let cells: Vec<Option<f64>> = series
                .into_iter()
                .map(|v| if v.is_nan() { None } else { Some(v) })
                .collect();
            columns.push(Column::new(variable.column_name().into(), cells));
        }

        DataFrame::new(columns)
    }
}
