//! Client for the GEOGLOWS river-discharge API.
//!
//! All four data products go through one parameterized fetch: the REST
//! service is queried per river for CSV, and the per-river tables are
//! assembled into one [`DataFrame`] whose shape depends on the product —
//! forecast products stack rivers as rows, historical products join them
//! as columns.

use crate::discharge::error::DischargeError;
use crate::reshape::TableShape;
use crate::sink::dated_file_name;
use crate::types::station::RiverId;
use chrono::NaiveDate;
use log::{debug, info, warn};
use polars::prelude::*;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use tempfile::NamedTempFile;
use tokio::task;

/// Public GEOGLOWS endpoint; override it for tests or a mirror.
pub const DEFAULT_DISCHARGE_URL: &str = "https://geoglows.ecmwf.int";

/// Time column of raw product tables, before reshaping renames it.
pub const TIME_COL: &str = "time";
/// River identifier column of row-keyed product tables.
pub const RIVER_ID_COL: &str = "river_id";

const MAX_RETRIES: u32 = 5;

/// The GEOGLOWS data products this crate fetches.
///
/// Each product knows its API path segment, the file name its table is
/// published under, and which [`TableShape`] the assembled table has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DischargeProduct {
    /// Median forecast with uncertainty bounds, one row set per river.
    Forecast,
    /// All ensemble members of the current forecast.
    ForecastEnsembles,
    /// The full retrospective simulation, one column per river.
    Retrospective,
    /// Day-of-year averages over the retrospective period.
    DailyAverages,
}

impl DischargeProduct {
    /// Every product, in the order the original deployment fetched them.
    pub const ALL: [DischargeProduct; 4] = [
        DischargeProduct::Forecast,
        DischargeProduct::ForecastEnsembles,
        DischargeProduct::Retrospective,
        DischargeProduct::DailyAverages,
    ];

    pub(crate) fn path_segment(&self) -> &'static str {
        match self {
            DischargeProduct::Forecast => "forecast",
            DischargeProduct::ForecastEnsembles => "forecastensembles",
            DischargeProduct::Retrospective => "retrospective",
            DischargeProduct::DailyAverages => "dailyaverages",
        }
    }

    pub(crate) fn file_prefix(&self) -> &'static str {
        match self {
            DischargeProduct::Forecast => "forecast",
            DischargeProduct::ForecastEnsembles => "forecast_ensembles",
            DischargeProduct::Retrospective => "retrospective",
            DischargeProduct::DailyAverages => "daily_averages",
        }
    }

    /// How the assembled table is keyed, which decides how
    /// [`reshape_discharge`](crate::reshape_discharge) relabels it.
    pub fn shape(&self) -> TableShape {
        match self {
            DischargeProduct::Forecast | DischargeProduct::ForecastEnsembles => {
                TableShape::RowKeyed
            }
            DischargeProduct::Retrospective | DischargeProduct::DailyAverages => {
                TableShape::ColumnKeyed
            }
        }
    }

    /// The CSV file name for a run on `date`. The retrospective table does
    /// not change between runs and keeps an undated name.
    pub fn file_name(&self, date: NaiveDate) -> String {
        match self {
            DischargeProduct::Retrospective => "retrospective.csv".to_string(),
            _ => dated_file_name(self.file_prefix(), date),
        }
    }
}

/// Allows formatting a `DischargeProduct` variant using its `path_segment`.
impl fmt::Display for DischargeProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

/// HTTP client for the GEOGLOWS REST API, with transient-error retries
/// built into the session.
pub struct GeoglowsClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl Default for GeoglowsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoglowsClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_DISCHARGE_URL)
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

    /// Fetches `product` for every river and assembles one table.
    ///
    /// Row-keyed products come back long: a `river_id` column, the `time`
    /// column, then the product's value columns, rivers stacked in request
    /// order. Column-keyed products come back wide: a `time` column plus one
    /// value column per river, named by its id, outer-joined over time and
    /// sorted by it.
    pub async fn product_table(
        &self,
        product: DischargeProduct,
        rivers: &[RiverId],
    ) -> Result<DataFrame, DischargeError> {
        if rivers.is_empty() {
            return Err(DischargeError::NoRivers);
        }
        info!(
            "Launching geoglows {} fetch for {} rivers",
            product,
            rivers.len()
        );

        let mut tables = Vec::with_capacity(rivers.len());
        for &river in rivers {
            let table = self.river_table(product, river).await?;
            tables.push((river, table));
        }

        match product.shape() {
            TableShape::RowKeyed => stack_row_keyed(tables),
            TableShape::ColumnKeyed => join_column_keyed(tables),
        }
    }

    async fn river_table(
        &self,
        product: DischargeProduct,
        river: RiverId,
    ) -> Result<DataFrame, DischargeError> {
        let url = format!(
            "{}/api/v2/{}/{}",
            self.base_url,
            product.path_segment(),
            river
        );
        debug!("Requesting {} data for river {} from {}", product, river, url);

        let response = self
            .client
            .get(&url)
            .query(&[("format", "csv")])
            .send()
            .await
            .map_err(|e| DischargeError::Network(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    DischargeError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    DischargeError::Network(url, e.into())
                });
            }
        };

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DischargeError::Download(url, e))?;

        let mut table = csv_to_dataframe(bytes.to_vec(), river).await?;
        normalize_time_column(&mut table, river)?;
        Ok(table)
    }
}

/// Parses raw CSV bytes into a DataFrame using a blocking task, letting
/// polars pick up the timestamp column as a datetime.
async fn csv_to_dataframe(bytes: Vec<u8>, river: RiverId) -> Result<DataFrame, DischargeError> {
    task::spawn_blocking(move || {
        let mut temp_file = NamedTempFile::new().map_err(|e| DischargeError::CsvReadIo {
            river,
            source: e,
        })?;
        temp_file
            .write_all(&bytes)
            .map_err(|e| DischargeError::CsvReadIo { river, source: e })?;
        temp_file
            .flush()
            .map_err(|e| DischargeError::CsvReadIo { river, source: e })?;

        CsvReadOptions::default()
            .with_has_header(true)
            .with_parse_options(CsvParseOptions::default().with_try_parse_dates(true))
            .try_into_reader_with_file_path(Some(temp_file.path().to_path_buf()))
            .map_err(|e| DischargeError::CsvReadPolars { river, source: e })?
            .finish()
            .map_err(|e| DischargeError::CsvReadPolars { river, source: e })
    })
    .await?
}

/// The REST service names its timestamp column differently per product;
/// normalize to [`TIME_COL`] so assembly and reshaping see one name.
fn normalize_time_column(table: &mut DataFrame, river: RiverId) -> Result<(), DischargeError> {
    let names = table.get_column_names_str();
    if names.iter().any(|&name| name == TIME_COL) {
        return Ok(());
    }
    let found = names
        .iter()
        .find(|&&name| name == "datetime" || name == "date")
        .map(|name| name.to_string());
    match found {
        Some(name) => {
            table.rename(&name, TIME_COL.into())?;
            Ok(())
        }
        None => Err(DischargeError::MissingTimeColumn(river)),
    }
}

/// Stacks per-river tables vertically, prefixing each with its river id.
fn stack_row_keyed(tables: Vec<(RiverId, DataFrame)>) -> Result<DataFrame, DischargeError> {
    let mut out: Option<DataFrame> = None;
    for (river, table) in tables {
        let ids = Column::new(RIVER_ID_COL.into(), vec![river.0; table.height()]);
        let mut columns = vec![ids];
        columns.extend(table.get_columns().iter().cloned());
        let keyed = DataFrame::new(columns)?;
        out = Some(match out {
            None => keyed,
            Some(mut acc) => {
                acc.vstack_mut(&keyed)?;
                acc
            }
        });
    }
    out.ok_or(DischargeError::NoRivers)
}

/// Joins per-river tables sideways on time, one value column per river
/// named by its id.
fn join_column_keyed(tables: Vec<(RiverId, DataFrame)>) -> Result<DataFrame, DischargeError> {
    let mut out: Option<LazyFrame> = None;
    for (river, table) in tables {
        let single = single_river_column(table, river)?.lazy();
        out = Some(match out {
            None => single,
            Some(acc) => acc.join(
                single,
                [col(TIME_COL)],
                [col(TIME_COL)],
                JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
            ),
        });
    }
    let joined = out.ok_or(DischargeError::NoRivers)?;
    Ok(joined
        .sort([TIME_COL], SortMultipleOptions::default())
        .collect()?)
}

/// Reduces a single river's table to its time column plus the first value
/// column, renamed to the river id.
fn single_river_column(table: DataFrame, river: RiverId) -> Result<DataFrame, DischargeError> {
    let value_col = table
        .get_column_names_str()
        .into_iter()
        .find(|&name| name != TIME_COL)
        .map(|name| name.to_string())
        .ok_or(DischargeError::EmptyTable(river))?;
    let mut reduced = table.select([TIME_COL, value_col.as_str()])?;
    reduced.rename(&value_col, river.to_string().into())?;
    Ok(reduced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn run_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 8).unwrap()
    }

    #[test]
    fn products_know_their_api_segments() {
        assert_eq!(DischargeProduct::Forecast.path_segment(), "forecast");
        assert_eq!(
            DischargeProduct::ForecastEnsembles.path_segment(),
            "forecastensembles"
        );
        assert_eq!(
            DischargeProduct::Retrospective.path_segment(),
            "retrospective"
        );
        assert_eq!(
            DischargeProduct::DailyAverages.path_segment(),
            "dailyaverages"
        );
    }

    #[test]
    fn forecast_products_are_row_keyed_historical_are_column_keyed() {
        assert_eq!(DischargeProduct::Forecast.shape(), TableShape::RowKeyed);
        assert_eq!(
            DischargeProduct::ForecastEnsembles.shape(),
            TableShape::RowKeyed
        );
        assert_eq!(
            DischargeProduct::Retrospective.shape(),
            TableShape::ColumnKeyed
        );
        assert_eq!(
            DischargeProduct::DailyAverages.shape(),
            TableShape::ColumnKeyed
        );
    }

    #[test]
    fn file_names_are_dated_except_retrospective() {
        assert_eq!(
            DischargeProduct::Forecast.file_name(run_date()),
            "forecast_2024-05-08.csv"
        );
        assert_eq!(
            DischargeProduct::ForecastEnsembles.file_name(run_date()),
            "forecast_ensembles_2024-05-08.csv"
        );
        assert_eq!(
            DischargeProduct::DailyAverages.file_name(run_date()),
            "daily_averages_2024-05-08.csv"
        );
        assert_eq!(
            DischargeProduct::Retrospective.file_name(run_date()),
            "retrospective.csv"
        );
    }

    #[test]
    fn stacking_prefixes_rows_with_river_ids() -> Result<(), DischargeError> {
        let uvac = df!(
            TIME_COL => ["2024-05-08 00:00:00", "2024-05-08 03:00:00"],
            "flow_med" => [1.5, 2.5],
        )?;
        let zvornik = df!(
            TIME_COL => ["2024-05-08 00:00:00", "2024-05-08 03:00:00"],
            "flow_med" => [100.0, 200.0],
        )?;

        let stacked = stack_row_keyed(vec![
            (RiverId(220252711), uvac),
            (RiverId(220348963), zvornik),
        ])?;

        assert_eq!(stacked.shape(), (4, 3));
        assert_eq!(
            stacked.get_column_names_str(),
            [RIVER_ID_COL, TIME_COL, "flow_med"]
        );
        let ids = stacked.column(RIVER_ID_COL)?.u64()?;
        assert_eq!(ids.get(0), Some(220252711));
        assert_eq!(ids.get(3), Some(220348963));
        Ok(())
    }

    #[test]
    fn joining_lines_rivers_up_as_columns_over_time() -> Result<(), DischargeError> {
        let uvac = df!(
            TIME_COL => ["2024-05-08", "2024-05-09"],
            "discharge" => [1.0, 2.0],
        )?;
        let zvornik = df!(
            TIME_COL => ["2024-05-09", "2024-05-10"],
            "discharge" => [20.0, 30.0],
        )?;

        let joined = join_column_keyed(vec![
            (RiverId(220252711), uvac),
            (RiverId(220348963), zvornik),
        ])?;

        // Outer join over the union of timestamps, sorted.
        assert_eq!(joined.shape(), (3, 3));
        assert_eq!(
            joined.get_column_names_str(),
            [TIME_COL, "220252711", "220348963"]
        );
        assert_eq!(
            joined.column(TIME_COL)?.str()?.get(0),
            Some("2024-05-08")
        );
        assert_eq!(joined.column("220252711")?.f64()?.get(2), None);
        assert_eq!(joined.column("220348963")?.f64()?.get(1), Some(20.0));
        Ok(())
    }

    #[test]
    fn single_river_tables_without_values_are_rejected() -> Result<(), DischargeError> {
        let empty = df!(TIME_COL => ["2024-05-08"])?;
        let err = single_river_column(empty, RiverId(7)).unwrap_err();
        assert!(matches!(err, DischargeError::EmptyTable(RiverId(7))));
        Ok(())
    }

    #[test]
    fn time_column_aliases_are_normalized() -> Result<(), DischargeError> {
        let mut table = df!(
            "datetime" => ["2024-05-08"],
            "flow_med" => [1.0],
        )?;
        normalize_time_column(&mut table, RiverId(1))?;
        assert_eq!(table.get_column_names_str(), [TIME_COL, "flow_med"]);

        let mut missing = df!("flow_med" => [1.0])?;
        let err = normalize_time_column(&mut missing, RiverId(1)).unwrap_err();
        assert!(matches!(err, DischargeError::MissingTimeColumn(RiverId(1))));
        Ok(())
    }

    #[tokio::test]
    async fn csv_bytes_become_a_dataframe() -> Result<(), DischargeError> {
        let csv = b"datetime,flow_med\n2024-05-08 00:00:00,1.5\n2024-05-08 03:00:00,2.5\n";
        let table = csv_to_dataframe(csv.to_vec(), RiverId(220252711)).await?;
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.column("flow_med")?.f64()?.get(1), Some(2.5));
        Ok(())
    }

    #[tokio::test]
    async fn no_rivers_is_an_error() {
        let client = GeoglowsClient::new();
        let err = client
            .product_table(DischargeProduct::Forecast, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, DischargeError::NoRivers));
    }
}
