//! Relabels raw discharge tables into their published form.
//!
//! Raw product tables arrive keyed by external river identifiers, either in
//! a `river_id` column (forecast-shaped) or in per-river column names
//! (historical-shaped). Publishing replaces the identifiers with station
//! names, renames the time column to the canonical `date-time`, and strips
//! rows that carry no data at all.

use crate::discharge::geoglows::{RIVER_ID_COL, TIME_COL};
use crate::types::forecast::{DATE_TIME_COL, STATION_COL};
use crate::types::station::RiverId;
use polars::prelude::*;
use std::collections::HashMap;

/// How a discharge table is keyed by river.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableShape {
    /// A `river_id` column keys each row (forecast-shaped tables).
    RowKeyed,
    /// Column names carry the river ids (historical-shaped tables).
    ColumnKeyed,
}

/// Turns a raw product table into its published form.
///
/// Row-keyed tables get rows without any value dropped, river ids replaced
/// by the mapped station names (unmapped ids become null), the columns
/// renamed to `meteo-station` and `date-time`, and a deterministic sort by
/// (station, time) ascending. Column-keyed tables get the same row drop,
/// their id columns renamed to station names where the map knows them
/// (unmapped columns keep their id), and the time column renamed.
pub fn reshape_discharge(
    table: DataFrame,
    shape: TableShape,
    names: &HashMap<RiverId, String>,
) -> Result<DataFrame, PolarsError> {
    match shape {
        TableShape::RowKeyed => reshape_row_keyed(table, names),
        TableShape::ColumnKeyed => reshape_column_keyed(table, names),
    }
}

fn reshape_row_keyed(
    table: DataFrame,
    names: &HashMap<RiverId, String>,
) -> Result<DataFrame, PolarsError> {
    let value_cols = value_columns(&table, &[RIVER_ID_COL, TIME_COL]);

    let mut lf = table.lazy();
    if let Some(keep) = any_value_present(&value_cols) {
        lf = lf.filter(keep);
    }

    // A left join against the id/name map mirrors a dictionary lookup:
    // unmapped river ids end up with a null station name.
    lf = lf.join(
        names_frame(names)?.lazy(),
        [col(RIVER_ID_COL)],
        [col(RIVER_ID_COL)],
        JoinArgs::new(JoinType::Left),
    );

    let mut selection = vec![col(STATION_COL), col(TIME_COL).alias(DATE_TIME_COL)];
    selection.extend(value_cols.iter().map(|name| col(name.as_str())));

    lf.select(selection)
        .sort(
            [STATION_COL, DATE_TIME_COL],
            SortMultipleOptions::default().with_nulls_last(true),
        )
        .collect()
}

fn reshape_column_keyed(
    table: DataFrame,
    names: &HashMap<RiverId, String>,
) -> Result<DataFrame, PolarsError> {
    let value_cols = value_columns(&table, &[TIME_COL]);

    let mut table = match any_value_present(&value_cols) {
        Some(keep) => table.lazy().filter(keep).collect()?,
        None => table,
    };

    for name in &value_cols {
        if let Ok(id) = name.parse::<u64>() {
            if let Some(station) = names.get(&RiverId(id)) {
                table.rename(name, station.as_str().into())?;
            }
        }
    }
    table.rename(TIME_COL, DATE_TIME_COL.into())?;
    Ok(table)
}

fn value_columns(table: &DataFrame, keys: &[&str]) -> Vec<String> {
    table
        .get_column_names_str()
        .into_iter()
        .filter(|name| !keys.contains(name))
        .map(|name| name.to_string())
        .collect()
}

/// True for rows where at least one value column is set; `None` when the
/// table has no value columns to judge by.
fn any_value_present(value_cols: &[String]) -> Option<Expr> {
    value_cols
        .iter()
        .map(|name| col(name.as_str()).is_not_null())
        .reduce(|acc, expr| acc.or(expr))
}

fn names_frame(names: &HashMap<RiverId, String>) -> Result<DataFrame, PolarsError> {
    let (ids, stations): (Vec<u64>, Vec<String>) = names
        .iter()
        .map(|(id, name)| (id.0, name.clone()))
        .unzip();
    df!(RIVER_ID_COL => ids, STATION_COL => stations)
}
