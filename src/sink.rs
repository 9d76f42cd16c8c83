//! Writes published tables to timestamped CSV files.

use chrono::NaiveDate;
use log::info;
use polars::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;
use tokio::task;

/// Datetime cells are serialized in this format, matching the published
/// table convention.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to create output directory '{0}'")]
    CreateDir(PathBuf, #[source] std::io::Error),

    #[error("Failed to write CSV file '{0}'")]
    WriteIo(PathBuf, #[source] std::io::Error),

    #[error("Failed to serialize CSV file '{0}'")]
    WritePolars(PathBuf, #[source] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] task::JoinError),
}

/// `{prefix}_{YYYY-MM-DD}.csv` — the timestamped naming every dated output
/// file uses.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use hydromet::dated_file_name;
///
/// let date = NaiveDate::from_ymd_opt(2024, 5, 8).unwrap();
/// assert_eq!(dated_file_name("gfs", date), "gfs_2024-05-08.csv");
/// ```
pub fn dated_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", prefix, date.format("%Y-%m-%d"))
}

/// Persists assembled tables as UTF-8 CSV files with a byte-order mark, one
/// whole file per run.
#[derive(Debug, Clone)]
pub struct CsvSink {
    output_dir: PathBuf,
}

impl CsvSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Writes `table` to `file_name` inside the output directory, creating
    /// the directory if missing, and returns the full path.
    ///
    /// The file starts with the UTF-8 byte-order mark so spreadsheet tools
    /// pick up the encoding, followed by one header row and the data rows.
    pub async fn write(&self, mut table: DataFrame, file_name: &str) -> Result<PathBuf, SinkError> {
        let path = self.output_dir.join(file_name);
        let path_buf = path.clone();
        task::spawn_blocking(move || {
            if let Some(dir) = path_buf.parent() {
                std::fs::create_dir_all(dir)
                    .map_err(|e| SinkError::CreateDir(dir.to_path_buf(), e))?;
            }
            let mut file = std::fs::File::create(&path_buf)
                .map_err(|e| SinkError::WriteIo(path_buf.clone(), e))?;
            file.write_all(b"\xEF\xBB\xBF")
                .map_err(|e| SinkError::WriteIo(path_buf.clone(), e))?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .with_datetime_format(Some(DATETIME_FORMAT.to_string()))
                .finish(&mut table)
                .map_err(|e| SinkError::WritePolars(path_buf, e))?;
            Ok::<(), SinkError>(())
        })
        .await??;
        info!("Wrote {}", path.display());
        Ok(path)
    }
}
