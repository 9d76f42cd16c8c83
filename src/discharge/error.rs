use crate::types::station::RiverId;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DischargeError {
    #[error("No rivers requested")]
    NoRivers,

    #[error("Network request failed for {0}")]
    Network(String, #[source] reqwest_middleware::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to download discharge data from {0}")]
    Download(String, #[source] reqwest::Error),

    // Errors during CSV reading (inside blocking task)
    #[error("I/O error processing discharge CSV for river {river}")]
    CsvReadIo {
        river: RiverId,
        #[source]
        source: std::io::Error,
    },
    #[error("Parsing error processing discharge CSV for river {river}")]
    CsvReadPolars {
        river: RiverId,
        #[source]
        source: PolarsError,
    },

    #[error("Discharge table for river {0} has no value columns")]
    EmptyTable(RiverId),

    #[error("No time column in the discharge table for river {0}")]
    MissingTimeColumn(RiverId),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Failed assembling discharge table")]
    Polars(#[from] PolarsError),
}
