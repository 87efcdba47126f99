//! Day-by-day acquisition of carbon-intensity samples from remote sources.

pub mod api;
pub mod fetcher;
pub mod sample;
pub mod static_csv;
pub mod window;

pub use api::ApiFetch;
pub use fetcher::{CarbonIntensityFetcher, FetchStyle};
pub use sample::{IntensitySample, IntensityTable};
pub use static_csv::StaticCsvFetch;
pub use window::{AcquisitionWindow, DateRange, RangeError};

use crate::config::types::HttpConfig;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("source '{source_id}' requires a credential in environment variable {env_var}, which is missing or empty")]
    MissingCredential { source_id: String, env_var: String },

    #[error("source '{source_id}' request for {day} failed with status {status}: {body}")]
    Remote {
        source_id: String,
        day: NaiveDate,
        status: u16,
        body: String,
    },

    #[error("source '{source_id}' returned an unusable payload for {day}: {message}")]
    Payload {
        source_id: String,
        day: NaiveDate,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid date range: {0}")]
    Range(#[from] RangeError),

    #[error("invalid source configuration: {0}")]
    Config(String),
}

impl FetchError {
    pub(crate) fn payload(source_id: &str, day: DateTime<Utc>, message: impl Into<String>) -> Self {
        FetchError::Payload {
            source_id: source_id.to_string(),
            day: day.date_naive(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// Shared HTTP client for one acquisition run.
pub fn build_client(http: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(http.timeout)
        .user_agent(concat!("gridco2/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
