use super::{require_config, CliError};
use crate::acquisition::{AcquisitionWindow, CarbonIntensityFetcher};
use crate::table::write_table_to_path;
use chrono::{DateTime, NaiveDate, Utc};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct FetchArgs {
    pub source: String,
    pub start: String,
    pub end: String,
    pub output: Option<PathBuf>,
}

/// Acquires the window for one configured source and writes it as CSV.
///
/// Returns the written path. Nothing is written unless every day succeeds.
pub async fn run(config_path: Option<&Path>, args: &FetchArgs) -> Result<PathBuf, CliError> {
    let config = require_config(config_path)?;

    let source = config.sources.get(&args.source).ok_or_else(|| {
        let mut known: Vec<&str> = config.sources.keys().map(String::as_str).collect();
        known.sort();
        CliError::UnknownSource {
            source_id: args.source.clone(),
            known: known.join(", "),
        }
    })?;

    let start = parse_date_arg(&args.start)?;
    let end = parse_date_arg(&args.end)?;
    let window = AcquisitionWindow::new(start, end, args.source.clone())?;

    let fetcher = CarbonIntensityFetcher::from_config(&args.source, source, &config.http)?;
    let table = fetcher.acquire(&window).await?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.output.directory.join(format!("{}.csv", args.source)));
    write_table_to_path(&table.samples, &output)?;

    info!(source_id = %args.source, path = %output.display(), samples = table.len(), "Fetch complete");
    Ok(output)
}

/// `YYYY-MM-DD` as UTC midnight, or a full RFC 3339 timestamp.
pub fn parse_date_arg(value: &str) -> Result<DateTime<Utc>, CliError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| CliError::InvalidDate {
            value: value.to_string(),
        })
}
