use super::{FetchError, FetchStyle, IntensitySample, Result};
use crate::config::types::StaticCsvSourceConfig;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::{debug, warn};

/// Unauthenticated per-day CSV file addressed by date in its URL.
#[derive(Debug)]
pub struct StaticCsvFetch {
    client: reqwest::Client,
    url_template: String,
    date_format: String,
    layout: CsvLayout,
}

/// Where the time of day and rate live in a day file, and how to read them.
#[derive(Debug, Clone)]
pub struct CsvLayout {
    pub time_column: String,
    pub time_format: String,
    pub rate_column: String,
    pub offset: FixedOffset,
}

impl StaticCsvFetch {
    pub fn new(
        source_id: &str,
        config: &StaticCsvSourceConfig,
        client: reqwest::Client,
    ) -> Result<Self> {
        let offset = config.utc_offset.parse::<FixedOffset>().map_err(|e| {
            FetchError::Config(format!(
                "source '{}': invalid utc_offset '{}': {}",
                source_id, config.utc_offset, e
            ))
        })?;

        Ok(Self {
            client,
            url_template: config.url.clone(),
            date_format: config.date_format.clone(),
            layout: CsvLayout {
                time_column: config.time_column.clone(),
                time_format: config.time_format.clone(),
                rate_column: config.rate_column.clone(),
                offset,
            },
        })
    }

    /// The resource URL for `day`.
    pub fn url_for(&self, day: NaiveDate) -> String {
        self.url_template
            .replace("{date}", &day.format(&self.date_format).to_string())
    }
}

#[async_trait]
impl FetchStyle for StaticCsvFetch {
    fn style_name(&self) -> &'static str {
        "static_csv"
    }

    async fn fetch_day(&self, source_id: &str, day: DateTime<Utc>) -> Result<Vec<IntensitySample>> {
        let url = self.url_for(day.date_naive());
        debug!(source_id = %source_id, url = %url, "Requesting day file");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() || body.trim().is_empty() {
            return Err(FetchError::Remote {
                source_id: source_id.to_string(),
                day: day.date_naive(),
                status: status.as_u16(),
                body,
            });
        }

        parse_day_csv(&body, source_id, day, &self.layout)
    }
}

/// Reads one day file, stamping each row's time of day onto `day`.
///
/// Only the combined timestamp and the rate survive; the source time column
/// is not carried into the samples. Rows with an empty rate cell are skipped.
pub fn parse_day_csv(
    body: &str,
    source_id: &str,
    day: DateTime<Utc>,
    layout: &CsvLayout,
) -> Result<Vec<IntensitySample>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = rdr.headers()?.clone();
    let time_idx = column_index(&headers, &layout.time_column)
        .ok_or_else(|| FetchError::payload(source_id, day, format!("missing column '{}'", layout.time_column)))?;
    let rate_idx = column_index(&headers, &layout.rate_column)
        .ok_or_else(|| FetchError::payload(source_id, day, format!("missing column '{}'", layout.rate_column)))?;

    let date = day.date_naive();
    let mut samples = Vec::new();

    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let time_cell = record.get(time_idx).unwrap_or("");
        let rate_cell = record.get(rate_idx).unwrap_or("");

        if time_cell.is_empty() {
            continue;
        }

        let time = NaiveTime::parse_from_str(time_cell, &layout.time_format).map_err(|e| {
            FetchError::payload(
                source_id,
                day,
                format!("row {}: bad time of day '{}': {}", i, time_cell, e),
            )
        })?;

        if rate_cell.is_empty() {
            warn!(source_id = %source_id, row = i, time = %time_cell, "Skipping row without rate");
            continue;
        }

        let rate: f64 = rate_cell.parse().map_err(|e| {
            FetchError::payload(
                source_id,
                day,
                format!("row {}: bad rate '{}': {}", i, rate_cell, e),
            )
        })?;

        let local = date.and_time(time);
        let timestamp = layout
            .offset
            .from_local_datetime(&local)
            .single()
            .ok_or_else(|| FetchError::payload(source_id, day, format!("row {}: ambiguous local time {}", i, local)))?;

        samples.push(IntensitySample {
            timestamp,
            rate_kg_per_mwh: rate,
            source_id: source_id.to_string(),
        });
    }

    Ok(samples)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}
