use super::{FetchError, FetchStyle, IntensitySample, Result};
use crate::config::types::{duration_format, ApiSourceConfig};
use crate::table::timestamp::parse_timestamp;
use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, warn};

const API_KEY_HEADER: &str = "X-Api-Key";

/// Metered JSON endpoint queried once per day.
///
/// Request: `GET <url>?region=..&start=..&end=..&resolution=..` with the API
/// key in `X-Api-Key`. Response: an object whose `data` member is an array of
/// rows carrying `time_field` and `rate_field` (dotted paths allowed for
/// nested members).
pub struct ApiFetch {
    client: reqwest::Client,
    url: String,
    region: String,
    api_key: String,
    resolution: String,
    time_field: String,
    rate_field: String,
}

impl std::fmt::Debug for ApiFetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiFetch")
            .field("url", &self.url)
            .field("region", &self.region)
            .field("api_key", &"<redacted>")
            .field("resolution", &self.resolution)
            .finish()
    }
}

impl ApiFetch {
    /// Reads the credential from the environment variable named in `config`.
    pub fn from_env(
        source_id: &str,
        config: &ApiSourceConfig,
        client: reqwest::Client,
    ) -> Result<Self> {
        let api_key = std::env::var(&config.credential_env).ok();
        Self::new(source_id, config, client, api_key)
    }

    /// Fails with [`FetchError::MissingCredential`] when `api_key` is absent or
    /// blank, before any request is made.
    pub fn new(
        source_id: &str,
        config: &ApiSourceConfig,
        client: reqwest::Client,
        api_key: Option<String>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) if !key.trim().is_empty() => key,
            _ => {
                return Err(FetchError::MissingCredential {
                    source_id: source_id.to_string(),
                    env_var: config.credential_env.clone(),
                })
            }
        };

        Ok(Self {
            client,
            url: config.url.clone(),
            region: config
                .region
                .clone()
                .unwrap_or_else(|| source_id.to_string()),
            api_key,
            resolution: duration_format::format_duration(config.resolution),
            time_field: config.time_field.clone(),
            rate_field: config.rate_field.clone(),
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl FetchStyle for ApiFetch {
    fn style_name(&self) -> &'static str {
        "api"
    }

    async fn fetch_day(&self, source_id: &str, day: DateTime<Utc>) -> Result<Vec<IntensitySample>> {
        let start = day.to_rfc3339_opts(SecondsFormat::Secs, true);
        let end = (day + Duration::days(1)).to_rfc3339_opts(SecondsFormat::Secs, true);

        debug!(source_id = %source_id, region = %self.region, start = %start, end = %end, "Requesting day");

        let response = self
            .client
            .get(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[
                ("region", self.region.as_str()),
                ("start", start.as_str()),
                ("end", end.as_str()),
                ("resolution", self.resolution.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::Remote {
                source_id: source_id.to_string(),
                day: day.date_naive(),
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = serde_json::from_str(&body)
            .map_err(|e| FetchError::payload(source_id, day, format!("invalid JSON: {}", e)))?;

        let rows = match payload.get("data") {
            Some(Value::Array(rows)) => rows,
            None | Some(Value::Null) => {
                return Err(FetchError::Remote {
                    source_id: source_id.to_string(),
                    day: day.date_naive(),
                    status: status.as_u16(),
                    body,
                })
            }
            Some(other) => {
                return Err(FetchError::payload(
                    source_id,
                    day,
                    format!("'data' is not an array: {}", other),
                ))
            }
        };

        parse_rows(rows, source_id, day, &self.time_field, &self.rate_field)
    }
}

/// Converts the `data` rows of one day's response into samples.
///
/// Rows whose rate is null or absent are skipped; a missing or unparseable
/// timestamp, or a non-numeric rate, fails the day.
pub fn parse_rows(
    rows: &[Value],
    source_id: &str,
    day: DateTime<Utc>,
    time_field: &str,
    rate_field: &str,
) -> Result<Vec<IntensitySample>> {
    let mut samples = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let time = lookup(row, time_field)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                FetchError::payload(source_id, day, format!("row {}: missing '{}'", i, time_field))
            })?;
        let timestamp = parse_timestamp(time)
            .map_err(|e| FetchError::payload(source_id, day, format!("row {}: {}", i, e)))?;

        let rate = match lookup(row, rate_field) {
            None | Some(Value::Null) => {
                warn!(source_id = %source_id, row = i, time = %time, "Skipping row without rate");
                continue;
            }
            Some(value) => value.as_f64().ok_or_else(|| {
                FetchError::payload(
                    source_id,
                    day,
                    format!("row {}: '{}' is not a number: {}", i, rate_field, value),
                )
            })?,
        };

        samples.push(IntensitySample {
            timestamp,
            rate_kg_per_mwh: rate,
            source_id: source_id.to_string(),
        });
    }

    Ok(samples)
}

/// Resolves a dotted member path such as `data.generated_rate_kg_per_mwh`.
fn lookup<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(row, |value, key| value.get(key))
}
