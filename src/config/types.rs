use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub sources: HashMap<String, SourceConfig>,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// How a source publishes its data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum SourceConfig {
    Api(ApiSourceConfig),
    StaticCsv(StaticCsvSourceConfig),
}

impl SourceConfig {
    pub fn style_name(&self) -> &'static str {
        match self {
            SourceConfig::Api(_) => "api",
            SourceConfig::StaticCsv(_) => "static_csv",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSourceConfig {
    pub url: String,
    /// Region passed to the endpoint; the source identifier when absent.
    pub region: Option<String>,
    #[serde(default = "default_credential_env")]
    pub credential_env: String,
    #[serde(with = "duration_format", default = "default_resolution")]
    pub resolution: Duration,
    #[serde(default = "default_time_field")]
    pub time_field: String,
    #[serde(default = "default_rate_field")]
    pub rate_field: String,
}

fn default_credential_env() -> String {
    "CARBON_API_KEY".to_string()
}

fn default_resolution() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_time_field() -> String {
    "start_date".to_string()
}

fn default_rate_field() -> String {
    "generated_rate_kg_per_mwh".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticCsvSourceConfig {
    /// URL template; `{date}` is replaced with the day formatted by `date_format`.
    pub url: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_time_column")]
    pub time_column: String,
    #[serde(default = "default_time_format")]
    pub time_format: String,
    #[serde(default = "default_rate_field")]
    pub rate_column: String,
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

fn default_date_format() -> String {
    "%Y%m%d".to_string()
}

fn default_time_column() -> String {
    "Time".to_string()
}

fn default_time_format() -> String {
    "%H:%M".to_string()
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(with = "duration_format", default = "default_timeout")]
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("collected")
}

// Custom serde module for duration parsing
pub mod duration_format {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_duration(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty duration string".to_string());
        }

        let (value_str, unit) = if let Some(v) = s.strip_suffix("ms") {
            (v, "ms")
        } else if let Some(v) = s.strip_suffix('s') {
            (v, "s")
        } else if let Some(v) = s.strip_suffix('m') {
            (v, "m")
        } else if let Some(v) = s.strip_suffix('h') {
            (v, "h")
        } else {
            return Err(format!("invalid duration format: {}", s));
        };

        let value: u64 = value_str
            .parse()
            .map_err(|_| format!("invalid numeric value: {}", value_str))?;

        let secs_per_unit = match unit {
            "ms" => return Ok(Duration::from_millis(value)),
            "s" => 1,
            "m" => 60,
            "h" => 3600,
            _ => return Err(format!("unknown unit: {}", unit)),
        };
        let duration = value
            .checked_mul(secs_per_unit)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("duration out of range: {}", s))?;

        Ok(duration)
    }

    /// Shortest whole-unit rendering, e.g. `5m`, `1h`, `90s`.
    pub fn format_duration(d: Duration) -> String {
        let secs = d.as_secs();
        if d.subsec_millis() != 0 || secs == 0 {
            format!("{}ms", d.as_millis())
        } else if secs % 3600 == 0 {
            format!("{}h", secs / 3600)
        } else if secs % 60 == 0 {
            format!("{}m", secs / 60)
        } else {
            format!("{}s", secs)
        }
    }

}
