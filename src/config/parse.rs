use super::types::*;
use crate::config::{expand_env_vars, expand_tilde};
use chrono::FixedOffset;
use regex::Regex;
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),

    #[error("validation failed: {0}")]
    Validation(String),
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    use std::io::Read;

    let mut file = File::open(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to open config file '{}': {}", path.display(), e),
        ))
    })?;

    let mut yaml_string = String::new();
    file.read_to_string(&mut yaml_string).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read config file '{}': {}", path.display(), e),
        ))
    })?;

    parse_config(&yaml_string).map_err(|e| match e {
        ConfigError::YamlParse(e) => ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("in file '{}': {}", path.display(), e),
        )),
        other => other,
    })
}

/// Parse and validate a config from YAML text.
pub fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    // Expand environment variables in the YAML string before parsing
    let yaml_string = expand_env_vars(yaml);

    check_unexpanded_vars(&yaml_string)?;

    let mut config: Config = serde_yaml::from_str(&yaml_string)?;

    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Checks for unexpanded environment variables and returns a helpful error.
/// Comment lines are not scanned.
fn check_unexpanded_vars(yaml_string: &str) -> Result<(), ConfigError> {
    let re = Regex::new(r"\$env\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
    let mut unexpanded_vars: Vec<String> = yaml_string
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(|line| {
            re.captures_iter(line)
                .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
                .collect::<Vec<_>>()
        })
        .collect();

    if unexpanded_vars.is_empty() {
        return Ok(());
    }

    unexpanded_vars.sort();
    unexpanded_vars.dedup();

    let error_msg = if unexpanded_vars.len() == 1 {
        format!(
            "Environment variable $env{{{0}}} is not set.\n\
             \n\
             To fix this, either:\n\
             1. Set the environment variable: export {0}=...\n\
             2. Replace $env{{{0}}} in the config file with a literal value",
            unexpanded_vars[0]
        )
    } else {
        format!(
            "Environment variables are not set: {}\n\
             \n\
             To fix this, either:\n\
             1. Set the environment variables\n\
             2. Replace the variables in the config file with literal values",
            unexpanded_vars.join(", ")
        )
    };

    Err(ConfigError::Validation(error_msg))
}

fn expand_paths(config: &mut Config) {
    config.output.directory = expand_tilde(&config.output.directory);
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.sources.is_empty() {
        errors.push("config must define at least one entry under 'sources'".to_string());
    }

    if config.http.timeout.is_zero() {
        errors.push("http.timeout must be greater than zero".to_string());
    }

    // Sorted for stable error output
    let mut source_ids: Vec<&String> = config.sources.keys().collect();
    source_ids.sort();

    for source_id in source_ids {
        let prefix = format!("source '{}'", source_id);
        if source_id.trim().is_empty() {
            errors.push("source identifiers cannot be empty".to_string());
        }
        match &config.sources[source_id] {
            SourceConfig::Api(api) => validate_api_source(&prefix, api, &mut errors),
            SourceConfig::StaticCsv(csv) => validate_static_csv_source(&prefix, csv, &mut errors),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}

fn validate_api_source(prefix: &str, api: &ApiSourceConfig, errors: &mut Vec<String>) {
    if api.url.trim().is_empty() {
        errors.push(format!("{}: url cannot be empty", prefix));
    }

    if api.credential_env.trim().is_empty() {
        errors.push(format!("{}: credential_env cannot be empty", prefix));
    }

    let day = Duration::from_secs(24 * 3600);
    if api.resolution.is_zero() {
        errors.push(format!("{}: resolution must be greater than zero", prefix));
    } else if day.as_millis() % api.resolution.as_millis() != 0 {
        errors.push(format!(
            "{}: resolution {} does not divide a day evenly",
            prefix,
            duration_format::format_duration(api.resolution)
        ));
    }

    if api.time_field.is_empty() || api.rate_field.is_empty() {
        errors.push(format!("{}: time_field and rate_field cannot be empty", prefix));
    }
}

fn validate_static_csv_source(
    prefix: &str,
    csv: &StaticCsvSourceConfig,
    errors: &mut Vec<String>,
) {
    if csv.url.trim().is_empty() {
        errors.push(format!("{}: url cannot be empty", prefix));
    } else if !csv.url.contains("{date}") {
        errors.push(format!(
            "{}: url must contain a '{{date}}' placeholder: {}",
            prefix, csv.url
        ));
    }

    if csv.time_column.is_empty() || csv.rate_column.is_empty() {
        errors.push(format!("{}: time_column and rate_column cannot be empty", prefix));
    }

    if csv.utc_offset.parse::<FixedOffset>().is_err() {
        errors.push(format!(
            "{}: invalid utc_offset '{}', expected e.g. '-08:00'",
            prefix, csv.utc_offset
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_api_source_gets_defaults() {
        let config = parse_config(
            r#"
sources:
  CAISO:
    style: api
    url: https://api.example.com/v1/carbon
"#,
        )
        .unwrap();

        match &config.sources["CAISO"] {
            SourceConfig::Api(api) => {
                assert_eq!(api.credential_env, "CARBON_API_KEY");
                assert_eq!(api.resolution, Duration::from_secs(300));
                assert_eq!(api.rate_field, "generated_rate_kg_per_mwh");
                assert!(api.region.is_none());
            }
            other => panic!("unexpected style {}", other.style_name()),
        }
        assert_eq!(config.http.timeout, Duration::from_secs(30));
        assert_eq!(config.output.directory, std::path::PathBuf::from("collected"));
    }

    #[test]
    fn test_resolution_must_divide_day() {
        let result = parse_config(
            r#"
sources:
  MISO:
    style: api
    url: https://api.example.com
    resolution: 7m
"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("does not divide a day evenly"));
    }

    #[test]
    fn test_static_csv_requires_date_placeholder() {
        let result = parse_config(
            r#"
sources:
  OUTLOOK:
    style: static_csv
    url: https://example.com/history/co2.csv
"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("{date}"));
    }

    #[test]
    fn test_bad_offset_rejected() {
        let result = parse_config(
            r#"
sources:
  OUTLOOK:
    style: static_csv
    url: https://example.com/{date}.csv
    utc_offset: pacific
"#,
        );
        assert!(matches!(result, Err(ConfigError::ValidationList(_))));
    }

    #[test]
    fn test_placeholder_in_comment_ignored() {
        let config = parse_config(
            r#"
# Values like $env{GRIDCO2_DOC_EXAMPLE_UNSET} are expanded before parsing
sources:
  CAISO:
    style: api
    url: https://api.example.com/v1/carbon # not $env{GRIDCO2_TRAILING_UNSET} either
"#,
        );
        // Trailing comments share a line with a value and are still scanned
        assert!(matches!(config, Err(ConfigError::Validation(msg)) if msg.contains("GRIDCO2_TRAILING_UNSET")));

        let config = parse_config(
            r#"
# Values like $env{GRIDCO2_DOC_EXAMPLE_UNSET} are expanded before parsing
sources:
  CAISO:
    style: api
    url: https://api.example.com/v1/carbon
"#,
        )
        .unwrap();
        assert_eq!(config.sources.len(), 1);
    }

    #[test]
    fn test_starter_config_parses_without_env() {
        let yaml = crate::config::generate::generate_starter_config();
        assert!(yaml.contains("$env{NAME}"));

        let config = parse_config(&yaml).unwrap();
        assert_eq!(config.sources.len(), 5);
    }

    #[test]
    fn test_unknown_style_is_yaml_error() {
        let result = parse_config(
            r#"
sources:
  X:
    style: carrier_pigeon
    url: https://example.com
"#,
        );
        assert!(matches!(result, Err(ConfigError::YamlParse(_))));
    }
}
