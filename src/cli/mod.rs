pub mod config;
pub mod fetch;
pub mod parse_log;
pub mod plot;

use crate::acquisition::{FetchError, RangeError};
use crate::config::ConfigError;
use crate::parser::ExtractError;
use crate::table::TableError;
use crate::viz::VizError;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error(
        "config not found. Searched locations:\n{}\nUse --config <path> to specify a config file, or run 'gridco2 config init' to generate one.",
        format_paths(.searched)
    )]
    ConfigNotFound { searched: Vec<PathBuf> },

    #[error("config file already exists at {}; remove it first or use --stdout", .path.display())]
    ConfigExists { path: PathBuf },

    #[error("unknown source '{source_id}' (configured: {known})")]
    UnknownSource { source_id: String, known: String },

    #[error("invalid date '{value}': expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate { value: String },

    #[error("invalid date range: {0}")]
    Range(#[from] RangeError),

    #[error("acquisition failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("log extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("no simulator state records found in '{}'", .path.display())]
    EmptyResult { path: PathBuf },

    #[error("table error: {0}")]
    Table(#[from] TableError),

    #[error("visualization error: {0}")]
    Viz(#[from] VizError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("  {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Loads the config at `path`, or reports where one was looked for.
pub fn require_config(path: Option<&Path>) -> Result<crate::config::Config, CliError> {
    match path {
        Some(path) => Ok(crate::config::load_config(path)?),
        None => Err(CliError::ConfigNotFound {
            searched: crate::config::default_config_paths(),
        }),
    }
}
