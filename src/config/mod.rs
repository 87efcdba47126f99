pub mod generate;
pub mod parse;
pub mod types;

use regex::Regex;
use std::path::{Path, PathBuf};

pub use parse::{load_config, parse_config, ConfigError};
pub use types::{Config, SourceConfig};

/// Expands environment variables in a string.
/// Supports $env{VAR_NAME} syntax.
/// If an environment variable is not set, it's left unchanged.
pub fn expand_env_vars(text: &str) -> String {
    // VAR_NAME starts with a letter or underscore, then alphanumerics or underscores
    let re = Regex::new(r"\$env\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();

    re.replace_all(text, |caps: &regex::Captures| {
        // Unset variables keep their original text so validation can name them
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}

/// Expands tilde (~) in paths to the user's home directory.
/// If the path starts with "~/" or is exactly "~", replaces it with the home directory.
/// Returns the path unchanged if it doesn't start with tilde or home directory cannot be determined.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();

    if path_str.starts_with("~/") {
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(&path_str[2..]);
        }
    } else if path_str == "~" {
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir;
        }
    }

    path.to_path_buf()
}

/// Resolves the config file path based on explicit argument or default locations.
/// Returns the first existing path from:
/// 1. Explicit path (if provided, with tilde expansion)
/// 2. ~/.config/gridco2/config.yml
/// 3. /etc/gridco2/config.yml
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        // Expand tilde if present
        return Some(expand_tilde(path));
    }

    for candidate in default_config_paths() {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    None
}

/// Default config locations in search order.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".config/gridco2/config.yml"));
    }
    paths.push(PathBuf::from("/etc/gridco2/config.yml"));
    paths
}
