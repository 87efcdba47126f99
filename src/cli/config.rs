use super::CliError;
use crate::config::generate::generate_starter_config;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the starter config to stdout, or to the first default location.
///
/// Returns the written path, or `None` when printed. Never overwrites an
/// existing file.
pub fn init(stdout: bool) -> Result<Option<PathBuf>, CliError> {
    let config_content = generate_starter_config();

    if stdout {
        print!("{}", config_content);
        return Ok(None);
    }

    let target = default_write_target();
    write_config(&config_content, &target)?;
    println!("Config file written to {}", target.display());
    Ok(Some(target))
}

/// `~/.config/gridco2/config.yml`, falling back to `/etc/gridco2/config.yml`
/// when the user directory cannot be created.
fn default_write_target() -> PathBuf {
    if let Some(home_dir) = dirs::home_dir() {
        let user_config = home_dir.join(".config/gridco2/config.yml");
        if let Some(parent) = user_config.parent() {
            match fs::create_dir_all(parent) {
                Ok(()) => return user_config,
                Err(e) => {
                    tracing::warn!(
                        dir = %parent.display(),
                        error = %e,
                        "Could not create user config directory, falling back to /etc/gridco2"
                    );
                }
            }
        }
    }
    PathBuf::from("/etc/gridco2/config.yml")
}

/// Writes `config_content` to `path`, refusing to replace an existing file.
pub fn write_config(config_content: &str, path: &Path) -> Result<(), CliError> {
    if path.exists() {
        return Err(CliError::ConfigExists {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, config_content)?;
    Ok(())
}

/// Loads and validates the config, reporting each configured source.
pub fn validate(config_path: Option<&Path>) -> Result<(), CliError> {
    let config = super::require_config(config_path)?;

    let mut ids: Vec<&String> = config.sources.keys().collect();
    ids.sort();

    println!("✓ Config is valid ({} sources)", ids.len());
    for id in ids {
        println!("  {} ({})", id, config.sources[id].style_name());
    }
    Ok(())
}
