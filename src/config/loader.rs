//! Configuration loading from file system
//!
//! Handles loading and parsing ~/.cliptrail/config.json.

use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::defaults::DEFAULT_CONFIG_PATH;
use super::types::Config;

/// Expanded path of the user config file
pub fn config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde(DEFAULT_CONFIG_PATH).as_ref())
}

/// Load configuration from ~/.cliptrail/config.json
///
/// Returns Config::default() if the file is missing, unreadable, malformed or
/// fails validation.
#[instrument(name = "load_config")]
pub fn load_config() -> Config {
    load_config_from(&config_path())
}

/// Same as [`load_config`] for an explicit path.
pub fn load_config_from(config_path: &Path) -> Config {
    if !config_path.exists() {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        return Config::default();
    }

    match read_config_file(config_path) {
        Ok(config) => {
            info!(path = %config_path.display(), "Successfully loaded config");
            config
        }
        Err(e) => {
            warn!(
                path = %config_path.display(),
                error = %format!("{:#}", e),
                "Failed to load config, using defaults"
            );
            Config::default()
        }
    }
}

fn read_config_file(config_path: &Path) -> anyhow::Result<Config> {
    let raw = std::fs::read_to_string(config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;

    let config: Config = serde_json::from_str(raw.trim())
        .with_context(|| format!("parsing {}", config_path.display()))?;

    config.validate().context("validating config")?;
    Ok(config)
}
