//! Application settings loading from config.toml
//!
//! This module provides functionality to load runtime settings from a TOML
//! configuration file: how often the reconciliation scheduler ticks and
//! where the database lives when `DATABASE_URL` is not set. Missing file or
//! missing keys fall back to defaults so the binary runs without any config.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default seconds between reconciliation ticks
const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 300;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Reconciliation scheduler settings
    #[serde(default)]
    pub reconciliation: ReconciliationSettings,
}

/// Settings for the periodic reconciliation tick
#[derive(Debug, Deserialize, Clone)]
pub struct ReconciliationSettings {
    /// Seconds between scheduler ticks; bounds the staleness of
    /// time-driven status transitions
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

const fn default_interval_secs() -> u64 {
    DEFAULT_RECONCILE_INTERVAL_SECS
}

impl Default for ReconciliationSettings {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_RECONCILE_INTERVAL_SECS,
        }
    }
}

/// Loads settings from a TOML file
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Returns
/// * `Ok(Settings)` - Successfully parsed configuration
/// * `Err(Error)` - Failed to read or parse the configuration file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML syntax is invalid.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from the default location (./config.toml), falling back to
/// defaults when the file does not exist.
pub fn load_default_settings() -> Result<Settings> {
    if Path::new("config.toml").exists() {
        load_settings("config.toml")
    } else {
        Ok(Settings {
            reconciliation: ReconciliationSettings::default(),
        })
    }
}
