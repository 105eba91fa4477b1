//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the hora-config.toml file.
//! It covers where the observer's location comes from, how long an acquired location
//! stays fresh, and how the hora tables are displayed.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "hora-config.toml";

/// Application configuration loaded from hora-config.toml
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Location acquisition settings
    pub location: LocationConfig,
    /// Table rendering settings
    pub display: DisplayConfig,
}

/// Location acquisition settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Fixed latitude in degrees, used when no better source is available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Fixed longitude in degrees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Whether location access is permitted at all
    pub allow: bool,
    /// Give up on location acquisition after this many seconds
    pub timeout_secs: u64,
    /// How long a cached location stays valid, in minutes
    pub cache_ttl_minutes: u64,
    /// File holding "lat,lon", e.g. written by a GPS daemon
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Table rendering settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Print the "📍 Latitude/Longitude" line above the tables
    pub show_location: bool,
    /// Include the Indicators column
    pub show_indicators: bool,
    /// Prefix for the row of the currently active hora
    pub active_marker: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        LocationConfig {
            latitude: None,
            longitude: None,
            allow: true,
            timeout_secs: 10,
            cache_ttl_minutes: 30,
            file: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            show_location: true,
            show_indicators: true,
            active_marker: "▶".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from hora-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), "invalid config file format: {}", e);
                    warn!("using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Save current configuration to the given path
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }
}
