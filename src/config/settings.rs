//! Application settings loaded from `config.toml`.
//!
//! Every field has a default, so the file is optional. A file that exists but
//! cannot be parsed is a configuration error rather than silently ignored.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP server settings
    pub server: ServerSettings,
    /// Dashboard sizing and windowing
    pub dashboard: DashboardSettings,
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address the HTTP server listens on
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

/// `[dashboard]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// How many recent donations the dashboard lists
    pub recent_donations: u64,
    /// How many donors the top-donor ranking keeps
    pub top_donors: usize,
    /// Length of the trailing window for monthly trends, in months
    pub trend_window_months: u32,
    /// Length of the raw recent-donations series, in days
    pub recent_trend_days: i64,
}

impl DashboardSettings {
    /// Longest accepted `recent_trend_days`, roughly a century.
    pub const MAX_RECENT_TREND_DAYS: i64 = 36_500;

    /// Rejects windows that cannot be applied to a timestamp.
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if !(0..=Self::MAX_RECENT_TREND_DAYS).contains(&self.recent_trend_days) {
            return Err(Error::Config {
                message: format!(
                    "dashboard.recent_trend_days must be between 0 and {}, got {}",
                    Self::MAX_RECENT_TREND_DAYS,
                    self.recent_trend_days
                ),
            });
        }
        Ok(())
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            recent_donations: 5,
            top_donors: 5,
            trend_window_months: 12,
            recent_trend_days: 30,
        }
    }
}

/// Loads settings from a TOML file, returning defaults when the file is absent.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or is not valid TOML.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No settings file at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    debug!("Loading settings from {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read settings file {}: {e}", path.display()),
    })?;

    parse_settings(&contents)
}

/// Parses settings from TOML text.
///
/// # Errors
/// Returns [`Error::Config`] if the text is not valid TOML or a `[dashboard]`
/// value is out of range.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    settings.dashboard.validate()?;
    Ok(settings)
}

/// Loads settings from the default location (./config.toml)
pub fn load_default_settings() -> Result<Settings> {
    load_settings("config.toml")
}
