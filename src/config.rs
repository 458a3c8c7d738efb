//! Configuration file support for seisread.
//!
//! Loads defaults from `~/.config/seisread/config.toml` on Linux
//! (or the platform-appropriate location on other OSes). Command-line flags
//! override anything set here.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::region::Region;

/// Application configuration loaded from a TOML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log filter used when `RUST_LOG` is unset (e.g. "info", "seisread=debug").
    pub log_level: String,

    /// Network code prefixed to common-receiver station names.
    pub network_code: Option<String>,

    /// Directory holding `<array>.txt` station lists.
    pub station_dir: Option<PathBuf>,

    /// Whether station lists start with a header line.
    pub skip_header: bool,

    /// Default region for fault reading.
    pub region: Option<Region>,

    /// Print tables as JSON instead of a summary.
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            network_code: None,
            station_dir: None,
            skip_header: false,
            region: None,
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from the default config file location.
    ///
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but is malformed.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Config::default()),
        }
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML in config file: {}", path.display()))
    }

    /// Returns the path to the config file.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("seisread/config.toml"))
    }

    /// Validate all configuration settings.
    pub fn validate(&self) -> Result<()> {
        if let Some(region) = &self.region {
            region
                .validate()
                .map_err(|e| anyhow::anyhow!("Invalid region: {}", e))?;
        }
        if let Some(code) = &self.network_code
            && code.chars().any(|c| c.is_whitespace() || c == '.')
        {
            anyhow::bail!("Invalid network code '{}': must not contain spaces or dots", code);
        }
        Ok(())
    }
}
