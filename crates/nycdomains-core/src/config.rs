//! Configuration management for nycdomains.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main application configuration.
///
/// This is loaded from `~/.config/nycdomains/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Registration feed settings
    pub feed: FeedConfig,
    /// Store settings
    pub store: StoreConfig,
    /// Enrichment behavior settings
    pub enrichment: EnrichmentConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `NYCDOMAINS_DB_PATH`: Override the store database path
    /// - `NYCDOMAINS_FEED_URL`: Override the registration feed endpoint
    /// - `NYCDOMAINS_MAX_CONCURRENT`: Override the concurrent fetch limit
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        if let Ok(val) = std::env::var("NYCDOMAINS_DB_PATH") {
            if !val.is_empty() {
                config.store.db_path = Some(PathBuf::from(&val));
                tracing::debug!("Override store.db_path from env: {}", val);
            }
        }

        if let Ok(val) = std::env::var("NYCDOMAINS_FEED_URL") {
            if !val.is_empty() {
                config.feed.base_url = val.clone();
                tracing::debug!("Override feed.base_url from env: {}", val);
            }
        }

        if let Ok(val) = std::env::var("NYCDOMAINS_MAX_CONCURRENT") {
            if let Ok(limit) = val.parse() {
                config.enrichment.max_concurrent_fetches = limit;
                tracing::debug!("Override max_concurrent_fetches from env: {}", limit);
            }
        }

        Ok(config)
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/nycdomains/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("nyc", "nycdomains", "nycdomains").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/nycdomains`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("nyc", "nycdomains", "nycdomains").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Resolve the store database path, defaulting into the data directory.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        match &self.store.db_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("nycdomains.db")),
        }
    }
}

/// Registration feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// NYC OpenData endpoint serving `.nyc` registrations as JSON
    pub base_url: String,
    /// Number of records to request per page
    pub batch_size: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://data.cityofnewyork.us/resource/9cw8-7heb.json".to_string(),
            batch_size: 1000,
        }
    }
}

/// Store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the SQLite database file; defaults into the data directory
    pub db_path: Option<PathBuf>,
    /// Number of stalest records pulled per pipeline run
    pub refresh_batch: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            refresh_batch: 100,
        }
    }
}

/// Enrichment behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Number of concurrent outbound fetches allowed
    pub max_concurrent_fetches: usize,
    /// Per-fetch timeout in seconds when running sequentially
    pub timeout_secs: u64,
    /// Per-fetch timeout in seconds when running concurrently
    pub concurrent_timeout_secs: u64,
    /// User agent string sent with every probe
    pub user_agent: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 5,
            timeout_secs: 5,
            concurrent_timeout_secs: 10,
            user_agent: "nycdomains/0.1.0 (+https://github.com/nycdomains/nycdomains)".to_string(),
        }
    }
}
