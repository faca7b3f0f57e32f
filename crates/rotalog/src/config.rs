//! Configuration management for rotalog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rotation::RECOMMENDED_INTERVAL_HOURS;
use crate::statistics::DEFAULT_WINDOW_DAYS;
use crate::timeline::TIMELINE_CAPACITY;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "rotalog";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "timeline.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ROTALOG_`)
/// 2. TOML config file at `~/.config/rotalog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Shared timeline configuration.
    pub timeline: TimelineConfig,
    /// HTTP server and client configuration.
    pub server: ServerConfig,
    /// Rotation engine configuration.
    pub rotation: RotationConfig,
    /// Statistics configuration.
    pub statistics: StatisticsConfig,
}

/// Which timeline backend the server uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Durable `SQLite` file.
    #[default]
    Sqlite,
    /// Process memory; lost on restart.
    Memory,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/rotalog/timeline.db`
    pub database_path: Option<PathBuf>,
    /// Timeline backend.
    pub backend: StorageBackend,
}

/// Shared timeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Maximum number of entries kept.
    pub capacity: usize,
    /// Seconds between feed refreshes for polling clients.
    pub poll_interval_secs: u64,
}

/// HTTP configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the timeline server listens on.
    pub bind_address: String,
    /// Base URL clients use to reach the timeline server.
    pub url: String,
}

/// Rotation engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Hours before a site is recommended again.
    pub threshold_hours: f64,
}

/// Statistics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Default trailing window in days.
    pub window_days: i64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            capacity: TIMELINE_CAPACITY,
            poll_interval_secs: 10,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8787".to_string(),
            url: "http://127.0.0.1:8787".to_string(),
        }
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            threshold_hours: RECOMMENDED_INTERVAL_HOURS,
        }
    }
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("ROTALOG_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.timeline.capacity == 0 {
            return Err(Error::ConfigValidation {
                message: "timeline.capacity must be at least 1".to_string(),
            });
        }

        if self.timeline.poll_interval_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "timeline.poll_interval_secs must be greater than 0".to_string(),
            });
        }

        if !self.rotation.threshold_hours.is_finite() || self.rotation.threshold_hours <= 0.0 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "rotation.threshold_hours must be a positive number, got {}",
                    self.rotation.threshold_hours
                ),
            });
        }

        if self.statistics.window_days < 1 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "statistics.window_days must be at least 1, got {}",
                    self.statistics.window_days
                ),
            });
        }

        self.bind_address()?;

        if !(self.server.url.starts_with("http://") || self.server.url.starts_with("https://")) {
            return Err(Error::ConfigValidation {
                message: format!("server.url must be an http(s) URL: {}", self.server.url),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Parse the server bind address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not a valid `host:port` socket
    /// address.
    pub fn bind_address(&self) -> Result<SocketAddr> {
        self.server
            .bind_address
            .parse()
            .map_err(|_| Error::ConfigValidation {
                message: format!("invalid server.bind_address: {}", self.server.bind_address),
            })
    }

    /// Get the poll interval as a Duration.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.timeline.poll_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.timeline.capacity, 30);
        assert_eq!(config.timeline.poll_interval_secs, 10);
        assert!((config.rotation.threshold_hours - 48.0).abs() < f64::EPSILON);
        assert_eq!(config.statistics.window_days, 30);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_capacity() {
        let mut config = Config::default();
        config.timeline.capacity = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("timeline.capacity"));
    }

    #[test]
    fn test_validate_zero_poll_interval() {
        let mut config = Config::default();
        config.timeline.poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_threshold() {
        let mut config = Config::default();
        config.rotation.threshold_hours = 0.0;
        assert!(config.validate().is_err());

        config.rotation.threshold_hours = f64::NAN;
        assert!(config.validate().is_err());

        config.rotation.threshold_hours = 72.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_window_days() {
        let mut config = Config::default();
        config.statistics.window_days = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("window_days"));
    }

    #[test]
    fn test_validate_bind_address() {
        let mut config = Config::default();
        config.server.bind_address = "not an address".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("bind_address"));
    }

    #[test]
    fn test_validate_url() {
        let mut config = Config::default();
        config.server.url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_address_parses() {
        let addr = Config::default().bind_address().unwrap();
        assert_eq!(addr.port(), 8787);
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("timeline.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));
        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_poll_interval() {
        assert_eq!(Config::default().poll_interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("rotalog"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[timeline]\ncapacity = 12\n\n[storage]\nbackend = \"memory\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.timeline.capacity, 12);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.timeline.poll_interval_secs, 10);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timeline]\ncapacity = 0\n").unwrap();

        assert!(Config::load_from(Some(path)).is_err());
    }

    #[test]
    fn test_backend_serialize() {
        let json = serde_json::to_string(&StorageBackend::Memory).unwrap();
        assert_eq!(json, "\"memory\"");
    }
}
