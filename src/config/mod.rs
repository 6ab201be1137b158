//! Configuration management module
//!
//! Handles loading, validation, and management of the follower's process
//! configuration. Which provider/pair to follow is passed explicitly to
//! `new_market_follower` rather than read from here — this module only
//! carries settings that apply regardless of pair: venue connectivity and
//! logging.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Logging level (`trace`, `debug`, `info`, `warn`, `error`).
    pub log_level: String,

    /// Venue connectivity configuration.
    pub venue: VenueConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VenueConfig {
    /// REST API base URL, used for the initial depth snapshot.
    pub rest_url: String,

    /// Streaming base URL (multiplexed `stream?streams=...` endpoint).
    pub stream_url: String,

    /// Snapshot request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            venue: VenueConfig::default(),
        }
    }
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            rest_url: "https://api.binance.com".to_string(),
            stream_url: "wss://stream.binance.com:9443/stream".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(log_level) = env::var("MARKET_FOLLOWER_LOG_LEVEL") {
            self.log_level = log_level;
        }

        if let Ok(rest_url) = env::var("MARKET_FOLLOWER_REST_URL") {
            self.venue.rest_url = rest_url;
        }

        if let Ok(stream_url) = env::var("MARKET_FOLLOWER_STREAM_URL") {
            self.venue.stream_url = stream_url;
        }

        if let Ok(timeout) = env::var("MARKET_FOLLOWER_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.venue.timeout_seconds = value;
            }
        }
    }

    /// Save configuration to file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Load configuration with fallback to default.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load_from_file(path).unwrap_or_else(|err| {
            tracing::warn!("Failed to load config: {}, using defaults", err);
            Self::default()
        })
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.venue.rest_url.trim().is_empty() {
            anyhow::bail!("venue.rest_url must not be empty");
        }

        if self.venue.stream_url.trim().is_empty() {
            anyhow::bail!("venue.stream_url must not be empty");
        }

        if self.venue.timeout_seconds == 0 {
            anyhow::bail!("venue.timeout_seconds must be greater than 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.venue.rest_url, "https://api.binance.com");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.venue.rest_url, deserialized.venue.rest_url);
    }

    #[test]
    fn test_config_file_operations() {
        let config = Config::default();
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();
        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.venue.rest_url, loaded_config.venue.rest_url);
    }

    #[test]
    fn test_env_override() {
        // SAFETY: no other test in this process touches this var.
        unsafe {
            env::set_var("MARKET_FOLLOWER_TIMEOUT_SECONDS", "42");
        }
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.venue.timeout_seconds, 42);
        unsafe {
            env::remove_var("MARKET_FOLLOWER_TIMEOUT_SECONDS");
        }
    }

    #[test]
    fn test_validate_rejects_empty_rest_url() {
        let mut config = Config::default();
        config.venue.rest_url = String::new();
        assert!(config.validate().is_err());
    }
}
