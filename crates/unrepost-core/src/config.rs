//! Configuration management for unrepost.
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
/// Loaded from `~/.config/unrepost/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote API settings
    pub api: ApiConfig,
    /// Request pacing settings
    pub pacing: PacingConfig,
    /// Retry/backoff settings
    pub retry: RetryConfig,
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
    /// - `UNREPOST_BASE_URL`: Override the platform base URL
    /// - `UNREPOST_INIT_DELAY_MS`: Override the identity-resolution delay
    /// - `UNREPOST_DELETE_DELAY_MS`: Override the base inter-delete delay
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        // Override from environment
        if let Ok(val) = std::env::var("UNREPOST_BASE_URL") {
            if !val.trim().is_empty() {
                tracing::debug!("Override api.base_url from env: {}", val);
                config.api.base_url = val;
            }
        }

        if let Ok(val) = std::env::var("UNREPOST_INIT_DELAY_MS") {
            if let Ok(ms) = val.parse() {
                config.pacing.init_delay_ms = ms;
                tracing::debug!("Override pacing.init_delay_ms from env: {}", ms);
            }
        }

        if let Ok(val) = std::env::var("UNREPOST_DELETE_DELAY_MS") {
            if let Ok(ms) = val.parse() {
                config.pacing.delete_delay_ms = ms;
                tracing::debug!("Override pacing.delete_delay_ms from env: {}", ms);
            }
        }

        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/unrepost/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("io", "unrepost", "unrepost").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/unrepost`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("io", "unrepost", "unrepost").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

/// Remote API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the platform
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.tiktok.com".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Request pacing settings.
///
/// These delays keep the request rate below the platform's rate-limiting
/// thresholds during a delete batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Delay in milliseconds between identity-resolution attempts
    /// (the page state may still be loading)
    pub init_delay_ms: u64,
    /// Base delay in milliseconds between delete requests
    pub delete_delay_ms: u64,
    /// Upper bound (exclusive) of the uniform random offset added to the
    /// base delete delay
    pub jitter_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            init_delay_ms: 2755,
            delete_delay_ms: 1000,
            jitter_ms: 575,
        }
    }
}

/// Retry/backoff settings shared by the fetch and delete engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per operation (first try included)
    pub max_attempts: u32,
    /// Base backoff in milliseconds; attempt n waits `base * 2^(n-1)`
    pub base_backoff_ms: u64,
    /// Fixed backoff in milliseconds for the server-unavailable status code
    pub unavailable_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 1000,
            unavailable_backoff_ms: 2000,
        }
    }
}
