//! Core error types for the unrepost workspace.
//!
//! This module defines the central error type plus the configuration and
//! cache error enums it wraps. Subsystem crates define their own error types
//! and convert into these where they cross crate boundaries.

use thiserror::Error;

/// Central error type for core operations.
#[derive(Error, Debug)]
pub enum UnrepostError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scan cache errors (reading or writing the persisted slot)
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// Validation errors (invalid input, constraints)
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Errors from the persisted scan-cache slot.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to determine the data directory for the slot file
    #[error("could not determine data directory (XDG base directories not available)")]
    NoDataDir,

    /// The slot file exists but does not contain a valid scan snapshot
    #[error("malformed scan cache at {path}: {source}")]
    Malformed {
        /// Path of the slot file
        path: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize the scan snapshot
    #[error("failed to serialize scan cache: {0}")]
    Serialize(#[source] serde_json::Error),

    /// I/O error reading/writing the slot file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using `UnrepostError`.
pub type Result<T> = std::result::Result<T, UnrepostError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UnrepostError::Validation("invalid secUid".to_string());
        assert_eq!(err.to_string(), "validation error: invalid secUid");

        let err = ConfigError::NoConfigDir;
        assert_eq!(
            err.to_string(),
            "could not determine config directory (XDG base directories not available)"
        );
    }

    #[test]
    fn test_error_from_config() {
        let config_err = ConfigError::NoConfigDir;
        let core_err: UnrepostError = config_err.into();
        assert!(matches!(core_err, UnrepostError::Config(_)));
    }

    #[test]
    fn test_error_from_cache() {
        let cache_err = CacheError::NoDataDir;
        let core_err: UnrepostError = cache_err.into();
        assert!(matches!(core_err, UnrepostError::Cache(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let core_err: UnrepostError = io_err.into();
        assert!(matches!(core_err, UnrepostError::Io(_)));
    }
}
