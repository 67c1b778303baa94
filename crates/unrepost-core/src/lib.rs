//! Unrepost Core - Foundation crate for the repost removal toolkit.
//!
//! This crate provides the shared types, error handling, configuration
//! management, and scan-cache persistence that the other unrepost crates
//! depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes and records (`SecUid`, `ItemId`, `Cursor`,
//!   `RepostItem`, `PageResult`)
//! - [`cache`] - The single persisted slot holding the last scan result
//! - [`logging`] - Tracing subscriber initialization
//!
//! # Example
//!
//! ```rust
//! use unrepost_core::{AppConfig, Cursor};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.pacing.delete_delay_ms, 1000);
//! assert_eq!(Cursor::start().as_str(), "0");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use cache::ScanCache;
pub use config::{ApiConfig, AppConfig, PacingConfig, RetryConfig};
pub use error::{CacheError, ConfigError, ConfigResult, Result, UnrepostError};
pub use types::{Cursor, ItemId, PageResult, RepostItem, SecUid};
