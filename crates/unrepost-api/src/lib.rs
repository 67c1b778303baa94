//! Unrepost API - Repost listing and removal engines.
//!
//! This crate talks to the platform's internal HTTP API: it resolves the
//! session identity from ambient page state, fetches pages of reposted items,
//! and deletes single items, all with bounded retry and classified backoff.
//!
//! # Features
//!
//! - Ordered identity probes over an ambient page-state snapshot
//! - Paginated fetch with response normalization into a stable item shape
//! - Single-item delete with the same retry discipline
//! - Transient failures retried with exponential backoff; the
//!   server-unavailable status code retried with a fixed backoff
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use unrepost_api::{FetchEngine, HttpTransport, IdentityResolver, RetryPolicy};
//! use unrepost_core::{AppConfig, Cursor};
//!
//! let config = AppConfig::load_with_env()?;
//! let transport = Arc::new(HttpTransport::new(&config.api)?);
//! let resolver = Arc::new(IdentityResolver::from_snapshot(page_state));
//! let fetch = FetchEngine::new(
//!     transport,
//!     resolver,
//!     RetryPolicy::from(&config.retry),
//!     &config.api.base_url,
//! );
//! let page = fetch.fetch_page(&Cursor::start()).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod delete;
pub mod error;
pub mod fetch;
pub mod identity;
pub mod retry;
pub mod transport;
#[allow(missing_docs)]
pub mod wire;

// Re-export commonly used types
pub use delete::DeleteEngine;
pub use error::{ClientError, Result};
pub use fetch::{FetchEngine, PAGE_SIZE};
pub use identity::{IdentityProbe, IdentityResolver, PageStateSource};
pub use retry::{Backoff, Outcome, RetryPolicy};
pub use transport::{HttpTransport, RepostTransport, TransportError};
