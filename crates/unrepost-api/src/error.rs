//! Error types for the API client.

use thiserror::Error;

/// Errors surfaced to callers of the fetch/delete engines.
///
/// Retryable failures never appear here directly; they are retried inside the
/// engines and only the final failure of an attempt ceiling crosses this
/// boundary.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No ambient page-state location yielded a session identity.
    /// Not retried by the engines: a missing identity will not appear by
    /// re-requesting the same page.
    #[error("identity not found: {0}")]
    IdentityNotFound(String),

    /// The API answered with a non-success application status code
    #[error("API error code {code}: {message}")]
    Api {
        /// Application-level status code from the response envelope
        code: i64,
        /// Human-readable description
        message: String,
    },

    /// The HTTP layer answered with a non-success status
    #[error("HTTP error {status}")]
    Http {
        /// HTTP status code
        status: u16,
    },

    /// The request could not be completed (connection, timeout, decode)
    #[error("request failed: {0}")]
    Request(String),

    /// A failure reported across the relay boundary, message only
    #[error("remote error: {0}")]
    Remote(String),
}

/// Result type for API client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
