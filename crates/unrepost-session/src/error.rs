//! Session error types.

use thiserror::Error;
use unrepost_api::ClientError;
use unrepost_core::CacheError;

/// Errors from orchestrating a scan-and-remove session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A client (fetch, delete, or identity) operation failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Reading or writing the scan cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A scan or batch was requested while a delete batch is running.
    #[error("a delete batch is already in progress")]
    Busy,
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
