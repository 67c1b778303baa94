//! Relay error types.

use thiserror::Error;

/// Errors from relaying messages between the page and the orchestrator.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A message carried a type tag this relay does not know.
    #[error("unrecognized message type: {0}")]
    UnrecognizedType(String),

    /// A message with a known type tag was missing or mistyping fields.
    #[error("malformed relay message: {0}")]
    Malformed(String),

    /// The far side reported a failure for this request.
    #[error("remote failure: {0}")]
    Remote(String),

    /// The channel to the far side is gone.
    #[error("relay channel closed")]
    ChannelClosed,
}

/// Result alias for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
