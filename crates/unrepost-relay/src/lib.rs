//! Unrepost Relay - Message relay between the page world and the engine world.
//!
//! The listing and delete endpoints only answer requests carrying the page's
//! session cookies, so the engines run in the page world while the
//! orchestrator runs elsewhere. This crate carries typed requests and
//! responses across that boundary.
//!
//! # Architecture
//!
//! - **Protocol** ([`protocol`]): Wire message types with string tags and
//!   request correlation ids
//! - **Bridge** ([`bridge`]): Origin and allowlist filtering for messages
//!   crossing the boundary
//! - **Dispatcher** ([`dispatch`]): Page-world handler turning requests into
//!   engine calls
//! - **Client** ([`client`]): Orchestrator-side client correlating responses
//!   back to in-flight requests
//! - **Errors** ([`error`]): Relay-specific error types

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod bridge;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod protocol;

// Re-export commonly used types
pub use bridge::{BridgeSink, ChannelSink, ContentBridge, MessageOrigin, PostedMessage, SinkError};
pub use client::RelayClient;
pub use dispatch::PageDispatcher;
pub use error::{RelayError, Result};
pub use protocol::{RelayRequest, RelayResponse, RequestId, RequestKind};
