//! Boundary filter for messages arriving from the page world.
//!
//! The page posts messages into a shared channel that any script on the page
//! can also write to. The bridge keeps the relay honest: only same-window
//! messages whose type tag belongs to this protocol are forwarded, and a
//! sink that has gone away is treated as shutdown, not as an error worth
//! surfacing.

use crate::protocol::RelayResponse;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

/// Where a posted message came from, as far as the boundary can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOrigin {
    /// Posted by a script running in the same window.
    SameWindow,
    /// Posted by anything else. Never forwarded.
    Foreign,
}

/// A raw message as it arrives at the boundary.
#[derive(Debug, Clone)]
pub struct PostedMessage {
    /// The message's provenance.
    pub origin: MessageOrigin,
    /// The untrusted JSON payload.
    pub payload: Value,
}

/// Failure delivering a forwarded message to the sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The receiving side has been torn down.
    #[error("sink unreachable")]
    Unreachable,
    /// Any other delivery failure.
    #[error("sink failure: {0}")]
    Other(String),
}

/// Destination for messages that pass the boundary filter.
pub trait BridgeSink: Send + Sync {
    /// Deliver one filtered payload.
    fn deliver(&self, payload: Value) -> Result<(), SinkError>;
}

/// Sink backed by an unbounded tokio channel.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Value>,
}

impl ChannelSink {
    /// Wrap a channel sender.
    #[must_use]
    pub fn new(tx: mpsc::UnboundedSender<Value>) -> Self {
        Self { tx }
    }
}

impl BridgeSink for ChannelSink {
    fn deliver(&self, payload: Value) -> Result<(), SinkError> {
        self.tx.send(payload).map_err(|_| SinkError::Unreachable)
    }
}

/// Forwards protocol responses from the page boundary to a sink.
pub struct ContentBridge<S> {
    sink: S,
}

impl<S: BridgeSink> ContentBridge<S> {
    /// Create a bridge over `sink`.
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Filter and forward one posted message.
    ///
    /// Returns `true` when the message was forwarded. Foreign origins,
    /// payloads without a recognized type tag, and an unreachable sink all
    /// drop the message; none of them is retried.
    pub fn relay(&self, message: &PostedMessage) -> bool {
        if message.origin != MessageOrigin::SameWindow {
            return false;
        }

        let Some(tag) = message.payload.get("type").and_then(Value::as_str) else {
            return false;
        };
        if !RelayResponse::is_recognized_tag(tag) {
            tracing::trace!(tag, "ignoring out-of-protocol message");
            return false;
        }

        match self.sink.deliver(message.payload.clone()) {
            Ok(()) => true,
            Err(SinkError::Unreachable) => {
                // The orchestrator side is shutting down; nothing to do.
                tracing::debug!(tag, "sink gone, dropping response");
                false
            }
            Err(SinkError::Other(reason)) => {
                tracing::error!(tag, reason = %reason, "failed to forward response");
                false
            }
        }
    }
}
