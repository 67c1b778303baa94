//! Orchestrator-side relay client.
//!
//! Requests travel out through a channel of raw JSON payloads; responses come
//! back through [`RelayClient::complete`] (typically fed by a
//! [`crate::bridge::ContentBridge`]) and are matched to their in-flight
//! request by correlation id. Responses may arrive in any order.

use crate::error::RelayError;
use crate::protocol::{RelayRequest, RelayResponse, RequestId, RequestKind};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::{mpsc, oneshot};
use unrepost_core::{Cursor, ItemId, PageResult};

/// Correlates relay responses back to their in-flight requests.
pub struct RelayClient {
    outbound: mpsc::UnboundedSender<Value>,
    pending: Mutex<HashMap<RequestId, oneshot::Sender<RelayResponse>>>,
    identity_waiters: Mutex<Vec<oneshot::Sender<RelayResponse>>>,
}

impl RelayClient {
    /// Create a client writing requests to `outbound`.
    #[must_use]
    pub fn new(outbound: mpsc::UnboundedSender<Value>) -> Self {
        Self {
            outbound,
            pending: Mutex::new(HashMap::new()),
            identity_waiters: Mutex::new(Vec::new()),
        }
    }

    /// Ask the page for the logged-in account's identity.
    pub async fn request_sec_uid(&self) -> Result<String, RelayError> {
        let (tx, rx) = oneshot::channel();
        self.identity_waiters
            .lock()
            .expect("lock identity waiters")
            .push(tx);

        self.send(&RelayRequest::GetSecUid)?;

        match rx.await.map_err(|_| RelayError::ChannelClosed)? {
            RelayResponse::SecUidResult { sec_uid } => Ok(sec_uid),
            RelayResponse::Error { error, .. } => Err(RelayError::Remote(error)),
            other => Err(RelayError::Malformed(format!(
                "mismatched response {}",
                other.tag()
            ))),
        }
    }

    /// Ask the page for the repost page at `cursor`.
    pub async fn request_items(&self, cursor: &Cursor) -> Result<PageResult, RelayError> {
        let request_id = RequestId::new();
        let rx = self.register(request_id);

        self.send_correlated(
            request_id,
            &RelayRequest::GetRepostItems {
                cursor: cursor.as_str().to_string(),
                request_id,
            },
        )?;

        match self.await_response(request_id, rx).await? {
            RelayResponse::GetRepostItemsResult { result, .. } => Ok(result),
            RelayResponse::Error { error, .. } => Err(RelayError::Remote(error)),
            other => Err(RelayError::Malformed(format!(
                "mismatched response {}",
                other.tag()
            ))),
        }
    }

    /// Ask the page to remove one reposted item.
    pub async fn request_removal(&self, item_id: &ItemId) -> Result<bool, RelayError> {
        let request_id = RequestId::new();
        let rx = self.register(request_id);

        self.send_correlated(
            request_id,
            &RelayRequest::RemoveRepostItem {
                item_id: item_id.as_str().to_string(),
                request_id,
            },
        )?;

        match self.await_response(request_id, rx).await? {
            RelayResponse::RemoveRepostItemResult { result, .. } => Ok(result),
            RelayResponse::Error { error, .. } => Err(RelayError::Remote(error)),
            other => Err(RelayError::Malformed(format!(
                "mismatched response {}",
                other.tag()
            ))),
        }
    }

    /// Route one response to whoever is waiting on it.
    ///
    /// Returns `false` when nothing was waiting, which happens when a request
    /// was abandoned before its response arrived.
    pub fn complete(&self, response: RelayResponse) -> bool {
        match &response {
            RelayResponse::SecUidResult { .. }
            | RelayResponse::Error {
                kind: RequestKind::GetSecUid,
                request_id: None,
                ..
            } => {
                let waiters: Vec<_> = self
                    .identity_waiters
                    .lock()
                    .expect("lock identity waiters")
                    .drain(..)
                    .collect();
                if waiters.is_empty() {
                    tracing::warn!(tag = %response.tag(), "identity response with no waiter");
                    return false;
                }
                for waiter in waiters {
                    let _ = waiter.send(response.clone());
                }
                true
            }
            RelayResponse::GetRepostItemsResult { request_id, .. }
            | RelayResponse::RemoveRepostItemResult { request_id, .. }
            | RelayResponse::Error {
                request_id: Some(request_id),
                ..
            } => {
                let waiter = self
                    .pending
                    .lock()
                    .expect("lock pending requests")
                    .remove(request_id);
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(response);
                        true
                    }
                    None => {
                        tracing::warn!(
                            tag = %response.tag(),
                            request_id = %request_id,
                            "response with no matching request"
                        );
                        false
                    }
                }
            }
            RelayResponse::Error {
                request_id: None, ..
            } => {
                tracing::warn!(tag = %response.tag(), "uncorrelated error response");
                false
            }
        }
    }

    /// Parse and route one raw boundary payload.
    pub fn complete_wire(&self, payload: &Value) -> Result<bool, RelayError> {
        Ok(self.complete(RelayResponse::from_wire(payload)?))
    }

    fn register(&self, request_id: RequestId) -> oneshot::Receiver<RelayResponse> {
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .expect("lock pending requests")
            .insert(request_id, tx);
        rx
    }

    fn send(&self, request: &RelayRequest) -> Result<(), RelayError> {
        let payload =
            serde_json::to_value(request).map_err(|e| RelayError::Malformed(e.to_string()))?;
        self.outbound
            .send(payload)
            .map_err(|_| RelayError::ChannelClosed)
    }

    fn send_correlated(&self, request_id: RequestId, request: &RelayRequest) -> Result<(), RelayError> {
        if let Err(e) = self.send(request) {
            self.pending
                .lock()
                .expect("lock pending requests")
                .remove(&request_id);
            return Err(e);
        }
        Ok(())
    }

    async fn await_response(
        &self,
        request_id: RequestId,
        rx: oneshot::Receiver<RelayResponse>,
    ) -> Result<RelayResponse, RelayError> {
        match rx.await {
            Ok(response) => Ok(response),
            Err(_) => {
                self.pending
                    .lock()
                    .expect("lock pending requests")
                    .remove(&request_id);
                Err(RelayError::ChannelClosed)
            }
        }
    }
}
