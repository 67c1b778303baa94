//! Page-world request handler.
//!
//! The dispatcher owns the engines and answers one relay request at a time.
//! Every failure becomes an error response tagged after the request that
//! caused it; nothing is ever dropped silently once a request has been
//! recognized.

use crate::protocol::{RelayRequest, RelayResponse, RequestKind};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use unrepost_api::{DeleteEngine, FetchEngine, IdentityResolver};
use unrepost_core::{Cursor, ItemId, PacingConfig};

/// Identity lookup attempts before giving up on a still-loading page.
const IDENTITY_ATTEMPTS: u32 = 3;

/// Turns relay requests into engine calls and engine results into responses.
pub struct PageDispatcher {
    fetch: FetchEngine,
    delete: DeleteEngine,
    resolver: Arc<IdentityResolver>,
    identity_wait: Duration,
}

impl PageDispatcher {
    /// Create a dispatcher over the given engines.
    ///
    /// `pacing.init_delay_ms` is the wait between identity lookup attempts
    /// while the page state is still hydrating.
    #[must_use]
    pub fn new(
        fetch: FetchEngine,
        delete: DeleteEngine,
        resolver: Arc<IdentityResolver>,
        pacing: &PacingConfig,
    ) -> Self {
        Self {
            fetch,
            delete,
            resolver,
            identity_wait: Duration::from_millis(pacing.init_delay_ms),
        }
    }

    /// Handle one request, always producing a response.
    pub async fn handle(&self, request: RelayRequest) -> RelayResponse {
        match request {
            RelayRequest::GetSecUid => {
                match self
                    .resolver
                    .resolve_with_retry(IDENTITY_ATTEMPTS, self.identity_wait)
                    .await
                {
                    Ok(sec_uid) => RelayResponse::SecUidResult {
                        sec_uid: sec_uid.as_str().to_string(),
                    },
                    Err(e) => RelayResponse::Error {
                        kind: RequestKind::GetSecUid,
                        request_id: None,
                        error: e.to_string(),
                    },
                }
            }
            RelayRequest::GetRepostItems { cursor, request_id } => {
                match self.fetch.fetch_page(&Cursor::from_response(cursor)).await {
                    Ok(result) => RelayResponse::GetRepostItemsResult { request_id, result },
                    Err(e) => RelayResponse::Error {
                        kind: RequestKind::GetRepostItems,
                        request_id: Some(request_id),
                        error: e.to_string(),
                    },
                }
            }
            RelayRequest::RemoveRepostItem {
                item_id,
                request_id,
            } => {
                let outcome = match ItemId::new(item_id) {
                    Ok(id) => self.delete.delete_item(&id).await.map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                };
                match outcome {
                    Ok(result) => RelayResponse::RemoveRepostItemResult { request_id, result },
                    Err(error) => RelayResponse::Error {
                        kind: RequestKind::RemoveRepostItem,
                        request_id: Some(request_id),
                        error,
                    },
                }
            }
        }
    }

    /// Handle a raw boundary payload.
    ///
    /// Payloads that do not parse as a request belong to someone else on the
    /// page and are ignored.
    pub async fn handle_wire(&self, payload: Value) -> Option<Value> {
        match serde_json::from_value::<RelayRequest>(payload) {
            Ok(request) => Some(self.handle(request).await.to_wire()),
            Err(e) => {
                tracing::trace!(error = %e, "ignoring non-request payload");
                None
            }
        }
    }
}
