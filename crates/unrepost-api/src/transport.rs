//! HTTP transport for the platform's internal API.
//!
//! The [`RepostTransport`] trait is the seam between the engines and the
//! network; tests substitute scripted implementations, production code uses
//! [`HttpTransport`] over `reqwest`.

use crate::wire::{DeleteEnvelope, ItemListEnvelope};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use unrepost_core::config::ApiConfig;
use unrepost_core::{Cursor, ItemId, SecUid};

/// Application id attached to every request, as the web client sends it.
const AID: &str = "1988";

/// Page size requested from the listing endpoint.
const PAGE_COUNT: &str = "30";

/// Transport-level failures. These are always classified as retryable by the
/// engines; application-level status codes live in the envelopes instead.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Non-success HTTP status
    #[error("HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Connection, timeout, or body decode failure
    #[error("request failed: {0}")]
    Request(String),
}

/// Low-level access to the two platform endpoints.
#[async_trait]
pub trait RepostTransport: Send + Sync {
    /// Fetch one page of the repost listing for `sec_uid` at `cursor`.
    async fn list_reposts(
        &self,
        sec_uid: &SecUid,
        cursor: &Cursor,
    ) -> Result<ItemListEnvelope, TransportError>;

    /// Request deletion of a single repost.
    async fn remove_repost(&self, item_id: &ItemId) -> Result<DeleteEnvelope, TransportError>;
}

/// `reqwest`-backed transport. Credentials are the ambient browser session
/// cookies; this client carries none of its own.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport from API settings.
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::Request(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RepostTransport for HttpTransport {
    async fn list_reposts(
        &self,
        sec_uid: &SecUid,
        cursor: &Cursor,
    ) -> Result<ItemListEnvelope, TransportError> {
        let url = format!("{}/api/repost/item_list/", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("aid", AID),
                ("count", PAGE_COUNT),
                ("coverFormat", "2"),
                ("cursor", cursor.as_str()),
                ("needPinnedItemIds", "true"),
                ("post_item_list_request_type", "0"),
                ("secUid", sec_uid.as_str()),
            ])
            .header(ACCEPT, "*/*")
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        resp.json::<ItemListEnvelope>()
            .await
            .map_err(|e| TransportError::Request(format!("invalid listing body: {e}")))
    }

    async fn remove_repost(&self, item_id: &ItemId) -> Result<DeleteEnvelope, TransportError> {
        let url = format!("{}/tiktok/v1/upvote/delete", self.base_url);
        let resp = self
            .http
            .post(&url)
            .query(&[("aid", AID), ("item_id", item_id.as_str())])
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("")
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        resp.json::<DeleteEnvelope>()
            .await
            .map_err(|e| TransportError::Request(format!("invalid delete body: {e}")))
    }
}
