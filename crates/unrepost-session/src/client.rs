//! The client seam the session drives.
//!
//! The session never cares where the engines run. [`EngineClient`] calls
//! them in-process; the relay's client satisfies the same trait from the
//! other side of the page boundary.

use async_trait::async_trait;
use unrepost_api::{ClientError, DeleteEngine, FetchEngine};
use unrepost_core::{Cursor, ItemId, PageResult};
use unrepost_relay::RelayClient;

/// Fetch-and-delete operations as the session sees them.
#[async_trait]
pub trait RepostClient: Send + Sync {
    /// Fetch one page of reposts at `cursor`.
    async fn fetch_page(&self, cursor: &Cursor) -> Result<PageResult, ClientError>;

    /// Delete a single repost. `Ok(true)` means the item is gone.
    async fn delete_item(&self, item_id: &ItemId) -> Result<bool, ClientError>;
}

/// In-process client wrapping the engines directly.
pub struct EngineClient {
    fetch: FetchEngine,
    delete: DeleteEngine,
}

impl EngineClient {
    /// Wrap a fetch and a delete engine.
    #[must_use]
    pub fn new(fetch: FetchEngine, delete: DeleteEngine) -> Self {
        Self { fetch, delete }
    }
}

#[async_trait]
impl RepostClient for EngineClient {
    async fn fetch_page(&self, cursor: &Cursor) -> Result<PageResult, ClientError> {
        self.fetch.fetch_page(cursor).await
    }

    async fn delete_item(&self, item_id: &ItemId) -> Result<bool, ClientError> {
        self.delete.delete_item(item_id).await
    }
}

/// Relay-backed client: the engines run in the page world, failures arrive
/// as messages and surface here as [`ClientError::Remote`].
#[async_trait]
impl RepostClient for RelayClient {
    async fn fetch_page(&self, cursor: &Cursor) -> Result<PageResult, ClientError> {
        self.request_items(cursor)
            .await
            .map_err(|e| ClientError::Remote(e.to_string()))
    }

    async fn delete_item(&self, item_id: &ItemId) -> Result<bool, ClientError> {
        self.request_removal(item_id)
            .await
            .map_err(|e| ClientError::Remote(e.to_string()))
    }
}
