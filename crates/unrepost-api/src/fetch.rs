//! Paginated fetch engine with bounded retry.

use crate::error::ClientError;
use crate::identity::IdentityResolver;
use crate::retry::{Backoff, Outcome, RetryPolicy};
use crate::transport::{RepostTransport, TransportError};
use crate::wire::{normalize_page, ItemListEnvelope, STATUS_OK, STATUS_SERVER_UNAVAILABLE};
use std::sync::Arc;
use unrepost_core::{Cursor, PageResult};

/// Page size the listing endpoint is asked for; responses never carry more.
pub const PAGE_SIZE: usize = 30;

/// Fetches pages of reposted items.
pub struct FetchEngine {
    transport: Arc<dyn RepostTransport>,
    resolver: Arc<IdentityResolver>,
    policy: RetryPolicy,
    base_url: String,
}

impl FetchEngine {
    /// Create a fetch engine.
    #[must_use]
    pub fn new(
        transport: Arc<dyn RepostTransport>,
        resolver: Arc<IdentityResolver>,
        policy: RetryPolicy,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            resolver,
            policy,
            base_url: base_url.into(),
        }
    }

    /// Fetch one page of reposts at `cursor`.
    ///
    /// A missing identity is surfaced immediately without touching the
    /// network: retrying an absent identity is pointless. Transient failures
    /// (transport errors, server-unavailable status) are retried up to the
    /// policy's attempt ceiling; any other application status code is fatal.
    pub async fn fetch_page(&self, cursor: &Cursor) -> Result<PageResult, ClientError> {
        let sec_uid = self.resolver.resolve()?;

        let mut last_error: Option<ClientError> = None;

        for attempt in 1..=self.policy.max_attempts {
            let outcome = match self.transport.list_reposts(&sec_uid, cursor).await {
                Ok(envelope) => self.classify(envelope),
                Err(e) => Outcome::Retryable {
                    error: e.into(),
                    backoff: Backoff::Exponential,
                },
            };

            match outcome {
                Outcome::Success(page) => {
                    tracing::debug!(
                        cursor = cursor.as_str(),
                        items = page.items.len(),
                        has_more = page.has_more,
                        "fetched repost page"
                    );
                    return Ok(page);
                }
                Outcome::Fatal(e) => {
                    tracing::error!(cursor = cursor.as_str(), error = %e, "fetch failed");
                    return Err(e);
                }
                Outcome::Retryable { error, backoff } => {
                    if attempt < self.policy.max_attempts {
                        let delay = self.policy.delay_for(attempt, backoff);
                        tracing::warn!(
                            attempt,
                            max = self.policy.max_attempts,
                            error = %error,
                            "fetch attempt failed, retrying in {:?}",
                            delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.expect("last_error must be set after exhausting attempts"))
    }

    fn classify(&self, envelope: ItemListEnvelope) -> Outcome<PageResult> {
        match envelope.status_code {
            STATUS_OK => Outcome::Success(normalize_page(envelope, &self.base_url)),
            STATUS_SERVER_UNAVAILABLE => Outcome::Retryable {
                error: ClientError::Api {
                    code: STATUS_SERVER_UNAVAILABLE,
                    message: "server transiently unavailable".to_string(),
                },
                backoff: Backoff::ServerUnavailable,
            },
            code => Outcome::Fatal(ClientError::Api {
                code,
                message: "listing request rejected".to_string(),
            }),
        }
    }
}

impl From<TransportError> for ClientError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Status { status } => ClientError::Http { status },
            TransportError::Request(msg) => ClientError::Request(msg),
        }
    }
}
