//! Single-item delete engine with bounded retry.

use crate::error::ClientError;
use crate::retry::{Backoff, Outcome, RetryPolicy};
use crate::transport::RepostTransport;
use crate::wire::{DeleteEnvelope, STATUS_OK, STATUS_SERVER_UNAVAILABLE};
use std::sync::Arc;
use unrepost_core::ItemId;

/// Deletes reposts one item at a time.
pub struct DeleteEngine {
    transport: Arc<dyn RepostTransport>,
    policy: RetryPolicy,
}

impl DeleteEngine {
    /// Create a delete engine.
    #[must_use]
    pub fn new(transport: Arc<dyn RepostTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Delete a single repost.
    ///
    /// Same retry discipline as the fetch engine: transport failures back off
    /// exponentially, the server-unavailable status waits a fixed interval,
    /// any other application status is fatal. There is no partial-success
    /// state for one item; anything but a success envelope after the attempt
    /// ceiling is an error.
    pub async fn delete_item(&self, item_id: &ItemId) -> Result<bool, ClientError> {
        let mut last_error: Option<ClientError> = None;

        for attempt in 1..=self.policy.max_attempts {
            let outcome = match self.transport.remove_repost(item_id).await {
                Ok(envelope) => Self::classify(&envelope),
                Err(e) => Outcome::Retryable {
                    error: e.into(),
                    backoff: Backoff::Exponential,
                },
            };

            match outcome {
                Outcome::Success(()) => {
                    tracing::debug!(item = item_id.as_str(), "repost deleted");
                    return Ok(true);
                }
                Outcome::Fatal(e) => {
                    tracing::error!(item = item_id.as_str(), error = %e, "delete failed");
                    return Err(e);
                }
                Outcome::Retryable { error, backoff } => {
                    if attempt < self.policy.max_attempts {
                        let delay = self.policy.delay_for(attempt, backoff);
                        tracing::warn!(
                            attempt,
                            max = self.policy.max_attempts,
                            item = item_id.as_str(),
                            error = %error,
                            "delete attempt failed, retrying in {:?}",
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

    fn classify(envelope: &DeleteEnvelope) -> Outcome<()> {
        match envelope.status_code {
            STATUS_OK => Outcome::Success(()),
            STATUS_SERVER_UNAVAILABLE => Outcome::Retryable {
                error: ClientError::Api {
                    code: STATUS_SERVER_UNAVAILABLE,
                    message: "server transiently unavailable".to_string(),
                },
                backoff: Backoff::ServerUnavailable,
            },
            code => Outcome::Fatal(ClientError::Api {
                code,
                message: "delete request rejected".to_string(),
            }),
        }
    }
}
