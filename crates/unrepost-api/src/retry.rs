//! Retry classification and backoff policy shared by the fetch and delete
//! engines.

use crate::error::ClientError;
use std::time::Duration;
use unrepost_core::config::RetryConfig;

/// How long to wait before the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Generic transient failure: `base * 2^(attempt-1)`
    Exponential,
    /// The server-unavailable status code waits a fixed interval regardless
    /// of the attempt index
    ServerUnavailable,
}

/// Classified result of a single attempt.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The attempt produced a usable result
    Success(T),
    /// Transient failure; retry until the attempt ceiling
    Retryable {
        /// The failure to surface if this turns out to be the last attempt
        error: ClientError,
        /// Backoff class for the wait before the next attempt
        backoff: Backoff,
    },
    /// Failure that retrying cannot fix; surfaced immediately
    Fatal(ClientError),
}

/// Bounded-retry policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts per operation (first try included)
    pub max_attempts: u32,
    /// Base delay for exponential backoff
    pub base_backoff: Duration,
    /// Fixed delay for the server-unavailable class
    pub unavailable_backoff: Duration,
}

impl RetryPolicy {
    /// Delay before the attempt that follows `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32, backoff: Backoff) -> Duration {
        match backoff {
            Backoff::Exponential => {
                let multiplier = 2u32.saturating_pow(attempt.saturating_sub(1));
                self.base_backoff.saturating_mul(multiplier)
            }
            Backoff::ServerUnavailable => self.unavailable_backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_backoff: Duration::from_millis(config.base_backoff_ms),
            unavailable_backoff: Duration::from_millis(config.unavailable_backoff_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.delay_for(1, Backoff::Exponential),
            Duration::from_millis(1000)
        );
        assert_eq!(
            policy.delay_for(2, Backoff::Exponential),
            Duration::from_millis(2000)
        );
        assert_eq!(
            policy.delay_for(3, Backoff::Exponential),
            Duration::from_millis(4000)
        );
    }

    #[test]
    fn test_server_unavailable_backoff_is_fixed() {
        let policy = RetryPolicy::default();
        for attempt in 1..=3 {
            assert_eq!(
                policy.delay_for(attempt, Backoff::ServerUnavailable),
                Duration::from_millis(2000)
            );
        }
    }

    #[test]
    fn test_policy_from_config() {
        let config = RetryConfig {
            max_attempts: 5,
            base_backoff_ms: 100,
            unavailable_backoff_ms: 250,
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(
            policy.delay_for(2, Backoff::Exponential),
            Duration::from_millis(200)
        );
        assert_eq!(
            policy.delay_for(2, Backoff::ServerUnavailable),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_at_least_one_attempt() {
        let config = RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        };
        assert_eq!(RetryPolicy::from(&config).max_attempts, 1);
    }
}
