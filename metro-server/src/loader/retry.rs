//! Bounded, retrying fetch.

use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::{NetworkId, RawNetwork};

use super::Loader;
use super::error::{LoadError, LoaderError};

/// Timeout and retry budget for store fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound on a single fetch attempt.
    pub timeout: Duration,

    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,

    /// Delay before the first retry. Doubles on each later retry.
    pub initial_backoff: Duration,

    /// Cap on the delay between retries.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the total number of attempts.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the initial and maximum backoff.
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
        }
    }
}

/// Fetch a network, retrying transient failures.
///
/// Each attempt is bounded by the policy timeout. Timeouts and
/// [`LoaderError::Unavailable`] are retried with exponential backoff;
/// anything else fails immediately. Running out of attempts yields
/// [`LoadError::StoreUnavailable`].
pub async fn fetch_with_retry<L: Loader>(
    loader: &L,
    network: &NetworkId,
    policy: &RetryPolicy,
) -> Result<RawNetwork, LoadError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let message = match tokio::time::timeout(policy.timeout, loader.fetch_network(network)).await
        {
            Ok(Ok(raw)) => {
                debug!(network = %network, attempt, "Fetched network data");
                return Ok(raw);
            }
            Ok(Err(LoaderError::NotFound(id))) => return Err(LoadError::NotFound(id)),
            Ok(Err(LoaderError::Malformed { message })) => {
                return Err(LoadError::Malformed {
                    network: network.clone(),
                    message,
                });
            }
            Ok(Err(LoaderError::Unavailable { message })) => message,
            Err(_) => format!("timed out after {:?}", policy.timeout),
        };

        if attempt >= max_attempts {
            warn!(network = %network, attempts = attempt, error = %message, "Giving up on network fetch");
            return Err(LoadError::StoreUnavailable {
                network: network.clone(),
                attempts: attempt,
                message,
            });
        }

        let delay = policy.backoff(attempt);
        warn!(
            network = %network,
            attempt,
            error = %message,
            retry_in_ms = delay.as_millis() as u64,
            "Network fetch failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
