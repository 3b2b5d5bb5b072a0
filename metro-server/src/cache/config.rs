//! Cache configuration.

use std::num::NonZeroUsize;

use crate::loader::RetryPolicy;

/// Default number of resident networks.
const DEFAULT_CAPACITY: usize = 8;

/// Configuration for the network cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of resident networks. Zero is treated as one.
    pub capacity: usize,

    /// Timeout and retry budget for loads on a miss.
    pub retry: RetryPolicy,
}

impl CacheConfig {
    /// Create a config with the given capacity and default retry policy.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            retry: RetryPolicy::default(),
        }
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Capacity as used by the LRU.
    pub fn effective_capacity(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
