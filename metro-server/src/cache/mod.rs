//! Bounded cache of built networks.
//!
//! Networks are built on first use from the store and kept in an LRU of
//! fixed capacity. Concurrent misses for the same network share a single
//! build, and entries are handed out as `Arc`s so an eviction never pulls
//! a graph out from under a query that is still using it.

mod config;
mod lru;
mod manager;
#[cfg(test)]
mod manager_tests;

pub use config::CacheConfig;
pub use lru::LruCache;
pub use manager::{CacheManager, CacheStats, EntryStatus};
