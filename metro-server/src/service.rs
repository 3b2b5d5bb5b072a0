//! Query operations over the network cache.
//!
//! [`MetroService`] is what the transport layer talks to: it resolves a
//! network id through the cache and runs routing or autocomplete against
//! the resulting entry.

use std::sync::Arc;

use tracing::debug;

use crate::autocomplete;
use crate::cache::{CacheConfig, CacheManager, CacheStats};
use crate::domain::{NetworkId, NetworkSummary};
use crate::loader::{CachedCatalog, CatalogConfig, LoadError, LoaderError, Store};
use crate::routing::{self, Route, RouteError};

/// Every failure a query can report.
///
/// The three "not found" flavours are distinct: unknown network, unknown
/// station, and known stations with no path between them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetroError {
    /// Unknown network id
    #[error("network {0} not found")]
    NotFound(NetworkId),

    /// Station name did not resolve
    #[error("station not found: {0}")]
    StationNotFound(String),

    /// Stations exist but are not connected
    #[error("no route from {from} to {to}")]
    NoRoute { from: String, to: String },

    /// Stored network data is invalid
    #[error("invalid network data: {0}")]
    InvalidData(String),

    /// The store could not be reached
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl MetroError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            MetroError::NotFound(_) => "network_not_found",
            MetroError::StationNotFound(_) => "station_not_found",
            MetroError::NoRoute { .. } => "no_route",
            MetroError::InvalidData(_) => "invalid_data",
            MetroError::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

impl From<LoadError> for MetroError {
    fn from(e: LoadError) -> Self {
        match e {
            LoadError::NotFound(network) => MetroError::NotFound(network),
            LoadError::InvalidData { .. } | LoadError::Malformed { .. } => {
                MetroError::InvalidData(e.to_string())
            }
            LoadError::StoreUnavailable { .. } | LoadError::Interrupted { .. } => {
                MetroError::StoreUnavailable(e.to_string())
            }
        }
    }
}

impl From<LoaderError> for MetroError {
    fn from(e: LoaderError) -> Self {
        match e {
            LoaderError::NotFound(network) => MetroError::NotFound(network),
            LoaderError::Malformed { message } => MetroError::InvalidData(message),
            LoaderError::Unavailable { message } => MetroError::StoreUnavailable(message),
        }
    }
}

impl From<RouteError> for MetroError {
    fn from(e: RouteError) -> Self {
        match e {
            RouteError::StationNotFound(name) => MetroError::StationNotFound(name),
            RouteError::NoRoute { from, to } => MetroError::NoRoute { from, to },
        }
    }
}

/// Routing and autocomplete across many networks.
pub struct MetroService<S> {
    cache: CacheManager<S>,
    catalog: CachedCatalog<S>,
}

impl<S: Store> MetroService<S> {
    /// Create a service over a store.
    pub fn new(store: S, cache: CacheConfig, catalog: &CatalogConfig) -> Self {
        Self {
            cache: CacheManager::new(store.clone(), cache),
            catalog: CachedCatalog::new(store, catalog),
        }
    }

    /// Create a service around an existing cache.
    pub fn with_cache(cache: CacheManager<S>, catalog: &CatalogConfig) -> Self {
        let store = cache.loader().clone();
        Self {
            cache,
            catalog: CachedCatalog::new(store, catalog),
        }
    }

    /// List known networks.
    pub async fn list_networks(&self) -> Result<Arc<Vec<NetworkSummary>>, MetroError> {
        Ok(self.catalog.list_networks().await?)
    }

    /// Station names in a network starting with `prefix`.
    pub async fn suggest_stations(
        &self,
        network: &NetworkId,
        prefix: &str,
        limit: Option<usize>,
    ) -> Result<Vec<String>, MetroError> {
        let entry = self.cache.get_or_load(network).await?;
        let names = autocomplete::suggest(&entry, prefix, limit);
        debug!(network = %network, prefix, results = names.len(), "Suggested stations");
        Ok(names)
    }

    /// Shortest route between two named stations of a network.
    pub async fn compute_route(
        &self,
        network: &NetworkId,
        start: &str,
        end: &str,
    ) -> Result<Route, MetroError> {
        // Holding the Arc keeps the entry alive even if it is evicted
        // while the search runs.
        let entry = self.cache.get_or_load(network).await?;
        let route = routing::compute_route(&entry, start, end)?;
        debug!(
            network = %network,
            start,
            end,
            hops = route.stations.len(),
            distance = route.distance,
            "Computed route"
        );
        Ok(route)
    }

    /// Cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The underlying cache.
    pub fn cache(&self) -> &CacheManager<S> {
        &self.cache
    }

    /// Release every cached network.
    pub fn close(&self) {
        self.cache.close();
        self.catalog.invalidate();
    }
}
