//! TTL cache over the network catalog.
//!
//! The catalog changes rarely and listing it may touch every network in
//! the store, so the listing is kept for a short TTL.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::NetworkSummary;

use super::Catalog;
use super::error::LoaderError;

/// Cached catalog listing.
type Listing = Arc<Vec<NetworkSummary>>;

/// Longest listing TTL the underlying cache accepts (1000 years).
pub const MAX_CATALOG_TTL: Duration = Duration::from_secs(1000 * 365 * 24 * 60 * 60);

/// Configuration for the catalog cache.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// How long a listing stays fresh.
    pub ttl: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
        }
    }
}

/// Catalog wrapper that caches the listing.
pub struct CachedCatalog<C> {
    catalog: C,
    listing: MokaCache<(), Listing>,
}

impl<C: Catalog> CachedCatalog<C> {
    /// Create a new cached catalog.
    ///
    /// TTLs above [`MAX_CATALOG_TTL`] are clamped to it.
    pub fn new(catalog: C, config: &CatalogConfig) -> Self {
        let listing = MokaCache::builder()
            .time_to_live(config.ttl.min(MAX_CATALOG_TTL))
            .max_capacity(1)
            .build();

        Self { catalog, listing }
    }

    /// List networks, using the cached listing if it is still fresh.
    ///
    /// Failures are not cached.
    pub async fn list_networks(&self) -> Result<Listing, LoaderError> {
        if let Some(cached) = self.listing.get(&()).await {
            return Ok(cached);
        }

        let networks = Arc::new(self.catalog.list_networks().await?);
        self.listing.insert((), networks.clone()).await;

        Ok(networks)
    }

    /// Drop the cached listing.
    pub fn invalidate(&self) {
        self.listing.invalidate_all();
    }

    /// Access the underlying catalog.
    pub fn inner(&self) -> &C {
        &self.catalog
    }
}
