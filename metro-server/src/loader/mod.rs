//! Access to the persistent network store.
//!
//! The core needs exactly two things from persistence: the raw records of
//! one network ([`Loader`]) and the list of known networks ([`Catalog`]).
//! Everything here is an adapter around those two operations: a JSON file
//! store, an in-memory store for tests, the timeout/retry wrapper used on
//! every load, and a TTL cache over the catalog.

mod catalog;
mod error;
mod file;
mod memory;
mod retry;

use std::future::Future;

use crate::domain::{NetworkId, NetworkSummary, RawNetwork};

pub use catalog::{CachedCatalog, CatalogConfig, MAX_CATALOG_TTL};
pub use error::{LoadError, LoaderError};
pub use file::FileStore;
pub use memory::InMemoryStore;
pub use retry::{RetryPolicy, fetch_with_retry};

/// Source of raw network data.
pub trait Loader: Send + Sync + 'static {
    /// Fetch all stations and edges of one network.
    fn fetch_network(
        &self,
        network: &NetworkId,
    ) -> impl Future<Output = Result<RawNetwork, LoaderError>> + Send;
}

/// Source of the list of known networks.
pub trait Catalog: Send + Sync + 'static {
    /// List every network the store knows about, ordered by id.
    fn list_networks(&self) -> impl Future<Output = Result<Vec<NetworkSummary>, LoaderError>> + Send;
}

/// A complete store: loads networks and lists them.
pub trait Store: Loader + Catalog + Clone {}

impl<T: Loader + Catalog + Clone> Store for T {}
