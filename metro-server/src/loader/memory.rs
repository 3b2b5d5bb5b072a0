//! In-memory store for tests and local development.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::domain::{NetworkId, NetworkSummary, RawNetwork};

use super::error::LoaderError;
use super::{Catalog, Loader};

#[derive(Debug, Default)]
struct MemoryState {
    networks: BTreeMap<NetworkId, RawNetwork>,

    /// Fetch calls per network, failed ones included.
    fetches: HashMap<NetworkId, usize>,

    /// Remaining scripted transient failures per network.
    failures: HashMap<NetworkId, usize>,
}

/// Store that serves networks from memory.
///
/// Counts fetches and can inject latency or transient failures, which
/// makes it useful for exercising the cache's load protocol.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
    latency: Duration,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every fetch by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add or replace a network.
    pub fn insert(&self, network: NetworkId, raw: RawNetwork) {
        self.state().networks.insert(network, raw);
    }

    /// Remove a network.
    pub fn remove(&self, network: &NetworkId) -> Option<RawNetwork> {
        self.state().networks.remove(network)
    }

    /// Make the next `count` fetches of `network` fail as unavailable.
    pub fn fail_next(&self, network: NetworkId, count: usize) {
        self.state().failures.insert(network, count);
    }

    /// Number of fetches issued for `network`.
    pub fn fetch_count(&self, network: &NetworkId) -> usize {
        self.state().fetches.get(network).copied().unwrap_or(0)
    }

    /// Number of fetches issued across all networks.
    pub fn total_fetches(&self) -> usize {
        self.state().fetches.values().sum()
    }

    fn take_fetch(&self, network: &NetworkId) -> Result<RawNetwork, LoaderError> {
        let mut state = self.state();
        *state.fetches.entry(network.clone()).or_default() += 1;

        if let Some(remaining) = state.failures.get_mut(network)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(LoaderError::Unavailable {
                message: format!("injected failure for {network}"),
            });
        }

        state
            .networks
            .get(network)
            .cloned()
            .ok_or_else(|| LoaderError::NotFound(network.clone()))
    }
}

impl Loader for InMemoryStore {
    async fn fetch_network(&self, network: &NetworkId) -> Result<RawNetwork, LoaderError> {
        let result = self.take_fetch(network);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        result
    }
}

impl Catalog for InMemoryStore {
    async fn list_networks(&self) -> Result<Vec<NetworkSummary>, LoaderError> {
        let state = self.state();
        Ok(state
            .networks
            .iter()
            .map(|(id, raw)| NetworkSummary {
                id: id.clone(),
                name: raw.name.clone().unwrap_or_else(|| id.to_string()),
            })
            .collect())
    }
}
