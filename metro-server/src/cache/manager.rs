//! Build-on-miss network cache with single-flight loading.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Instant;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::domain::NetworkId;
use crate::loader::{LoadError, Loader, RetryPolicy, fetch_with_retry};
use crate::network::NetworkEntry;

use super::config::CacheConfig;
use super::lru::LruCache;

type BuildResult = Result<Arc<NetworkEntry>, LoadError>;

/// A build that any number of callers can await for the same result.
type SharedBuild = Shared<BoxFuture<'static, BuildResult>>;

type EvictionListener = Box<dyn Fn(&NetworkId) + Send + Sync>;

/// Where a network currently is in its cache lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Not resident and not being built.
    Absent,
    /// A build is in flight.
    Loading,
    /// Built and resident.
    Resident,
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub builds: u64,
    pub build_failures: u64,
    pub evictions: u64,
    pub resident: usize,
    pub capacity: usize,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
    build_failures: AtomicU64,
    evictions: AtomicU64,
}

/// Bookkeeping guarded by the cache mutex.
///
/// The lock is only ever held for map updates, never across a load or a
/// build.
struct CacheState {
    entries: LruCache<NetworkId, Arc<NetworkEntry>>,
    building: HashMap<NetworkId, SharedBuild>,
}

struct Inner<L> {
    loader: L,
    retry: RetryPolicy,
    state: Mutex<CacheState>,
    counters: Counters,
    on_evict: Option<EvictionListener>,
}

impl<L> Inner<L> {
    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Release the cache's reference to an entry that left the cache.
    ///
    /// Queries still holding the entry keep it alive; its memory goes
    /// when the last of them finishes.
    ///
    /// A panicking eviction listener is logged and ignored.
    fn release(&self, network: &NetworkId, entry: Arc<NetworkEntry>) {
        let readers = Arc::strong_count(&entry) - 1;
        debug!(network = %network, readers, "Releasing network entry");
        drop(entry);

        if let Some(listener) = &self.on_evict
            && panic::catch_unwind(AssertUnwindSafe(|| listener(network))).is_err()
        {
            error!(network = %network, "Eviction listener panicked");
        }
    }
}

/// Cache of built networks, keyed by network id.
///
/// Cloning is cheap and every clone shares the same cache; construct one
/// at startup and hand it to whatever serves queries.
pub struct CacheManager<L> {
    inner: Arc<Inner<L>>,
}

impl<L> Clone for CacheManager<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: Loader> CacheManager<L> {
    /// Create an empty cache loading from `loader`.
    pub fn new(loader: L, config: CacheConfig) -> Self {
        Self::assemble(loader, config, None)
    }

    /// Create an empty cache that calls `listener` with the id of every
    /// entry that leaves the cache.
    pub fn with_eviction_listener<F>(loader: L, config: CacheConfig, listener: F) -> Self
    where
        F: Fn(&NetworkId) + Send + Sync + 'static,
    {
        Self::assemble(loader, config, Some(Box::new(listener)))
    }

    fn assemble(loader: L, config: CacheConfig, on_evict: Option<EvictionListener>) -> Self {
        let state = CacheState {
            entries: LruCache::new(config.effective_capacity()),
            building: HashMap::new(),
        };

        Self {
            inner: Arc::new(Inner {
                loader,
                retry: config.retry,
                state: Mutex::new(state),
                counters: Counters::default(),
                on_evict,
            }),
        }
    }

    /// Get a built network, loading and building it on a miss.
    ///
    /// At most one build runs per network id. Callers arriving while a
    /// build is in flight wait for it and receive the same result, error
    /// included. Failed builds leave the cache untouched, so the next
    /// request starts over.
    ///
    /// The build runs as its own task, so it completes even if every
    /// caller waiting on it goes away.
    pub async fn get_or_load(&self, network: &NetworkId) -> Result<Arc<NetworkEntry>, LoadError> {
        let build = {
            let mut state = self.inner.state();

            if let Some(entry) = state.entries.get(network) {
                self.inner.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!(network = %network, "Cache hit");
                return Ok(Arc::clone(entry));
            }
            self.inner.counters.misses.fetch_add(1, Ordering::Relaxed);

            match state.building.get(network) {
                Some(build) => {
                    debug!(network = %network, "Waiting on in-flight build");
                    build.clone()
                }
                None => {
                    debug!(network = %network, "Cache miss, starting build");
                    let build = spawn_build(&self.inner, network.clone());
                    state.building.insert(network.clone(), build.clone());
                    build
                }
            }
        };

        build.await
    }

    /// Get a resident entry without loading or touching recency.
    pub fn peek(&self, network: &NetworkId) -> Option<Arc<NetworkEntry>> {
        self.inner.state().entries.peek(network).cloned()
    }

    /// Check whether a network is resident.
    pub fn contains(&self, network: &NetworkId) -> bool {
        self.inner.state().entries.contains(network)
    }

    /// Lifecycle status of a network.
    pub fn status(&self, network: &NetworkId) -> EntryStatus {
        let state = self.inner.state();
        if state.entries.contains(network) {
            EntryStatus::Resident
        } else if state.building.contains_key(network) {
            EntryStatus::Loading
        } else {
            EntryStatus::Absent
        }
    }

    /// Resident network ids, most recently used first.
    pub fn resident_ids(&self) -> Vec<NetworkId> {
        self.inner
            .state()
            .entries
            .keys()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Drop a network from the cache. Returns whether it was resident.
    ///
    /// An in-flight build for the network is not affected.
    pub fn invalidate(&self, network: &NetworkId) -> bool {
        let removed = self.inner.state().entries.remove(network);
        match removed {
            Some(entry) => {
                info!(network = %network, "Invalidated network");
                self.inner.release(network, entry);
                true
            }
            None => false,
        }
    }

    /// Drop every resident network.
    pub fn close(&self) {
        let drained = self.inner.state().entries.drain();
        info!(count = drained.len(), "Closing network cache");
        for (network, entry) in drained {
            self.inner.release(&network, entry);
        }
    }

    /// Snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        let (resident, capacity) = {
            let state = self.inner.state();
            (state.entries.len(), state.entries.capacity())
        };
        let counters = &self.inner.counters;

        CacheStats {
            hits: counters.hits.load(Ordering::Relaxed),
            misses: counters.misses.load(Ordering::Relaxed),
            builds: counters.builds.load(Ordering::Relaxed),
            build_failures: counters.build_failures.load(Ordering::Relaxed),
            evictions: counters.evictions.load(Ordering::Relaxed),
            resident,
            capacity,
        }
    }

    /// Access the underlying loader.
    pub fn loader(&self) -> &L {
        &self.inner.loader
    }
}

/// Start building a network on its own task.
///
/// The returned future only holds a weak reference to the cache, so an
/// abandoned build never keeps the cache alive.
fn spawn_build<L: Loader>(inner: &Arc<Inner<L>>, network: NetworkId) -> SharedBuild {
    let task = tokio::spawn(run_build(Arc::clone(inner), network.clone()));
    let weak: Weak<Inner<L>> = Arc::downgrade(inner);

    async move {
        match task.await {
            Ok(result) => result,
            Err(e) => {
                warn!(network = %network, error = %e, "Network build task failed");
                if let Some(inner) = weak.upgrade() {
                    inner.state().building.remove(&network);
                    inner.counters.build_failures.fetch_add(1, Ordering::Relaxed);
                }
                Err(LoadError::Interrupted {
                    network,
                    message: e.to_string(),
                })
            }
        }
    }
    .boxed()
    .shared()
}

/// Load, validate and insert one network.
async fn run_build<L: Loader>(inner: Arc<Inner<L>>, network: NetworkId) -> BuildResult {
    let started = Instant::now();
    let result = load_entry(&inner.loader, &network, &inner.retry).await;

    // Clear the in-flight marker and publish the entry under one lock: a
    // caller always finds either the build or the resident entry.
    let evicted = {
        let mut state = inner.state();
        state.building.remove(&network);
        match &result {
            Ok(entry) => state.entries.put(network.clone(), Arc::clone(entry)),
            Err(_) => None,
        }
    };

    match &result {
        Ok(entry) => {
            inner.counters.builds.fetch_add(1, Ordering::Relaxed);
            info!(
                network = %network,
                stations = entry.graph().station_count(),
                arcs = entry.graph().arc_count(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Built network"
            );
        }
        Err(e) => {
            inner.counters.build_failures.fetch_add(1, Ordering::Relaxed);
            warn!(network = %network, error = %e, "Network build failed");
        }
    }

    if let Some((victim, entry)) = evicted {
        inner.counters.evictions.fetch_add(1, Ordering::Relaxed);
        info!(network = %victim, "Evicted least recently used network");
        inner.release(&victim, entry);
    }

    result
}

async fn load_entry<L: Loader>(loader: &L, network: &NetworkId, retry: &RetryPolicy) -> BuildResult {
    let raw = fetch_with_retry(loader, network, retry).await?;

    let entry = NetworkEntry::build(network.clone(), &raw).map_err(|source| {
        LoadError::InvalidData {
            network: network.clone(),
            source,
        }
    })?;

    Ok(Arc::new(entry))
}
