//! Application state for the web layer.

use std::sync::Arc;

use crate::service::MetroService;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
pub struct AppState<S> {
    /// Query service over the network cache
    pub service: Arc<MetroService<S>>,

    /// Maximum suggestions returned per request
    pub suggest_limit: usize,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            suggest_limit: self.suggest_limit,
        }
    }
}

impl<S> AppState<S> {
    /// Create a new app state.
    pub fn new(service: Arc<MetroService<S>>, suggest_limit: usize) -> Self {
        Self {
            service,
            suggest_limit,
        }
    }
}
