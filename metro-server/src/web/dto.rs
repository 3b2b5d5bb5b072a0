//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::domain::NetworkSummary;
use crate::routing::Route;

/// Response listing known networks.
#[derive(Debug, Serialize)]
pub struct NetworksResponse {
    pub networks: Vec<NetworkSummary>,
}

/// Request for station suggestions.
#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    /// Name prefix typed so far
    #[serde(default)]
    pub q: String,

    /// Maximum number of results (capped by server config)
    pub limit: Option<usize>,
}

/// Station suggestions.
#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    /// Network id
    pub network: String,

    /// The prefix as received
    pub prefix: String,

    /// Matching station names, alphabetical
    pub stations: Vec<String>,
}

/// Request for a route between two stations.
#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    /// Start station name
    #[serde(default)]
    pub from: String,

    /// Destination station name
    #[serde(default)]
    pub to: String,
}

/// A computed route.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    /// Network id
    pub network: String,

    /// Station names from start to destination
    pub path: Vec<String>,

    /// Total weight of the route
    pub distance: f64,
}

impl RouteResponse {
    /// Build a response from a computed route.
    pub fn from_route(network: &str, route: Route) -> Self {
        Self {
            network: network.to_string(),
            path: route.stations,
            distance: route.distance,
        }
    }
}

/// Cache counters.
#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,

    /// Resident network ids, most recently used first
    pub resident_networks: Vec<String>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,

    /// Machine-readable error kind
    pub kind: String,
}
