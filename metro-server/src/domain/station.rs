//! Raw station and connection records.

use serde::{Deserialize, Serialize};

use super::ids::{NetworkId, StationId};

/// A station as persisted by the store.
///
/// The owning network is implied by the [`RawNetwork`] it arrives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
}

impl Station {
    /// Create a station record.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: StationId::new(id),
            name: name.into(),
        }
    }
}

/// A weighted connection between two stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: StationId,
    pub to: StationId,
    pub weight: f64,

    /// One-way segment. Undirected unless the store says otherwise.
    #[serde(default)]
    pub directed: bool,
}

impl Edge {
    /// Create an undirected edge.
    pub fn new(from: impl Into<String>, to: impl Into<String>, weight: f64) -> Self {
        Self {
            from: StationId::new(from),
            to: StationId::new(to),
            weight,
            directed: false,
        }
    }

    /// Create an edge traversable only from `from` to `to`.
    pub fn directed(from: impl Into<String>, to: impl Into<String>, weight: f64) -> Self {
        Self {
            directed: true,
            ..Self::new(from, to, weight)
        }
    }
}

/// Everything the store holds for one network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNetwork {
    /// Human-readable network name, if the store has one.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub stations: Vec<Station>,

    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Catalog listing entry for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub id: NetworkId,
    pub name: String,
}

/// Normalize a station name (or query prefix) for matching.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
