//! Adjacency-list graph of one network.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::domain::{Edge, Station, StationId, normalize_name};

use super::error::BuildError;

/// Weighted station graph.
///
/// Every station has an adjacency list, possibly empty, ordered by
/// neighbour id. Parallel edges between the same pair have already been
/// collapsed to the cheapest one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    adjacency: HashMap<StationId, Vec<(StationId, f64)>>,

    /// Station id → display name.
    names: HashMap<StationId, String>,

    /// Normalized name → station id, for case-insensitive lookup.
    by_name: HashMap<String, StationId>,
}

impl Graph {
    /// Neighbours of a station with the weight of the connecting edge.
    ///
    /// Unknown stations have no neighbours.
    pub fn neighbors(&self, station: &StationId) -> &[(StationId, f64)] {
        self.adjacency
            .get(station)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Display name of a station.
    pub fn station_name(&self, station: &StationId) -> Option<&str> {
        self.names.get(station).map(String::as_str)
    }

    /// Resolve a station name to its id, ignoring case and surrounding
    /// whitespace.
    pub fn resolve(&self, name: &str) -> Option<&StationId> {
        self.by_name.get(&normalize_name(name))
    }

    /// Check whether a station id belongs to this graph.
    pub fn contains(&self, station: &StationId) -> bool {
        self.names.contains_key(station)
    }

    /// Number of stations.
    pub fn station_count(&self) -> usize {
        self.names.len()
    }

    /// Number of directed adjacency entries (an undirected edge counts twice).
    pub fn arc_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }
}

/// Incremental builder for [`Graph`].
///
/// Stations must be added before the edges that reference them.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    names: HashMap<StationId, String>,
    by_name: HashMap<String, StationId>,
    adjacency: HashMap<StationId, BTreeMap<StationId, f64>>,

    /// Sum of every accepted edge weight. Bounds the length of any
    /// simple path, so keeping it finite keeps route distances finite.
    total_weight: f64,
}

impl GraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a full set of stations and edges.
    pub fn build_from(stations: &[Station], edges: &[Edge]) -> Result<Graph, BuildError> {
        let mut builder = Self::new();
        for station in stations {
            builder.add_station(station)?;
        }
        for edge in edges {
            builder.add_edge(edge)?;
        }
        Ok(builder.build())
    }

    /// Add a station.
    ///
    /// If two stations share a normalized name, lookups by that name
    /// resolve to the smaller station id.
    pub fn add_station(&mut self, station: &Station) -> Result<(), BuildError> {
        let key = normalize_name(&station.name);
        if key.is_empty() {
            return Err(BuildError::EmptyStationName(station.id.clone()));
        }

        match self.names.entry(station.id.clone()) {
            Entry::Occupied(_) => return Err(BuildError::DuplicateStationId(station.id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(station.name.clone());
            }
        }
        self.adjacency.entry(station.id.clone()).or_default();

        match self.by_name.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(station.id.clone());
            }
            Entry::Occupied(mut slot) => {
                warn!(
                    name = %station.name,
                    first = %slot.get(),
                    second = %station.id,
                    "Two stations share a name; lookups use the smaller id"
                );
                if station.id < *slot.get() {
                    slot.insert(station.id.clone());
                }
            }
        }

        Ok(())
    }

    /// Add an edge.
    ///
    /// Undirected edges are stored in both directions. When the same pair
    /// is connected more than once, the minimum weight is kept. Self-loops
    /// never shorten a path and are dropped.
    pub fn add_edge(&mut self, edge: &Edge) -> Result<(), BuildError> {
        if !edge.weight.is_finite() {
            return Err(BuildError::NonFiniteWeight {
                from: edge.from.clone(),
                to: edge.to.clone(),
            });
        }
        if edge.weight < 0.0 {
            return Err(BuildError::NegativeWeight {
                from: edge.from.clone(),
                to: edge.to.clone(),
                weight: edge.weight,
            });
        }
        for endpoint in [&edge.from, &edge.to] {
            if !self.names.contains_key(endpoint) {
                return Err(BuildError::UnknownStation(endpoint.clone()));
            }
        }

        if edge.from == edge.to {
            return Ok(());
        }

        let total_weight = self.total_weight + edge.weight;
        if !total_weight.is_finite() {
            return Err(BuildError::WeightOverflow {
                from: edge.from.clone(),
                to: edge.to.clone(),
            });
        }
        self.total_weight = total_weight;

        self.insert_arc(&edge.from, &edge.to, edge.weight);
        if !edge.directed {
            self.insert_arc(&edge.to, &edge.from, edge.weight);
        }
        Ok(())
    }

    fn insert_arc(&mut self, from: &StationId, to: &StationId, weight: f64) {
        let arcs = self.adjacency.entry(from.clone()).or_default();
        arcs.entry(to.clone())
            .and_modify(|w| *w = w.min(weight))
            .or_insert(weight);
    }

    /// Finish building.
    pub fn build(self) -> Graph {
        let adjacency = self
            .adjacency
            .into_iter()
            .map(|(station, arcs)| (station, arcs.into_iter().collect()))
            .collect();

        Graph {
            adjacency,
            names: self.names,
            by_name: self.by_name,
        }
    }
}
