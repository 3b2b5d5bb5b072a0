//! Dijkstra shortest path.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap, HashSet};

use serde::Serialize;
use tracing::trace;

use crate::domain::StationId;
use crate::network::{Graph, NetworkEntry};

/// Query-local routing failures. Neither affects cache state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The name matches no station, ignoring case
    #[error("station not found: {0}")]
    StationNotFound(String),

    /// Both stations exist but are not connected
    #[error("no route from {from} to {to}")]
    NoRoute { from: String, to: String },
}

/// A shortest route between two stations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// Display names from start to destination, both included.
    pub stations: Vec<String>,

    /// Station ids along the same path.
    pub station_ids: Vec<StationId>,

    /// Sum of edge weights along the path.
    pub distance: f64,
}

/// Queue entry: a station and its tentative distance.
#[derive(Debug)]
struct Candidate<'a> {
    distance: f64,
    station: &'a StationId,
}

impl Ord for Candidate<'_> {
    /// Reversed so the max-heap pops the smallest distance first, and
    /// among equal distances the smallest station id.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.station.cmp(self.station))
    }
}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}

/// Compute the shortest route between two stations named by the caller.
///
/// Names are matched case-insensitively. Ties are broken
/// deterministically: equally distant stations are settled in station id
/// order, and a station keeps the first predecessor that reached it at
/// its final distance. Repeated calls on the same entry therefore always
/// return the same route.
pub fn compute_route(entry: &NetworkEntry, start: &str, end: &str) -> Result<Route, RouteError> {
    let graph = entry.graph();
    let from = graph
        .resolve(start)
        .ok_or_else(|| RouteError::StationNotFound(start.to_string()))?;
    let to = graph
        .resolve(end)
        .ok_or_else(|| RouteError::StationNotFound(end.to_string()))?;

    let (station_ids, distance) =
        shortest_path(graph, from, to).ok_or_else(|| RouteError::NoRoute {
            from: start.to_string(),
            to: end.to_string(),
        })?;

    let stations = station_ids
        .iter()
        .map(|id| {
            graph
                .station_name(id)
                .map_or_else(|| id.to_string(), str::to_string)
        })
        .collect();

    Ok(Route {
        stations,
        station_ids,
        distance,
    })
}

/// Shortest path between two station ids, with its total weight.
///
/// Returns `None` if `to` is unreachable from `from`.
pub fn shortest_path(
    graph: &Graph,
    from: &StationId,
    to: &StationId,
) -> Option<(Vec<StationId>, f64)> {
    let mut best: HashMap<&StationId, f64> = HashMap::new();
    let mut previous: HashMap<&StationId, &StationId> = HashMap::new();
    let mut settled: HashSet<&StationId> = HashSet::new();
    let mut queue = BinaryHeap::new();

    best.insert(from, 0.0);
    queue.push(Candidate {
        distance: 0.0,
        station: from,
    });

    while let Some(Candidate { distance, station }) = queue.pop() {
        // Stale queue entry for an already settled station
        if !settled.insert(station) {
            continue;
        }

        if station == to {
            trace!(settled = settled.len(), distance, "Reached destination");
            return Some((reconstruct(&previous, from, to), distance));
        }

        for (neighbor, weight) in graph.neighbors(station) {
            if settled.contains(neighbor) {
                continue;
            }

            let tentative = distance + weight;
            let improved = match best.entry(neighbor) {
                Entry::Occupied(mut known) => {
                    if tentative < *known.get() {
                        known.insert(tentative);
                        true
                    } else {
                        false
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(tentative);
                    true
                }
            };

            if improved {
                previous.insert(neighbor, station);
                queue.push(Candidate {
                    distance: tentative,
                    station: neighbor,
                });
            }
        }
    }

    trace!(settled = settled.len(), "Queue exhausted before destination");
    None
}

/// Walk predecessors back from `to` and return the path in travel order.
fn reconstruct(
    previous: &HashMap<&StationId, &StationId>,
    from: &StationId,
    to: &StationId,
) -> Vec<StationId> {
    let mut path = vec![to.clone()];
    let mut current = to;
    while current != from {
        match previous.get(current) {
            Some(&prev) => {
                path.push(prev.clone());
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
