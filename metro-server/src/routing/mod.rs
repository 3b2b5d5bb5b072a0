//! Shortest-path routing over a cached network.
//!
//! Plain Dijkstra with early exit: edge weights are validated as
//! non-negative at build time, so the destination's distance is final the
//! first time it leaves the queue.

mod dijkstra;

pub use dijkstra::{Route, RouteError, compute_route, shortest_path};
