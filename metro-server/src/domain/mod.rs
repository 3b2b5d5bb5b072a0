//! Domain types for metro networks.
//!
//! Identifiers are validated at construction time, and the raw records
//! mirror what the persistent store hands back for a single network.

mod ids;
mod station;

pub use ids::{InvalidNetworkId, NetworkId, StationId};
pub use station::{Edge, NetworkSummary, RawNetwork, Station, normalize_name};
