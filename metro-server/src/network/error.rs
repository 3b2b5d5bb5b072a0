//! Build-time validation errors.

use crate::domain::StationId;

/// Raw network data that cannot be turned into a graph or trie.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    /// Dijkstra requires non-negative weights
    #[error("edge {from} -> {to} has negative weight {weight}")]
    NegativeWeight {
        from: StationId,
        to: StationId,
        weight: f64,
    },

    /// NaN or infinite weight
    #[error("edge {from} -> {to} has non-finite weight")]
    NonFiniteWeight { from: StationId, to: StationId },

    /// Total edge weight is too large for a path sum to stay finite
    #[error("total edge weight overflows at edge {from} -> {to}")]
    WeightOverflow { from: StationId, to: StationId },

    /// Edge endpoint is not a known station
    #[error("edge references unknown station {0}")]
    UnknownStation(StationId),

    /// The same station id appears twice
    #[error("duplicate station id {0}")]
    DuplicateStationId(StationId),

    /// Station name is empty after normalization
    #[error("station {0} has an empty name")]
    EmptyStationName(StationId),
}
