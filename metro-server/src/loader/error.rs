//! Store and load error types.

use crate::domain::NetworkId;
use crate::network::BuildError;

/// Errors reported by a store for a single fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoaderError {
    /// The store has no such network
    #[error("network {0} not found")]
    NotFound(NetworkId),

    /// Transient failure; the fetch may succeed if retried
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// The stored data could not be parsed
    #[error("malformed network data: {message}")]
    Malformed { message: String },
}

impl LoaderError {
    /// Whether retrying the same fetch could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, LoaderError::Unavailable { .. })
    }
}

/// Outcome of a failed build-on-miss.
///
/// Cloneable so one failed build can be reported to every caller that
/// was waiting on it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    /// Unknown network id
    #[error("network {0} not found")]
    NotFound(NetworkId),

    /// Records failed graph or trie validation
    #[error("network {network} has invalid data: {source}")]
    InvalidData {
        network: NetworkId,
        source: BuildError,
    },

    /// Records could not be parsed at all
    #[error("network {network} has malformed data: {message}")]
    Malformed { network: NetworkId, message: String },

    /// The retry budget ran out
    #[error("store unavailable for network {network} after {attempts} attempt(s): {message}")]
    StoreUnavailable {
        network: NetworkId,
        attempts: u32,
        message: String,
    },

    /// The build task died before producing a result
    #[error("build of network {network} was interrupted: {message}")]
    Interrupted { network: NetworkId, message: String },
}

impl LoadError {
    /// The network whose load failed.
    pub fn network(&self) -> &NetworkId {
        match self {
            LoadError::NotFound(network)
            | LoadError::InvalidData { network, .. }
            | LoadError::Malformed { network, .. }
            | LoadError::StoreUnavailable { network, .. }
            | LoadError::Interrupted { network, .. } => network,
        }
    }
}
