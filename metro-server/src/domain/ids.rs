//! Network and station identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length of a network id.
const MAX_NETWORK_ID_LEN: usize = 64;

/// Error returned when parsing an invalid network id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid network id: {reason}")]
pub struct InvalidNetworkId {
    reason: &'static str,
}

/// Identifier of one metro network.
///
/// Network ids are 1 to 64 characters drawn from ASCII letters, digits,
/// `-` and `_`. Stores use them as file names, so anything else (path
/// separators, dots) is rejected at construction.
///
/// # Examples
///
/// ```
/// use metro_server::domain::NetworkId;
///
/// let london = NetworkId::parse("london").unwrap();
/// assert_eq!(london.as_str(), "london");
///
/// assert!(NetworkId::parse("").is_err());
/// assert!(NetworkId::parse("../etc").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NetworkId(String);

impl NetworkId {
    /// Parse a network id from a string.
    pub fn parse(s: &str) -> Result<Self, InvalidNetworkId> {
        if s.is_empty() {
            return Err(InvalidNetworkId {
                reason: "must not be empty",
            });
        }

        if s.len() > MAX_NETWORK_ID_LEN {
            return Err(InvalidNetworkId {
                reason: "must be at most 64 characters",
            });
        }

        if !s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(InvalidNetworkId {
                reason: "must contain only ASCII letters, digits, '-' or '_'",
            });
        }

        Ok(NetworkId(s.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NetworkId {
    type Error = InvalidNetworkId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        NetworkId::parse(&value)
    }
}

impl From<NetworkId> for String {
    fn from(id: NetworkId) -> Self {
        id.0
    }
}

impl fmt::Debug for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetworkId({})", self.0)
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a station within one network.
///
/// Station ids are opaque strings assigned by the store. Their ordering is
/// plain lexicographic string ordering, which routing relies on to break
/// ties between equally distant stations.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    /// Create a station id.
    pub fn new(id: impl Into<String>) -> Self {
        StationId(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StationId {
    fn from(s: &str) -> Self {
        StationId(s.to_string())
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
