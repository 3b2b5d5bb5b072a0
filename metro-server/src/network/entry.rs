//! The cached unit: graph and trie of one network.

use chrono::{DateTime, Utc};

use crate::domain::{NetworkId, RawNetwork};

use super::error::BuildError;
use super::graph::{Graph, GraphBuilder};
use super::trie::{Trie, TrieBuilder};

/// Fully built, immutable representation of one network.
///
/// Graph and trie are always built, cached and evicted together.
#[derive(Debug)]
pub struct NetworkEntry {
    network_id: NetworkId,
    name: Option<String>,
    graph: Graph,
    trie: Trie,
    built_at: DateTime<Utc>,
}

impl NetworkEntry {
    /// Build an entry from raw store data.
    ///
    /// Fails without producing anything if any record is invalid.
    pub fn build(network_id: NetworkId, raw: &RawNetwork) -> Result<Self, BuildError> {
        let graph = GraphBuilder::build_from(&raw.stations, &raw.edges)?;
        let trie = TrieBuilder::build_from(&raw.stations);

        Ok(Self {
            network_id,
            name: raw.name.clone(),
            graph,
            trie,
            built_at: Utc::now(),
        })
    }

    pub fn network_id(&self) -> &NetworkId {
        &self.network_id
    }

    /// Network name as given by the store.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Compare graph and trie contents, ignoring build time.
    pub fn same_contents(&self, other: &NetworkEntry) -> bool {
        self.network_id == other.network_id && self.graph == other.graph && self.trie == other.trie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Edge, Station, StationId};

    fn raw() -> RawNetwork {
        RawNetwork {
            name: Some("Test".to_string()),
            stations: vec![Station::new("A", "Alpha"), Station::new("B", "Beta")],
            edges: vec![Edge::new("A", "B", 2.0)],
        }
    }

    #[test]
    fn builds_graph_and_trie_together() {
        let id = NetworkId::parse("test").unwrap();
        let entry = NetworkEntry::build(id.clone(), &raw()).unwrap();

        assert_eq!(entry.network_id(), &id);
        assert_eq!(entry.name(), Some("Test"));
        assert_eq!(entry.graph().station_count(), 2);
        assert_eq!(entry.trie().len(), 2);
        assert_eq!(
            entry.graph().neighbors(&StationId::from("A")),
            &[(StationId::from("B"), 2.0)]
        );
    }

    #[test]
    fn rebuild_from_same_data_is_equivalent() {
        let id = NetworkId::parse("test").unwrap();
        let first = NetworkEntry::build(id.clone(), &raw()).unwrap();
        let second = NetworkEntry::build(id, &raw()).unwrap();

        assert!(first.same_contents(&second));
    }

    #[test]
    fn invalid_data_builds_nothing() {
        let mut data = raw();
        data.edges.push(Edge::new("B", "A", -1.0));

        let result = NetworkEntry::build(NetworkId::parse("test").unwrap(), &data);
        assert!(matches!(result, Err(BuildError::NegativeWeight { .. })));
    }
}
