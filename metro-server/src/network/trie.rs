//! Arena-backed prefix trie over station names.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{Station, normalize_name};

/// Index of a node in the trie arena.
type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TrieNode {
    children: BTreeMap<char, NodeId>,
    terminal: bool,

    /// Display names whose normalized form ends at this node.
    names: BTreeSet<String>,
}

/// Prefix index from normalized names to display names.
///
/// Nodes live in a single `Vec` and refer to their children by index.
/// Only parents point at children, so the structure is a tree by
/// construction and is released in one go when the trie is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trie {
    nodes: Vec<TrieNode>,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    /// Create a trie holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
        }
    }

    /// Insert a display name under its normalized form.
    pub fn insert(&mut self, display_name: &str) {
        let mut node = ROOT;
        for ch in normalize_name(display_name).chars() {
            node = match self.nodes[node].children.get(&ch) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[node].children.insert(ch, child);
                    child
                }
            };
        }

        let end = &mut self.nodes[node];
        end.terminal = true;
        end.names.insert(display_name.to_string());
    }

    /// Walk the trie along an already normalized prefix.
    fn walk(&self, normalized: &str) -> Option<NodeId> {
        normalized
            .chars()
            .try_fold(ROOT, |node, ch| self.nodes[node].children.get(&ch).copied())
    }

    /// All display names under `prefix`, sorted lexicographically.
    ///
    /// The prefix is normalized the same way names are on insert. An empty
    /// prefix matches every name.
    pub fn names_with_prefix(&self, prefix: &str) -> Vec<String> {
        let Some(start) = self.walk(&normalize_name(prefix)) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            let node = &self.nodes[node];
            if node.terminal {
                found.extend(node.names.iter().cloned());
            }
            stack.extend(node.children.values().copied());
        }

        found.sort();
        found.dedup();
        found
    }

    /// Check whether a name (in any casing) is stored.
    pub fn contains(&self, name: &str) -> bool {
        self.walk(&normalize_name(name))
            .is_some_and(|node| self.nodes[node].terminal)
    }

    /// Number of distinct display names stored.
    pub fn len(&self) -> usize {
        self.nodes.iter().map(|n| n.names.len()).sum()
    }

    /// Returns true if no names are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of nodes in the arena, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Builder that indexes station names into a [`Trie`].
#[derive(Debug, Default)]
pub struct TrieBuilder {
    trie: Trie,
}

impl TrieBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a trie from a set of stations.
    pub fn build_from(stations: &[Station]) -> Trie {
        stations
            .iter()
            .fold(Self::new(), |builder, station| builder.add(station))
            .build()
    }

    /// Index one station's name.
    pub fn add(mut self, station: &Station) -> Self {
        self.trie.insert(&station.name);
        self
    }

    /// Finish building.
    pub fn build(self) -> Trie {
        self.trie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trie_of(names: &[&str]) -> Trie {
        let mut trie = Trie::new();
        for name in names {
            trie.insert(name);
        }
        trie
    }

    #[test]
    fn prefix_match_is_sorted_and_case_insensitive() {
        let trie = trie_of(&["Station Square", "Other", "Station A", "Station Central"]);

        assert_eq!(
            trie.names_with_prefix("sta"),
            vec!["Station A", "Station Central", "Station Square"]
        );
        assert_eq!(trie.names_with_prefix("STATION C"), vec!["Station Central"]);
    }

    #[test]
    fn missing_prefix_returns_empty() {
        let trie = trie_of(&["Alpha", "Beta"]);
        assert!(trie.names_with_prefix("gamma").is_empty());
        assert!(trie.names_with_prefix("alphabet").is_empty());
    }

    #[test]
    fn empty_prefix_returns_everything() {
        let trie = trie_of(&["Beta", "Alpha"]);
        assert_eq!(trie.names_with_prefix(""), vec!["Alpha", "Beta"]);
        assert_eq!(trie.names_with_prefix("   "), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn case_variants_share_a_node() {
        let trie = trie_of(&["Bank", "BANK"]);

        assert_eq!(trie.names_with_prefix("b"), vec!["BANK", "Bank"]);
        assert_eq!(trie.len(), 2);
        // root + b, a, n, k
        assert_eq!(trie.node_count(), 5);
    }

    #[test]
    fn exact_name_counts_as_prefix() {
        let trie = trie_of(&["Bank", "Bankside"]);
        assert_eq!(trie.names_with_prefix("bank"), vec!["Bank", "Bankside"]);
        assert_eq!(trie.names_with_prefix("banks"), vec!["Bankside"]);
    }

    #[test]
    fn contains_checks_terminal_nodes() {
        let trie = trie_of(&["Bankside"]);
        assert!(trie.contains("BANKSIDE"));
        assert!(!trie.contains("bank"));
    }

    #[test]
    fn builder_indexes_station_names() {
        let trie = TrieBuilder::build_from(&[
            Station::new("1", "Oxford Circus"),
            Station::new("2", "Old Street"),
        ]);

        assert_eq!(trie.names_with_prefix("o"), vec!["Old Street", "Oxford Circus"]);
        assert!(!trie.is_empty());
    }

    #[test]
    fn non_ascii_names() {
        let trie = trie_of(&["Étoile", "Europe"]);
        assert_eq!(trie.names_with_prefix("ét"), vec!["Étoile"]);
        assert_eq!(trie.names_with_prefix("É"), vec!["Étoile"]);
    }
}
