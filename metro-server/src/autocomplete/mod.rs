//! Station name autocomplete.

use crate::network::NetworkEntry;

/// Station names starting with `prefix`, ignoring case and surrounding
/// whitespace, sorted lexicographically.
///
/// `limit` caps the number of names returned; `None` returns them all.
/// A prefix that matches nothing yields an empty list.
pub fn suggest(entry: &NetworkEntry, prefix: &str, limit: Option<usize>) -> Vec<String> {
    let mut names = entry.trie().names_with_prefix(prefix);
    if let Some(limit) = limit {
        names.truncate(limit);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NetworkId, RawNetwork, Station};

    fn entry(names: &[&str]) -> NetworkEntry {
        let raw = RawNetwork {
            name: None,
            stations: names
                .iter()
                .enumerate()
                .map(|(i, name)| Station::new(i.to_string(), *name))
                .collect(),
            edges: vec![],
        };
        NetworkEntry::build(NetworkId::parse("test").unwrap(), &raw).unwrap()
    }

    #[test]
    fn prefix_matches_in_alphabetical_order() {
        let network = entry(&["Station Square", "Other", "Station A", "Station Central"]);

        assert_eq!(
            suggest(&network, "sta", None),
            vec!["Station A", "Station Central", "Station Square"]
        );
    }

    #[test]
    fn matching_ignores_case() {
        let network = entry(&["Station A", "Other"]);
        assert_eq!(suggest(&network, "STA", None), vec!["Station A"]);
        assert_eq!(suggest(&network, "oTh", None), vec!["Other"]);
    }

    #[test]
    fn no_match_is_empty() {
        let network = entry(&["Station A", "Other"]);
        assert!(suggest(&network, "xyz", None).is_empty());
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let network = entry(&["Station Square", "Station A", "Station Central"]);
        assert_eq!(
            suggest(&network, "station", Some(2)),
            vec!["Station A", "Station Central"]
        );
        assert!(suggest(&network, "station", Some(0)).is_empty());
    }

    #[test]
    fn empty_prefix_lists_everything() {
        let network = entry(&["Beta", "Alpha"]);
        assert_eq!(suggest(&network, "", None), vec!["Alpha", "Beta"]);
    }
}
