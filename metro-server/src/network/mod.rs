//! In-memory representation of one metro network.
//!
//! A [`NetworkEntry`] bundles the adjacency-list [`Graph`] used for routing
//! with the prefix [`Trie`] used for autocomplete. Both are built together
//! from the store's raw records and are immutable afterwards, so an entry
//! can be shared between any number of concurrent queries.

mod entry;
mod error;
mod graph;
mod trie;

pub use entry::NetworkEntry;
pub use error::BuildError;
pub use graph::{Graph, GraphBuilder};
pub use trie::{Trie, TrieBuilder};
