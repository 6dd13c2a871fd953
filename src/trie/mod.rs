//! Twin binary trie for longest-prefix matching
//!
//! This implements an uncompressed binary trie per address family where:
//! - Each level consumes one address bit, most significant first
//! - A node carries a value when an inserted network ends exactly there
//! - Lookups remember the deepest value seen on the way down

mod family;
mod node;
mod tree;

pub use family::{AddressFamily, V4, V6};
pub use node::TrieNode;
pub use tree::{FamilyTrie, Ipv4Trie, Ipv6Trie, NetMatch, NetTree};
