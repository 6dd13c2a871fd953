//! # shrubnet
//!
//! Longest-prefix-match lookup of IP addresses against a set of networks.
//!
//! Networks in CIDR notation are stored with a value of any type in a pair
//! of binary tries, one over the 32-bit IPv4 space and one over the 128-bit
//! IPv6 space. A lookup walks the queried address bit by bit and returns the
//! value of the most specific stored network containing it, along with that
//! network.
//!
//! ## Core Concepts
//!
//! - **NetTree**: the two-rooted trie; the family is picked from the address
//! - **NetMatch**: a lookup hit, carrying the value and the matched network
//! - **SharedNetTree**: a `NetTree` behind a read-write lock
//! - **NetworkTable**: a JSON file of networks the CLI builds trees from
//!
//! ## Example
//!
//! ```
//! use shrubnet::NetTree;
//!
//! let mut tree = NetTree::new();
//! tree.add_net("10.10.10.1/18", "Hello")?;
//!
//! let found = tree.lookup_str("10.10.10.3")?.expect("inside 10.10.0.0/18");
//! assert_eq!(*found.value, "Hello");
//! assert_eq!(found.network.to_string(), "10.10.0.0/18");
//! # Ok::<(), shrubnet::Error>(())
//! ```

pub mod parse;
pub mod shared;
pub mod table;
pub mod trie;

mod error;

pub use error::{Error, Result};
pub use parse::{parse_address, parse_network};
pub use shared::SharedNetTree;
pub use table::{NetworkTable, TableEntry};
pub use trie::{
    AddressFamily, FamilyTrie, Ipv4Trie, Ipv6Trie, NetMatch, NetTree, TrieNode, V4, V6,
};

/// Re-exported so callers can build networks without depending on ipnetwork
pub use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};
