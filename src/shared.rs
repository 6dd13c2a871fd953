//! Thread-shareable wrapper around [`NetTree`]
//!
//! `NetTree` has no internal synchronization and does not support concurrent
//! mutation: inserting takes `&mut self`, so callers must provide their own
//! exclusion before sharing one across threads. This wrapper is one such
//! caller-side discipline, a single-writer/multi-reader lock around the
//! whole tree. Every insert serializes on the write lock; lookups hand back
//! owned copies of the value since the read guard cannot outlive the call.

use crate::trie::{NetTree, TrieNode};
use crate::Result;
use ipnetwork::IpNetwork;
use parking_lot::RwLock;
use std::net::IpAddr;

/// A [`NetTree`] behind a read-write lock
///
/// Writers are exclusive; the tree underneath is never mutated concurrently.
#[derive(Debug)]
pub struct SharedNetTree<T> {
    inner: RwLock<NetTree<T>>,
}

impl<T> SharedNetTree<T> {
    /// Create an empty shared tree
    pub fn new() -> Self {
        SharedNetTree {
            inner: RwLock::new(NetTree::new()),
        }
    }

    /// Insert a network, replacing any identical earlier network
    pub fn insert(&self, network: IpNetwork, value: T) {
        self.inner.write().insert(network, value);
    }

    /// Parse a network in CIDR notation and insert it
    pub fn add_net(&self, cidr: &str, value: T) -> Result<()> {
        self.inner.write().add_net(cidr, value).map(|_| ())
    }

    /// Number of distinct networks stored
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if no network has been stored
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Run `f` against the node for `network` while holding the write lock
    pub fn insert_with<R>(
        &self,
        network: IpNetwork,
        value: T,
        f: impl FnOnce(&mut TrieNode<T>) -> R,
    ) -> R {
        f(self.inner.write().insert(network, value))
    }

    /// Consume the wrapper and return the tree
    pub fn into_inner(self) -> NetTree<T> {
        self.inner.into_inner()
    }
}

impl<T: Clone> SharedNetTree<T> {
    /// Find the most specific network containing `addr`
    pub fn lookup(&self, addr: IpAddr) -> Option<(T, IpNetwork)> {
        let tree = self.inner.read();
        tree.lookup(addr).map(|m| (m.value.clone(), m.network))
    }

    /// Parse an address and look it up
    pub fn lookup_str(&self, input: &str) -> Result<Option<(T, IpNetwork)>> {
        let tree = self.inner.read();
        let found = tree
            .lookup_str(input)?
            .map(|m| (m.value.clone(), m.network));
        Ok(found)
    }
}

impl<T> Default for SharedNetTree<T> {
    fn default() -> Self {
        SharedNetTree::new()
    }
}

impl<T> From<NetTree<T>> for SharedNetTree<T> {
    fn from(tree: NetTree<T>) -> Self {
        SharedNetTree {
            inner: RwLock::new(tree),
        }
    }
}
