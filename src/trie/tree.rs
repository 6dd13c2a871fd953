//! Longest-prefix-match trie over both address families

use super::{AddressFamily, TrieNode, V4, V6};
use crate::parse::{parse_address, parse_network};
use crate::Result;
use ipnetwork::IpNetwork;
use std::fmt;
use std::marker::PhantomData;
use std::net::IpAddr;
use tracing::trace;

/// The best match for a looked-up address
#[derive(PartialEq, Eq)]
pub struct NetMatch<'a, T> {
    /// Value stored for the matched network
    pub value: &'a T,
    /// The matched network: the queried address masked to the matched prefix
    pub network: IpNetwork,
}

impl<T> NetMatch<'_, T> {
    /// Length of the matched prefix, i.e. the depth of the matching node
    pub fn prefix_len(&self) -> u8 {
        self.network.prefix()
    }
}

impl<T> Clone for NetMatch<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NetMatch<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for NetMatch<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetMatch")
            .field("value", self.value)
            .field("network", &self.network)
            .finish()
    }
}

/// A binary trie for a single address family
///
/// Networks are stored along the path spelled by their first `prefix` bits.
/// The trie only grows: there is no removal and no path compression.
#[derive(Clone, Debug)]
pub struct FamilyTrie<F: AddressFamily, T> {
    root: TrieNode<T>,
    /// Number of nodes holding a value
    len: usize,
    _family: PhantomData<F>,
}

/// Trie over the IPv4 address space
pub type Ipv4Trie<T> = FamilyTrie<V4, T>;

/// Trie over the IPv6 address space
pub type Ipv6Trie<T> = FamilyTrie<V6, T>;

impl<F: AddressFamily, T> FamilyTrie<F, T> {
    /// Create a new empty trie
    pub fn new() -> Self {
        FamilyTrie {
            root: TrieNode::empty(),
            len: 0,
            _family: PhantomData,
        }
    }

    /// The root node, which holds the value of the `/0` network if any
    pub fn root(&self) -> &TrieNode<T> {
        &self.root
    }

    /// Number of distinct networks stored
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if no network has been stored
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a network, replacing the value of an identical earlier network.
    ///
    /// Returns the node the network ends at.
    pub fn insert(&mut self, network: F::Network, value: T) -> &mut TrieNode<T> {
        let (addr, prefix_len) = F::split(network);

        let mut node = &mut self.root;
        let mut allocated = 0usize;
        for index in 1..=prefix_len {
            let (child, created) = node.child_or_insert(F::bit(addr, index));
            allocated += usize::from(created);
            node = child;
        }
        trace!(?network, allocated, "inserted network");

        if node.set_value(value).is_none() {
            self.len += 1;
        }
        node
    }

    /// Get the value stored for exactly this network
    pub fn get(&self, network: F::Network) -> Option<&T> {
        let (addr, prefix_len) = F::split(network);

        let mut node = &self.root;
        for index in 1..=prefix_len {
            node = node.child(F::bit(addr, index))?;
        }
        node.value()
    }

    /// Find the most specific stored network containing `addr`
    pub fn lookup(&self, addr: F::Addr) -> Option<NetMatch<'_, T>> {
        let mut node = &self.root;
        let mut best = node.value().map(|value| (value, 0));

        for index in 1..=F::BITS {
            node = match node.child(F::bit(addr, index)) {
                Some(child) => child,
                None => break,
            };
            if let Some(value) = node.value() {
                best = Some((value, index));
            }
        }

        best.map(|(value, prefix_len)| NetMatch {
            value,
            network: F::masked(addr, prefix_len),
        })
    }
}

impl<F: AddressFamily, T> Default for FamilyTrie<F, T> {
    fn default() -> Self {
        FamilyTrie::new()
    }
}

/// Longest-prefix-match table for IPv4 and IPv6 networks
///
/// Holds one independent trie per address family. The family is chosen by
/// the parsed address alone; IPv4-mapped IPv6 addresses stay in the IPv6
/// trie.
///
/// ```
/// use shrubnet::NetTree;
///
/// let mut tree = NetTree::new();
/// tree.add_net("192.168.0.0/16", "Larger")?;
/// tree.add_net("192.168.5.0/24", "Smaller")?;
///
/// let found = tree.lookup_str("192.168.5.34")?.unwrap();
/// assert_eq!(*found.value, "Smaller");
/// assert_eq!(found.prefix_len(), 24);
///
/// assert!(tree.lookup_str("10.10.10.10")?.is_none());
/// # Ok::<(), shrubnet::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct NetTree<T> {
    ipv4: Ipv4Trie<T>,
    ipv6: Ipv6Trie<T>,
}

impl<T> NetTree<T> {
    /// Create a tree with two empty roots
    pub fn new() -> Self {
        NetTree {
            ipv4: FamilyTrie::new(),
            ipv6: FamilyTrie::new(),
        }
    }

    /// The IPv4 trie
    pub fn ipv4(&self) -> &Ipv4Trie<T> {
        &self.ipv4
    }

    /// The IPv6 trie
    pub fn ipv6(&self) -> &Ipv6Trie<T> {
        &self.ipv6
    }

    /// Number of distinct networks stored across both families
    pub fn len(&self) -> usize {
        self.ipv4.len() + self.ipv6.len()
    }

    /// Check if no network has been stored
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_empty() && self.ipv6.is_empty()
    }

    /// Insert a network, replacing the value of an identical earlier network
    pub fn insert(&mut self, network: IpNetwork, value: T) -> &mut TrieNode<T> {
        match network {
            IpNetwork::V4(network) => self.ipv4.insert(network, value),
            IpNetwork::V6(network) => self.ipv6.insert(network, value),
        }
    }

    /// Parse a network in CIDR notation and insert it
    pub fn add_net(&mut self, cidr: &str, value: T) -> Result<&mut TrieNode<T>> {
        let network = parse_network(cidr)?;
        Ok(self.insert(network, value))
    }

    /// Get the value stored for exactly this network
    pub fn get(&self, network: IpNetwork) -> Option<&T> {
        match network {
            IpNetwork::V4(network) => self.ipv4.get(network),
            IpNetwork::V6(network) => self.ipv6.get(network),
        }
    }

    /// Find the most specific stored network containing `addr`
    pub fn lookup(&self, addr: IpAddr) -> Option<NetMatch<'_, T>> {
        match addr {
            IpAddr::V4(addr) => self.ipv4.lookup(addr),
            IpAddr::V6(addr) => self.ipv6.lookup(addr),
        }
    }

    /// Parse an address and look it up.
    ///
    /// Fails only when the input is neither an address nor a CIDR; a valid
    /// address outside every stored network yields `Ok(None)`.
    pub fn lookup_str(&self, input: &str) -> Result<Option<NetMatch<'_, T>>> {
        let addr = parse_address(input)?;
        Ok(self.lookup(addr))
    }
}

impl<T> Default for NetTree<T> {
    fn default() -> Self {
        NetTree::new()
    }
}

impl<T> Extend<(IpNetwork, T)> for NetTree<T> {
    fn extend<I: IntoIterator<Item = (IpNetwork, T)>>(&mut self, iter: I) {
        for (network, value) in iter {
            self.insert(network, value);
        }
    }
}

impl<T> FromIterator<(IpNetwork, T)> for NetTree<T> {
    fn from_iter<I: IntoIterator<Item = (IpNetwork, T)>>(iter: I) -> Self {
        let mut tree = NetTree::new();
        tree.extend(iter);
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn net(s: &str) -> IpNetwork {
        s.parse().unwrap()
    }

    #[test]
    fn test_add_v4() {
        let mut tree = NetTree::new();
        let node = tree.add_net("10.10.10.1/18", "Hello").unwrap();
        assert_eq!(node.value(), Some(&"Hello"));
    }

    #[test]
    fn test_add_v6() {
        let mut tree = NetTree::new();
        let node = tree
            .add_net("bd5f:285d:2687:ec0c:0a3b:9f7a:cb63:560b/64", "yo yo yo")
            .unwrap();
        assert_eq!(node.value(), Some(&"yo yo yo"));
    }

    #[test]
    fn test_add_and_retrieve_v4() {
        let mut tree = NetTree::new();
        tree.add_net("10.10.10.1/18", "Hello").unwrap();

        let found = tree.lookup_str("10.10.10.3").unwrap().unwrap();
        assert_eq!(*found.value, "Hello");
        assert_eq!(found.prefix_len(), 18);
        assert_eq!(found.network, net("10.10.0.0/18"));
    }

    #[test]
    fn test_add_and_retrieve_v6() {
        let mut tree = NetTree::new();
        tree.add_net("bd5f:285d:2687:ec0c:0a3b:9f7a:cb63:560b/64", "yo yo yo")
            .unwrap();

        let found = tree
            .lookup_str("bd5f:285d:2687:ec0c:0000:0000:0000:0001")
            .unwrap()
            .unwrap();
        assert_eq!(*found.value, "yo yo yo");
        assert_eq!(found.prefix_len(), 64);
        assert_eq!(found.network, net("bd5f:285d:2687:ec0c::/64"));
    }

    #[test]
    fn test_overlap_most_specific_wins() {
        let mut tree = NetTree::new();
        tree.add_net("192.168.0.0/16", "Larger").unwrap();
        tree.add_net("192.168.5.0/24", "Smaller").unwrap();

        let found = tree.lookup_str("192.168.5.34").unwrap().unwrap();
        assert_eq!(*found.value, "Smaller");
        assert_eq!(found.prefix_len(), 24);

        // Outside the /24 but inside the /16
        let found = tree.lookup_str("192.168.6.1").unwrap().unwrap();
        assert_eq!(*found.value, "Larger");
        assert_eq!(found.prefix_len(), 16);
    }

    #[test]
    fn test_overlap_insertion_order_irrelevant() {
        let mut tree = NetTree::new();
        tree.add_net("192.168.5.0/24", "Smaller").unwrap();
        tree.add_net("192.168.1.0/16", "Larger").unwrap();

        let found = tree.lookup_str("192.168.5.34").unwrap().unwrap();
        assert_eq!(*found.value, "Smaller");
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_ancestor_match_survives_dead_end() {
        let mut tree = NetTree::new();
        tree.add_net("10.0.0.0/8", "eight").unwrap();
        tree.add_net("10.1.2.0/24", "deep").unwrap();

        // Walk follows 10.1.x.x down past /8, then hits an unexplored child
        let found = tree.lookup_str("10.1.3.4").unwrap().unwrap();
        assert_eq!(*found.value, "eight");
        assert_eq!(found.network, net("10.0.0.0/8"));
    }

    #[test]
    fn test_not_found_v4() {
        let mut tree = NetTree::new();
        tree.add_net("192.168.1.0/16", "Larger").unwrap();
        tree.add_net("192.168.5.0/24", "Smaller").unwrap();

        assert!(tree.lookup_str("10.10.10.10").unwrap().is_none());
    }

    #[test]
    fn test_single_host_v4() {
        let mut tree = NetTree::new();
        tree.add_net("192.168.1.2/32", "My thing").unwrap();

        let found = tree.lookup_str("192.168.1.2").unwrap().unwrap();
        assert_eq!(*found.value, "My thing");
        assert_eq!(found.prefix_len(), 32);
        assert!(tree.lookup_str("192.168.1.3").unwrap().is_none());
    }

    #[test]
    fn test_single_host_v6() {
        let mut tree = NetTree::new();
        tree.add_net("2001:db8::42/128", 42u32).unwrap();

        let found = tree.lookup("2001:db8::42".parse().unwrap()).unwrap();
        assert_eq!(*found.value, 42);
        assert_eq!(found.prefix_len(), 128);
        assert!(tree.lookup("2001:db8::43".parse().unwrap()).is_none());
    }

    #[test]
    fn test_overwrite_v4() {
        let mut tree = NetTree::new();
        tree.add_net("172.16.0.0/12", "first").unwrap();
        let node = tree.add_net("172.16.0.0/12", "second").unwrap();
        assert_eq!(node.value(), Some(&"second"));

        assert_eq!(tree.get(net("172.16.0.0/12")), Some(&"second"));
        assert_eq!(*tree.lookup_str("172.20.1.1").unwrap().unwrap().value, "second");
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_overwrite_v6() {
        let mut tree = NetTree::new();
        tree.add_net("2001:db8::/32", "first").unwrap();
        tree.add_net("2001:db8::/32", "second").unwrap();

        assert_eq!(tree.get(net("2001:db8::/32")), Some(&"second"));
        assert_eq!(*tree.lookup_str("2001:db8::1").unwrap().unwrap().value, "second");
        assert_eq!(tree.ipv6().len(), 1);
    }

    #[test]
    fn test_overwrite_ignores_host_bits() {
        let mut tree = NetTree::new();
        tree.add_net("10.10.10.1/18", "first").unwrap();
        tree.add_net("10.10.0.0/18", "second").unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(net("10.10.63.255/18")), Some(&"second"));
    }

    #[test]
    fn test_family_isolation() {
        let mut tree = NetTree::new();
        tree.add_net("0.0.0.0/0", "v4 default").unwrap();
        tree.add_net("10.0.0.0/8", "v4").unwrap();

        assert!(tree.lookup_str("::").unwrap().is_none());
        assert!(tree.lookup_str("::ffff:10.0.0.1").unwrap().is_none());
        assert!(tree.ipv6().is_empty());

        let mut tree = NetTree::new();
        tree.add_net("::/0", "v6 default").unwrap();

        assert!(tree.lookup_str("10.0.0.1").unwrap().is_none());
        assert!(tree.ipv4().is_empty());

        let found = tree.lookup_str("2001:db8::1").unwrap().unwrap();
        assert_eq!(*found.value, "v6 default");
        assert_eq!(found.prefix_len(), 0);
        assert_eq!(found.network, net("::/0"));
    }

    #[test]
    fn test_empty_tree_never_matches() {
        let tree: NetTree<()> = NetTree::new();
        assert!(tree.is_empty());
        for addr in ["0.0.0.0", "255.255.255.255", "8.8.8.8", "::", "ffff::1"] {
            assert!(tree.lookup_str(addr).unwrap().is_none(), "{addr}");
        }
    }

    #[test]
    fn test_default_route_on_root() {
        let mut tree = NetTree::new();
        tree.add_net("0.0.0.0/0", "default").unwrap();
        tree.add_net("10.0.0.0/8", "ten").unwrap();

        assert!(tree.ipv4().root().has_value());

        let found = tree.lookup_str("8.8.8.8").unwrap().unwrap();
        assert_eq!(*found.value, "default");
        assert_eq!(found.prefix_len(), 0);
        assert_eq!(found.network, net("0.0.0.0/0"));

        assert_eq!(*tree.lookup_str("10.1.1.1").unwrap().unwrap().value, "ten");
    }

    #[test]
    fn test_parse_error_is_not_no_match() {
        let mut tree = NetTree::new();
        tree.add_net("10.0.0.0/8", 1).unwrap();

        assert!(tree.lookup_str("10.0.0.300").unwrap_err().is_address_parse());
        assert!(tree.add_net("10.0.0.0/40", 2).unwrap_err().is_address_parse());
        assert!(tree.lookup_str("11.0.0.1").unwrap().is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_add_net_rejects_bare_address() {
        let mut tree = NetTree::new();

        assert!(tree.add_net("192.168.1.2", "host").unwrap_err().is_address_parse());
        assert!(tree.add_net("2001:db8::1", "host").unwrap_err().is_address_parse());
        assert!(tree.is_empty());
        assert!(tree.lookup_str("192.168.1.2").unwrap().is_none());
    }

    #[test]
    fn test_lookup_accepts_cidr_input() {
        let mut tree = NetTree::new();
        tree.add_net("192.168.5.0/24", "Smaller").unwrap();

        let found = tree.lookup_str("192.168.5.34/16").unwrap().unwrap();
        assert_eq!(*found.value, "Smaller");
        assert_eq!(found.prefix_len(), 24);
    }

    #[test]
    fn test_get_exact_only() {
        let mut tree = NetTree::new();
        tree.add_net("10.0.0.0/8", "ten").unwrap();

        assert_eq!(tree.get(net("10.0.0.0/8")), Some(&"ten"));
        assert_eq!(tree.get(net("10.0.0.0/9")), None);
        assert_eq!(tree.get(net("10.0.0.0/7")), None);
    }

    #[test]
    fn test_family_trie_typed() {
        let mut trie: Ipv4Trie<&str> = FamilyTrie::new();
        trie.insert("198.51.100.0/24".parse().unwrap(), "doc");

        let found = trie.lookup(Ipv4Addr::new(198, 51, 100, 7)).unwrap();
        assert_eq!(*found.value, "doc");
        assert!(trie.lookup(Ipv4Addr::new(198, 51, 101, 7)).is_none());

        let mut trie: Ipv6Trie<&str> = FamilyTrie::default();
        trie.insert("fe80::/10".parse().unwrap(), "link-local");
        let addr: Ipv6Addr = "fe80::1".parse().unwrap();
        assert_eq!(trie.lookup(addr).unwrap().prefix_len(), 10);
    }

    #[test]
    fn test_value_mut_through_handle() {
        let mut tree = NetTree::new();
        *tree
            .insert(net("10.0.0.0/8"), vec![1])
            .value_mut()
            .unwrap() = vec![1, 2];

        assert_eq!(tree.get(net("10.0.0.0/8")), Some(&vec![1, 2]));
    }

    #[test]
    fn test_from_iterator_last_write_wins() {
        let tree: NetTree<u32> = vec![
            (net("10.0.0.0/8"), 1),
            (net("2001:db8::/32"), 2),
            (net("10.0.0.0/8"), 3),
        ]
        .into_iter()
        .collect();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(net("10.0.0.0/8")), Some(&3));
        assert_eq!(tree.ipv4().len(), 1);
        assert_eq!(tree.ipv6().len(), 1);
    }

    #[test]
    fn test_many_hosts_round_trip() {
        let mut tree = NetTree::new();
        for i in 0..=255u8 {
            let addr = Ipv4Addr::new(10, i, i.wrapping_mul(7), i.wrapping_add(3));
            tree.insert(IpNetwork::new(addr.into(), 32).unwrap(), u32::from(i));
        }
        for i in 0..=255u8 {
            let addr = Ipv4Addr::new(10, i, i.wrapping_mul(7), i.wrapping_add(3));
            let found = tree.lookup(addr.into()).unwrap();
            assert_eq!(*found.value, u32::from(i));
            assert_eq!(found.prefix_len(), 32);
        }
    }
}
