//! Address families and MSB-first bit extraction

use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// One address family the trie can be keyed by
///
/// The bit width is a compile-time constant, so a walk over an IPv4 trie
/// can never run past 32 levels and an IPv6 walk past 128.
pub trait AddressFamily {
    /// Number of bits in an address of this family
    const BITS: u8;

    /// Bare address type
    type Addr: Copy + fmt::Debug;

    /// Validated network type (address plus prefix length within `BITS`)
    type Network: Copy + fmt::Debug;

    /// Bit `index` of `addr`, counting from 1 at the most significant bit.
    ///
    /// `index` must be in `1..=BITS`.
    fn bit(addr: Self::Addr, index: u8) -> bool;

    /// Split a network into its address and prefix length
    fn split(network: Self::Network) -> (Self::Addr, u8);

    /// The network of `prefix_len` bits containing `addr`, host bits cleared
    fn masked(addr: Self::Addr, prefix_len: u8) -> IpNetwork;
}

/// IPv4: 32-bit addresses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum V4 {}

/// IPv6: 128-bit addresses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum V6 {}

impl AddressFamily for V4 {
    const BITS: u8 = 32;
    type Addr = Ipv4Addr;
    type Network = Ipv4Network;

    fn bit(addr: Ipv4Addr, index: u8) -> bool {
        debug_assert!((1..=Self::BITS).contains(&index));
        (u32::from(addr) >> (Self::BITS - index)) & 1 == 1
    }

    fn split(network: Ipv4Network) -> (Ipv4Addr, u8) {
        (network.ip(), network.prefix())
    }

    fn masked(addr: Ipv4Addr, prefix_len: u8) -> IpNetwork {
        let mask = u32::MAX
            .checked_shl(u32::from(Self::BITS - prefix_len))
            .unwrap_or(0);
        let network = Ipv4Network::new(Ipv4Addr::from(u32::from(addr) & mask), prefix_len)
            .expect("prefix length is bounded by the walk depth");
        IpNetwork::V4(network)
    }
}

impl AddressFamily for V6 {
    const BITS: u8 = 128;
    type Addr = Ipv6Addr;
    type Network = Ipv6Network;

    fn bit(addr: Ipv6Addr, index: u8) -> bool {
        debug_assert!((1..=Self::BITS).contains(&index));
        (u128::from(addr) >> (Self::BITS - index)) & 1 == 1
    }

    fn split(network: Ipv6Network) -> (Ipv6Addr, u8) {
        (network.ip(), network.prefix())
    }

    fn masked(addr: Ipv6Addr, prefix_len: u8) -> IpNetwork {
        let mask = u128::MAX
            .checked_shl(u32::from(Self::BITS - prefix_len))
            .unwrap_or(0);
        let network = Ipv6Network::new(Ipv6Addr::from(u128::from(addr) & mask), prefix_len)
            .expect("prefix length is bounded by the walk depth");
        IpNetwork::V6(network)
    }
}
