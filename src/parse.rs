//! String parsing for addresses and networks
//!
//! The trie itself only consumes validated `IpAddr`/`IpNetwork` values;
//! these helpers back the string entry points on [`NetTree`](crate::NetTree).

use crate::{Error, Result};
use ipnetwork::IpNetwork;
use std::net::IpAddr;
use tracing::debug;

/// Parse a network in CIDR notation.
///
/// The prefix length is required; a bare address is rejected. Host bits
/// beyond the prefix are kept as written; the trie never reads them.
pub fn parse_network(input: &str) -> Result<IpNetwork> {
    if !input.contains('/') {
        return Err(Error::address_parse(input, "missing prefix length"));
    }
    input
        .parse::<IpNetwork>()
        .map_err(|e| Error::address_parse(input, e))
}

/// Parse a single address to look up.
///
/// Input that is not a bare address is retried as CIDR notation, in which
/// case the address part is used and the prefix length is ignored.
pub fn parse_address(input: &str) -> Result<IpAddr> {
    if let Ok(addr) = input.parse::<IpAddr>() {
        return Ok(addr);
    }

    debug!(input, "not a bare IP address, attempting to parse as CIDR");
    let network = parse_network(input)?;
    let full_width = match network {
        IpNetwork::V4(_) => 32,
        IpNetwork::V6(_) => 128,
    };
    if network.prefix() == full_width {
        debug!(ip = %network.ip(), "CIDR parsed as single host network");
    } else {
        debug!(
            ip = %network.ip(),
            prefix = network.prefix(),
            "input parses as a CIDR block, using its address"
        );
    }
    Ok(network.ip())
}
