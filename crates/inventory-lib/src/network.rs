//! Node network identity
//!
//! Picks the address a node is reachable on from the outside, preferring a
//! globally routable address over a private one.

use crate::models::{ExternalAddress, NetworkInterface};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Whether an address is private or otherwise not globally routable
///
/// Unparseable input is reported as not private.
pub fn is_private_address(address: &str) -> bool {
    match address.trim().parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => is_private_v4(v4),
        Ok(IpAddr::V6(v6)) => is_private_v6(v6),
        Err(_) => false,
    }
}

fn is_private_v4(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || ip.is_documentation()
        || a == 0
        // 192.0.0.0/24 IETF protocol assignments
        || (a == 192 && b == 0 && c == 0)
        // 198.18.0.0/15 benchmarking
        || (a == 198 && (b & 0xfe) == 18)
        // 240.0.0.0/4 reserved
        || a >= 240
}

fn is_private_v6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_private_v4(v4);
    }

    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link local
        || (first & 0xffc0) == 0xfe80
        // 2001:db8::/32 documentation
        || (first == 0x2001 && ip.segments()[1] == 0x0db8)
}

/// Select the external address among a node's interfaces
///
/// Candidates are active, IPv4-enabled and have both an address and a
/// gateway. The first candidate wins unless it is private and a later one
/// is not.
pub fn select_external_address(interfaces: &[NetworkInterface]) -> Option<ExternalAddress> {
    let mut best: Option<ExternalAddress> = None;

    for iface in interfaces {
        if !iface.is_active() {
            continue;
        }
        let has_inet = iface
            .families
            .as_ref()
            .map(|families| families.iter().any(|f| f == "inet"))
            .unwrap_or(false);
        if !has_inet {
            continue;
        }

        let (Some(address), Some(gateway)) = (
            iface.address.as_ref().filter(|a| !a.is_empty()),
            iface.gateway.as_ref().filter(|g| !g.is_empty()),
        ) else {
            continue;
        };

        let candidate = ExternalAddress {
            address: address.clone(),
            cidr: iface.cidr.clone(),
            gateway: gateway.clone(),
        };

        let replace = match &best {
            None => true,
            Some(current) => {
                is_private_address(&current.address) && !is_private_address(&candidate.address)
            }
        };
        if replace {
            best = Some(candidate);
        }
    }

    best
}
