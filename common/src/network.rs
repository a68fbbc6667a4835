//! # Network Primitives
//!
//! Value types describing addresses, networks and synthetic packets.

pub mod cidr;
pub mod destination;
pub mod packet;
pub mod range;

use std::net::Ipv4Addr;

/// Source specifier that matches every IPv4 address.
pub const ALL_ADDRESSES: &str = "0.0.0.0/0";

/// Canonical form of a domain name: trimmed, lowercase, no trailing root dot.
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Parses a dotted-quad IPv4 address, reading each octet as a plain decimal number.
///
/// Unlike [`Ipv4Addr::from_str`](std::str::FromStr), leading zeros are accepted, so `10.0.0.05`
/// is `10.0.0.5`. Octets above 255 are rejected.
pub fn parse_ipv4(s: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut groups = s.trim().split('.');

    for octet in octets.iter_mut() {
        let group = groups.next()?;
        if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = group.parse().ok()?;
    }
    if groups.next().is_some() {
        return None;
    }

    Some(Ipv4Addr::from(octets))
}
