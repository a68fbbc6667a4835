//! # Trace Destination Model
//!
//! A packet is addressed either by name, which must go through the resolver, or by a
//! literal IPv4 address, which needs no lookup.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::Serialize;

use crate::network::{normalize_domain, parse_ipv4};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Destination {
    /// Literal IPv4 address (e.g., "10.0.0.5").
    Address(Ipv4Addr),
    /// Domain name, stored in canonical form.
    Domain(String),
}

impl FromStr for Destination {
    type Err = String;

    /// Parses a destination string.
    ///
    /// * **Address**: anything that parses as a dotted-quad IPv4 address.
    /// * **Domain**: any other non-empty string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("destination cannot be empty".to_string());
        }

        if let Some(addr) = parse_ipv4(trimmed) {
            return Ok(Destination::Address(addr));
        }

        Ok(Destination::Domain(normalize_domain(trimmed)))
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Address(addr) => write!(f, "{addr}"),
            Destination::Domain(domain) => write!(f, "{domain}"),
        }
    }
}
