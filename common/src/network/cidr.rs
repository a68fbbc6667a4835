//! # CIDR Blocks
//!
//! Parses `network/prefix` notation (e.g. `10.0.0.0/24`) and answers prefix-match queries.
//!
//! Matching compares only the leading *prefix* bits of both addresses, so host bits left set in
//! the declared network (`10.0.0.7/24`) are ignored.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use pnet::ipnetwork::Ipv4Network;
use thiserror::Error;

use crate::network::parse_ipv4;

/// Reasons a CIDR string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CidrError {
    #[error("'{0}' is not of the form network/prefix")]
    Shape(String),
    #[error("invalid network address in '{0}'")]
    Network(String),
    #[error("prefix length in '{0}' must be between 0 and 32")]
    Prefix(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr {
    network: Ipv4Network,
}

impl Cidr {
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, CidrError> {
        let network = Ipv4Network::new(addr, prefix)
            .map_err(|_| CidrError::Prefix(format!("{addr}/{prefix}")))?;
        Ok(Self { network })
    }

    /// The network address exactly as declared.
    pub fn addr(&self) -> Ipv4Addr {
        self.network.ip()
    }

    pub fn prefix(&self) -> u8 {
        self.network.prefix()
    }

    /// Whether this is the catch-all `/0` block.
    pub fn is_default(&self) -> bool {
        self.prefix() == 0
    }

    /// True when the leading `prefix` bits of `addr` equal those of the network.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.network.contains(addr)
    }
}

impl FromStr for Cidr {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        let [ip_str, prefix_str] = parts.as_slice() else {
            return Err(CidrError::Shape(s.to_string()));
        };

        let addr = parse_ipv4(ip_str).ok_or_else(|| CidrError::Network(s.to_string()))?;

        let prefix = prefix_str
            .parse::<u8>()
            .ok()
            .filter(|prefix| *prefix <= 32)
            .ok_or_else(|| CidrError::Prefix(s.to_string()))?;

        Self::new(addr, prefix)
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr(), self.prefix())
    }
}
