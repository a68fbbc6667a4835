use std::collections::HashSet;
use std::net::Ipv4Addr;

use pathtrace_common::config::DnsRecords;
use pathtrace_common::network::{normalize_domain, parse_ipv4};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("NXDOMAIN: {0} not found")]
    NxDomain(String),
    #[error("cyclic resolution: {}", .chain.join(" -> "))]
    CyclicResolution { chain: Vec<String> },
    #[error("{domain} points to invalid address {target}")]
    InvalidAddress { domain: String, target: String },
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub address: Ipv4Addr,
    /// Every domain visited, starting with the queried one.
    pub chain: Vec<String>,
}

impl Resolution {
    pub fn is_alias(&self) -> bool {
        self.chain.len() > 1
    }

    /// The visited domains joined with `" -> "`.
    pub fn chain_text(&self) -> String {
        self.chain.join(" -> ")
    }
}

/// Resolves names against the configured records.
pub struct NameResolver {
    records: DnsRecords,
}

impl NameResolver {
    pub fn new(records: DnsRecords) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &DnsRecords {
        &self.records
    }

    /// Looks `domain` up, following aliases until a record holds an address.
    ///
    /// Each domain may be visited once per call; seeing one again is a
    /// [`ResolveError::CyclicResolution`].
    pub fn resolve(&self, domain: &str) -> Result<Resolution, ResolveError> {
        let mut current: String = normalize_domain(domain);
        let mut visited: HashSet<String> = HashSet::new();
        let mut chain: Vec<String> = Vec::new();

        loop {
            if !visited.insert(current.clone()) {
                chain.push(current);
                return Err(ResolveError::CyclicResolution { chain });
            }
            chain.push(current.clone());

            let Some(target) = self.records.get(&current) else {
                return Err(ResolveError::NxDomain(current));
            };

            if is_dotted_quad(target) {
                let address =
                    parse_ipv4(target).ok_or_else(|| ResolveError::InvalidAddress {
                        domain: current.clone(),
                        target: target.to_string(),
                    })?;
                debug!("{} resolved to {address}", chain.join(" -> "));
                return Ok(Resolution { address, chain });
            }

            debug!("{current} is an alias for {target}");
            current = normalize_domain(target);
        }
    }
}

/// Four groups of one to three ASCII digits separated by dots. Octet range is not checked here.
fn is_dotted_quad(s: &str) -> bool {
    let groups: Vec<&str> = s.split('.').collect();
    groups.len() == 4
        && groups
            .iter()
            .all(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()))
}
