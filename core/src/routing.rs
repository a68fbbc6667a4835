//! # Routing Table
//!
//! Longest-prefix-match route selection. Among all routes whose network contains the
//! destination, the one with the longest prefix wins; equal prefixes resolve to the route
//! declared first.

use std::net::Ipv4Addr;

use pathtrace_common::config::Route;
use pathtrace_common::network::cidr::{Cidr, CidrError};
use pathtrace_common::network::parse_ipv4;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("invalid destination address '{0}'")]
    InvalidAddress(String),
}

/// A selected route together with its parsed network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub cidr: Cidr,
}

pub struct RoutingTable {
    routes: Vec<(Route, Cidr)>,
    malformed: Vec<(usize, Route, CidrError)>,
}

impl RoutingTable {
    /// Builds the table, setting aside routes whose CIDR does not parse.
    pub fn new(routes: Vec<Route>) -> Self {
        let mut valid = Vec::with_capacity(routes.len());
        let mut malformed = Vec::new();

        for (idx, route) in routes.into_iter().enumerate() {
            match route.cidr.parse::<Cidr>() {
                Ok(cidr) => valid.push((route, cidr)),
                Err(e) => {
                    debug!("Skipping route #{}: {e}", idx + 1);
                    malformed.push((idx + 1, route, e));
                }
            }
        }

        Self {
            routes: valid,
            malformed,
        }
    }

    /// Number of usable routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes that were skipped, with their 1-based declared position.
    pub fn malformed(&self) -> &[(usize, Route, CidrError)] {
        &self.malformed
    }

    /// Parses `destination` and looks it up.
    ///
    /// Unparseable input is a caller error, distinct from `Ok(None)` (no route).
    pub fn find_route(&self, destination: &str) -> Result<Option<RouteMatch<'_>>, RouteError> {
        let addr = parse_ipv4(destination)
            .ok_or_else(|| RouteError::InvalidAddress(destination.to_string()))?;
        Ok(self.lookup(addr))
    }

    pub fn lookup(&self, destination: Ipv4Addr) -> Option<RouteMatch<'_>> {
        let mut best: Option<RouteMatch<'_>> = None;

        for (route, cidr) in &self.routes {
            if !cidr.contains(destination) {
                continue;
            }
            // Strictly longer only, so the earliest route keeps a tie
            if best.is_none_or(|b| cidr.prefix() > b.cidr.prefix()) {
                best = Some(RouteMatch { route, cidr: *cidr });
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    fn table() -> RoutingTable {
        RoutingTable::new(vec![
            Route::new("0.0.0.0/0", "192.168.1.1", "wan0"),
            Route::new("10.0.0.0/8", "10.255.255.1", "eth1"),
            Route::new("10.0.0.0/24", "direct", "eth0"),
            Route::new("10.0.0.128/25", "10.0.0.129", "eth2"),
        ])
    }

    #[test]
    fn test_longest_prefix_wins() {
        let table = table();

        assert_eq!(table.lookup(ip("10.0.0.5")).unwrap().route.interface, "eth0");
        assert_eq!(table.lookup(ip("10.0.0.200")).unwrap().route.interface, "eth2");
        assert_eq!(table.lookup(ip("10.9.9.9")).unwrap().route.interface, "eth1");
        assert_eq!(table.lookup(ip("8.8.8.8")).unwrap().route.interface, "wan0");
    }

    #[test]
    fn test_declaration_order_is_irrelevant_except_ties() {
        let reversed = RoutingTable::new(vec![
            Route::new("10.0.0.0/24", "direct", "eth0"),
            Route::new("10.0.0.0/8", "10.255.255.1", "eth1"),
        ]);
        assert_eq!(reversed.lookup(ip("10.0.0.5")).unwrap().cidr.prefix(), 24);

        let tied = RoutingTable::new(vec![
            Route::new("10.0.0.0/16", "10.0.0.1", "first"),
            Route::new("10.0.5.0/16", "10.0.0.2", "second"),
        ]);
        assert_eq!(tied.lookup(ip("10.0.7.7")).unwrap().route.interface, "first");
    }

    #[test]
    fn test_no_match() {
        let table = RoutingTable::new(vec![Route::new("10.0.0.0/24", "direct", "eth0")]);
        assert_eq!(table.lookup(ip("10.0.1.1")), None);

        let empty = RoutingTable::new(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.lookup(ip("10.0.0.1")), None);
    }

    #[test]
    fn test_malformed_routes_skipped() {
        let table = RoutingTable::new(vec![
            Route::new("10.0.0.0/40", "direct", "bad-prefix"),
            Route::new("10.0.0.0", "direct", "no-prefix"),
            Route::new("10.0.0.0/x", "direct", "nan-prefix"),
            Route::new("10.0.0.0/8", "10.0.0.1", "eth1"),
        ]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.malformed().len(), 3);
        assert_eq!(table.malformed()[0].0, 1);
        assert_eq!(table.lookup(ip("10.0.0.5")).unwrap().route.interface, "eth1");
    }

    #[test]
    fn test_leading_zero_octets() {
        let table = RoutingTable::new(vec![Route::new("010.0.0.0/8", "direct", "eth0")]);

        assert_eq!(table.len(), 1);
        assert!(table.malformed().is_empty());
        assert_eq!(
            table.find_route("010.000.000.005").unwrap().unwrap().route.interface,
            "eth0"
        );
    }

    #[test]
    fn test_find_route_rejects_bad_input() {
        let table = table();

        assert_eq!(
            table.find_route("not-an-ip"),
            Err(RouteError::InvalidAddress("not-an-ip".into()))
        );
        assert!(table.find_route("10.0.0.256").is_err());
        assert_eq!(
            table.find_route("10.0.0.5").unwrap().unwrap().route.gateway,
            "direct"
        );
    }
}
