//! # Trace Engine
//!
//! Walks a packet through the modeled network and records every step.
//!
//! ```text
//! START -> DNS_RESOLVED -> { FIREWALL_CHECKED -> ROUTED }* -> terminal
//! ```
//!
//! Terminal states are [`TraceOutcome`] values. Every way a trace can end, including lookup
//! failures, is a hop in the returned [`Trace`] rather than an error; only caller input is
//! rejected, and that happens before a [`PacketDescriptor`] exists.

use std::convert::Infallible;
use std::fmt;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use pathtrace_common::config::{Config, TraceSettings};
use pathtrace_common::network::destination::Destination;
use pathtrace_common::network::packet::PacketDescriptor;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, debug_span};

use crate::firewall::FirewallEvaluator;
use crate::resolver::{NameResolver, ResolveError, Resolution};
use crate::routing::RoutingTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Location {
    #[serde(rename = "DNS")]
    Dns,
    Firewall,
    Router,
    Destination,
    Gateway,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Location::Dns => "DNS",
            Location::Firewall => "Firewall",
            Location::Router => "Router",
            Location::Destination => "Destination",
            Location::Gateway => "Gateway",
        };
        f.write_str(name)
    }
}

/// One step of a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HopRecord {
    /// 1-based, strictly increasing.
    pub hop: usize,
    pub location: Location,
    pub action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraceOutcome {
    DestinationReached,
    Blocked,
    Unreachable,
    TtlExceeded,
    /// Left the modeled network through the default route. Only produced when
    /// [`TraceSettings::internet_handoff`] is enabled.
    HandedOff,
}

impl fmt::Display for TraceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraceOutcome::DestinationReached => "DESTINATION_REACHED",
            TraceOutcome::Blocked => "BLOCKED",
            TraceOutcome::Unreachable => "UNREACHABLE",
            TraceOutcome::TtlExceeded => "TTL_EXCEEDED",
            TraceOutcome::HandedOff => "HANDED_OFF",
        };
        f.write_str(name)
    }
}

/// A finished trace: the hops in order and how it ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trace {
    pub hops: Vec<HopRecord>,
    pub outcome: TraceOutcome,
}

impl Trace {
    pub fn last(&self) -> Option<&HopRecord> {
        self.hops.last()
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }
}

/// A trace ran past its wall-clock limit and was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("trace did not finish within {}ms", .limit.as_millis())]
pub struct DeadlineExceeded {
    pub limit: Duration,
    /// Hops recorded before the trace was abandoned.
    pub hops: usize,
}

#[derive(Default)]
struct TraceBuilder {
    hops: Vec<HopRecord>,
}

impl TraceBuilder {
    fn push(&mut self, location: Location, action: impl Into<String>) {
        let hop = HopRecord {
            hop: self.hops.len() + 1,
            location,
            action: action.into(),
        };
        debug!("[{}] {}: {}", hop.hop, hop.location, hop.action);
        self.hops.push(hop);
    }

    fn len(&self) -> usize {
        self.hops.len()
    }

    fn finish(self, outcome: TraceOutcome) -> Trace {
        debug!("Trace finished as {outcome} after {} hops", self.hops.len());
        Trace {
            hops: self.hops,
            outcome,
        }
    }
}

pub struct TraceEngine {
    resolver: NameResolver,
    firewall: FirewallEvaluator,
    routing: RoutingTable,
    settings: TraceSettings,
}

impl TraceEngine {
    pub fn new(
        resolver: NameResolver,
        firewall: FirewallEvaluator,
        routing: RoutingTable,
        settings: TraceSettings,
    ) -> Self {
        Self {
            resolver,
            firewall,
            routing,
            settings,
        }
    }

    pub fn from_config(config: Config) -> Self {
        Self::new(
            NameResolver::new(config.dns),
            FirewallEvaluator::new(config.firewall),
            RoutingTable::new(config.routes),
            config.trace,
        )
    }

    pub fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    pub fn firewall(&self) -> &FirewallEvaluator {
        &self.firewall
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    pub fn settings(&self) -> &TraceSettings {
        &self.settings
    }

    /// Runs a complete trace for `packet`.
    pub fn trace(&self, packet: &PacketDescriptor) -> Trace {
        let Ok(trace) = self.run::<Infallible>(packet, |_| Ok(()));
        trace
    }

    /// Like [`trace`](Self::trace), but gives up once `limit` has elapsed.
    ///
    /// The clock is checked before every routing attempt, so an abandoned trace stops within one
    /// hop of the deadline.
    pub fn trace_within(
        &self,
        packet: &PacketDescriptor,
        limit: Duration,
    ) -> Result<Trace, DeadlineExceeded> {
        let Some(deadline) = Instant::now().checked_add(limit) else {
            return Ok(self.trace(packet));
        };

        self.run(packet, |hops| {
            if Instant::now() >= deadline {
                debug!("Deadline of {}ms passed after {hops} hops", limit.as_millis());
                return Err(DeadlineExceeded { limit, hops });
            }
            Ok(())
        })
    }

    fn run<E>(
        &self,
        packet: &PacketDescriptor,
        mut on_hop: impl FnMut(usize) -> Result<(), E>,
    ) -> Result<Trace, E> {
        let span = debug_span!("trace", dest = %packet.destination);
        let _guard = span.enter();

        let mut trace = TraceBuilder::default();

        let address: Ipv4Addr = match self.resolve_destination(&packet.destination) {
            Ok((address, description)) => {
                trace.push(Location::Dns, description);
                address
            }
            Err(e) => {
                trace.push(Location::Dns, e.to_string());
                return Ok(trace.finish(TraceOutcome::Unreachable));
            }
        };

        let mut budget: u32 = packet.ttl.unwrap_or(self.settings.default_ttl);

        while budget > 0 {
            budget -= 1;
            on_hop(trace.len())?;

            if let Some(rule) = self.firewall.check(packet).blocked_by() {
                trace.push(Location::Firewall, format!("Blocked by rule #{rule}"));
                return Ok(trace.finish(TraceOutcome::Blocked));
            }

            let Some(found) = self.routing.lookup(address) else {
                trace.push(
                    Location::Router,
                    format!("No route found for host: {address}"),
                );
                return Ok(trace.finish(TraceOutcome::Unreachable));
            };
            let route = found.route;

            trace.push(
                Location::Router,
                format!(
                    "Forwarded to {} via {} (Match: {})",
                    route.gateway, route.interface, route.cidr
                ),
            );

            if self.settings.is_local_gateway(&route.gateway) {
                trace.push(Location::Destination, "Packet reached destination network");
                return Ok(trace.finish(TraceOutcome::DestinationReached));
            }

            if self.settings.internet_handoff && found.cidr.is_default() {
                trace.push(Location::Gateway, "Packet sent to ISP / Internet");
                return Ok(trace.finish(TraceOutcome::HandedOff));
            }
        }

        trace.push(Location::Router, "Time to Live (TTL) exceeded");
        Ok(trace.finish(TraceOutcome::TtlExceeded))
    }

    fn resolve_destination(
        &self,
        destination: &Destination,
    ) -> Result<(Ipv4Addr, String), ResolveError> {
        match destination {
            Destination::Address(address) => Ok((
                *address,
                format!("{address} is an address literal, no lookup needed"),
            )),
            Destination::Domain(domain) => {
                let resolution: Resolution = self.resolver.resolve(domain)?;
                let address = resolution.address;
                Ok((address, format!("Resolved {} -> {address}", resolution.chain_text())))
            }
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
