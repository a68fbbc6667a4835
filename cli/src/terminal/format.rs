use crate::terminal::colors;
use colored::*;
use pathtrace_common::network::destination::Destination;
use pathtrace_common::network::packet::PacketDescriptor;
use pathtrace_core::routing::RouteMatch;
use pathtrace_core::trace::{Location, TraceOutcome};

pub type Detail = (String, ColoredString);

pub fn location_to_colored(location: Location) -> ColoredString {
    let color: Color = match location {
        Location::Dns => colors::LOC_DNS,
        Location::Firewall => colors::LOC_FIREWALL,
        Location::Router => colors::LOC_ROUTER,
        Location::Destination => colors::LOC_DESTINATION,
        Location::Gateway => colors::LOC_GATEWAY,
    };
    location.to_string().color(color).bold()
}

pub fn outcome_to_colored(outcome: TraceOutcome) -> ColoredString {
    let text: String = outcome.to_string().replace('_', " ");
    match outcome {
        TraceOutcome::DestinationReached | TraceOutcome::HandedOff => text.green().bold(),
        TraceOutcome::Blocked => text.red().bold(),
        TraceOutcome::Unreachable | TraceOutcome::TtlExceeded => text.yellow().bold(),
    }
}

pub fn packet_to_details(packet: &PacketDescriptor, default_ttl: u32) -> Vec<Detail> {
    let destination: ColoredString = match &packet.destination {
        Destination::Address(addr) => addr.to_string().color(colors::IPV4_ADDR),
        Destination::Domain(domain) => domain.normal(),
    };
    let source: ColoredString = packet
        .source
        .map(|addr| addr.to_string().color(colors::IPV4_ADDR))
        .unwrap_or_else(|| "unspecified".dimmed());
    let protocol: ColoredString = packet
        .protocol
        .as_deref()
        .map(|p| p.normal())
        .unwrap_or_else(|| "any".dimmed());
    let port: ColoredString = packet
        .port
        .map(|p| p.to_string().normal())
        .unwrap_or_else(|| "any".dimmed());
    let ttl: ColoredString = match packet.ttl {
        Some(ttl) => ttl.to_string().normal(),
        None => format!("{default_ttl} (default)").dimmed(),
    };

    vec![
        ("Dest".to_string(), destination),
        ("Source".to_string(), source),
        ("Proto".to_string(), protocol),
        ("Port".to_string(), port),
        ("TTL".to_string(), ttl),
    ]
}

pub fn route_to_details(found: &RouteMatch<'_>) -> Vec<Detail> {
    vec![
        ("Network".to_string(), found.cidr.to_string().color(colors::IPV4_ADDR)),
        ("Gateway".to_string(), found.route.gateway.normal()),
        ("Iface".to_string(), found.route.interface.normal()),
    ]
}
