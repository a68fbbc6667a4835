use pathtrace_common::config::Config;
use pathtrace_common::network::packet::{PacketDescriptor, TraceRequest};
use pathtrace_core::trace::{Location, Trace, TraceEngine};

pub const SCENARIO_A: &str = include_str!("../fixtures/scenario_a.json");
pub const SCENARIO_B: &str = include_str!("../fixtures/scenario_b.json");
pub const CAMPUS: &str = include_str!("../fixtures/campus.json");

pub fn engine(fixture: &str) -> TraceEngine {
    TraceEngine::from_config(Config::from_json(fixture).unwrap())
}

/// Builds a packet the way a host would, from a JSON request body.
pub fn packet(request: &str) -> PacketDescriptor {
    PacketDescriptor::try_from(TraceRequest::from_json(request).unwrap()).unwrap()
}

pub fn locations(trace: &Trace) -> Vec<Location> {
    trace.hops.iter().map(|h| h.location).collect()
}
