use std::sync::Arc;

use pathtrace_common::config::Config;
use pathtrace_common::network::packet::{PacketDescriptor, RequestError, TraceRequest};
use pathtrace_core::trace::{Location, TraceEngine, TraceOutcome};
use serde_json::json;

use crate::util::{self, CAMPUS, SCENARIO_A, SCENARIO_B};

#[test]
fn scenario_a_direct_delivery() {
    let engine = util::engine(SCENARIO_A);
    let trace = engine.trace(&util::packet(r#"{"dest": "example.com", "ttl": 5}"#));

    assert_eq!(trace.outcome, TraceOutcome::DestinationReached);
    assert_eq!(
        serde_json::to_value(&trace.hops).unwrap(),
        json!([
            { "hop": 1, "location": "DNS", "action": "Resolved example.com -> 10.0.0.5" },
            { "hop": 2, "location": "Router", "action": "Forwarded to direct via eth0 (Match: 10.0.0.0/24)" },
            { "hop": 3, "location": "Destination", "action": "Packet reached destination network" }
        ])
    );
}

#[test]
fn scenario_b_blocked_by_first_rule() {
    let engine = util::engine(SCENARIO_B);
    let trace = engine.trace(&util::packet(
        r#"{"dest": "ssh.example.com", "protocol": "TCP", "port": 22}"#,
    ));

    assert_eq!(trace.outcome, TraceOutcome::Blocked);
    assert_eq!(util::locations(&trace), vec![Location::Dns, Location::Firewall]);
    assert_eq!(trace.last().unwrap().action, "Blocked by rule #1");

    // Same host on another port falls through to the catch-all allow
    let https = engine.trace(&util::packet(
        r#"{"dest": "ssh.example.com", "protocol": "TCP", "port": 443}"#,
    ));
    assert_eq!(https.outcome, TraceOutcome::DestinationReached);
}

#[test]
fn scenario_c_nxdomain() {
    let engine = util::engine(SCENARIO_A);
    let trace = engine.trace(&util::packet(r#"{"dest": "unknown.example.com"}"#));

    assert_eq!(trace.outcome, TraceOutcome::Unreachable);
    assert_eq!(trace.len(), 1);
    assert_eq!(trace.hops[0].location, Location::Dns);
    assert_eq!(trace.hops[0].action, "NXDOMAIN: unknown.example.com not found");
}

#[test]
fn alias_chain_reaches_vlan_and_ties_keep_first_route() {
    let engine = util::engine(CAMPUS);
    let trace = engine.trace(&util::packet(r#"{"dest": "www.campus.edu"}"#));

    assert_eq!(trace.outcome, TraceOutcome::DestinationReached);
    assert_eq!(
        trace.hops[0].action,
        "Resolved www.campus.edu -> web.campus.edu -> intranet.campus.edu -> 10.1.20.15"
    );
    assert_eq!(
        trace.hops[1].action,
        "Forwarded to direct via vlan20 (Match: 10.1.20.0/24)"
    );
}

#[test]
fn broken_names_end_at_dns() {
    let engine = util::engine(CAMPUS);

    let cyclic = engine.trace(&util::packet(r#"{"dest": "loop-a.campus.edu"}"#));
    assert_eq!(cyclic.outcome, TraceOutcome::Unreachable);
    assert_eq!(cyclic.len(), 1);
    assert_eq!(
        cyclic.hops[0].action,
        "cyclic resolution: loop-a.campus.edu -> loop-b.campus.edu -> loop-a.campus.edu"
    );

    let dangling = engine.trace(&util::packet(r#"{"dest": "dangling.campus.edu"}"#));
    assert_eq!(dangling.outcome, TraceOutcome::Unreachable);
    assert_eq!(dangling.hops[0].action, "NXDOMAIN: gone.campus.edu not found");
}

#[test]
fn forwarding_without_delivery_exhausts_default_ttl() {
    let engine = util::engine(CAMPUS);
    let trace = engine.trace(&util::packet(r#"{"dest": "mirror.campus.edu"}"#));

    // DNS, six forwards from the configured default TTL, then the TTL hop
    assert_eq!(trace.outcome, TraceOutcome::TtlExceeded);
    assert_eq!(trace.len(), 8);
    assert!(
        trace.hops[1..7]
            .iter()
            .all(|h| h.action == "Forwarded to 10.255.0.9 via lab0 (Match: 172.16.0.0/12)")
    );

    let indices: Vec<usize> = trace.hops.iter().map(|h| h.hop).collect();
    assert_eq!(indices, (1..=8).collect::<Vec<usize>>());
}

#[test]
fn ttl_one_makes_exactly_one_routing_attempt() {
    let engine = util::engine(CAMPUS);
    let trace = engine.trace(&util::packet(r#"{"dest": "mirror.campus.edu", "ttl": 1}"#));

    assert_eq!(trace.outcome, TraceOutcome::TtlExceeded);
    assert_eq!(
        util::locations(&trace),
        vec![Location::Dns, Location::Router, Location::Router]
    );
    assert_eq!(trace.hops[2].action, "Time to Live (TTL) exceeded");
}

#[test]
fn firewall_first_match_with_ranges_and_sources() {
    let engine = util::engine(CAMPUS);
    let outcome = |request: &str| engine.trace(&util::packet(request)).outcome;

    // Rule 1: telnet
    let telnet = engine.trace(&util::packet(
        r#"{"dest": "intranet.campus.edu", "protocol": "TCP", "port": 23}"#,
    ));
    assert_eq!(telnet.last().unwrap().action, "Blocked by rule #1");

    // Rule 2: X11 range, only from 10.0.0.0/8
    let x11_inside = engine.trace(&util::packet(
        r#"{"dest": "intranet.campus.edu", "source": "10.3.3.3", "protocol": "TCP", "port": 6010}"#,
    ));
    assert_eq!(x11_inside.last().unwrap().action, "Blocked by rule #2");
    assert_eq!(
        outcome(r#"{"dest": "intranet.campus.edu", "source": "192.168.1.1", "protocol": "TCP", "port": 6010}"#),
        TraceOutcome::DestinationReached
    );
    assert_eq!(
        outcome(r#"{"dest": "intranet.campus.edu", "source": "10.3.3.3", "protocol": "TCP", "port": 6064}"#),
        TraceOutcome::DestinationReached
    );

    // Rules 3 and 4 are malformed and never match
    assert_eq!(
        outcome(r#"{"dest": "intranet.campus.edu", "source": "192.168.66.5", "protocol": "TCP", "port": 80}"#),
        TraceOutcome::DestinationReached
    );

    // Rule 6 blocks the host, unless rule 5 allows it first
    let banned = engine.trace(&util::packet(
        r#"{"dest": "intranet.campus.edu", "source": "203.0.113.7", "protocol": "TCP", "port": 443}"#,
    ));
    assert_eq!(banned.last().unwrap().action, "Blocked by rule #6");
    assert_eq!(
        outcome(r#"{"dest": "intranet.campus.edu", "source": "203.0.113.7", "protocol": "UDP", "port": 53}"#),
        TraceOutcome::DestinationReached
    );
}

#[test]
fn address_literal_destination() {
    let engine = util::engine(CAMPUS);
    let trace = engine.trace(&util::packet(r#"{"dest": "10.1.20.99", "ttl": 2}"#));

    assert_eq!(trace.outcome, TraceOutcome::DestinationReached);
    assert_eq!(trace.hops[0].location, Location::Dns);
}

#[test]
fn default_route_handoff_is_opt_in() {
    let request = r#"{"dest": "search.example.org", "ttl": 3}"#;

    let plain = util::engine(CAMPUS).trace(&util::packet(request));
    assert_eq!(plain.outcome, TraceOutcome::TtlExceeded);

    let mut cfg = Config::from_json(CAMPUS).unwrap();
    cfg.trace.internet_handoff = true;
    let handoff = TraceEngine::from_config(cfg).trace(&util::packet(request));

    assert_eq!(handoff.outcome, TraceOutcome::HandedOff);
    assert_eq!(
        util::locations(&handoff),
        vec![Location::Dns, Location::Router, Location::Gateway]
    );
    assert_eq!(
        handoff.hops[1].action,
        "Forwarded to 198.51.100.1 via wan0 (Match: 0.0.0.0/0)"
    );
}

#[test]
fn malformed_entries_are_reported_not_fatal() {
    let engine = util::engine(CAMPUS);

    let rules: Vec<usize> = engine
        .firewall()
        .malformed_rules()
        .into_iter()
        .map(|(idx, _)| idx)
        .collect();
    assert_eq!(rules, vec![3, 4]);

    assert_eq!(engine.routing().len(), 6);
    assert_eq!(engine.routing().malformed().len(), 1);
    assert_eq!(engine.routing().malformed()[0].0, 7);
}

#[test]
fn empty_configuration_degrades_permissively() {
    let engine = util::engine("{}");

    let by_name = engine.trace(&util::packet(r#"{"dest": "example.com"}"#));
    assert_eq!(by_name.outcome, TraceOutcome::Unreachable);
    assert_eq!(by_name.len(), 1);

    let by_address = engine.trace(&util::packet(r#"{"dest": "10.0.0.1", "protocol": "TCP", "port": 22}"#));
    assert_eq!(by_address.outcome, TraceOutcome::Unreachable);
    assert_eq!(
        by_address.last().unwrap().action,
        "No route found for host: 10.0.0.1"
    );
}

#[test]
fn caller_errors_are_rejected_before_tracing() {
    let missing = TraceRequest::from_json(r#"{"protocol": "TCP"}"#).unwrap();
    assert_eq!(
        PacketDescriptor::try_from(missing),
        Err(RequestError::MissingDestination)
    );

    assert!(matches!(
        TraceRequest::from_json(r#"{"dest": "example.com", "ttl": "ten"}"#),
        Err(RequestError::Malformed(_))
    ));
}

#[test]
fn concurrent_traces_share_one_engine() {
    let engine = Arc::new(util::engine(CAMPUS));
    let requests = [
        r#"{"dest": "www.campus.edu"}"#,
        r#"{"dest": "mirror.campus.edu"}"#,
        r#"{"dest": "loop-a.campus.edu"}"#,
        r#"{"dest": "intranet.campus.edu", "protocol": "TCP", "port": 23}"#,
    ];
    let expected: Vec<_> = requests
        .iter()
        .map(|r| engine.trace(&util::packet(r)))
        .collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                scope.spawn(move || {
                    requests
                        .iter()
                        .map(|r| engine.trace(&util::packet(r)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
