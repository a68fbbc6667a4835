//! # Firewall Evaluation
//!
//! Stateless, first-match policy: rules are scanned in declared order and the first rule whose
//! predicates all hold decides. Specificity plays no part. When nothing matches, traffic is
//! allowed.

use std::net::Ipv4Addr;

use pathtrace_common::config::{Action, FirewallRule};
use pathtrace_common::network::{ALL_ADDRESSES, parse_ipv4};
use pathtrace_common::network::cidr::Cidr;
use pathtrace_common::network::packet::PacketDescriptor;
use serde::Serialize;
use tracing::debug;

/// Outcome of a firewall check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub allowed: bool,
    /// 1-based index of the deciding rule, `None` for the default allow.
    pub rule: Option<usize>,
}

impl Verdict {
    const DEFAULT_ALLOW: Verdict = Verdict {
        allowed: true,
        rule: None,
    };

    /// The rule that blocked the packet, if it was blocked.
    pub fn blocked_by(&self) -> Option<usize> {
        match self {
            Verdict {
                allowed: false,
                rule: Some(rule),
            } => Some(*rule),
            _ => None,
        }
    }
}

pub struct FirewallEvaluator {
    rules: Vec<FirewallRule>,
}

impl FirewallEvaluator {
    pub fn new(rules: Vec<FirewallRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[FirewallRule] {
        &self.rules
    }

    pub fn check(&self, packet: &PacketDescriptor) -> Verdict {
        for (idx, rule) in self.rules.iter().enumerate() {
            if !rule_matches(rule, packet) {
                continue;
            }

            let number = idx + 1;
            let allowed = rule.action == Action::Allow;
            debug!(
                "Rule #{number} matched, packet {}",
                if allowed { "allowed" } else { "denied" }
            );
            return Verdict {
                allowed,
                rule: Some(number),
            };
        }

        Verdict::DEFAULT_ALLOW
    }

    /// Rules whose source or port predicate can never match, with the reason.
    pub fn malformed_rules(&self) -> Vec<(usize, String)> {
        self.rules
            .iter()
            .enumerate()
            .filter_map(|(idx, rule)| malformed_reason(rule).map(|reason| (idx + 1, reason)))
            .collect()
    }
}

fn rule_matches(rule: &FirewallRule, packet: &PacketDescriptor) -> bool {
    protocol_matches(rule.protocol.as_deref(), packet.protocol.as_deref())
        && port_matches(rule, packet.port)
        && source_matches(rule.source.as_deref(), packet.source)
}

fn protocol_matches(expected: Option<&str>, actual: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(expected) => actual == Some(expected),
    }
}

fn port_matches(rule: &FirewallRule, port: Option<u16>) -> bool {
    match (&rule.port, port) {
        (None, _) => true,
        (Some(spec), Some(port)) => spec.matches(port),
        (Some(_), None) => false,
    }
}

fn source_matches(spec: Option<&str>, source: Option<Ipv4Addr>) -> bool {
    let Some(spec) = spec.map(str::trim) else {
        return true;
    };
    if spec.eq_ignore_ascii_case("any") || spec == ALL_ADDRESSES {
        return true;
    }

    let Some(source) = source else {
        return false;
    };
    if let Some(host) = parse_ipv4(spec) {
        return host == source;
    }
    if !spec.contains('/') {
        return false;
    }

    match spec.parse::<Cidr>() {
        Ok(cidr) => cidr.contains(source),
        Err(e) => {
            debug!("Skipping source predicate: {e}");
            false
        }
    }
}

fn malformed_reason(rule: &FirewallRule) -> Option<String> {
    if let Some(spec) = &rule.port
        && spec.bounds().is_none()
    {
        return Some(format!("unparseable port {spec:?}"));
    }

    let source = rule.source.as_deref()?.trim();
    if source.contains('/') && source != ALL_ADDRESSES {
        return source.parse::<Cidr>().err().map(|e| e.to_string());
    }
    None
}
