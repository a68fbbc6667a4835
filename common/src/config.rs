//! # Network Configuration
//!
//! The declarative description of the modeled network, loaded from JSON.
//!
//! Loading is the only place where shape problems are reported. Once a [`Config`] exists the
//! trace engine never fails because of it: empty sections degrade to permissive defaults and
//! individually malformed rules or routes are skipped where they are evaluated.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::network::normalize_domain;
use crate::network::range::PortSpec;

pub const DEFAULT_TTL: u32 = 16;
pub const DEFAULT_DEADLINE_MS: u64 = 2_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Name records, either as a list of `{domain, target}` or a `domain -> target` map.
    #[serde(default)]
    pub dns: DnsRecords,

    /// Firewall rules. Order is priority.
    #[serde(default)]
    pub firewall: Vec<FirewallRule>,

    #[serde(default)]
    pub routes: Vec<Route>,

    #[serde(default)]
    pub trace: TraceSettings,
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.trace.validate()?;
        config.warn_empty_sections();
        Ok(config)
    }

    fn warn_empty_sections(&self) {
        if self.dns.is_empty() {
            warn!("No DNS records configured, every lookup will fail with NXDOMAIN");
        }
        if self.firewall.is_empty() {
            warn!("No firewall rules configured, all traffic is allowed");
        }
        if self.routes.is_empty() {
            warn!("No routes configured, every destination is unreachable");
        }
    }
}

// ---------------------------------------------------------------------------
// Name records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub domain: String,
    /// An IPv4 address or the name of another record.
    #[serde(alias = "ip")]
    pub target: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDnsRecords {
    List(Vec<DomainRecord>),
    Map(BTreeMap<String, String>),
}

/// Canonical `domain -> target` mapping, keyed by normalized domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawDnsRecords")]
pub struct DnsRecords {
    records: BTreeMap<String, String>,
}

impl DnsRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a record. Returns the previous target, if any.
    pub fn insert(&mut self, domain: &str, target: &str) -> Option<String> {
        self.records
            .insert(normalize_domain(domain), target.trim().to_string())
    }

    pub fn get(&self, domain: &str) -> Option<&str> {
        self.records
            .get(&normalize_domain(domain))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<RawDnsRecords> for DnsRecords {
    fn from(raw: RawDnsRecords) -> Self {
        let mut records = DnsRecords::new();
        match raw {
            RawDnsRecords::List(list) => {
                for record in list {
                    if let Some(previous) = records.insert(&record.domain, &record.target) {
                        warn!(
                            "Duplicate record for {}, replacing {} with {}",
                            record.domain, previous, record.target
                        );
                    }
                }
            }
            RawDnsRecords::Map(map) => {
                for (domain, target) in map {
                    records.insert(&domain, &target);
                }
            }
        }
        records
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for DnsRecords {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut records = DnsRecords::new();
        for (domain, target) in iter {
            records.insert(domain, target);
        }
        records
    }
}

// ---------------------------------------------------------------------------
// Firewall rules and routes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[serde(alias = "ALLOW", alias = "Allow", alias = "accept")]
    Allow,
    #[serde(alias = "DENY", alias = "Deny", alias = "drop")]
    Deny,
}

/// Each predicate left as `None` matches every packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRule {
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default, alias = "dest_port")]
    pub port: Option<PortSpec>,
    /// An address, a CIDR block, or `"any"`.
    #[serde(default)]
    pub source: Option<String>,
    pub action: Action,
}

impl FirewallRule {
    pub fn new(action: Action) -> Self {
        Self {
            protocol: None,
            port: None,
            source: None,
            action,
        }
    }

    pub fn protocol(mut self, protocol: &str) -> Self {
        self.protocol = Some(protocol.to_string());
        self
    }

    pub fn port(mut self, port: impl Into<PortSpec>) -> Self {
        self.port = Some(port.into());
        self
    }

    pub fn source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub cidr: String,
    /// Next-hop address, or a local-delivery sentinel such as `direct`.
    pub gateway: String,
    pub interface: String,
}

impl Route {
    pub fn new(cidr: &str, gateway: &str, interface: &str) -> Self {
        Self {
            cidr: cidr.to_string(),
            gateway: gateway.to_string(),
            interface: interface.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Trace settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    /// Hop budget used when a packet carries no TTL.
    pub default_ttl: u32,

    /// Gateways that denote delivery on a directly attached network. Compared case-insensitively.
    pub local_gateways: Vec<String>,

    /// Stop at the default route and report the packet as handed off to the internet.
    pub internet_handoff: bool,

    /// Wall-clock limit a host applies to a single trace.
    pub deadline_ms: u64,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            local_gateways: vec!["direct".to_string(), "0.0.0.0".to_string()],
            internet_handoff: false,
            deadline_ms: DEFAULT_DEADLINE_MS,
        }
    }
}

impl TraceSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_ttl == 0 {
            return Err(ConfigError::Invalid(
                "trace.default_ttl must be positive".to_string(),
            ));
        }
        if self.deadline_ms == 0 {
            return Err(ConfigError::Invalid(
                "trace.deadline_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_local_gateway(&self, gateway: &str) -> bool {
        let gateway = gateway.trim();
        self.local_gateways
            .iter()
            .any(|sentinel| sentinel.eq_ignore_ascii_case(gateway))
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
