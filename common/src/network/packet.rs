//! # Synthetic Packets
//!
//! [`TraceRequest`] is the loosely-typed input a host receives (CLI flags, JSON body).
//! [`PacketDescriptor`] is the validated form the trace engine consumes. Conversion between
//! the two is the only place caller input is rejected.

use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::destination::Destination;
use crate::network::parse_ipv4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("a destination is required")]
    MissingDestination,
    #[error("ttl must be a positive integer")]
    InvalidTtl,
    #[error("invalid source address '{0}'")]
    InvalidSource(String),
    #[error("malformed trace request: {0}")]
    Malformed(String),
}

/// Trace input as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TraceRequest {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub dest: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub ttl: Option<u32>,
}

impl TraceRequest {
    pub fn from_json(json: &str) -> Result<Self, RequestError> {
        serde_json::from_str(json).map_err(|e| RequestError::Malformed(e.to_string()))
    }
}

/// A validated packet, immutable for the lifetime of a trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketDescriptor {
    pub source: Option<Ipv4Addr>,
    pub destination: Destination,
    pub protocol: Option<String>,
    pub port: Option<u16>,
    /// Hop budget. `None` defers to the engine's configured default.
    pub ttl: Option<u32>,
}

impl PacketDescriptor {
    pub fn new(destination: Destination) -> Self {
        Self {
            source: None,
            destination,
            protocol: None,
            port: None,
            ttl: None,
        }
    }

    pub fn with_source(mut self, source: Ipv4Addr) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

impl TryFrom<TraceRequest> for PacketDescriptor {
    type Error = RequestError;

    fn try_from(request: TraceRequest) -> Result<Self, Self::Error> {
        let dest = request
            .dest
            .filter(|dest| !dest.trim().is_empty())
            .ok_or(RequestError::MissingDestination)?;
        let destination =
            Destination::from_str(&dest).map_err(|_| RequestError::MissingDestination)?;

        if request.ttl == Some(0) {
            return Err(RequestError::InvalidTtl);
        }

        let source = request
            .source
            .map(|source| {
                parse_ipv4(&source).ok_or_else(|| RequestError::InvalidSource(source.clone()))
            })
            .transpose()?;

        Ok(Self {
            source,
            destination,
            protocol: request.protocol,
            port: request.port,
            ttl: request.ttl,
        })
    }
}
