use serde::{Deserialize, Serialize};

/// Destination-port predicate of a firewall rule.
///
/// Configurations may give a bare integer (`22`), a numeric string (`"22"`) or an
/// inclusive range (`"80-443"`). Anything else never matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortSpec {
    Number(i64),
    Text(String),
}

impl PortSpec {
    /// Inclusive `(start, end)` bounds, or `None` when the spec cannot be parsed.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        match self {
            PortSpec::Number(port) => Some((*port, *port)),
            PortSpec::Text(text) => parse_text(text),
        }
    }

    pub fn matches(&self, port: u16) -> bool {
        let port = i64::from(port);
        self.bounds()
            .is_some_and(|(start, end)| start <= port && port <= end)
    }
}

impl From<u16> for PortSpec {
    fn from(port: u16) -> Self {
        PortSpec::Number(i64::from(port))
    }
}

impl From<&str> for PortSpec {
    fn from(text: &str) -> Self {
        PortSpec::Text(text.to_string())
    }
}

fn parse_text(text: &str) -> Option<(i64, i64)> {
    let text = text.trim();
    match text.split_once('-') {
        Some((start_str, end_str)) => {
            let start = start_str.trim().parse::<i64>().ok()?;
            let end = end_str.trim().parse::<i64>().ok()?;
            Some((start, end))
        }
        None => {
            let port = text.parse::<i64>().ok()?;
            Some((port, port))
        }
    }
}
