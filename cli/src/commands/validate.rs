use colored::*;
use pathtrace_common::config::Config;
use pathtrace_core::trace::TraceEngine;
use tracing::{info, warn};

use crate::terminal::print;

/// Summarizes the configuration and lists entries that will never take effect.
pub fn validate(cfg: Config) -> anyhow::Result<()> {
    let engine: TraceEngine = TraceEngine::from_config(cfg);
    let settings = engine.settings();

    print::header("configuration");
    print::set_key_width(["Records", "Rules", "Routes", "Default TTL", "Local gateways"]);
    print::aligned_line("Records", engine.resolver().records().len().to_string());
    print::aligned_line("Rules", engine.firewall().rules().len().to_string());
    print::aligned_line("Routes", engine.routing().len().to_string());
    print::aligned_line("Default TTL", settings.default_ttl.to_string());
    print::aligned_line("Local gateways", settings.local_gateways.join(", "));

    let mut problems: usize = 0;

    for (domain, _) in engine.resolver().records().iter() {
        if let Err(e) = engine.resolver().resolve(domain) {
            warn!("Record {}: {e}", domain.bold());
            problems += 1;
        }
    }

    for (idx, reason) in engine.firewall().malformed_rules() {
        warn!("Firewall rule #{idx} will be skipped: {reason}");
        problems += 1;
    }

    for (idx, route, e) in engine.routing().malformed() {
        warn!("Route #{idx} ({} via {}) will be skipped: {e}", route.cidr, route.interface);
        problems += 1;
    }

    if problems == 0 {
        info!("Configuration is consistent");
    } else {
        warn!("{problems} entries need attention");
    }
    Ok(())
}
