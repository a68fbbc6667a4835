pub mod resolve;
pub mod route;
pub mod trace;
pub mod validate;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pathtrace_common::config::TraceSettings;

#[derive(Parser)]
#[command(name = "pathtrace")]
#[command(about = "Trace synthetic packets through a modeled network.")]
pub struct CommandLine {
    /// Network description (JSON)
    #[arg(short, long, global = true, default_value = "network.json")]
    pub config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Hop budget for packets sent without a TTL
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    pub default_ttl: Option<u32>,

    /// Wall-clock limit for a single trace, in milliseconds
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub deadline_ms: Option<u64>,

    /// Stop at the default route and report the packet as handed off
    #[arg(long, global = true)]
    pub handoff: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Trace a packet to a domain or address
    #[command(alias = "t")]
    Trace(TraceArgs),
    /// Resolve a domain against the configured records
    #[command(alias = "r")]
    Resolve { domain: String },
    /// Show the route selected for an address
    Route { address: String },
    /// Load the configuration and report anything that will be skipped
    #[command(alias = "v")]
    Validate,
}

#[derive(Args)]
pub struct TraceArgs {
    /// Domain name or IPv4 address
    pub dest: String,

    /// Source address of the packet
    #[arg(short, long)]
    pub source: Option<String>,

    /// Protocol label matched against firewall rules (e.g. TCP)
    #[arg(short, long)]
    pub protocol: Option<String>,

    /// Destination port
    #[arg(long)]
    pub port: Option<u16>,

    /// Hop budget
    #[arg(long)]
    pub ttl: Option<u32>,

    /// Print the trace as JSON
    #[arg(long)]
    pub json: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Flags take precedence over the `trace` section of the config file.
    pub fn apply_overrides(&self, settings: &mut TraceSettings) {
        if let Some(ttl) = self.default_ttl {
            settings.default_ttl = ttl;
        }
        if let Some(deadline_ms) = self.deadline_ms {
            settings.deadline_ms = deadline_ms;
        }
        if self.handoff {
            settings.internet_handoff = true;
        }
    }
}
