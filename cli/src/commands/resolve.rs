use anyhow::Context;
use colored::*;
use pathtrace_common::config::Config;
use pathtrace_core::resolver::{NameResolver, Resolution};

use crate::terminal::{colors, print};

pub fn resolve(domain: &str, cfg: Config) -> anyhow::Result<()> {
    let resolver: NameResolver = NameResolver::new(cfg.dns);
    let resolution: Resolution = resolver
        .resolve(domain)
        .with_context(|| format!("could not resolve {domain}"))?;

    print::header("name resolution");
    print::set_key_width(["Domain", "Address", "Chain"]);
    print::aligned_line("Domain", domain);
    print::aligned_line(
        "Address",
        resolution.address.to_string().color(colors::IPV4_ADDR),
    );
    if resolution.is_alias() {
        print::aligned_line("Chain", resolution.chain_text());
    }
    Ok(())
}
