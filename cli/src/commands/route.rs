use colored::*;
use pathtrace_common::config::Config;
use pathtrace_core::routing::RoutingTable;
use tracing::warn;

use crate::terminal::{format, print};

pub fn route(address: &str, cfg: Config) -> anyhow::Result<()> {
    let table: RoutingTable = RoutingTable::new(cfg.routes);

    print::header("route lookup");
    match table.find_route(address)? {
        Some(found) => {
            print::tree_head(1, &address.bold());
            print::as_tree_one_level(format::route_to_details(&found));
        }
        None => warn!("No route found for host: {address}"),
    }
    Ok(())
}
