mod commands;
mod terminal;

use anyhow::Context;
use commands::{CommandLine, Commands, resolve, route, trace, validate};
use pathtrace_common::config::Config;
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);

    let mut cfg = Config::load(&commands.config)
        .with_context(|| format!("loading {}", commands.config.display()))?;
    commands.apply_overrides(&mut cfg.trace);

    match commands.command {
        Commands::Trace(args) => trace::trace(args, cfg).await,
        Commands::Resolve { domain } => resolve::resolve(&domain, cfg),
        Commands::Route { address } => route::route(&address, cfg),
        Commands::Validate => validate::validate(cfg),
    }
}
