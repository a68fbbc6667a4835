use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use pathtrace_common::config::Config;
use pathtrace_common::network::packet::{PacketDescriptor, TraceRequest};
use pathtrace_core::trace::{Trace, TraceEngine};
use tracing::info_span;

use crate::commands::TraceArgs;
use crate::terminal::{colors, format, print};
use crate::tprint;

pub async fn trace(args: TraceArgs, cfg: Config) -> anyhow::Result<()> {
    let request = TraceRequest {
        source: args.source,
        dest: Some(args.dest),
        protocol: args.protocol,
        port: args.port,
        ttl: args.ttl,
    };
    let packet: PacketDescriptor = PacketDescriptor::try_from(request).context("invalid trace request")?;

    let default_ttl: u32 = cfg.trace.default_ttl;
    let deadline: Duration = Duration::from_millis(cfg.trace.deadline_ms);
    let engine: TraceEngine = TraceEngine::from_config(cfg);

    let start_time: Instant = Instant::now();
    let trace: Trace = run_with_deadline(engine, packet.clone(), deadline).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&trace)?);
        return Ok(());
    }

    print_trace(&packet, &trace, default_ttl, start_time.elapsed());
    Ok(())
}

/// The engine is synchronous; it runs on the blocking pool and stops itself at the deadline.
async fn run_with_deadline(
    engine: TraceEngine,
    packet: PacketDescriptor,
    deadline: Duration,
) -> anyhow::Result<Trace> {
    let span = info_span!("trace_worker", dest = %packet.destination);
    let worker = tokio::task::spawn_blocking(move || {
        let _guard = span.enter();
        engine.trace_within(&packet, deadline)
    });

    let trace: Trace = worker.await.context("trace worker failed")??;
    Ok(trace)
}

fn print_trace(packet: &PacketDescriptor, trace: &Trace, default_ttl: u32, total_time: Duration) {
    print::header("packet");
    print::as_tree_one_level(format::packet_to_details(packet, default_ttl));
    tprint!();

    print::header("trace");
    for hop in &trace.hops {
        print::tree_head(hop.hop, &format::location_to_colored(hop.location));
        print::as_tree_one_level(vec![("Action".to_string(), hop.action.normal())]);
    }

    print_summary(trace, total_time);
}

fn print_summary(trace: &Trace, total_time: Duration) {
    let outcome: ColoredString = format::outcome_to_colored(trace.outcome);
    let hops: ColoredString = format!("{} hops", trace.len()).bold();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: ColoredString =
        format!("{outcome} after {hops} in {total_time}").color(colors::TEXT_DEFAULT);

    print::fat_separator();
    print::centerln(&output.to_string());
}
