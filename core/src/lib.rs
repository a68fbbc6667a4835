//! # Pathtrace Core
//!
//! The trace engine and the three lookups it is built from.
//!
//! * **[`resolver`]**: Name to address, following alias chains.
//! * **[`firewall`]**: First-match allow/deny evaluation over ordered rules.
//! * **[`routing`]**: Longest-prefix-match route selection.
//! * **[`trace`]**: The hop-by-hop state machine combining them under a TTL budget.
//!
//! Every component owns immutable configuration and keeps no per-call state, so a single
//! [`TraceEngine`] can serve any number of concurrent traces.

pub mod firewall;
pub mod resolver;
pub mod routing;
pub mod trace;

pub use firewall::{FirewallEvaluator, Verdict};
pub use resolver::{NameResolver, Resolution, ResolveError};
pub use routing::{RouteError, RouteMatch, RoutingTable};
pub use trace::{DeadlineExceeded, HopRecord, Location, Trace, TraceEngine, TraceOutcome};
