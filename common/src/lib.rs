//! # Pathtrace Common
//!
//! Models shared by the trace engine and its hosts.
//!
//! * **[`config`]**: The declarative network description and its JSON loader.
//! * **[`network`]**: Address-level value types (CIDR blocks, port ranges, packets).

pub mod config;
pub mod network;
