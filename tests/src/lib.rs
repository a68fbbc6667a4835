//! End-to-end trace scenarios driven from JSON fixtures.

#[cfg(test)]
mod trace;
#[cfg(test)]
mod util;
