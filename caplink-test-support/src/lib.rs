//! Shared test utilities used across caplink crates.
//!
//! - [`tracing`]: a recording layer for asserting spans and events.
//! - [`ci`]: environment-driven tuning for property suites.
//! - [`clouds`]: small point clouds with known clustering outcomes.

pub mod ci;
pub mod clouds;
pub mod tracing;
