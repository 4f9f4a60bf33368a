//! Support library for the caplink CLI binary.
//!
//! Exposes the command pipeline and logging setup so doctests and
//! integration tests can drive them without forking a subprocess.

pub mod cli;
pub mod logging;
