//! Command-line interface orchestration for caplink.
//!
//! The `run` command loads points from a Parquet column or an `x y z` text
//! file, partitions them into size-bounded clusters and reports the
//! assignment of every point.

mod byte_size;
mod commands;

pub use byte_size::{ByteSizeError, parse_byte_size};
pub use commands::{
    BackendArg, Cli, CliError, Command, ExecutionSummary, ParquetArgs, RunCommand, RunSource,
    StrategyArg, TextArgs, render_summary, run_cli,
};

#[cfg(test)]
mod test_byte_size;
#[cfg(test)]
mod test_fixtures;
#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod tests;
