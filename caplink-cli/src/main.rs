//! `caplink` binary.
//!
//! Exit status is 0 on success, 2 when a merge or time budget ran out
//! without `--allow-partial`, and 1 for every other failure.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use caplink_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging::{self, LoggingError},
};
use caplink_core::{CaplinkError, CaplinkErrorCode};
use tracing::{error, field};

const BUDGET_EXHAUSTED: u8 = 2;

fn try_main() -> Result<()> {
    let summary = run_cli(Cli::parse()).context("clustering failed")?;
    let mut out = BufWriter::new(io::stdout().lock());
    render_summary(&summary, &mut out).context("failed to write partition")?;
    out.flush().context("failed to flush partition")
}

fn core_error(err: &anyhow::Error) -> Option<&CaplinkError> {
    match err.downcast_ref::<CliError>()? {
        CliError::Core(core) => Some(core),
        _ => None,
    }
}

fn report(err: &anyhow::Error) -> ExitCode {
    let core = core_error(err);
    error!(
        error = %err,
        cause = %err.root_cause(),
        code = core.map(|core| field::display(core.code().as_str())),
        point_source_code = core
            .and_then(CaplinkError::point_source_code)
            .map(|code| field::display(code.as_str())),
        "caplink failed"
    );
    match core.map(CaplinkError::code) {
        Some(CaplinkErrorCode::BudgetExceeded) => ExitCode::from(BUDGET_EXHAUSTED),
        _ => ExitCode::FAILURE,
    }
}

#[expect(
    clippy::print_stderr,
    reason = "tracing is not available until logging is initialised"
)]
fn report_logging_failure(err: &LoggingError) {
    eprintln!("caplink: cannot initialise logging: {err}");
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_failure(&err);
        return ExitCode::FAILURE;
    }
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}
