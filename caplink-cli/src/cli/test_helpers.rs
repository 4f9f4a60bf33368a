//! Small helpers shared across CLI tests.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use tempfile::TempDir;

use super::commands::run_command;
use super::{BackendArg, CliError, RunCommand, RunSource, StrategyArg, TextArgs};

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn create_text_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    let mut file = File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path)
}

/// A `run` command with default options over `source`.
pub(super) fn command_for(source: RunSource) -> RunCommand {
    RunCommand {
        max_cluster_size: 2,
        strategy: StrategyArg::Sequential,
        backend: BackendArg::Auto,
        max_merges: None,
        time_limit_ms: None,
        memory_limit_bytes: None,
        allow_partial: false,
        source,
    }
}

pub(super) fn text_source(path: PathBuf) -> RunSource {
    RunSource::Text(TextArgs { path, name: None })
}

pub(super) fn run_command_expecting_error(cmd: RunCommand, panic_msg: &str) -> CliError {
    match run_command(cmd) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
