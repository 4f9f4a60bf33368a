//! Command implementations and argument parsing for the caplink CLI.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use caplink_core::{
    Caplink, CaplinkBuilder, CaplinkError, ClusteringResult, DEFAULT_MAX_CLUSTER_SIZE,
    ExecutionStrategy, NeighbourBackend, PointSource,
};
use caplink_providers_dense::{PointMatrixProvider, PointMatrixProviderError};
use caplink_providers_text::{TextPointProvider, TextPointProviderError};
use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::{Span, field, info, instrument, warn};

use super::byte_size::parse_byte_size;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "caplink",
    about = "Partition 3D points into clusters of bounded size."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Cluster the points of one input source.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Maximum number of points per cluster.
    #[arg(
        long = "max-cluster-size",
        default_value_t = DEFAULT_MAX_CLUSTER_SIZE,
        value_parser = clap::value_parser!(usize),
    )]
    pub max_cluster_size: usize,

    /// How proposals are computed each round.
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    pub strategy: StrategyArg,

    /// Nearest-neighbour index used each round.
    #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
    pub backend: BackendArg,

    /// Stop after this many merges.
    #[arg(long = "max-merges")]
    pub max_merges: Option<usize>,

    /// Stop after this many milliseconds of merging.
    #[arg(long = "time-limit-ms")]
    pub time_limit_ms: Option<u64>,

    /// Peak bytes a k-d tree may use before a round falls back to brute force
    /// (accepts suffixes such as `64M` or `1GiB`).
    #[arg(long = "memory-limit-bytes", value_parser = parse_byte_size)]
    pub memory_limit_bytes: Option<u64>,

    /// Print the partial partition instead of failing when a budget trips.
    #[arg(long = "allow-partial")]
    pub allow_partial: bool,

    /// Input source configuration.
    #[command(subcommand)]
    pub source: RunSource,
}

/// Execution strategies selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Parallel for large inputs when the build supports it.
    Auto,
    /// Always sequential.
    Sequential,
    /// Always parallel.
    Parallel,
}

impl From<StrategyArg> for ExecutionStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Auto => Self::Auto,
            StrategyArg::Sequential => Self::Sequential,
            StrategyArg::Parallel => Self::Parallel,
        }
    }
}

/// Neighbour backends selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// k-d tree for large rounds, brute force for small ones.
    Auto,
    /// Exhaustive scan.
    BruteForce,
    /// Exact k-d tree rebuilt each round.
    KdTree,
    /// Nearest neighbours cached between rounds.
    Incremental,
}

impl From<BackendArg> for NeighbourBackend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Auto => Self::Auto,
            BackendArg::BruteForce => Self::BruteForce,
            BackendArg::KdTree => Self::KdTree,
            BackendArg::Incremental => Self::Incremental,
        }
    }
}

/// Input sources supported by the `run` command.
#[derive(Debug, Subcommand, Clone)]
pub enum RunSource {
    /// Read a Parquet file containing a `FixedSizeList<Float32 | Float64, 3>` column.
    Parquet(ParquetArgs),
    /// Read a UTF-8 text file with one `x y z` point per line.
    Text(TextArgs),
}

/// Parquet ingestion arguments.
#[derive(Debug, Args, Clone)]
pub struct ParquetArgs {
    /// Path to the Parquet file containing points.
    pub path: PathBuf,

    /// Column containing `FixedSizeList<Float32 | Float64, 3>` rows.
    #[arg(long)]
    pub column: String,

    /// Override name for the data source (defaults to the file name).
    #[arg(long)]
    pub name: Option<String>,
}

/// Text ingestion arguments.
#[derive(Debug, Args, Clone)]
pub struct TextArgs {
    /// Path to a UTF-8 text file with one point per line.
    pub path: PathBuf,

    /// Override name for the data source (defaults to the file name).
    #[arg(long)]
    pub name: Option<String>,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while loading an input source.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Parquet ingestion failed.
    #[error(transparent)]
    Dense(#[from] PointMatrixProviderError),
    /// Text ingestion failed.
    #[error(transparent)]
    Text(#[from] TextPointProviderError),
    /// Configuration or clustering failed.
    #[error(transparent)]
    Core(#[from] CaplinkError),
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name reported by the point source.
    pub data_source: String,
    /// Partition produced by the run.
    pub result: ClusteringResult,
    /// `false` when a budget stopped the run and `--allow-partial` was set.
    pub complete: bool,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading the input or clustering fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use caplink_cli::cli::{BackendArg, Cli, Command, RunCommand, RunSource, StrategyArg, TextArgs, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "0 0 0\n0 0 1\n")?;
/// let cli = Cli {
///     command: Command::Run(RunCommand {
///         max_cluster_size: 2,
///         strategy: StrategyArg::Sequential,
///         backend: BackendArg::Auto,
///         max_merges: None,
///         time_limit_ms: None,
///         memory_limit_bytes: None,
///         allow_partial: false,
///         source: RunSource::Text(TextArgs {
///             path: file.path().to_path_buf(),
///             name: None,
///         }),
///     }),
/// };
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.result.assignments(), &[0, 0]);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(max_cluster_size = field::Empty, source = field::Empty),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let caplink = build_caplink(&command)?;

    let span = Span::current();
    span.record("max_cluster_size", field::display(command.max_cluster_size));

    let allow_partial = command.allow_partial;
    let summary = match command.source {
        RunSource::Parquet(args) => {
            span.record("source", field::display("parquet"));
            run_parquet(&caplink, args, allow_partial)?
        }
        RunSource::Text(args) => {
            span.record("source", field::display("text"));
            run_text(&caplink, args, allow_partial)?
        }
    };

    info!(
        data_source = summary.data_source.as_str(),
        clusters = summary.result.cluster_count(),
        merges = summary.result.merges(),
        complete = summary.complete,
        "command completed"
    );
    Ok(summary)
}

pub(super) fn build_caplink(command: &RunCommand) -> Result<Caplink, CliError> {
    let mut builder = CaplinkBuilder::new()
        .with_max_cluster_size(command.max_cluster_size)
        .with_execution_strategy(command.strategy.into())
        .with_neighbour_backend(command.backend.into());
    if let Some(merges) = command.max_merges {
        builder = builder.with_max_merges(merges);
    }
    if let Some(millis) = command.time_limit_ms {
        builder = builder.with_time_limit(Duration::from_millis(millis));
    }
    if let Some(bytes) = command.memory_limit_bytes {
        builder = builder.with_memory_limit(bytes);
    }
    Ok(builder.build()?)
}

#[instrument(
    name = "cli.run_parquet",
    err,
    skip(caplink, args),
    fields(path = field::Empty, column = field::Empty, override_name = field::Empty),
)]
pub(super) fn run_parquet(
    caplink: &Caplink,
    args: ParquetArgs,
    allow_partial: bool,
) -> Result<ExecutionSummary, CliError> {
    let ParquetArgs { path, column, name } = args;
    let span = Span::current();
    span.record("path", field::display(path.display()));
    span.record("column", field::display(&column));
    span.record(
        "override_name",
        field::display(name.as_deref().unwrap_or("<derived>")),
    );
    let chosen_name = derive_data_source_name(&path, name.as_deref());
    let provider = PointMatrixProvider::try_from_parquet_path(chosen_name, &path, &column)?;
    execute(caplink, &provider, allow_partial)
}

#[instrument(
    name = "cli.run_text",
    err,
    skip(caplink, args),
    fields(path = field::Empty, override_name = field::Empty),
)]
pub(super) fn run_text(
    caplink: &Caplink,
    args: TextArgs,
    allow_partial: bool,
) -> Result<ExecutionSummary, CliError> {
    let TextArgs { path, name } = args;
    let span = Span::current();
    span.record("path", field::display(path.display()));
    span.record(
        "override_name",
        field::display(name.as_deref().unwrap_or("<derived>")),
    );
    let chosen_name = derive_data_source_name(&path, name.as_deref());
    let reader = open_text_reader(&path)?;
    let provider = TextPointProvider::try_from_reader(chosen_name, reader)?;
    execute(caplink, &provider, allow_partial)
}

fn execute<S: PointSource + ?Sized>(
    caplink: &Caplink,
    provider: &S,
    allow_partial: bool,
) -> Result<ExecutionSummary, CliError> {
    let data_source = provider.name().to_owned();
    match caplink.run(provider) {
        Ok(result) => Ok(ExecutionSummary {
            data_source,
            result,
            complete: true,
        }),
        Err(CaplinkError::BudgetExceeded {
            limit,
            merges,
            partial,
        }) if allow_partial => {
            warn!(%limit, merges, "reporting partial partition");
            Ok(ExecutionSummary {
                data_source,
                result: *partial,
                complete: false,
            })
        }
        Err(err) => Err(err.into()),
    }
}

#[instrument(name = "cli.open_text_reader", err, fields(path = field::Empty))]
pub(super) fn open_text_reader(path: &Path) -> Result<BufReader<File>, CliError> {
    Span::current().record("path", field::display(path.display()));
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

pub(super) fn derive_data_source_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map_or_else(|| "data_source".to_owned(), ToOwned::to_owned)
}

/// Renders `summary` to `writer`.
///
/// Three header lines (`data source`, `clusters`, `merges`) are followed by
/// one `clusterIndex:pointIndex` line per point in point order, where
/// `clusterIndex` is the cluster's position in ascending id order.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use caplink_cli::cli::{ExecutionSummary, render_summary};
/// # use caplink_core::{Cluster, ClusterId, ClusteringResult, Point};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let result = ClusteringResult::try_from_clusters(
///     3,
///     vec![
///         Cluster::new(ClusterId::new(0), vec![0, 2], Point::new(0.5, 0.0, 0.0)),
///         Cluster::new(ClusterId::new(1), vec![1], Point::new(9.0, 0.0, 0.0)),
///     ],
/// )?;
/// let summary = ExecutionSummary {
///     data_source: "demo".into(),
///     result,
///     complete: true,
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert_eq!(
///     String::from_utf8(buffer)?,
///     "data source: demo\nclusters: 2\nmerges: 0\n0:0\n1:1\n0:2\n",
/// );
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "data source: {}", summary.data_source)?;
    writeln!(writer, "clusters: {}", summary.result.cluster_count())?;
    writeln!(writer, "merges: {}", summary.result.merges())?;
    for (point, cluster) in summary.result.assignments().iter().enumerate() {
        writeln!(writer, "{cluster}:{point}")?;
    }
    Ok(())
}
