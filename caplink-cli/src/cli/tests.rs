//! Unit tests for the CLI commands and input helpers.

use super::commands::{derive_data_source_name, run_command};
use super::test_fixtures::create_parquet_file;
use super::test_helpers::{
    command_for, create_text_file, run_command_expecting_error, temp_dir, text_source,
};
use super::{
    BackendArg, Cli, CliError, Command, ExecutionSummary, ParquetArgs, RunSource, StrategyArg,
    render_summary, run_cli,
};

use std::path::Path;

use caplink_core::{BudgetLimit, CaplinkError, ClusteringResult};
use caplink_providers_dense::PointMatrixProviderError;
use caplink_providers_text::TextPointProviderError;
use caplink_test_support::{clouds, tracing::RecordingLayer};
use clap::Parser;
use rstest::rstest;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn pairs_text() -> String {
    clouds::to_xyz_text(&clouds::two_pairs())
}

#[rstest]
#[case::override_name("/tmp/source.parquet", Some("override"), "override")]
#[case::stem_with_extension("/tmp/source.parquet", None, "source")]
#[case::stem_without_extension("/tmp/source", None, "source")]
#[case::missing_stem("", None, "data_source")]
fn derive_data_source_name_selects_expected_name(
    #[case] raw_path: &str,
    #[case] override_name: Option<&'static str>,
    #[case] expected: &str,
) {
    let path = Path::new(raw_path);
    let name = derive_data_source_name(path, override_name);
    assert_eq!(name, expected);
}

#[rstest]
#[case(1, vec![0, 1, 2, 3])]
#[case(2, vec![0, 0, 1, 1])]
#[case(6, vec![0, 0, 0, 0])]
fn run_text_success(#[case] max_cluster_size: usize, #[case] expected: Vec<usize>) -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "pairs.xyz", &pairs_text())?;
    let mut command = command_for(text_source(path));
    command.max_cluster_size = max_cluster_size;
    let summary = run_cli(Cli {
        command: Command::Run(command),
    })?;
    assert_eq!(summary.data_source, "pairs");
    assert_eq!(summary.result.assignments(), expected.as_slice());
    assert!(summary.complete);
    Ok(())
}

#[rstest]
fn run_text_accepts_empty_files() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "empty.xyz", "")?;
    let summary = run_command(command_for(text_source(path)))?;
    assert_eq!(summary.result.cluster_count(), 0);
    Ok(())
}

#[rstest]
fn run_text_rejects_malformed_lines() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "bad.xyz", "0 0 0\n1 1\n")?;
    let err = run_command_expecting_error(command_for(text_source(path)), "two fields must fail");
    assert!(matches!(
        err,
        CliError::Text(TextPointProviderError::WrongFieldCount { line: 2, found: 2 })
    ));
    Ok(())
}

#[rstest]
fn run_text_rejects_non_finite_coordinates() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "nan.xyz", "0 0 0\n1 inf 0\n")?;
    let err = run_command_expecting_error(command_for(text_source(path)), "inf must fail");
    assert!(matches!(
        err,
        CliError::Core(CaplinkError::NonFiniteCoordinate { index: 1, .. })
    ));
    Ok(())
}

#[rstest]
fn run_parquet_success() -> TestResult {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "points.parquet")?;
    let summary = run_command(command_for(RunSource::Parquet(ParquetArgs {
        path,
        column: "points".into(),
        name: Some("parquet".into()),
    })))?;
    assert_eq!(summary.data_source, "parquet");
    assert_eq!(summary.result.assignments(), &[0, 0, 1, 1]);
    Ok(())
}

#[rstest]
fn run_parquet_rejects_missing_column() -> TestResult {
    let dir = temp_dir();
    let path = create_parquet_file(&dir, "points.parquet")?;
    let err = run_command_expecting_error(
        command_for(RunSource::Parquet(ParquetArgs {
            path,
            column: "unknown".into(),
            name: None,
        })),
        "unknown column must fail",
    );
    assert!(matches!(
        err,
        CliError::Dense(PointMatrixProviderError::ColumnNotFound { .. })
    ));
    Ok(())
}

#[rstest]
fn run_command_rejects_zero_max_cluster_size() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "pairs.xyz", &pairs_text())?;
    let mut command = command_for(text_source(path));
    command.max_cluster_size = 0;
    let err = run_command_expecting_error(command, "zero max-cluster-size must fail");
    assert!(matches!(
        err,
        CliError::Core(CaplinkError::InvalidMaxClusterSize { got: 0 })
    ));
    Ok(())
}

#[rstest]
fn budget_trip_fails_without_allow_partial() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "pairs.xyz", &pairs_text())?;
    let mut command = command_for(text_source(path));
    command.max_merges = Some(1);
    let err = run_command_expecting_error(command, "merge budget must trip");
    assert!(matches!(
        err,
        CliError::Core(CaplinkError::BudgetExceeded {
            limit: BudgetLimit::Merges(1),
            ..
        })
    ));
    Ok(())
}

#[rstest]
fn allow_partial_reports_budgeted_partition() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "pairs.xyz", &pairs_text())?;
    let mut command = command_for(text_source(path));
    command.max_merges = Some(1);
    command.allow_partial = true;

    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let summary = tracing::subscriber::with_default(subscriber, || run_command(command))?;

    assert!(!summary.complete);
    assert_eq!(summary.result.merges(), 1);
    assert_eq!(summary.result.assignments(), &[0, 0, 1, 2]);
    let warnings = layer.events_with_message(Level::WARN, "reporting partial partition");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field("limit"), Some("merge limit of 1"));
    Ok(())
}

#[rstest]
#[case::brute_force(BackendArg::BruteForce)]
#[case::kd_tree(BackendArg::KdTree)]
#[case::incremental(BackendArg::Incremental)]
fn backends_agree_through_the_cli(#[case] backend: BackendArg) -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "grid.xyz", &clouds::to_xyz_text(&clouds::lattice(3)))?;
    let mut reference = command_for(text_source(path));
    reference.max_cluster_size = 4;
    let mut command = reference.clone();
    command.backend = backend;
    command.memory_limit_bytes = Some(64);
    let expected = run_command(reference)?;
    let summary = run_command(command)?;
    assert_eq!(
        summary.result.member_lists(),
        expected.result.member_lists()
    );
    Ok(())
}

#[rstest]
fn render_summary_outputs_assignments() -> TestResult {
    let summary = ExecutionSummary {
        data_source: "demo".into(),
        result: ClusteringResult::empty(),
        complete: true,
    };
    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer)?;
    assert_eq!(
        String::from_utf8(buffer)?,
        "data source: demo\nclusters: 0\nmerges: 0\n"
    );
    Ok(())
}

#[rstest]
fn render_summary_lists_every_point() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "pairs.xyz", &pairs_text())?;
    let summary = run_command(command_for(text_source(path)))?;
    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer)?;
    assert_eq!(
        String::from_utf8(buffer)?,
        "data source: pairs\nclusters: 2\nmerges: 2\n0:0\n0:1\n1:2\n1:3\n"
    );
    Ok(())
}

#[rstest]
fn clap_parses_every_run_option() {
    let cli = Cli::try_parse_from([
        "caplink",
        "run",
        "--max-cluster-size",
        "4",
        "--strategy",
        "sequential",
        "--backend",
        "kd-tree",
        "--max-merges",
        "10",
        "--time-limit-ms",
        "250",
        "--memory-limit-bytes",
        "64K",
        "--allow-partial",
        "parquet",
        "points.parquet",
        "--column",
        "xyz",
        "--name",
        "scan",
    ])
    .expect("arguments must parse");
    let Command::Run(run) = cli.command;
    assert_eq!(run.max_cluster_size, 4);
    assert_eq!(run.strategy, StrategyArg::Sequential);
    assert_eq!(run.backend, BackendArg::KdTree);
    assert_eq!(run.max_merges, Some(10));
    assert_eq!(run.time_limit_ms, Some(250));
    assert_eq!(run.memory_limit_bytes, Some(64 * 1024));
    assert!(run.allow_partial);
    match run.source {
        RunSource::Parquet(args) => {
            assert_eq!(args.column, "xyz");
            assert_eq!(args.name.as_deref(), Some("scan"));
        }
        RunSource::Text(_) => panic!("expected parquet source"),
    }
}

#[rstest]
fn clap_applies_defaults() {
    let cli = Cli::try_parse_from(["caplink", "run", "text", "points.xyz"])
        .expect("arguments must parse");
    let Command::Run(run) = cli.command;
    assert_eq!(run.max_cluster_size, 6);
    assert_eq!(run.strategy, StrategyArg::Auto);
    assert_eq!(run.backend, BackendArg::Auto);
    assert_eq!(run.memory_limit_bytes, None);
    assert!(!run.allow_partial);
}

#[rstest]
#[case::unknown_strategy(&["caplink", "run", "--strategy", "gpu", "text", "p.xyz"])]
#[case::unknown_backend(&["caplink", "run", "--backend", "octree", "text", "p.xyz"])]
#[case::bad_memory_limit(&["caplink", "run", "--memory-limit-bytes", "lots", "text", "p.xyz"])]
#[case::missing_column(&["caplink", "run", "parquet", "p.parquet"])]
fn clap_rejects_invalid_arguments(#[case] args: &[&str]) {
    assert!(Cli::try_parse_from(args.iter().copied()).is_err());
}

#[rstest]
fn run_command_records_tracing_spans() -> TestResult {
    let dir = temp_dir();
    let path = create_text_file(&dir, "pairs.xyz", &pairs_text())?;
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    tracing::subscriber::with_default(subscriber, || run_command(command_for(text_source(path))))?;

    let execute = layer.span("cli.execute").expect("cli.execute span must exist");
    assert_eq!(execute.field("max_cluster_size"), Some("2"));
    assert_eq!(execute.field("source"), Some("text"));

    let text_span = layer.span("cli.run_text").expect("cli.run_text span must exist");
    assert!(
        text_span
            .field("path")
            .is_some_and(|value| value.ends_with("pairs.xyz"))
    );
    assert_eq!(text_span.field("override_name"), Some("<derived>"));

    let completed = layer.events_with_message(Level::INFO, "command completed");
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].field("data_source"), Some("pairs"));
    assert_eq!(completed[0].field("merges"), Some("2"));

    assert!(layer.span("core.run").is_some());
    Ok(())
}

#[rstest]
fn open_text_reader_records_path_on_error() {
    let dir = temp_dir();
    let missing_path = dir.path().join("missing.xyz");
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    let err = tracing::subscriber::with_default(subscriber, || {
        run_command(command_for(text_source(missing_path)))
    })
    .expect_err("missing file must fail");
    assert!(matches!(err, CliError::Io { .. }));

    let reader_span = layer
        .span("cli.open_text_reader")
        .expect("reader span must exist");
    assert!(
        reader_span
            .field("path")
            .is_some_and(|value| value.ends_with("missing.xyz"))
    );
}
