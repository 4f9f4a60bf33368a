//! Oracle and cross-configuration equivalence.
//!
//! Every backend and execution strategy must reproduce the naive oracle's
//! partition exactly, member order included.

use std::num::NonZeroUsize;

use proptest::test_runner::{TestCaseError, TestCaseResult};

use crate::{
    builder::ExecutionStrategy,
    engine::{Budget, EngineConfig, MergeEngine},
    index::NeighbourBackend,
    result::ClusteringResult,
};

use super::oracle::naive_merge;
use super::types::EngineFixture;

/// Backend and strategy combinations exercised by the equivalence property.
fn configurations() -> Vec<(NeighbourBackend, ExecutionStrategy)> {
    let mut configurations = vec![
        (NeighbourBackend::BruteForce, ExecutionStrategy::Sequential),
        (NeighbourBackend::KdTree, ExecutionStrategy::Sequential),
        (NeighbourBackend::Incremental, ExecutionStrategy::Sequential),
        (NeighbourBackend::Auto, ExecutionStrategy::Auto),
    ];
    if cfg!(feature = "parallel") {
        configurations.extend([
            (NeighbourBackend::BruteForce, ExecutionStrategy::Parallel),
            (NeighbourBackend::KdTree, ExecutionStrategy::Parallel),
            (NeighbourBackend::Incremental, ExecutionStrategy::Parallel),
        ]);
    }
    configurations
}

/// Runs the engine on `fixture` with the given configuration.
pub(super) fn run_engine(
    fixture: &EngineFixture,
    backend: NeighbourBackend,
    strategy: ExecutionStrategy,
) -> Result<ClusteringResult, TestCaseError> {
    let max_cluster_size = NonZeroUsize::new(fixture.max_cluster_size)
        .ok_or_else(|| TestCaseError::fail("fixture size bound must be non-zero"))?;
    let engine = MergeEngine::new(EngineConfig {
        max_cluster_size,
        strategy,
        backend,
        budget: Budget::default(),
        memory_limit: None,
        record_merges: true,
    });
    engine.run(fixture.points.clone()).map_err(|err| {
        TestCaseError::fail(format!(
            "engine failed with {backend:?}/{strategy:?}: {err} ({})",
            fixture.describe()
        ))
    })
}

/// Compares every configuration against the oracle.
pub(super) fn run_oracle_equivalence_property(fixture: &EngineFixture) -> TestCaseResult {
    let oracle = naive_merge(&fixture.points, fixture.max_cluster_size);

    for (backend, strategy) in configurations() {
        let result = run_engine(fixture, backend, strategy)?;
        if result.member_lists() != oracle.members {
            return Err(TestCaseError::fail(format!(
                "partition mismatch for {backend:?}/{strategy:?}: engine={:?}, oracle={:?} ({})",
                result.member_lists(),
                oracle.members,
                fixture.describe()
            )));
        }
        if result.merges() != oracle.merges {
            return Err(TestCaseError::fail(format!(
                "merge count mismatch for {backend:?}/{strategy:?}: engine={}, oracle={} ({})",
                result.merges(),
                oracle.merges,
                fixture.describe()
            )));
        }
    }
    Ok(())
}

/// Runs the same configuration repeatedly and requires identical output.
pub(super) fn run_determinism_property(fixture: &EngineFixture) -> TestCaseResult {
    let strategy = if cfg!(feature = "parallel") {
        ExecutionStrategy::Parallel
    } else {
        ExecutionStrategy::Sequential
    };
    let baseline = run_engine(fixture, NeighbourBackend::Auto, strategy)?;
    for run in 1..4 {
        let repeat = run_engine(fixture, NeighbourBackend::Auto, strategy)?;
        if repeat != baseline {
            return Err(TestCaseError::fail(format!(
                "run {run} diverged from the first run ({})",
                fixture.describe()
            )));
        }
    }
    Ok(())
}
