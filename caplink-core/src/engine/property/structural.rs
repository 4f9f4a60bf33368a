//! Structural invariants of a finished run.
//!
//! - **Partition**: every point index appears in exactly one cluster.
//! - **Size bound**: every cluster holds between one and the bound.
//! - **Centroids**: each centroid is the mean of its members.
//! - **Monotonic progress**: each merge removes exactly one cluster.

use proptest::test_runner::{TestCaseError, TestCaseResult};

use crate::{
    builder::ExecutionStrategy, index::NeighbourBackend, point::Point, result::ClusteringResult,
};

use super::equivalence::run_engine;
use super::types::EngineFixture;

/// Relative tolerance for centroid comparisons.
const CENTROID_TOLERANCE: f64 = 1e-9;

/// Runs every structural check against the default configuration.
pub(super) fn run_structural_invariants_property(fixture: &EngineFixture) -> TestCaseResult {
    let result = run_engine(fixture, NeighbourBackend::Auto, ExecutionStrategy::Auto)?;
    validate_partition(fixture, &result)?;
    validate_sizes(fixture, &result)?;
    validate_centroids(fixture, &result)?;
    validate_progress(fixture, &result)?;
    Ok(())
}

fn validate_partition(fixture: &EngineFixture, result: &ClusteringResult) -> TestCaseResult {
    let mut seen = vec![false; fixture.points.len()];
    for cluster in result.clusters() {
        for &member in cluster.members() {
            match seen.get_mut(member) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(TestCaseError::fail(format!(
                        "point {member} assigned twice ({})",
                        fixture.describe()
                    )));
                }
                None => {
                    return Err(TestCaseError::fail(format!(
                        "point {member} out of range ({})",
                        fixture.describe()
                    )));
                }
            }
        }
    }
    if let Some(missing) = seen.iter().position(|&hit| !hit) {
        return Err(TestCaseError::fail(format!(
            "point {missing} unassigned ({})",
            fixture.describe()
        )));
    }
    for (point, &label) in result.assignments().iter().enumerate() {
        let holds = result
            .clusters()
            .get(label)
            .is_some_and(|cluster| cluster.members().contains(&point));
        if !holds {
            return Err(TestCaseError::fail(format!(
                "assignment of point {point} points at the wrong cluster ({})",
                fixture.describe()
            )));
        }
    }
    Ok(())
}

fn validate_sizes(fixture: &EngineFixture, result: &ClusteringResult) -> TestCaseResult {
    for cluster in result.clusters() {
        if cluster.is_empty() || cluster.len() > fixture.max_cluster_size {
            return Err(TestCaseError::fail(format!(
                "cluster {} has size {} ({})",
                cluster.id().get(),
                cluster.len(),
                fixture.describe()
            )));
        }
    }
    Ok(())
}

fn validate_centroids(fixture: &EngineFixture, result: &ClusteringResult) -> TestCaseResult {
    for cluster in result.clusters() {
        let count = cluster.len() as f64;
        let mut sum = [0.0_f64; 3];
        for &member in cluster.members() {
            let point = fixture.points[member];
            sum[0] += point.x;
            sum[1] += point.y;
            sum[2] += point.z;
        }
        let expected = Point::new(sum[0] / count, sum[1] / count, sum[2] / count);
        let actual = cluster.centroid();
        let scale = expected.coords().iter().fold(1.0_f64, |acc, v| acc.max(v.abs()));
        if expected.distance(&actual) > CENTROID_TOLERANCE * scale {
            return Err(TestCaseError::fail(format!(
                "cluster {} centroid {actual:?} differs from mean {expected:?} ({})",
                cluster.id().get(),
                fixture.describe()
            )));
        }
    }
    Ok(())
}

fn validate_progress(fixture: &EngineFixture, result: &ClusteringResult) -> TestCaseResult {
    let n = fixture.points.len();
    if result.merges() != result.steps().len() || result.cluster_count() + result.merges() != n {
        return Err(TestCaseError::fail(format!(
            "merges={}, steps={}, clusters={} do not add up ({})",
            result.merges(),
            result.steps().len(),
            result.cluster_count(),
            fixture.describe()
        )));
    }
    for (index, step) in result.steps().iter().enumerate() {
        let expected_active = n - index - 1;
        if step.active_clusters != expected_active || step.survivor >= step.absorbed {
            return Err(TestCaseError::fail(format!(
                "step {index} is inconsistent: {step:?} ({})",
                fixture.describe()
            )));
        }
        if step.size > fixture.max_cluster_size {
            return Err(TestCaseError::fail(format!(
                "step {index} built an oversized cluster: {step:?} ({})",
                fixture.describe()
            )));
        }
    }
    Ok(())
}
