//! Benchmark parameter types.

use std::fmt;

use caplink_core::{ExecutionStrategy, NeighbourBackend};

/// Parameters for an end-to-end clustering benchmark case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeBenchParams {
    /// Number of points in the cloud.
    pub point_count: usize,
    /// Cluster size cap.
    pub max_cluster_size: usize,
    /// Nearest-neighbour backend.
    pub backend: NeighbourBackend,
    /// Sequential or parallel neighbour search.
    pub strategy: ExecutionStrategy,
}

impl fmt::Display for MergeBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={},k={},backend={},strategy={}",
            self.point_count,
            self.max_cluster_size,
            backend_label(self.backend),
            strategy_label(self.strategy),
        )
    }
}

/// Parameters for a nearest-neighbour index benchmark case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexBenchParams {
    /// Number of active centroids.
    pub centroid_count: usize,
    /// Index under test.
    pub backend: NeighbourBackend,
}

impl fmt::Display for IndexBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={},backend={}",
            self.centroid_count,
            backend_label(self.backend)
        )
    }
}

/// Short, stable label for a backend, used in benchmark IDs.
#[must_use]
pub const fn backend_label(backend: NeighbourBackend) -> &'static str {
    match backend {
        NeighbourBackend::Auto => "auto",
        NeighbourBackend::BruteForce => "brute",
        NeighbourBackend::KdTree => "kdtree",
        NeighbourBackend::Incremental => "incremental",
    }
}

const fn strategy_label(strategy: ExecutionStrategy) -> &'static str {
    match strategy {
        ExecutionStrategy::Auto => "auto",
        ExecutionStrategy::Sequential => "seq",
        ExecutionStrategy::Parallel => "par",
    }
}
