//! Builder utilities for configuring Caplink runs.
//!
//! Exposes the execution strategy selection surface and builder validation
//! used before constructing [`Caplink`] instances.

use std::{num::NonZeroUsize, time::Duration};

use crate::{
    Result,
    caplink::Caplink,
    engine::{Budget, EngineConfig},
    error::CaplinkError,
    index::NeighbourBackend,
};

/// Size bound used when the caller does not configure one.
pub const DEFAULT_MAX_CLUSTER_SIZE: usize = 6;

/// Indicates how [`Caplink`] computes each round's merge proposals.
///
/// Every strategy yields the same partition; they only differ in how the
/// per-cluster nearest-neighbour queries are scheduled.
///
/// # Examples
/// ```
/// use caplink_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::default();
/// assert!(matches!(strategy, ExecutionStrategy::Auto));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Use the rayon pool once the active set is large enough to benefit,
    /// and a single thread otherwise.
    #[default]
    Auto,
    /// Answer every query on the calling thread.
    Sequential,
    /// Always answer queries on the rayon pool. Requires the `parallel`
    /// feature.
    Parallel,
}

/// Configures and constructs [`Caplink`] instances.
///
/// # Examples
/// ```
/// use caplink_core::{CaplinkBuilder, ExecutionStrategy};
///
/// let caplink = CaplinkBuilder::new()
///     .with_max_cluster_size(8)
///     .with_execution_strategy(ExecutionStrategy::Sequential)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(caplink.max_cluster_size().get(), 8);
/// assert_eq!(caplink.execution_strategy(), ExecutionStrategy::Sequential);
/// ```
#[derive(Debug, Clone)]
pub struct CaplinkBuilder {
    max_cluster_size: usize,
    execution_strategy: ExecutionStrategy,
    neighbour_backend: NeighbourBackend,
    max_merges: Option<usize>,
    time_limit: Option<Duration>,
    memory_limit: Option<u64>,
    record_merges: bool,
}

impl Default for CaplinkBuilder {
    fn default() -> Self {
        Self {
            max_cluster_size: DEFAULT_MAX_CLUSTER_SIZE,
            execution_strategy: ExecutionStrategy::Auto,
            neighbour_backend: NeighbourBackend::Auto,
            max_merges: None,
            time_limit: None,
            memory_limit: None,
            record_merges: false,
        }
    }
}

impl CaplinkBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use caplink_core::{CaplinkBuilder, ExecutionStrategy};
    ///
    /// let builder = CaplinkBuilder::new();
    /// assert_eq!(builder.max_cluster_size(), 6);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Auto);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the maximum number of points a cluster may hold.
    ///
    /// # Examples
    /// ```
    /// use caplink_core::CaplinkBuilder;
    ///
    /// let builder = CaplinkBuilder::new().with_max_cluster_size(10);
    /// assert_eq!(builder.max_cluster_size(), 10);
    /// ```
    #[must_use]
    pub fn with_max_cluster_size(mut self, size: usize) -> Self {
        self.max_cluster_size = size;
        self
    }

    /// Returns the configured maximum cluster size.
    #[must_use]
    pub fn max_cluster_size(&self) -> usize {
        self.max_cluster_size
    }

    /// Sets the execution strategy to use when running the algorithm.
    ///
    /// # Examples
    /// ```
    /// use caplink_core::{CaplinkBuilder, ExecutionStrategy};
    ///
    /// let builder = CaplinkBuilder::new().with_execution_strategy(ExecutionStrategy::Sequential);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Sequential);
    /// ```
    #[must_use]
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Returns the currently configured execution strategy.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Selects how nearest-neighbour queries are answered.
    #[must_use]
    pub fn with_neighbour_backend(mut self, backend: NeighbourBackend) -> Self {
        self.neighbour_backend = backend;
        self
    }

    /// Returns the configured neighbour backend.
    #[must_use]
    pub fn neighbour_backend(&self) -> NeighbourBackend {
        self.neighbour_backend
    }

    /// Stops the run with [`CaplinkError::BudgetExceeded`] once `merges`
    /// merges have been performed and another legal merge is still
    /// available.
    #[must_use]
    pub fn with_max_merges(mut self, merges: usize) -> Self {
        self.max_merges = Some(merges);
        self
    }

    /// Stops the run with [`CaplinkError::BudgetExceeded`] once `limit` has
    /// elapsed and another legal merge is still available.
    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Caps the estimated footprint of a k-d tree. Rounds whose tree would
    /// exceed the cap fall back to brute force.
    ///
    /// # Examples
    /// ```
    /// use caplink_core::CaplinkBuilder;
    ///
    /// let caplink = CaplinkBuilder::new()
    ///     .with_memory_limit(64 * 1024 * 1024)
    ///     .build()
    ///     .expect("configuration is valid");
    /// assert_eq!(caplink.memory_limit(), Some(64 * 1024 * 1024));
    /// ```
    #[must_use]
    pub fn with_memory_limit(mut self, bytes: u64) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    /// Keeps a [`crate::MergeStep`] for every merge on the result.
    #[must_use]
    pub fn with_merge_recording(mut self, enabled: bool) -> Self {
        self.record_merges = enabled;
        self
    }

    /// Validates the configuration and constructs a [`Caplink`] instance.
    ///
    /// # Errors
    /// Returns [`CaplinkError::InvalidMaxClusterSize`] when the size bound is
    /// zero.
    ///
    /// # Examples
    /// ```
    /// use caplink_core::{CaplinkBuilder, CaplinkError};
    ///
    /// let caplink = CaplinkBuilder::new().build().expect("configuration is valid");
    /// assert_eq!(caplink.max_cluster_size().get(), 6);
    ///
    /// let err = CaplinkBuilder::new().with_max_cluster_size(0).build().unwrap_err();
    /// assert!(matches!(err, CaplinkError::InvalidMaxClusterSize { got: 0 }));
    /// ```
    pub fn build(self) -> Result<Caplink> {
        let max_cluster_size = NonZeroUsize::new(self.max_cluster_size).ok_or(
            CaplinkError::InvalidMaxClusterSize {
                got: self.max_cluster_size,
            },
        )?;

        Ok(Caplink::new(EngineConfig {
            max_cluster_size,
            strategy: self.execution_strategy,
            backend: self.neighbour_backend,
            budget: Budget {
                max_merges: self.max_merges,
                time_limit: self.time_limit,
            },
            memory_limit: self.memory_limit,
            record_merges: self.record_merges,
        }))
    }
}
