//! Run orchestration for the Caplink library.
//!
//! Provides the [`Caplink`] entry point, which reads and validates a
//! [`PointSource`], checks that the requested strategy is compiled in, and
//! drives the merge engine.

use std::{num::NonZeroUsize, sync::Arc};

use tracing::{info, instrument};

use crate::{
    Result,
    builder::ExecutionStrategy,
    engine::{EngineConfig, MergeEngine},
    error::{CaplinkError, PointSourceError},
    index::NeighbourBackend,
    point::{Point, validate_points},
    result::ClusteringResult,
    source::PointSource,
};

/// Entry point for running size-bounded clustering.
///
/// # Examples
/// ```
/// use caplink_core::{CaplinkBuilder, PointCloud};
///
/// let caplink = CaplinkBuilder::new()
///     .with_max_cluster_size(2)
///     .build()
///     .expect("builder must succeed");
/// let cloud = PointCloud::from_coords(
///     "pairs",
///     &[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [10.0, 10.0, 10.0], [10.0, 10.0, 11.0]],
/// );
/// let result = caplink.run(&cloud).expect("run must succeed");
/// assert_eq!(result.member_lists(), vec![vec![0, 1], vec![2, 3]]);
/// ```
#[derive(Debug, Clone)]
pub struct Caplink {
    config: EngineConfig,
}

impl Caplink {
    pub(crate) fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the maximum cluster size configured for this instance.
    #[must_use]
    pub fn max_cluster_size(&self) -> NonZeroUsize {
        self.config.max_cluster_size
    }

    /// Returns the execution strategy that will be used when running.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.config.strategy
    }

    /// Returns the configured neighbour backend.
    #[must_use]
    pub fn neighbour_backend(&self) -> NeighbourBackend {
        self.config.backend
    }

    /// Returns the configured k-d tree memory cap, if any.
    #[must_use]
    pub fn memory_limit(&self) -> Option<u64> {
        self.config.memory_limit
    }

    /// Clusters every point in `source`.
    ///
    /// # Errors
    /// Returns [`CaplinkError::BackendUnavailable`] when
    /// [`ExecutionStrategy::Parallel`] is requested without the `parallel`
    /// feature, [`CaplinkError::PointSource`] when the source fails,
    /// [`CaplinkError::NonFiniteCoordinate`] when a coordinate is NaN or
    /// infinite, [`CaplinkError::CoordinateOutOfRange`] when a coordinate's
    /// magnitude exceeds [`crate::MAX_COORDINATE_MAGNITUDE`], and
    /// [`CaplinkError::BudgetExceeded`] when a configured
    /// budget stops the run early.
    ///
    /// An empty source yields an empty result.
    pub fn run<S: PointSource + ?Sized>(&self, source: &S) -> Result<ClusteringResult> {
        let points = source.len();
        self.run_with_len(source, points)
    }

    /// Clusters `points` directly.
    ///
    /// # Errors
    /// Same as [`Self::run`], minus source failures.
    ///
    /// # Examples
    /// ```
    /// use caplink_core::{CaplinkBuilder, Point};
    ///
    /// let caplink = CaplinkBuilder::new().build().expect("defaults are valid");
    /// let result = caplink
    ///     .cluster(&[Point::new(0.0, 0.0, 0.0), Point::new(1.0, 0.0, 0.0)])
    ///     .expect("run must succeed");
    /// assert_eq!(result.cluster_count(), 1);
    /// ```
    pub fn cluster(&self, points: &[Point]) -> Result<ClusteringResult> {
        self.run(&SliceSource(points))
    }

    #[instrument(
        name = "core.run",
        err,
        skip(self, source),
        fields(
            data_source = %source.name(),
            points = points,
            max_cluster_size = %self.config.max_cluster_size,
            strategy = ?self.config.strategy,
            backend = ?self.config.backend
        ),
    )]
    fn run_with_len<S: PointSource + ?Sized>(
        &self,
        source: &S,
        points: usize,
    ) -> Result<ClusteringResult> {
        if self.config.strategy == ExecutionStrategy::Parallel && !cfg!(feature = "parallel") {
            return Err(CaplinkError::BackendUnavailable {
                requested: ExecutionStrategy::Parallel,
            });
        }

        let coords = source
            .points()
            .map_err(|error| wrap_source_error(source, error))?;
        validate_points(&coords)?;

        if coords.is_empty() {
            info!("point source is empty, returning an empty partition");
            return Ok(ClusteringResult::empty());
        }

        let result = MergeEngine::new(self.config).run(coords)?;
        info!(
            clusters = result.cluster_count(),
            merges = result.merges(),
            rounds = result.rounds(),
            "clustering completed"
        );
        Ok(result)
    }
}

fn wrap_source_error<S: PointSource + ?Sized>(source: &S, error: PointSourceError) -> CaplinkError {
    CaplinkError::PointSource {
        data_source: Arc::from(source.name()),
        error,
    }
}

/// Borrowed points presented as a source for [`Caplink::cluster`].
struct SliceSource<'a>(&'a [Point]);

impl PointSource for SliceSource<'_> {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn name(&self) -> &str {
        "points"
    }

    fn point(&self, index: usize) -> core::result::Result<Point, PointSourceError> {
        self.0
            .get(index)
            .copied()
            .ok_or(PointSourceError::OutOfBounds { index })
    }

    fn points(&self) -> core::result::Result<Vec<Point>, PointSourceError> {
        Ok(self.0.to_vec())
    }
}
