//! Deterministic synthetic point clouds for benchmarks.
//!
//! Two shapes are available: points scattered uniformly through a cube, and
//! isotropic Gaussian blobs whose centres sit on a circle. Both are seeded so
//! repeated benchmark runs cluster identical inputs.

mod errors;
mod generation;

use caplink_core::{CentroidSnapshot, Point, PointCloud, PointSource, PointSourceError};
use rand::{SeedableRng, rngs::SmallRng};

pub use self::errors::SyntheticError;
use self::generation::{
    blob_centres, gaussian_around, uniform_point, validate_blob_config, validate_uniform_config,
};

/// Points drawn uniformly from `[0, extent)` on every axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformConfig {
    /// Number of points to generate.
    pub point_count: usize,
    /// Edge length of the sampling cube.
    pub extent: f64,
    /// RNG seed.
    pub seed: u64,
}

/// Points drawn from `cluster_count` isotropic Gaussian blobs.
///
/// Points are dealt to blobs round-robin, so blob sizes differ by at most one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaussianBlobConfig {
    /// Number of points to generate.
    pub point_count: usize,
    /// Number of blobs.
    pub cluster_count: usize,
    /// Radius of the circle the blob centres sit on.
    pub separation: f64,
    /// Standard deviation of each blob along every axis.
    pub spread: f64,
    /// RNG seed.
    pub seed: u64,
}

/// A generated point cloud.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntheticSource {
    cloud: PointCloud,
}

impl SyntheticSource {
    /// Generates a uniform cloud.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when `point_count` is zero or `extent` is
    /// not a positive finite number.
    pub fn uniform(config: &UniformConfig) -> Result<Self, SyntheticError> {
        validate_uniform_config(config)?;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let points = (0..config.point_count)
            .map(|_| uniform_point(&mut rng, config.extent))
            .collect();
        Ok(Self {
            cloud: PointCloud::new("synthetic-uniform", points),
        })
    }

    /// Generates a cloud of Gaussian blobs.
    ///
    /// # Errors
    /// Returns [`SyntheticError`] when a count is zero, there are more blobs
    /// than points, or `separation`/`spread` is not a positive finite number.
    pub fn gaussian_blobs(config: &GaussianBlobConfig) -> Result<Self, SyntheticError> {
        validate_blob_config(config)?;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let centres = blob_centres(config, &mut rng);
        let points = centres
            .iter()
            .cycle()
            .take(config.point_count)
            .map(|centre| gaussian_around(&mut rng, *centre, config.spread))
            .collect();
        Ok(Self {
            cloud: PointCloud::new("synthetic-gaussian-blobs", points),
        })
    }

    /// Borrows the generated points.
    #[must_use]
    pub fn as_slice(&self) -> &[Point] {
        self.cloud.as_slice()
    }

    /// Treats every point as a singleton cluster, as the engine does before
    /// its first round.
    #[must_use]
    pub fn singleton_snapshot(&self) -> CentroidSnapshot {
        CentroidSnapshot::from_pairs(self.as_slice().iter().copied().enumerate())
    }
}

impl PointSource for SyntheticSource {
    fn len(&self) -> usize {
        self.cloud.len()
    }

    fn name(&self) -> &str {
        self.cloud.name()
    }

    fn point(&self, index: usize) -> Result<Point, PointSourceError> {
        self.cloud.point(index)
    }

    fn points(&self) -> Result<Vec<Point>, PointSourceError> {
        self.cloud.points()
    }
}
