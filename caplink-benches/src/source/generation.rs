//! Sampling helpers shared by the generators.

use std::f64::consts::PI;

use caplink_core::Point;
use rand::{Rng, rngs::SmallRng};

use super::{GaussianBlobConfig, SyntheticError, UniformConfig};

pub(super) const fn validate_uniform_config(
    config: &UniformConfig,
) -> Result<(), SyntheticError> {
    if config.point_count == 0 {
        return Err(SyntheticError::ZeroPoints);
    }
    require_positive(config.extent, "extent")
}

pub(super) fn validate_blob_config(config: &GaussianBlobConfig) -> Result<(), SyntheticError> {
    if config.point_count == 0 {
        return Err(SyntheticError::ZeroPoints);
    }
    if config.cluster_count == 0 {
        return Err(SyntheticError::ZeroClusters);
    }
    if config.cluster_count > config.point_count {
        return Err(SyntheticError::ClusterCountExceedsPointCount {
            cluster_count: config.cluster_count,
            point_count: config.point_count,
        });
    }
    require_positive(config.separation, "separation")?;
    require_positive(config.spread, "spread")
}

const fn require_positive(value: f64, parameter: &'static str) -> Result<(), SyntheticError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SyntheticError::InvalidFloatParameter { parameter })
    }
}

pub(super) fn uniform_point(rng: &mut SmallRng, extent: f64) -> Point {
    Point::new(
        rng.gen_range(0.0..extent),
        rng.gen_range(0.0..extent),
        rng.gen_range(0.0..extent),
    )
}

/// Blob centres sit evenly on a circle of radius `separation` in the xy
/// plane, with a small random z offset.
#[expect(
    clippy::cast_precision_loss,
    reason = "centre placement uses index-derived angles"
)]
#[expect(
    clippy::float_arithmetic,
    reason = "centre placement uses trigonometric expressions"
)]
pub(super) fn blob_centres(config: &GaussianBlobConfig, rng: &mut SmallRng) -> Vec<Point> {
    let z_range = 0.2 * config.separation;
    (0..config.cluster_count)
        .map(|cluster_index| {
            let angle = (cluster_index as f64 / config.cluster_count as f64) * (2.0 * PI);
            Point::new(
                config.separation * angle.cos(),
                config.separation * angle.sin(),
                rng.gen_range(-z_range..z_range),
            )
        })
        .collect()
}

#[expect(
    clippy::float_arithmetic,
    reason = "Gaussian offsets scale standard normal samples"
)]
pub(super) fn gaussian_around(rng: &mut SmallRng, centre: Point, spread: f64) -> Point {
    Point::new(
        centre.x + spread * standard_normal_sample(rng),
        centre.y + spread * standard_normal_sample(rng),
        centre.z + spread * standard_normal_sample(rng),
    )
}

/// Box-Muller transform; `u1` is kept away from zero so the log is finite.
#[expect(
    clippy::float_arithmetic,
    reason = "Box-Muller uses floating-point transforms"
)]
fn standard_normal_sample(rng: &mut SmallRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
