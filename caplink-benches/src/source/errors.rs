//! Errors raised by the synthetic point generators.

/// Errors returned when a generator configuration is unusable.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SyntheticError {
    /// `point_count` was zero.
    #[error("point_count must be greater than zero")]
    ZeroPoints,
    /// `cluster_count` was zero.
    #[error("cluster_count must be greater than zero")]
    ZeroClusters,
    /// More blobs were requested than there are points to fill them.
    #[error("cluster_count ({cluster_count}) exceeds point_count ({point_count})")]
    ClusterCountExceedsPointCount {
        /// Requested number of blobs.
        cluster_count: usize,
        /// Requested number of points.
        point_count: usize,
    },
    /// A floating-point parameter was non-finite or not positive.
    #[error("{parameter} must be finite and greater than zero")]
    InvalidFloatParameter {
        /// Name of the offending field.
        parameter: &'static str,
    },
}
