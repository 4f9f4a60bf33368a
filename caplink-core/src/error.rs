//! Error types for the caplink core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.

use std::{fmt, num::NonZeroUsize, sync::Arc, time::Duration};

use thiserror::Error;

use crate::{builder::ExecutionStrategy, point::Axis, result::ClusteringResult};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl ::std::fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

pub(crate) use define_error_codes;

/// An error produced by [`crate::PointSource`] operations.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum PointSourceError {
    /// Requested index was outside the source's bounds.
    #[error("index {index} is out of bounds")]
    OutOfBounds {
        /// The requested point that exceeded the source bounds.
        index: usize,
    },
    /// A stored row did not have exactly three coordinates.
    #[error("row {index} has {actual} coordinates but {expected} were expected")]
    DimensionMismatch {
        /// Row that carried the wrong number of coordinates.
        index: usize,
        /// Number of coordinates every point must carry.
        expected: usize,
        /// Number of coordinates found.
        actual: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`PointSourceError`] variants.
    enum PointSourceErrorCode for PointSourceError {
        /// Requested index was outside the source's bounds.
        OutOfBounds => OutOfBounds { .. } => "POINT_SOURCE_OUT_OF_BOUNDS",
        /// A stored row did not have exactly three coordinates.
        DimensionMismatch => DimensionMismatch { .. } => "POINT_SOURCE_DIMENSION_MISMATCH",
    }
}

/// Identifies which caller-imposed budget stopped a run early.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BudgetLimit {
    /// The configured maximum number of merges was reached.
    Merges(usize),
    /// The configured wall-clock limit elapsed.
    Time(Duration),
}

impl fmt::Display for BudgetLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merges(limit) => write!(f, "merge limit of {limit}"),
            Self::Time(limit) => write!(f, "time limit of {}ms", limit.as_millis()),
        }
    }
}

/// Error type produced when constructing or running [`crate::Caplink`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CaplinkError {
    /// Maximum cluster size must be at least one.
    #[error("max_cluster_size must be at least 1 (got {got})")]
    InvalidMaxClusterSize {
        /// The invalid maximum cluster size supplied by the caller.
        got: usize,
    },
    /// An input coordinate was NaN or infinite.
    #[error("point {index} has a non-finite {axis} coordinate: {value}")]
    NonFiniteCoordinate {
        /// Index of the offending point.
        index: usize,
        /// Axis holding the offending value.
        axis: Axis,
        /// The rejected value.
        value: f64,
    },
    /// An input coordinate is too large for squared distances to stay finite.
    #[error(
        "point {index} has a {axis} coordinate of {value:e}, beyond the supported magnitude of 1e150"
    )]
    CoordinateOutOfRange {
        /// Index of the offending point.
        index: usize,
        /// Axis holding the offending value.
        axis: Axis,
        /// The rejected value.
        value: f64,
    },
    /// The requested execution strategy is unavailable in the current build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied by the current build.
        requested: ExecutionStrategy,
    },
    /// A caller-imposed budget stopped the run before it converged.
    ///
    /// The partial partition still satisfies the partition and size
    /// invariants; it is simply not maximally merged.
    #[error("stopped early after {merges} merges: {limit} reached before convergence")]
    BudgetExceeded {
        /// The limit that tripped.
        limit: BudgetLimit,
        /// Number of merges performed before stopping.
        merges: usize,
        /// The partition reached when the budget tripped.
        partial: Box<ClusteringResult>,
    },
    /// A [`crate::PointSource`] operation failed while reading input.
    #[error("point source `{data_source}` failed: {error}")]
    PointSource {
        /// Identifier for the source that produced the error.
        data_source: Arc<str>,
        #[source]
        /// Underlying source error.
        error: PointSourceError,
    },
    /// The engine produced output that breaks the partition invariant.
    #[error("clustering invariant violated: {reason} (max_cluster_size {max_cluster_size})")]
    InvariantViolation {
        /// Description of the violated invariant.
        reason: Arc<str>,
        /// Size bound in force for the run.
        max_cluster_size: NonZeroUsize,
    },
}

define_error_codes! {
    /// Stable codes describing [`CaplinkError`] variants.
    enum CaplinkErrorCode for CaplinkError {
        /// Maximum cluster size must be at least one.
        InvalidMaxClusterSize => InvalidMaxClusterSize { .. } => "CAPLINK_INVALID_MAX_CLUSTER_SIZE",
        /// An input coordinate was NaN or infinite.
        NonFiniteCoordinate => NonFiniteCoordinate { .. } => "CAPLINK_NON_FINITE_COORDINATE",
        /// An input coordinate exceeded the supported magnitude.
        CoordinateOutOfRange => CoordinateOutOfRange { .. } => "CAPLINK_COORDINATE_OUT_OF_RANGE",
        /// The requested execution strategy is unavailable in the current build.
        BackendUnavailable => BackendUnavailable { .. } => "CAPLINK_BACKEND_UNAVAILABLE",
        /// A caller-imposed budget stopped the run early.
        BudgetExceeded => BudgetExceeded { .. } => "CAPLINK_BUDGET_EXCEEDED",
        /// A [`crate::PointSource`] operation failed while reading input.
        PointSourceFailure => PointSource { .. } => "CAPLINK_POINT_SOURCE_FAILURE",
        /// The engine produced output that breaks the partition invariant.
        InvariantViolation => InvariantViolation { .. } => "CAPLINK_INVARIANT_VIOLATION",
    }
}

impl CaplinkError {
    /// Retrieve the inner [`PointSourceErrorCode`] when the error originated in a [`crate::PointSource`].
    pub const fn point_source_code(&self) -> Option<PointSourceErrorCode> {
        match self {
            Self::PointSource { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    /// Returns the partial partition carried by [`CaplinkError::BudgetExceeded`].
    #[must_use]
    pub fn partial_result(&self) -> Option<&ClusteringResult> {
        match self {
            Self::BudgetExceeded { partial, .. } => Some(partial),
            _ => None,
        }
    }

    /// Consumes the error and returns the partial partition, if any.
    #[must_use]
    pub fn into_partial_result(self) -> Option<ClusteringResult> {
        match self {
            Self::BudgetExceeded { partial, .. } => Some(*partial),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, CaplinkError>;
