//! Benchmark setup error type.
//!
//! Lets setup functions propagate failures with `?` so the Criterion entry
//! points only panic in one place.

use crate::source::SyntheticError;
use caplink_core::{CaplinkError, IndexError};

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic data generation failed.
    #[error("synthetic source generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// Building or running the clustering engine failed.
    #[error("clustering failed: {0}")]
    Caplink(#[from] CaplinkError),
    /// Building a spatial index failed.
    #[error("index build failed: {0}")]
    Index(#[from] IndexError),
}
