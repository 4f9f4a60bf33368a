//! Dense point providers backed by contiguous storage.
//!
//! [`PointMatrixProvider`] loads a Parquet column of
//! `FixedSizeList<Float32 | Float64, 3>` rows; [`DenseSource`] wraps rows
//! that are already in memory and checks their width lazily.

mod errors;
mod ingest;
mod provider;
mod source;

pub use errors::PointMatrixProviderError;
pub use provider::PointMatrixProvider;
pub use source::DenseSource;

#[cfg(test)]
mod tests;
