use arrow_schema::{ArrowError, DataType};
use thiserror::Error;

/// Failures raised while loading points from Arrow or Parquet storage.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PointMatrixProviderError {
    /// The requested column is absent from the schema.
    #[error("column `{column}` not found in Parquet schema")]
    ColumnNotFound {
        /// Requested column name.
        column: String,
    },
    /// The column is not a fixed-size list.
    #[error("column `{column}` must be a FixedSizeList<Float32 | Float64, 3> but found {actual:?}")]
    InvalidColumnType {
        /// Requested column name.
        column: String,
        /// Arrow type found instead.
        actual: DataType,
    },
    /// The list values are neither `Float32` nor `Float64`.
    #[error("FixedSizeList child type must be Float32 or Float64 but found {actual:?}")]
    InvalidListValueType {
        /// Arrow type of the list values.
        actual: DataType,
    },
    /// Rows do not carry exactly three coordinates.
    #[error("points need 3 coordinates but the column holds lists of {actual}")]
    InvalidDimension {
        /// Declared list width.
        actual: i32,
    },
    /// A whole row is null.
    #[error("row {row} is null")]
    NullRow {
        /// Row index across all batches.
        row: usize,
    },
    /// A coordinate inside a row is null.
    #[error("row {row} contains null value at position {value_index}")]
    NullValue {
        /// Row index across all batches.
        row: usize,
        /// Coordinate position within the row.
        value_index: usize,
    },
    /// A row's child slice did not match the declared width.
    #[error("row {row} has length {actual} but expected {expected}")]
    InvalidRowLength {
        /// Row index across all batches.
        row: usize,
        /// Declared width.
        expected: usize,
        /// Observed width.
        actual: usize,
    },
    /// Arrow rejected the data.
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
    /// Parquet decoding failed.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    /// The file could not be opened.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
