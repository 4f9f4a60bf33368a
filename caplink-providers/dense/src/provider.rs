//! Parquet-backed point provider.
use std::{fs::File, path::Path};

use arrow_array::{Array, FixedSizeListArray, RecordBatchReader};
use caplink_core::{Point, PointSource, PointSourceError};
use parquet::arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder};
use parquet::file::reader::ChunkReader;

use crate::errors::PointMatrixProviderError;
use crate::ingest::{append_points, validate_point_field};

/// Point provider backed by a contiguous buffer loaded from Arrow data.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use arrow_array::{ArrayRef, FixedSizeListArray, Float64Array};
/// use arrow_schema::{DataType, Field};
/// use caplink_core::{Point, PointSource};
/// use caplink_providers_dense::PointMatrixProvider;
///
/// let values = Float64Array::from(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
/// let array = FixedSizeListArray::new(
///     Arc::new(Field::new("item", DataType::Float64, false)),
///     3,
///     Arc::new(values) as ArrayRef,
///     None,
/// );
/// let provider = PointMatrixProvider::try_from_fixed_size_list("demo", &array)?;
/// assert_eq!(provider.len(), 2);
/// assert_eq!(provider.point(1)?, Point::new(3.0, 4.0, 5.0));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PointMatrixProvider {
    name: String,
    points: Vec<Point>,
}

impl PointMatrixProvider {
    /// Borrows the loaded points in row order.
    #[must_use]
    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }

    /// Loads points from an Arrow [`FixedSizeListArray`].
    ///
    /// # Errors
    /// Returns [`PointMatrixProviderError`] when the list is not three
    /// floats wide or contains nulls.
    pub fn try_from_fixed_size_list(
        name: impl Into<String>,
        array: &FixedSizeListArray,
    ) -> Result<Self, PointMatrixProviderError> {
        let mut points = Vec::new();
        append_points(array, 0, &mut points)?;
        Ok(Self {
            name: name.into(),
            points,
        })
    }

    /// Loads points from a Parquet file column of
    /// `FixedSizeList<Float32 | Float64, 3>` rows.
    ///
    /// # Errors
    /// Returns [`PointMatrixProviderError::Io`] when the file cannot be
    /// opened and the errors of [`Self::try_from_parquet_reader`] otherwise.
    pub fn try_from_parquet_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        column: &str,
    ) -> Result<Self, PointMatrixProviderError> {
        let file = File::open(path)?;
        Self::try_from_parquet_reader(name, file, column)
    }

    /// Loads points from a Parquet reader.
    ///
    /// # Errors
    /// Returns [`PointMatrixProviderError`] when the column is missing, has
    /// the wrong type, holds nulls, or the data cannot be decoded.
    pub fn try_from_parquet_reader<R>(
        name: impl Into<String>,
        reader: R,
        column: &str,
    ) -> Result<Self, PointMatrixProviderError>
    where
        R: ChunkReader + Send + 'static,
    {
        let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
        let mask = ProjectionMask::columns(builder.parquet_schema(), [column]);
        let reader = builder.with_projection(mask).build()?;
        let schema = reader.schema();
        let column_index =
            schema
                .index_of(column)
                .map_err(|_| PointMatrixProviderError::ColumnNotFound {
                    column: column.to_owned(),
                })?;
        validate_point_field(schema.field(column_index), column)?;
        let mut points = Vec::new();
        for batch in reader {
            let batch = batch?;
            let column_array = batch.column(column_index);
            let list = column_array
                .as_any()
                .downcast_ref::<FixedSizeListArray>()
                .ok_or_else(|| PointMatrixProviderError::InvalidColumnType {
                    column: column.to_owned(),
                    actual: column_array.data_type().clone(),
                })?;
            append_points(list, points.len(), &mut points)?;
        }
        Ok(Self {
            name: name.into(),
            points,
        })
    }
}

impl PointSource for PointMatrixProvider {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn point(&self, index: usize) -> Result<Point, PointSourceError> {
        self.points
            .get(index)
            .copied()
            .ok_or(PointSourceError::OutOfBounds { index })
    }

    fn points(&self) -> Result<Vec<Point>, PointSourceError> {
        Ok(self.points.clone())
    }
}
