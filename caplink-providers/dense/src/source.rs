//! In-memory rows whose width is checked when they are read.
use caplink_core::{Point, PointSource, PointSourceError};

use crate::ingest::POINT_DIMENSION;

/// In-memory point rows of caller-supplied width.
///
/// Rows that do not hold exactly three coordinates are reported as
/// [`PointSourceError::DimensionMismatch`] when read, so a clustering run
/// over a ragged matrix fails with the offending row index.
pub struct DenseSource {
    data: Vec<Vec<f64>>,
    name: String,
}

impl DenseSource {
    /// Creates a new dense source.
    ///
    /// # Examples
    /// ```
    /// use caplink_core::{PointSource, PointSourceError};
    /// use caplink_providers_dense::DenseSource;
    ///
    /// let ds = DenseSource::new("demo", vec![vec![0.0, 0.0, 0.0], vec![1.0, 2.0]]);
    /// assert_eq!(ds.len(), 2);
    /// assert!(ds.point(0).is_ok());
    /// assert!(matches!(
    ///     ds.point(1),
    ///     Err(PointSourceError::DimensionMismatch { index: 1, expected: 3, actual: 2 })
    /// ));
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>, data: Vec<Vec<f64>>) -> Self {
        Self {
            data,
            name: name.into(),
        }
    }
}

impl PointSource for DenseSource {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn point(&self, index: usize) -> Result<Point, PointSourceError> {
        let row = self
            .data
            .get(index)
            .ok_or(PointSourceError::OutOfBounds { index })?;
        match row.as_slice() {
            &[x, y, z] => Ok(Point::new(x, y, z)),
            other => Err(PointSourceError::DimensionMismatch {
                index,
                expected: POINT_DIMENSION,
                actual: other.len(),
            }),
        }
    }
}
