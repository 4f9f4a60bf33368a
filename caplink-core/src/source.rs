//! Point source abstractions for the caplink core runtime.

use crate::{error::PointSourceError, point::Point};

/// Abstraction over an ordered collection of 3D points.
///
/// The position of a point in the source is its original index; the engine
/// reports cluster membership in terms of these indices so callers can map
/// clusters back to whatever the points stand for.
///
/// # Examples
/// ```
/// use caplink_core::{Point, PointSource, PointSourceError};
///
/// struct Line(Vec<f64>);
///
/// impl PointSource for Line {
///     fn len(&self) -> usize { self.0.len() }
///     fn name(&self) -> &str { "line" }
///     fn point(&self, index: usize) -> Result<Point, PointSourceError> {
///         let x = self.0.get(index).ok_or(PointSourceError::OutOfBounds { index })?;
///         Ok(Point::new(*x, 0.0, 0.0))
///     }
/// }
///
/// let src = Line(vec![1.0, 2.0, 4.0]);
/// assert_eq!(src.len(), 3);
/// assert_eq!(src.point(2)?, Point::new(4.0, 0.0, 0.0));
/// assert_eq!(src.points()?.len(), 3);
/// # Ok::<(), PointSourceError>(())
/// ```
pub trait PointSource {
    /// Returns number of points in the source.
    fn len(&self) -> usize;

    /// Returns whether the source contains no points.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a human-readable name.
    fn name(&self) -> &str;

    /// Returns the point stored at `index`.
    ///
    /// # Errors
    /// Implementations must return [`PointSourceError::OutOfBounds`] for
    /// indices `>= len()`.
    fn point(&self, index: usize) -> Result<Point, PointSourceError>;

    /// Collects every point in index order.
    ///
    /// Implementations backed by contiguous storage can override this to
    /// avoid the per-point calls.
    ///
    /// # Errors
    /// Returns the first [`PointSourceError`] surfaced by [`Self::point`].
    fn points(&self) -> Result<Vec<Point>, PointSourceError> {
        (0..self.len()).map(|index| self.point(index)).collect()
    }
}

/// A named, in-memory list of points.
///
/// # Examples
/// ```
/// use caplink_core::{Point, PointCloud, PointSource};
///
/// let cloud = PointCloud::new("demo", vec![Point::new(0.0, 0.0, 0.0)]);
/// assert_eq!(cloud.name(), "demo");
/// assert_eq!(cloud.len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointCloud {
    name: String,
    points: Vec<Point>,
}

impl PointCloud {
    /// Creates a cloud from already-validated storage.
    #[must_use]
    pub fn new(name: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Builds a cloud from `[x, y, z]` triples.
    #[must_use]
    pub fn from_coords(name: impl Into<String>, coords: &[[f64; 3]]) -> Self {
        Self::new(name, coords.iter().copied().map(Point::from).collect())
    }

    /// Borrows the stored points.
    #[must_use]
    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }

    /// Consumes the cloud and returns the stored points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

impl PointSource for PointCloud {
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
