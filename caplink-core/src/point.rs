//! Immutable 3D coordinates and the distance/centroid arithmetic the engine
//! relies on.
//!
//! All arithmetic happens in `f64`. Distances are compared squared; the square
//! root is only taken when a distance is reported to callers. Squared
//! distance is symmetric bit-for-bit, so every index backend observes the
//! same ordering for the same pair of centroids.

use core::fmt;

use crate::error::{CaplinkError, Result};

/// Identifies a coordinate axis.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Axis {
    /// The first coordinate.
    X,
    /// The second coordinate.
    Y,
    /// The third coordinate.
    Z,
}

impl Axis {
    /// All axes in coordinate order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Returns the position of the axis within [`Point::coords`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
            Self::Z => f.write_str("z"),
        }
    }
}

/// A 3D coordinate.
///
/// # Examples
/// ```
/// use caplink_core::Point;
///
/// let a = Point::new(0.0, 0.0, 0.0);
/// let b = Point::from([3.0, 4.0, 0.0]);
/// assert_eq!(a.distance_squared(&b), 25.0);
/// assert_eq!(a.distance(&b), 5.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// Coordinate along [`Axis::X`].
    pub x: f64,
    /// Coordinate along [`Axis::Y`].
    pub y: f64,
    /// Coordinate along [`Axis::Z`].
    pub z: f64,
}

impl Point {
    /// Creates a point from its three coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns the coordinates as `[x, y, z]`.
    #[must_use]
    pub const fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Returns the coordinate along `axis`.
    #[must_use]
    pub const fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Squared Euclidean distance to `other`.
    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Returns the first non-finite coordinate, if any.
    #[must_use]
    pub fn first_non_finite(&self) -> Option<(Axis, f64)> {
        Axis::ALL
            .into_iter()
            .map(|axis| (axis, self.along(axis)))
            .find(|(_, value)| !value.is_finite())
    }

    /// Arithmetic mean of `points[i]` for every `i` in `members`.
    ///
    /// Returns `None` when `members` is empty or references an index outside
    /// `points`.
    ///
    /// # Examples
    /// ```
    /// use caplink_core::Point;
    ///
    /// let points = [Point::new(0.0, 0.0, 0.0), Point::new(2.0, 4.0, 6.0)];
    /// let mean = Point::mean_of(&points, &[0, 1]).expect("members are valid");
    /// assert_eq!(mean, Point::new(1.0, 2.0, 3.0));
    /// ```
    #[must_use]
    pub fn mean_of(points: &[Self], members: &[usize]) -> Option<Self> {
        if members.is_empty() {
            return None;
        }
        let mut sum = [0.0_f64; 3];
        for &member in members {
            let point = points.get(member)?;
            sum[0] += point.x;
            sum[1] += point.y;
            sum[2] += point.z;
        }
        let count = members.len() as f64;
        Some(Self::new(sum[0] / count, sum[1] / count, sum[2] / count))
    }
}

impl From<[f64; 3]> for Point {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<[f32; 3]> for Point {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(f64::from(x), f64::from(y), f64::from(z))
    }
}

impl From<Point> for [f64; 3] {
    fn from(point: Point) -> Self {
        point.coords()
    }
}

/// Largest accepted coordinate magnitude.
///
/// Two coordinates within this bound differ by at most `2e150`, so the sum
/// of three squared differences stays below `1.2e301` and never overflows
/// to infinity.
pub const MAX_COORDINATE_MAGNITUDE: f64 = 1e150;

/// Rejects the first point carrying a NaN, infinite or oversized coordinate.
pub(crate) fn validate_points(points: &[Point]) -> Result<()> {
    for (index, point) in points.iter().enumerate() {
        if let Some((axis, value)) = point.first_non_finite() {
            return Err(CaplinkError::NonFiniteCoordinate { index, axis, value });
        }
        if let Some((axis, value)) = Axis::ALL
            .into_iter()
            .map(|axis| (axis, point.along(axis)))
            .find(|(_, value)| value.abs() > MAX_COORDINATE_MAGNITUDE)
        {
            return Err(CaplinkError::CoordinateOutOfRange { index, axis, value });
        }
    }
    Ok(())
}
