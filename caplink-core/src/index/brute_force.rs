//! Exhaustive scan backend.

use super::{CentroidSnapshot, Neighbour, SpatialIndex};

/// Answers each query by scanning every other centroid.
///
/// Quadratic per round, but allocation-free and the fastest option for small
/// active sets.
///
/// # Examples
/// ```
/// use caplink_core::{BruteForceIndex, CentroidSnapshot, Point, SpatialIndex};
///
/// let snapshot = CentroidSnapshot::from_pairs([
///     (0, Point::new(0.0, 0.0, 0.0)),
///     (1, Point::new(5.0, 0.0, 0.0)),
///     (2, Point::new(1.0, 0.0, 0.0)),
/// ]);
/// let index = BruteForceIndex::new(&snapshot);
/// let nearest = index.nearest_other(0).expect("three clusters are active");
/// assert_eq!(nearest.id, 2);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct BruteForceIndex<'a> {
    snapshot: &'a CentroidSnapshot,
}

impl<'a> BruteForceIndex<'a> {
    /// Wraps `snapshot`; there is nothing to precompute.
    #[must_use]
    pub const fn new(snapshot: &'a CentroidSnapshot) -> Self {
        Self { snapshot }
    }
}

impl SpatialIndex for BruteForceIndex<'_> {
    fn snapshot(&self) -> &CentroidSnapshot {
        self.snapshot
    }

    fn nearest_other(&self, position: usize) -> Option<Neighbour> {
        self.snapshot.scan_nearest(position)
    }
}
