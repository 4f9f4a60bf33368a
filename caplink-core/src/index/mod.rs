//! Exact nearest-other-centroid queries over the active cluster set.
//!
//! Every backend answers the same question for a [`CentroidSnapshot`]: which
//! other active cluster has the closest centroid to the cluster at a given
//! position. Answers are exact. Squared distances are compared with
//! `total_cmp` and ties go to the lowest cluster id, so brute force, the k-d
//! tree and the incremental cache return identical neighbours.

mod brute_force;
mod incremental;
mod kd_tree;
mod memory;

use std::cmp::Ordering;

use crate::{error::define_error_codes, point::Point};

pub use self::{
    brute_force::BruteForceIndex,
    kd_tree::KdTreeIndex,
    memory::estimate_index_bytes,
};
pub(crate) use self::incremental::{CachedIndex, NearestCache};

/// Active set size above which [`NeighbourBackend::Auto`] builds a k-d tree.
pub const KD_TREE_THRESHOLD: usize = 64;

/// Selects how nearest-neighbour queries are answered each round.
///
/// All variants produce identical merge decisions; they only differ in cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeighbourBackend {
    /// Brute force for small active sets, k-d tree above
    /// [`KD_TREE_THRESHOLD`].
    #[default]
    Auto,
    /// Scan every other centroid.
    BruteForce,
    /// Rebuild a k-d tree over the active centroids every round.
    KdTree,
    /// Keep each cluster's nearest neighbour between rounds and only rescan
    /// clusters affected by the last merge.
    Incremental,
}

/// Errors raised while building an accelerated index.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum IndexError {
    /// The index would need more memory than the configured limit allows.
    #[error("index needs about {required_bytes} bytes but the limit is {limit_bytes}")]
    CapacityExceeded {
        /// Estimated peak bytes for the index.
        required_bytes: u64,
        /// Configured limit.
        limit_bytes: u64,
    },
}

define_error_codes! {
    /// Stable codes describing [`IndexError`] variants.
    enum IndexErrorCode for IndexError {
        /// The index would need more memory than the configured limit allows.
        CapacityExceeded => CapacityExceeded { .. } => "INDEX_CAPACITY_EXCEEDED",
    }
}

/// The nearest other active cluster of some query cluster.
///
/// Ordered by squared distance, then by cluster id.
///
/// # Examples
/// ```
/// use caplink_core::Neighbour;
///
/// let near = Neighbour { id: 7, distance_squared: 1.0 };
/// let tie = Neighbour { id: 3, distance_squared: 1.0 };
/// assert!(tie < near);
/// assert_eq!(near.distance(), 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbour {
    /// Cluster id of the neighbour.
    pub id: usize,
    /// Squared Euclidean distance between the two centroids.
    pub distance_squared: f64,
}

impl Neighbour {
    /// Euclidean distance between the two centroids.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance_squared.sqrt()
    }
}

impl Eq for Neighbour {}

impl Ord for Neighbour {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_squared
            .total_cmp(&other.distance_squared)
            .then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for Neighbour {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Active cluster ids, ascending, paired with their centroids.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CentroidSnapshot {
    ids: Vec<usize>,
    centroids: Vec<Point>,
}

impl CentroidSnapshot {
    /// Builds a snapshot from `(cluster_id, centroid)` pairs.
    ///
    /// Pairs must arrive in ascending id order.
    ///
    /// # Examples
    /// ```
    /// use caplink_core::{CentroidSnapshot, Point};
    ///
    /// let snapshot = CentroidSnapshot::from_pairs([
    ///     (0, Point::new(0.0, 0.0, 0.0)),
    ///     (4, Point::new(1.0, 0.0, 0.0)),
    /// ]);
    /// assert_eq!(snapshot.ids(), &[0, 4]);
    /// assert_eq!(snapshot.position_of(4), Some(1));
    /// ```
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, Point)>) -> Self {
        let (ids, centroids): (Vec<usize>, Vec<Point>) = pairs.into_iter().unzip();
        debug_assert!(
            ids.windows(2).all(|pair| pair[0] < pair[1]),
            "snapshot ids must be strictly ascending"
        );
        Self { ids, centroids }
    }

    /// Number of active clusters in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Cluster ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// Centroids aligned with [`Self::ids`].
    #[must_use]
    pub fn centroids(&self) -> &[Point] {
        &self.centroids
    }

    /// Cluster id stored at `position`.
    #[must_use]
    pub fn id(&self, position: usize) -> Option<usize> {
        self.ids.get(position).copied()
    }

    /// Centroid stored at `position`.
    #[must_use]
    pub fn centroid(&self, position: usize) -> Option<Point> {
        self.centroids.get(position).copied()
    }

    /// Position of cluster `id`, if it is active.
    #[must_use]
    pub fn position_of(&self, id: usize) -> Option<usize> {
        self.ids.binary_search(&id).ok()
    }

    /// Distance from the centroid at `position` to every other centroid,
    /// reduced to the nearest one. Shared by the brute-force backend and the
    /// incremental rescans.
    pub(crate) fn scan_nearest(&self, position: usize) -> Option<Neighbour> {
        let query = self.centroid(position)?;
        self.ids
            .iter()
            .zip(&self.centroids)
            .enumerate()
            .filter(|&(other, _)| other != position)
            .map(|(_, (&id, centroid))| Neighbour {
                id,
                distance_squared: query.distance_squared(centroid),
            })
            .min()
    }
}

/// Exact nearest-other-centroid query over a [`CentroidSnapshot`].
pub trait SpatialIndex {
    /// The snapshot the index answers for.
    fn snapshot(&self) -> &CentroidSnapshot;

    /// Nearest other active cluster for the cluster at `position`, or `None`
    /// when it is the only active cluster or `position` is out of range.
    fn nearest_other(&self, position: usize) -> Option<Neighbour>;

    /// Number of clusters the index covers.
    fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether the index covers no clusters.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Index built fresh for one round.
pub(crate) enum RoundIndex<'a> {
    BruteForce(BruteForceIndex<'a>),
    KdTree(KdTreeIndex<'a>),
}

impl<'a> RoundIndex<'a> {
    /// Builds the index `backend` asks for. A k-d tree that would exceed
    /// `memory_limit` degrades to brute force; the returned error explains
    /// why so the caller can log it.
    pub(crate) fn build(
        snapshot: &'a CentroidSnapshot,
        backend: NeighbourBackend,
        memory_limit: Option<u64>,
    ) -> (Self, Option<IndexError>) {
        let wants_tree = match backend {
            NeighbourBackend::BruteForce => false,
            NeighbourBackend::KdTree => true,
            NeighbourBackend::Auto | NeighbourBackend::Incremental => {
                snapshot.len() > KD_TREE_THRESHOLD
            }
        };
        if !wants_tree {
            return (Self::BruteForce(BruteForceIndex::new(snapshot)), None);
        }
        match KdTreeIndex::try_build(snapshot, memory_limit) {
            Ok(tree) => (Self::KdTree(tree), None),
            Err(error) => (Self::BruteForce(BruteForceIndex::new(snapshot)), Some(error)),
        }
    }

    pub(crate) const fn label(&self) -> &'static str {
        match self {
            Self::BruteForce(_) => "brute_force",
            Self::KdTree(_) => "kd_tree",
        }
    }
}

impl SpatialIndex for RoundIndex<'_> {
    fn snapshot(&self) -> &CentroidSnapshot {
        match self {
            Self::BruteForce(index) => index.snapshot(),
            Self::KdTree(index) => index.snapshot(),
        }
    }

    fn nearest_other(&self, position: usize) -> Option<Neighbour> {
        match self {
            Self::BruteForce(index) => index.nearest_other(position),
            Self::KdTree(index) => index.nearest_other(position),
        }
    }
}
