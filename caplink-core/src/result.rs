//! Result types for clustering operations.
//!
//! Provides structures to represent the final partition, per-point labels,
//! and validation of the partition invariant.

use thiserror::Error;

use crate::point::Point;

/// Identifier assigned to a cluster.
///
/// Ids are stable: a cluster keeps the id of the singleton it grew from, and
/// the id of an absorbed cluster is never handed out again.
///
/// # Examples
/// ```
/// use caplink_core::ClusterId;
///
/// let id = ClusterId::new(4);
/// assert_eq!(id.get(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(u64);

impl ClusterId {
    /// Creates a new cluster identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: u64) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }

    pub(crate) const fn from_slot(slot: usize) -> Self {
        Self(slot as u64)
    }
}

/// One cluster of the final partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    id: ClusterId,
    members: Vec<usize>,
    centroid: Point,
}

impl Cluster {
    /// Creates a cluster record.
    #[must_use]
    pub fn new(id: ClusterId, members: Vec<usize>, centroid: Point) -> Self {
        Self {
            id,
            members,
            centroid,
        }
    }

    /// Returns the stable cluster id.
    #[must_use]
    pub fn id(&self) -> ClusterId {
        self.id
    }

    /// Returns member point indices in merge append order.
    #[must_use]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Returns the number of member points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns whether the cluster has no members. Never true for engine output.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the mean of the members' original coordinates.
    #[must_use]
    pub fn centroid(&self) -> Point {
        self.centroid
    }
}

/// A single merge performed by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeStep {
    /// One-based round in which the merge happened.
    pub round: usize,
    /// Cluster that kept its id (the lower of the pair).
    pub survivor: ClusterId,
    /// Cluster that was absorbed and retired.
    pub absorbed: ClusterId,
    /// Centroid distance between the pair before merging.
    pub distance: f64,
    /// Size of the survivor after the merge.
    pub size: usize,
    /// Number of active clusters after the merge.
    pub active_clusters: usize,
}

/// Error returned when a list of clusters is not a partition of `0..point_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidPartition {
    /// A cluster has no members.
    #[error("cluster {id} is empty")]
    EmptyCluster {
        /// Offending cluster id.
        id: u64,
    },
    /// A point index appears in more than one place.
    #[error("point {point} is assigned more than once")]
    Duplicate {
        /// Repeated point index.
        point: usize,
    },
    /// A member index is not below the point count.
    #[error("point {point} is out of range for {point_count} points")]
    OutOfRange {
        /// Offending point index.
        point: usize,
        /// Number of points in the input.
        point_count: usize,
    },
    /// A point index is not assigned to any cluster.
    #[error("point {point} is not assigned to any cluster")]
    Missing {
        /// Unassigned point index.
        point: usize,
    },
}

/// Represents the output of a [`crate::Caplink::run`] invocation.
///
/// Clusters are listed in ascending id order. [`Self::assignments`] maps every point
/// to the position of its cluster in that list.
///
/// # Examples
/// ```
/// use caplink_core::{Cluster, ClusterId, ClusteringResult, Point};
///
/// let result = ClusteringResult::try_from_clusters(
///     3,
///     vec![
///         Cluster::new(ClusterId::new(0), vec![0, 2], Point::new(0.5, 0.0, 0.0)),
///         Cluster::new(ClusterId::new(1), vec![1], Point::new(9.0, 0.0, 0.0)),
///     ],
/// )
/// .expect("clusters partition the points");
/// assert_eq!(result.cluster_count(), 2);
/// assert_eq!(result.assignments(), &[0, 1, 0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringResult {
    clusters: Vec<Cluster>,
    labels: Vec<usize>,
    merges: usize,
    rounds: usize,
    steps: Vec<MergeStep>,
}

impl ClusteringResult {
    /// Result for an input without points.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            clusters: Vec::new(),
            labels: Vec::new(),
            merges: 0,
            rounds: 0,
            steps: Vec::new(),
        }
    }

    /// Builds a result after checking that `clusters` partition
    /// `0..point_count`.
    ///
    /// Clusters are sorted by id; member order within a cluster is preserved.
    ///
    /// # Errors
    /// Returns [`InvalidPartition`] describing the first violation found.
    pub fn try_from_clusters(
        point_count: usize,
        mut clusters: Vec<Cluster>,
    ) -> Result<Self, InvalidPartition> {
        clusters.sort_by_key(Cluster::id);
        let mut labels: Vec<Option<usize>> = vec![None; point_count];
        for (label, cluster) in clusters.iter().enumerate() {
            if cluster.is_empty() {
                return Err(InvalidPartition::EmptyCluster {
                    id: cluster.id.get(),
                });
            }
            for &point in &cluster.members {
                let slot = labels.get_mut(point).ok_or(InvalidPartition::OutOfRange {
                    point,
                    point_count,
                })?;
                if slot.replace(label).is_some() {
                    return Err(InvalidPartition::Duplicate { point });
                }
            }
        }
        let labels = labels
            .into_iter()
            .enumerate()
            .map(|(point, label)| label.ok_or(InvalidPartition::Missing { point }))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            clusters,
            labels,
            merges: 0,
            rounds: 0,
            steps: Vec::new(),
        })
    }

    pub(crate) fn with_progress(mut self, merges: usize, rounds: usize, steps: Vec<MergeStep>) -> Self {
        self.merges = merges;
        self.rounds = rounds;
        self.steps = steps;
        self
    }

    /// Returns the clusters in ascending id order.
    #[must_use]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Returns, per point, the position of its cluster in [`Self::clusters`].
    #[must_use]
    pub fn assignments(&self) -> &[usize] {
        &self.labels
    }

    /// Returns the stable id of the cluster containing `point`.
    #[must_use]
    pub fn cluster_of(&self, point: usize) -> Option<ClusterId> {
        let label = *self.labels.get(point)?;
        self.clusters.get(label).map(Cluster::id)
    }

    /// Counts the clusters in the partition.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Returns the number of input points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.labels.len()
    }

    /// Returns the number of merges performed.
    #[must_use]
    pub fn merges(&self) -> usize {
        self.merges
    }

    /// Returns the number of rounds the engine evaluated, including the final
    /// round that found no legal merge.
    #[must_use]
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Returns the recorded merges. Empty unless merge recording was enabled.
    #[must_use]
    pub fn steps(&self) -> &[MergeStep] {
        &self.steps
    }

    /// Returns the member lists in cluster order, the shape most callers
    /// persist.
    #[must_use]
    pub fn member_lists(&self) -> Vec<Vec<usize>> {
        self.clusters
            .iter()
            .map(|cluster| cluster.members.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn cluster(id: u64, members: &[usize]) -> Cluster {
        Cluster::new(ClusterId::new(id), members.to_vec(), Point::default())
    }

    #[test]
    fn sorts_clusters_by_id_and_labels_points() {
        let result = ClusteringResult::try_from_clusters(
            4,
            vec![cluster(2, &[3, 2]), cluster(0, &[1, 0])],
        )
        .expect("valid partition");
        let ids: Vec<u64> = result.clusters().iter().map(|c| c.id().get()).collect();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(result.assignments(), &[0, 0, 1, 1]);
        assert_eq!(result.cluster_of(3), Some(ClusterId::new(2)));
        assert_eq!(result.member_lists(), vec![vec![1, 0], vec![3, 2]]);
    }

    #[rstest]
    #[case::empty_cluster(vec![cluster(0, &[0, 1]), cluster(1, &[])], InvalidPartition::EmptyCluster { id: 1 })]
    #[case::duplicate(vec![cluster(0, &[0, 1]), cluster(1, &[1])], InvalidPartition::Duplicate { point: 1 })]
    #[case::out_of_range(vec![cluster(0, &[0, 5])], InvalidPartition::OutOfRange { point: 5, point_count: 2 })]
    #[case::missing(vec![cluster(0, &[0])], InvalidPartition::Missing { point: 1 })]
    fn rejects_invalid_partitions(#[case] clusters: Vec<Cluster>, #[case] expected: InvalidPartition) {
        let err = ClusteringResult::try_from_clusters(2, clusters).expect_err("partition is invalid");
        assert_eq!(err, expected);
    }

    #[test]
    fn empty_result_has_no_clusters() {
        let result = ClusteringResult::empty();
        assert_eq!(result.cluster_count(), 0);
        assert_eq!(result.point_count(), 0);
        assert!(result.assignments().is_empty());
    }
}
