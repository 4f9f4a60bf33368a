//! Authoritative cluster membership and centroid bookkeeping.
//!
//! Clusters live in an arena addressed by their stable id. Retiring a
//! cluster empties its slot instead of shifting later entries, so ids never
//! change meaning while the active set shrinks.

use std::num::NonZeroUsize;

use crate::{
    index::CentroidSnapshot,
    point::Point,
    result::{Cluster, ClusterId},
};

#[derive(Clone, Debug)]
struct ClusterRecord {
    members: Vec<usize>,
    centroid: Point,
}

/// Outcome of a successful [`ClusterStore::merge`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct MergedPair {
    pub(crate) survivor: usize,
    pub(crate) absorbed: usize,
    pub(crate) size: usize,
}

#[derive(Clone, Debug)]
pub(crate) struct ClusterStore {
    points: Vec<Point>,
    records: Vec<Option<ClusterRecord>>,
    active: Vec<usize>,
    max_cluster_size: NonZeroUsize,
}

impl ClusterStore {
    /// Creates one singleton cluster per point; cluster `i` holds point `i`.
    pub(crate) fn new(points: Vec<Point>, max_cluster_size: NonZeroUsize) -> Self {
        let records = points
            .iter()
            .enumerate()
            .map(|(index, &point)| {
                Some(ClusterRecord {
                    members: vec![index],
                    centroid: point,
                })
            })
            .collect();
        let active = (0..points.len()).collect();
        Self {
            points,
            records,
            active,
            max_cluster_size,
        }
    }

    /// Active cluster ids in ascending order.
    pub(crate) fn active_ids(&self) -> &[usize] {
        &self.active
    }

    pub(crate) fn active_count(&self) -> usize {
        self.active.len()
    }

    pub(crate) fn point_count(&self) -> usize {
        self.points.len()
    }

    fn record(&self, id: usize) -> Option<&ClusterRecord> {
        self.records.get(id).and_then(Option::as_ref)
    }

    /// Size of an active cluster, or `None` when `id` is retired or unknown.
    pub(crate) fn size(&self, id: usize) -> Option<usize> {
        self.record(id).map(|record| record.members.len())
    }

    pub(crate) fn centroid(&self, id: usize) -> Option<Point> {
        self.record(id).map(|record| record.centroid)
    }

    #[cfg(test)]
    pub(crate) fn members(&self, id: usize) -> Option<&[usize]> {
        self.record(id).map(|record| record.members.as_slice())
    }

    /// Whether merging `left` and `right` stays within the size bound.
    ///
    /// Returns `false` when either id is not active.
    pub(crate) fn can_merge(&self, left: usize, right: usize) -> bool {
        match (self.size(left), self.size(right)) {
            (Some(a), Some(b)) => left != right && a + b <= self.max_cluster_size.get(),
            _ => false,
        }
    }

    /// Ascending `(id, centroid)` pairs for every active cluster.
    pub(crate) fn snapshot(&self) -> CentroidSnapshot {
        CentroidSnapshot::from_pairs(
            self.active_ids()
                .iter()
                .filter_map(|&id| self.centroid(id).map(|centroid| (id, centroid))),
        )
    }

    /// Appends `absorbed`'s members to `survivor`, recomputes the survivor's
    /// centroid from its full member list, and retires `absorbed`.
    ///
    /// Callers must have checked [`Self::can_merge`]; the engine only ever
    /// proposes legal pairs. An illegal request leaves the store unchanged
    /// and returns `None`.
    pub(crate) fn merge(&mut self, survivor: usize, absorbed: usize) -> Option<MergedPair> {
        debug_assert!(
            self.can_merge(survivor, absorbed),
            "merge({survivor}, {absorbed}) requested without a legal pair"
        );
        if !self.can_merge(survivor, absorbed) {
            return None;
        }
        let position = self.active.binary_search(&absorbed).ok()?;
        let mut members = self.record(survivor)?.members.clone();
        members.extend_from_slice(&self.record(absorbed)?.members);
        let centroid = Point::mean_of(&self.points, &members)?;

        // Both slots were read above; from here on nothing can bail out.
        let size = members.len();
        if let Some(slot) = self.records.get_mut(absorbed) {
            *slot = None;
        }
        if let Some(slot) = self.records.get_mut(survivor) {
            *slot = Some(ClusterRecord { members, centroid });
        }
        self.active.remove(position);
        Some(MergedPair {
            survivor,
            absorbed,
            size,
        })
    }

    /// Converts the active clusters into result records in ascending id order.
    pub(crate) fn into_clusters(self) -> Vec<Cluster> {
        self.records
            .into_iter()
            .enumerate()
            .filter_map(|(id, record)| {
                record.map(|record| {
                    Cluster::new(ClusterId::from_slot(id), record.members, record.centroid)
                })
            })
            .collect()
    }
}
