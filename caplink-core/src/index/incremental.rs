//! Nearest-neighbour cache carried between rounds.
//!
//! A merge only changes two centroids: the survivor moves and the absorbed
//! cluster disappears. A cluster whose cached neighbour was neither of them
//! still has that neighbour as its nearest among the unchanged clusters, so
//! its new nearest is the smaller of the cached entry and its distance to
//! the moved survivor. Every other cluster is rescanned.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{CentroidSnapshot, Neighbour, SpatialIndex};
use crate::store::MergedPair;

/// Per-cluster nearest neighbours, indexed by cluster id.
#[derive(Clone, Debug, Default)]
pub(crate) struct NearestCache {
    neighbours: Vec<Option<Neighbour>>,
    rescans: usize,
}

impl NearestCache {
    /// Seeds the cache by querying `index` for every cluster it covers.
    ///
    /// `slots` must exceed every cluster id in the snapshot.
    pub(crate) fn from_index<I: SpatialIndex + ?Sized>(index: &I, slots: usize) -> Self {
        let mut neighbours = vec![None; slots];
        for (position, &id) in index.snapshot().ids().iter().enumerate() {
            if let Some(slot) = neighbours.get_mut(id) {
                *slot = index.nearest_other(position);
            }
        }
        Self {
            neighbours,
            rescans: 0,
        }
    }

    pub(crate) fn get(&self, id: usize) -> Option<Neighbour> {
        self.neighbours.get(id).copied().flatten()
    }

    /// Number of full rescans performed since the cache was seeded.
    pub(crate) fn rescans(&self) -> usize {
        self.rescans
    }

    /// Nearest neighbour of the cluster at `position` in `snapshot`, which
    /// must reflect `merged` already.
    ///
    /// Returns the answer and whether it needed a full rescan.
    fn refreshed(
        &self,
        snapshot: &CentroidSnapshot,
        position: usize,
        merged: MergedPair,
    ) -> (Option<Neighbour>, bool) {
        let Some(id) = snapshot.id(position) else {
            return (None, false);
        };
        let cached = self.get(id);
        let stale = id == merged.survivor
            || cached.is_none_or(|n| n.id == merged.survivor || n.id == merged.absorbed);
        if stale {
            return (snapshot.scan_nearest(position), true);
        }

        let survivor = snapshot
            .position_of(merged.survivor)
            .and_then(|p| snapshot.centroid(p));
        let (Some(query), Some(survivor)) = (snapshot.centroid(position), survivor) else {
            return (snapshot.scan_nearest(position), true);
        };
        let moved = Neighbour {
            id: merged.survivor,
            distance_squared: query.distance_squared(&survivor),
        };
        (cached.map(|c| c.min(moved)), false)
    }

    /// Brings the cache up to date after `merged`. `snapshot` must be the
    /// post-merge snapshot.
    pub(crate) fn apply_merge(
        &mut self,
        snapshot: &CentroidSnapshot,
        merged: MergedPair,
        parallel: bool,
    ) {
        let updates = self.collect_updates(snapshot, merged, parallel);
        if let Some(slot) = self.neighbours.get_mut(merged.absorbed) {
            *slot = None;
        }
        for (id, neighbour, rescanned) in updates {
            if let Some(slot) = self.neighbours.get_mut(id) {
                *slot = neighbour;
            }
            self.rescans += usize::from(rescanned);
        }
    }

    #[cfg(feature = "parallel")]
    fn collect_updates(
        &self,
        snapshot: &CentroidSnapshot,
        merged: MergedPair,
        parallel: bool,
    ) -> Vec<(usize, Option<Neighbour>, bool)> {
        if parallel {
            snapshot
                .ids()
                .par_iter()
                .enumerate()
                .map(|(position, &id)| {
                    let (neighbour, rescanned) = self.refreshed(snapshot, position, merged);
                    (id, neighbour, rescanned)
                })
                .collect()
        } else {
            self.collect_sequential(snapshot, merged)
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn collect_updates(
        &self,
        snapshot: &CentroidSnapshot,
        merged: MergedPair,
        _parallel: bool,
    ) -> Vec<(usize, Option<Neighbour>, bool)> {
        self.collect_sequential(snapshot, merged)
    }

    fn collect_sequential(
        &self,
        snapshot: &CentroidSnapshot,
        merged: MergedPair,
    ) -> Vec<(usize, Option<Neighbour>, bool)> {
        snapshot
            .ids()
            .iter()
            .enumerate()
            .map(|(position, &id)| {
                let (neighbour, rescanned) = self.refreshed(snapshot, position, merged);
                (id, neighbour, rescanned)
            })
            .collect()
    }
}

/// Serves queries for one round straight from a [`NearestCache`].
pub(crate) struct CachedIndex<'a> {
    snapshot: &'a CentroidSnapshot,
    cache: &'a NearestCache,
}

impl<'a> CachedIndex<'a> {
    pub(crate) const fn new(snapshot: &'a CentroidSnapshot, cache: &'a NearestCache) -> Self {
        Self { snapshot, cache }
    }
}

impl SpatialIndex for CachedIndex<'_> {
    fn snapshot(&self) -> &CentroidSnapshot {
        self.snapshot
    }

    fn nearest_other(&self, position: usize) -> Option<Neighbour> {
        self.snapshot.id(position).and_then(|id| self.cache.get(id))
    }
}
