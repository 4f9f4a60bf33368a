//! Greedy nearest-centroid merge loop.
//!
//! Each round takes a snapshot of the active centroids, asks the configured
//! index for every cluster's nearest other cluster, keeps the proposals whose
//! combined size fits the bound, and merges the single closest pair. A
//! cluster whose nearest neighbour is too large proposes nothing that round.
//! The loop stops when no cluster has a legal proposal.

use std::{
    cmp::Ordering,
    num::NonZeroUsize,
    sync::Arc,
    time::{Duration, Instant},
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::{
    Result,
    builder::ExecutionStrategy,
    error::{BudgetLimit, CaplinkError},
    index::{CachedIndex, IndexError, NearestCache, NeighbourBackend, RoundIndex, SpatialIndex},
    point::Point,
    result::{ClusterId, ClusteringResult, MergeStep},
    store::{ClusterStore, MergedPair},
};

/// Active set size from which [`ExecutionStrategy::Auto`] computes proposals
/// on the rayon pool.
pub const PARALLEL_THRESHOLD: usize = 512;

/// Caller-imposed limits on a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Budget {
    pub(crate) max_merges: Option<usize>,
    pub(crate) time_limit: Option<Duration>,
}

impl Budget {
    /// Returns the limit that stops the run before merge number
    /// `merges + 1`, if any.
    fn tripped(&self, merges: usize, elapsed: Duration) -> Option<BudgetLimit> {
        if let Some(limit) = self.max_merges.filter(|&limit| merges >= limit) {
            return Some(BudgetLimit::Merges(limit));
        }
        self.time_limit
            .filter(|&limit| elapsed >= limit)
            .map(BudgetLimit::Time)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct EngineConfig {
    pub(crate) max_cluster_size: NonZeroUsize,
    pub(crate) strategy: ExecutionStrategy,
    pub(crate) backend: NeighbourBackend,
    pub(crate) budget: Budget,
    pub(crate) memory_limit: Option<u64>,
    pub(crate) record_merges: bool,
}

impl EngineConfig {
    fn runs_parallel(&self, active: usize) -> bool {
        match self.strategy {
            ExecutionStrategy::Sequential => false,
            ExecutionStrategy::Parallel => cfg!(feature = "parallel"),
            ExecutionStrategy::Auto => cfg!(feature = "parallel") && active >= PARALLEL_THRESHOLD,
        }
    }
}

/// One cluster's proposal: merge `query` with its nearest neighbour.
///
/// Ordered by squared distance, then query id, then neighbour id.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    distance_squared: f64,
    query: usize,
    neighbour: usize,
}

impl Candidate {
    fn survivor(&self) -> usize {
        self.query.min(self.neighbour)
    }

    fn absorbed(&self) -> usize {
        self.query.max(self.neighbour)
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_squared
            .total_cmp(&other.distance_squared)
            .then(self.query.cmp(&other.query))
            .then(self.neighbour.cmp(&other.neighbour))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Counters accumulated across rounds.
#[derive(Debug, Default)]
struct Progress {
    merges: usize,
    rounds: usize,
    index_fallbacks: usize,
    steps: Vec<MergeStep>,
}

#[derive(Debug)]
pub(crate) struct MergeEngine {
    config: EngineConfig,
}

impl MergeEngine {
    pub(crate) const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Clusters `points` until no legal merge remains or a budget trips.
    ///
    /// Points must already be validated as finite.
    #[instrument(
        name = "core.merge_loop",
        err,
        skip(self, points),
        fields(points = points.len(), backend = ?self.config.backend),
    )]
    pub(crate) fn run(&self, points: Vec<Point>) -> Result<ClusteringResult> {
        let started = Instant::now();
        let mut store = ClusterStore::new(points, self.config.max_cluster_size);
        let mut progress = Progress::default();
        let mut snapshot = store.snapshot();
        let mut cache = (self.config.backend == NeighbourBackend::Incremental).then(|| {
            let (index, fallback) =
                RoundIndex::build(&snapshot, self.config.backend, self.config.memory_limit);
            self.note_fallback(fallback, &mut progress);
            NearestCache::from_index(&index, store.point_count())
        });

        loop {
            let round_started = Instant::now();
            progress.rounds += 1;
            record_round();
            let parallel = self.config.runs_parallel(snapshot.len());

            let best = match cache.as_ref() {
                Some(cache) => propose(&CachedIndex::new(&snapshot, cache), &store, parallel),
                None => {
                    let (index, fallback) =
                        RoundIndex::build(&snapshot, self.config.backend, self.config.memory_limit);
                    self.note_fallback(fallback, &mut progress);
                    debug!(
                        round = progress.rounds,
                        index = index.label(),
                        active_clusters = snapshot.len(),
                        "round index built"
                    );
                    propose(&index, &store, parallel)
                }
            };
            record_round_latency(round_started.elapsed());

            let Some(candidate) = best else {
                break;
            };

            if let Some(limit) = self.config.budget.tripped(progress.merges, started.elapsed()) {
                warn!(
                    %limit,
                    merges = progress.merges,
                    active_clusters = store.active_count(),
                    "budget exhausted before convergence"
                );
                let merges = progress.merges;
                let partial = self.finish(store, progress)?;
                return Err(CaplinkError::BudgetExceeded {
                    limit,
                    merges,
                    partial: Box::new(partial),
                });
            }

            let merged = store
                .merge(candidate.survivor(), candidate.absorbed())
                .ok_or_else(|| {
                    self.invariant_violation(format!(
                        "proposed merge of {} into {} was rejected by the store",
                        candidate.absorbed(),
                        candidate.survivor()
                    ))
                })?;
            progress.merges += 1;
            snapshot = store.snapshot();
            self.note_merge(&candidate, merged, progress.rounds, snapshot.len(), &mut progress);

            if let Some(cache) = cache.as_mut() {
                cache.apply_merge(&snapshot, merged, parallel);
            }
        }

        if let Some(cache) = cache.as_ref() {
            debug!(rescans = cache.rescans(), "incremental index statistics");
        }
        self.finish(store, progress)
    }

    fn note_fallback(&self, fallback: Option<IndexError>, progress: &mut Progress) {
        let Some(error) = fallback else {
            return;
        };
        progress.index_fallbacks += 1;
        if progress.index_fallbacks == 1 {
            warn!(
                code = %error.code(),
                %error,
                "k-d tree unavailable, answering with brute force"
            );
        } else {
            debug!(code = %error.code(), round = progress.rounds, "k-d tree unavailable");
        }
    }

    fn note_merge(
        &self,
        candidate: &Candidate,
        merged: MergedPair,
        round: usize,
        active_clusters: usize,
        progress: &mut Progress,
    ) {
        let distance = candidate.distance_squared.sqrt();
        debug!(
            round,
            survivor = merged.survivor,
            absorbed = merged.absorbed,
            size = merged.size,
            distance,
            "merged clusters"
        );
        record_merge();
        if self.config.record_merges {
            progress.steps.push(MergeStep {
                round,
                survivor: ClusterId::from_slot(merged.survivor),
                absorbed: ClusterId::from_slot(merged.absorbed),
                distance,
                size: merged.size,
                active_clusters,
            });
        }
    }

    /// Converts the store into a result, re-checking the partition and size
    /// invariants on the way out.
    fn finish(&self, store: ClusterStore, progress: Progress) -> Result<ClusteringResult> {
        let point_count = store.point_count();
        let clusters = store.into_clusters();
        let max = self.config.max_cluster_size.get();
        if let Some(cluster) = clusters.iter().find(|cluster| cluster.len() > max) {
            return Err(self.invariant_violation(format!(
                "cluster {} holds {} points",
                cluster.id().get(),
                cluster.len()
            )));
        }
        let result = ClusteringResult::try_from_clusters(point_count, clusters)
            .map_err(|error| self.invariant_violation(error.to_string()))?;
        if progress.index_fallbacks > 0 {
            debug!(
                index_fallbacks = progress.index_fallbacks,
                "rounds answered by brute force after a k-d tree was refused"
            );
        }
        Ok(result.with_progress(progress.merges, progress.rounds, progress.steps))
    }

    fn invariant_violation(&self, reason: String) -> CaplinkError {
        CaplinkError::InvariantViolation {
            reason: Arc::from(reason),
            max_cluster_size: self.config.max_cluster_size,
        }
    }
}

/// Best legal proposal across every cluster `index` covers.
fn propose<I>(index: &I, store: &ClusterStore, parallel: bool) -> Option<Candidate>
where
    I: SpatialIndex + Sync,
{
    let propose_at = |position: usize| {
        let query = index.snapshot().id(position)?;
        let neighbour = index.nearest_other(position)?;
        store.can_merge(query, neighbour.id).then_some(Candidate {
            distance_squared: neighbour.distance_squared,
            query,
            neighbour: neighbour.id,
        })
    };

    #[cfg(feature = "parallel")]
    if parallel {
        return (0..index.len()).into_par_iter().filter_map(propose_at).min();
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    (0..index.len()).filter_map(propose_at).min()
}

#[cfg(feature = "metrics")]
fn record_merge() {
    metrics::counter!("caplink_merges_total").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_merge() {}

#[cfg(feature = "metrics")]
fn record_round() {
    metrics::counter!("caplink_rounds_total").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_round() {}

#[cfg(feature = "metrics")]
fn record_round_latency(elapsed: Duration) {
    metrics::histogram!("caplink_round_latency_seconds").record(elapsed.as_secs_f64());
}

#[cfg(not(feature = "metrics"))]
fn record_round_latency(_elapsed: Duration) {}

#[cfg(test)]
mod property;
