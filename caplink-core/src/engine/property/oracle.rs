//! Naive reference implementation of the merge loop.
//!
//! Recomputes every centroid and every pairwise distance each round with no
//! index, no cache and no parallelism.

use std::cmp::Ordering;

use crate::point::Point;

/// Outcome of the oracle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct OracleResult {
    /// Member lists in ascending surviving-id order.
    pub members: Vec<Vec<usize>>,
    /// Number of merges performed.
    pub merges: usize,
}

/// Runs the greedy loop by exhaustive search.
pub(super) fn naive_merge(points: &[Point], max_cluster_size: usize) -> OracleResult {
    let mut clusters: Vec<Option<Vec<usize>>> = (0..points.len()).map(|i| Some(vec![i])).collect();
    let mut merges = 0;

    loop {
        let active: Vec<(usize, Point, usize)> = clusters
            .iter()
            .enumerate()
            .filter_map(|(id, members)| {
                let members = members.as_ref()?;
                Some((id, Point::mean_of(points, members)?, members.len()))
            })
            .collect();

        let mut best: Option<(f64, usize, usize)> = None;
        for &(i, ci, size_i) in &active {
            let mut nearest: Option<(f64, usize, usize)> = None;
            for &(j, cj, size_j) in &active {
                if i == j {
                    continue;
                }
                let d = ci.distance_squared(&cj);
                // Strict comparison keeps the lowest id among ties.
                if nearest.is_none_or(|(best_d, _, _)| d < best_d) {
                    nearest = Some((d, j, size_j));
                }
            }
            let Some((d, j, size_j)) = nearest else {
                continue;
            };
            if size_i + size_j > max_cluster_size {
                continue;
            }
            if best.is_none_or(|current| compare(&(d, i, j), &current) == Ordering::Less) {
                best = Some((d, i, j));
            }
        }

        let Some((_, i, j)) = best else {
            break;
        };
        let (survivor, absorbed) = (i.min(j), i.max(j));
        let taken = clusters[absorbed].take().unwrap_or_default();
        if let Some(members) = clusters[survivor].as_mut() {
            members.extend(taken);
        }
        merges += 1;
    }

    OracleResult {
        members: clusters.into_iter().flatten().collect(),
        merges,
    }
}

fn compare(lhs: &(f64, usize, usize), rhs: &(f64, usize, usize)) -> Ordering {
    lhs.0
        .total_cmp(&rhs.0)
        .then(lhs.1.cmp(&rhs.1))
        .then(lhs.2.cmp(&rhs.2))
}
