//! Per-round k-d tree over active centroids.
//!
//! The tree stores a permutation of snapshot positions plus a flat node
//! array. Each node carries the axis-aligned bounding box of its centroids.
//! A subtree is skipped only when its box is strictly farther than the best
//! neighbour found so far, so equidistant candidates are always visited and
//! the lowest-id tie-break matches an exhaustive scan.

use super::{
    CentroidSnapshot, IndexError, Neighbour, SpatialIndex,
    memory::{LEAF_SIZE, estimate_index_bytes},
};
use crate::point::{Axis, Point};

#[derive(Clone, Copy, Debug)]
struct Bounds {
    min: Point,
    max: Point,
}

impl Bounds {
    fn around(centroids: &[Point], positions: &[usize]) -> Self {
        let mut min = Point::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for centroid in positions.iter().filter_map(|&p| centroids.get(p)) {
            min = Point::new(
                min.x.min(centroid.x),
                min.y.min(centroid.y),
                min.z.min(centroid.z),
            );
            max = Point::new(
                max.x.max(centroid.x),
                max.y.max(centroid.y),
                max.z.max(centroid.z),
            );
        }
        Self { min, max }
    }

    fn widest_axis(&self) -> Axis {
        Axis::ALL
            .into_iter()
            .max_by(|a, b| {
                let extent_a = self.max.along(*a) - self.min.along(*a);
                let extent_b = self.max.along(*b) - self.min.along(*b);
                extent_a.total_cmp(&extent_b)
            })
            .unwrap_or(Axis::X)
    }

    /// Lower bound on the squared distance from `query` to any centroid in
    /// the box.
    ///
    /// Evaluated with the same operation order as
    /// [`Point::distance_squared`]. Rounding is monotonic, so the bound never
    /// exceeds a distance the exhaustive scan would compute.
    fn distance_squared_to(&self, query: &Point) -> f64 {
        let gap = |axis: Axis| {
            let q = query.along(axis);
            let lo = self.min.along(axis);
            let hi = self.max.along(axis);
            if q < lo {
                lo - q
            } else if q > hi {
                q - hi
            } else {
                0.0
            }
        };
        let dx = gap(Axis::X);
        let dy = gap(Axis::Y);
        let dz = gap(Axis::Z);
        dx * dx + dy * dy + dz * dz
    }
}

#[derive(Clone, Copy, Debug)]
enum Node {
    Leaf {
        bounds: Bounds,
        start: usize,
        end: usize,
    },
    Split {
        bounds: Bounds,
        left: usize,
        right: usize,
    },
}

impl Node {
    const fn bounds(&self) -> &Bounds {
        match self {
            Self::Leaf { bounds, .. } | Self::Split { bounds, .. } => bounds,
        }
    }
}

/// Exact nearest-other-centroid index backed by a k-d tree.
///
/// Built fresh from each round's snapshot. Construction is `O(n log n)` via
/// median selection on the widest axis; queries visit only boxes that could
/// still hold a neighbour at least as close as the current best.
///
/// # Examples
/// ```
/// use caplink_core::{CentroidSnapshot, KdTreeIndex, Point, SpatialIndex};
///
/// let snapshot = CentroidSnapshot::from_pairs(
///     (0..100).map(|i| (i, Point::new(i as f64, 0.0, 0.0))),
/// );
/// let tree = KdTreeIndex::try_build(&snapshot, None).expect("no memory limit");
/// let nearest = tree.nearest_other(50).expect("many clusters are active");
/// assert_eq!(nearest.id, 49);
/// assert_eq!(nearest.distance_squared, 1.0);
/// ```
#[derive(Clone, Debug)]
pub struct KdTreeIndex<'a> {
    snapshot: &'a CentroidSnapshot,
    order: Vec<usize>,
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl<'a> KdTreeIndex<'a> {
    /// Builds a tree over `snapshot`.
    ///
    /// # Errors
    /// Returns [`IndexError::CapacityExceeded`] when the estimated footprint
    /// from [`estimate_index_bytes`] is above `memory_limit`.
    pub fn try_build(
        snapshot: &'a CentroidSnapshot,
        memory_limit: Option<u64>,
    ) -> Result<Self, IndexError> {
        if let Some(limit_bytes) = memory_limit {
            let required_bytes = estimate_index_bytes(snapshot.len());
            if required_bytes > limit_bytes {
                return Err(IndexError::CapacityExceeded {
                    required_bytes,
                    limit_bytes,
                });
            }
        }

        let mut order: Vec<usize> = (0..snapshot.len()).collect();
        let mut nodes = Vec::with_capacity(2 * snapshot.len().div_ceil(LEAF_SIZE));
        let root = (!order.is_empty())
            .then(|| build_node(snapshot.centroids(), &mut order, 0, &mut nodes));
        Ok(Self {
            snapshot,
            order,
            nodes,
            root,
        })
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn scan_leaf(
        &self,
        position: usize,
        query: &Point,
        range: std::ops::Range<usize>,
        best: &mut Option<Neighbour>,
    ) {
        let Some(slots) = self.order.get(range) else {
            return;
        };
        for &other in slots {
            if other == position {
                continue;
            }
            let (Some(id), Some(centroid)) = (self.snapshot.id(other), self.snapshot.centroid(other))
            else {
                continue;
            };
            let candidate = Neighbour {
                id,
                distance_squared: query.distance_squared(&centroid),
            };
            if best.is_none_or(|current| candidate < current) {
                *best = Some(candidate);
            }
        }
    }
}

fn build_node(
    centroids: &[Point],
    order: &mut [usize],
    offset: usize,
    nodes: &mut Vec<Node>,
) -> usize {
    let bounds = Bounds::around(centroids, order);
    if order.len() <= LEAF_SIZE {
        nodes.push(Node::Leaf {
            bounds,
            start: offset,
            end: offset + order.len(),
        });
        return nodes.len() - 1;
    }

    let axis = bounds.widest_axis();
    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| {
        let lhs = centroids.get(a).map_or(0.0, |p| p.along(axis));
        let rhs = centroids.get(b).map_or(0.0, |p| p.along(axis));
        lhs.total_cmp(&rhs)
    });
    let (lower, upper) = order.split_at_mut(mid);
    let left = build_node(centroids, lower, offset, nodes);
    let right = build_node(centroids, upper, offset + mid, nodes);
    nodes.push(Node::Split {
        bounds,
        left,
        right,
    });
    nodes.len() - 1
}

impl SpatialIndex for KdTreeIndex<'_> {
    fn snapshot(&self) -> &CentroidSnapshot {
        self.snapshot
    }

    fn nearest_other(&self, position: usize) -> Option<Neighbour> {
        let query = self.snapshot.centroid(position)?;
        let mut best: Option<Neighbour> = None;
        let mut stack = Vec::with_capacity(64);
        stack.extend(self.root);

        while let Some(index) = stack.pop() {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            if let Some(current) = best {
                if node.bounds().distance_squared_to(&query) > current.distance_squared {
                    continue;
                }
            }
            match *node {
                Node::Leaf { start, end, .. } => {
                    self.scan_leaf(position, &query, start..end, &mut best);
                }
                Node::Split { left, right, .. } => {
                    let gap = |child: usize| {
                        self.nodes
                            .get(child)
                            .map_or(f64::INFINITY, |n| n.bounds().distance_squared_to(&query))
                    };
                    // Push the far child first so the near one is searched first.
                    if gap(left) <= gap(right) {
                        stack.push(right);
                        stack.push(left);
                    } else {
                        stack.push(left);
                        stack.push(right);
                    }
                }
            }
        }
        best
    }
}
