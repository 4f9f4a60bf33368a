//! Fixture type for merge loop property tests.

use crate::{point::Point, test_utils::CloudLayout};

/// Input for one property case.
///
/// Carries the layout and seed alongside the points so failures can be
/// reproduced from the report alone.
#[derive(Clone, Debug)]
pub(super) struct EngineFixture {
    pub layout: CloudLayout,
    pub seed: u64,
    pub points: Vec<Point>,
    pub max_cluster_size: usize,
}

impl EngineFixture {
    /// Short description used in failure messages.
    pub(super) fn describe(&self) -> String {
        format!(
            "layout={:?}, seed={}, points={}, max_cluster_size={}",
            self.layout,
            self.seed,
            self.points.len(),
            self.max_cluster_size
        )
    }
}
