//! Strategy builders for merge loop property tests.

use proptest::prelude::*;
use rand::{SeedableRng, rngs::SmallRng};

use crate::test_utils::{CloudLayout, generate_cloud};

use super::types::EngineFixture;

/// Largest generated cloud. The oracle is cubic, so keep this modest.
const MAX_POINTS: usize = 96;
/// Largest generated size bound.
const MAX_CLUSTER_SIZE: usize = 9;

/// Generates fixtures across every [`CloudLayout`].
pub(super) fn engine_fixture_strategy() -> impl Strategy<Value = EngineFixture> {
    (
        any::<CloudLayout>(),
        0..=MAX_POINTS,
        1..=MAX_CLUSTER_SIZE,
        any::<u64>(),
    )
        .prop_map(|(layout, len, max_cluster_size, seed)| {
            generate_fixture(layout, len, max_cluster_size, seed)
        })
}

/// Builds a fixture deterministically from its parameters.
pub(super) fn generate_fixture(
    layout: CloudLayout,
    len: usize,
    max_cluster_size: usize,
    seed: u64,
) -> EngineFixture {
    let mut rng = SmallRng::seed_from_u64(seed);
    EngineFixture {
        layout,
        seed,
        points: generate_cloud(layout, len, &mut rng),
        max_cluster_size,
    }
}
