//! Shared test utilities for `caplink-core`.

use caplink_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::{prelude::*, test_runner::Config as ProptestConfig};
use rand::{Rng, rngs::SmallRng};

use crate::{error::PointSourceError, point::Point, source::PointSource};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Builds a standard proptest configuration from the shared CI profile.
///
/// This keeps property suites aligned on the same `PROGTEST_CASES` and
/// `CAPLINK_PBT_FORK` interpretation.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// [`PointSource`] over points on the x axis that counts `point` calls.
#[derive(Clone)]
pub(crate) struct CountingSource {
    xs: Vec<f64>,
    calls: Arc<AtomicUsize>,
}

impl CountingSource {
    #[must_use]
    pub(crate) fn new(xs: Vec<f64>, calls: Arc<AtomicUsize>) -> Self {
        Self { xs, calls }
    }
}

impl PointSource for CountingSource {
    fn len(&self) -> usize {
        self.xs.len()
    }

    fn name(&self) -> &str {
        "counting"
    }

    fn point(&self, index: usize) -> Result<Point, PointSourceError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.xs
            .get(index)
            .map(|&x| Point::new(x, 0.0, 0.0))
            .ok_or(PointSourceError::OutOfBounds { index })
    }
}

/// Shape of a generated point cloud.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum CloudLayout {
    /// Uniform coordinates in a cube.
    Scattered,
    /// Integer grid points, which produce many exact distance ties.
    Lattice,
    /// Few distinct positions repeated many times.
    Duplicates,
    /// Tight groups far apart from each other.
    Clumps,
    /// Points on a single line with small integer spacing.
    Collinear,
}

// Ties are where backends are most likely to disagree, so bias towards them.
impl Arbitrary for CloudLayout {
    type Parameters = ();
    type Strategy = proptest::strategy::TupleUnion<(
        proptest::strategy::WA<Just<Self>>,
        proptest::strategy::WA<Just<Self>>,
        proptest::strategy::WA<Just<Self>>,
        proptest::strategy::WA<Just<Self>>,
        proptest::strategy::WA<Just<Self>>,
    )>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            2 => Just(Self::Scattered),
            3 => Just(Self::Lattice),
            2 => Just(Self::Duplicates),
            2 => Just(Self::Clumps),
            2 => Just(Self::Collinear),
        ]
    }
}

/// Generates `len` points following `layout`.
pub(crate) fn generate_cloud(layout: CloudLayout, len: usize, rng: &mut SmallRng) -> Vec<Point> {
    match layout {
        CloudLayout::Scattered => (0..len)
            .map(|_| {
                Point::new(
                    rng.gen_range(-100.0..100.0),
                    rng.gen_range(-100.0..100.0),
                    rng.gen_range(-100.0..100.0),
                )
            })
            .collect(),
        CloudLayout::Lattice => (0..len)
            .map(|_| {
                Point::new(
                    f64::from(rng.gen_range(0_i32..6)),
                    f64::from(rng.gen_range(0_i32..6)),
                    f64::from(rng.gen_range(0_i32..6)),
                )
            })
            .collect(),
        CloudLayout::Duplicates => {
            let anchors = [
                Point::new(0.0, 0.0, 0.0),
                Point::new(1.0, 0.0, 0.0),
                Point::new(0.0, 2.0, 0.0),
                Point::new(5.0, 5.0, 5.0),
            ];
            (0..len)
                .map(|_| anchors[rng.gen_range(0..anchors.len())])
                .collect()
        }
        CloudLayout::Clumps => {
            let centres: Vec<Point> = (0..rng.gen_range(1_usize..6))
                .map(|_| {
                    Point::new(
                        rng.gen_range(-1000.0..1000.0),
                        rng.gen_range(-1000.0..1000.0),
                        rng.gen_range(-1000.0..1000.0),
                    )
                })
                .collect();
            (0..len)
                .map(|_| {
                    let centre = centres[rng.gen_range(0..centres.len())];
                    Point::new(
                        centre.x + rng.gen_range(-1.0..1.0),
                        centre.y + rng.gen_range(-1.0..1.0),
                        centre.z + rng.gen_range(-1.0..1.0),
                    )
                })
                .collect()
        }
        CloudLayout::Collinear => {
            let mut x = 0.0;
            (0..len)
                .map(|_| {
                    x += f64::from(rng.gen_range(0_i32..4));
                    Point::new(x, 0.0, 0.0)
                })
                .collect()
        }
    }
}
