use caplink_core::{Point, PointSource, PointSourceError};

/// Source that serves its points but fails at one index.
#[derive(Clone)]
pub struct FlakySource {
    points: Vec<Point>,
    fail_at: usize,
}

impl FlakySource {
    #[must_use]
    pub fn new(coords: &[[f64; 3]], fail_at: usize) -> Self {
        Self {
            points: coords.iter().copied().map(Point::from).collect(),
            fail_at,
        }
    }
}

impl PointSource for FlakySource {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn name(&self) -> &str {
        "flaky"
    }

    fn point(&self, index: usize) -> Result<Point, PointSourceError> {
        if index == self.fail_at {
            return Err(PointSourceError::DimensionMismatch {
                index,
                expected: 3,
                actual: 2,
            });
        }
        self.points
            .get(index)
            .copied()
            .ok_or(PointSourceError::OutOfBounds { index })
    }
}
