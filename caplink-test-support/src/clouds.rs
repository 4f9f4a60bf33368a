//! Small point clouds with known clustering outcomes.
//!
//! Coordinates are plain `[f64; 3]` triples so every crate in the workspace
//! can use them, whatever point type it works with.

/// Two well-separated close pairs.
///
/// With a size bound of two the expected partition is `{0, 1}` and `{2, 3}`.
#[must_use]
pub fn two_pairs() -> Vec<[f64; 3]> {
    vec![
        [0.0, 0.0, 0.0],
        [0.0, 0.0, 1.0],
        [10.0, 10.0, 10.0],
        [10.0, 10.0, 11.0],
    ]
}

/// Three mutually nearest points.
///
/// With a size bound of two only `{0, 1}` merges and point 2 stays alone.
#[must_use]
pub fn triangle() -> Vec<[f64; 3]> {
    vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 0.9, 0.0]]
}

/// Integer grid of `side^3` points in x-major order.
#[must_use]
pub fn lattice(side: usize) -> Vec<[f64; 3]> {
    let mut points = Vec::with_capacity(side.pow(3));
    for x in 0..side {
        for y in 0..side {
            for z in 0..side {
                points.push([x as f64, y as f64, z as f64]);
            }
        }
    }
    points
}

/// Renders `points` in the whitespace-separated `x y z` text format, one
/// point per line.
///
/// # Examples
/// ```
/// use caplink_test_support::clouds::{to_xyz_text, triangle};
///
/// let text = to_xyz_text(&triangle());
/// assert_eq!(text.lines().count(), 3);
/// assert_eq!(text.lines().nth(2), Some("0.5 0.9 0"));
/// ```
#[must_use]
pub fn to_xyz_text(points: &[[f64; 3]]) -> String {
    points
        .iter()
        .map(|[x, y, z]| format!("{x} {y} {z}\n"))
        .collect()
}
