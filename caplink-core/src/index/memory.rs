//! Pre-flight memory estimation for the k-d tree backend.
//!
//! The estimate is pessimistic on purpose so a configured limit trips before
//! the allocator does.

/// Safety multiplier (3/2) covering allocator slack and the traversal stack.
const SAFETY_MULTIPLIER_NUMERATOR: u64 = 3;
const SAFETY_MULTIPLIER_DENOMINATOR: u64 = 2;

/// Maximum points stored in one leaf. Mirrors the tree builder.
pub(super) const LEAF_SIZE: usize = 8;

/// Size of one tree node: two `[f64; 3]` bounds, two child or range offsets,
/// and the enum tag with padding on 64-bit targets.
const NODE_BYTES: u64 = 72;

/// Size of a `usize` on 64-bit platforms, used for the permutation array.
const USIZE_BYTES: u64 = 8;

/// Returns a conservative estimate of peak bytes a k-d tree over
/// `centroid_count` centroids needs, on top of the snapshot it borrows.
///
/// # Examples
///
/// ```
/// use caplink_core::estimate_index_bytes;
///
/// assert_eq!(estimate_index_bytes(0), 0);
/// assert!(estimate_index_bytes(1_000) < estimate_index_bytes(10_000));
/// ```
#[must_use]
pub fn estimate_index_bytes(centroid_count: usize) -> u64 {
    if centroid_count == 0 {
        return 0;
    }

    let n = centroid_count as u64;

    // Permutation of snapshot positions.
    let order = n.saturating_mul(USIZE_BYTES);

    // A tree with ceil(n / LEAF_SIZE) leaves has fewer than twice as many
    // nodes in total.
    let leaves = n.div_ceil(LEAF_SIZE as u64);
    let nodes = leaves.saturating_mul(2).saturating_mul(NODE_BYTES);

    order
        .saturating_add(nodes)
        .saturating_mul(SAFETY_MULTIPLIER_NUMERATOR)
        .saturating_div(SAFETY_MULTIPLIER_DENOMINATOR)
}
