//! Property-based tests for the merge loop.
//!
//! Checks the engine against a naive oracle, validates the partition, size
//! and centroid invariants, and confirms that every index backend and
//! execution strategy produces the same partition.

mod equivalence;
mod oracle;
mod strategies;
mod structural;
mod types;
