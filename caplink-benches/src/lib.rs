//! Benchmark support for caplink.
//!
//! Provides deterministic synthetic point clouds and parameter types shared
//! by the Criterion benchmarks under `benches/`.

pub mod error;
pub mod params;
pub mod source;
