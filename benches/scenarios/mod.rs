//! Real-world scenario benchmarks.
//!
//! These benchmarks model how a host runs the effects: whole chains
//! behind an `EffectProcessor`, processed in place.

mod shimmer;

pub use shimmer::bench_shimmer;
