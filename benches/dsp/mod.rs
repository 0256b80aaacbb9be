//! Benchmarks for low-level DSP primitives.

mod allpass;
mod delay;
mod pitch;
mod reverb;

pub use allpass::bench_allpass;
pub use delay::bench_delay;
pub use pitch::bench_pitch;
pub use reverb::bench_reverb;
