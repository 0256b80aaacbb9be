//! Low-level DSP primitives used by the effect layer.
//!
//! Everything here allocates in `new`/`prepare` only; `process` and the
//! setters are realtime-safe. The primitives stay focused on the signal math
//! so `effect` can layer on bypass, mixing and parameter messages.

/// Schroeder all-pass section built on a delay line.
pub mod allpass;
/// Circular delay buffer with fixed, modulated and tap reads.
pub mod delay;
/// Three-band parametric equalizer on a state-variable filter.
pub mod equalizer;
/// One-pole low-pass used for tone control and damping.
pub mod integrator;
/// Sine/triangle modulation source.
pub mod lfo;
/// Two-grain crossfading pitch shifter.
pub mod pitch;
/// Linear parameter smoothing.
pub mod ramp;
/// Plate and ring reverberators.
pub mod reverb;
/// Waveshaping for regeneration paths.
pub mod saturate;
/// Pitch-shifted regenerating reverb.
pub mod shimmer;

pub use allpass::AllPass;
pub use delay::DelayLine;
pub use equalizer::{BandShape, ParametricEqualizer};
pub use integrator::LeakyIntegrator;
pub use lfo::{Lfo, LfoShape};
pub use pitch::GranularPitchShifter;
pub use ramp::Ramp;
pub use reverb::{DattorroReverb, KeithBarrReverb};
pub use shimmer::{Shimmer, ShimmerReverb};
