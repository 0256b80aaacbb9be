//! Reverb - Space Simulation via Feedback Delay Networks
//!
//! A reverb builds thousands of decaying reflections out of a handful of
//! delay lines by feeding their outputs back into each other. Both
//! reverberators here share the same recipe:
//!
//! ```text
//!   in ──→ mono ──→ [input diffusion] ──→ (+) ──→ [ recursive network ] ──┬──→ taps ──→ out
//!                                          ↑                              │
//!                                          └──────── feedback ←───────────┘
//! ```
//!
//! ## Input Diffusion
//!
//! Four short all-passes in series smear each transient into a cloud before
//! it reaches the recursive part, so the tail starts dense instead of as a
//! train of discrete echoes.
//!
//! ## Recursive Network
//!
//! - **Dattorro plate** ([`DattorroReverb`]): two "tank" halves in a
//!   figure-eight. Each half's output is the other half's input on the next
//!   sample. A slow LFO chorus on the first all-pass of each half keeps the
//!   tail from ringing at fixed resonances.
//! - **Keith Barr ring** ([`KeithBarrReverb`]): four all-pass + delay nodes
//!   in a loop, each node feeding the next.
//!
//! ## Stability
//!
//! All-passes are lossless, so the only thing stopping a feedback network
//! from ringing forever (or growing) is the gain applied inside the loop.
//! Both reverbs clamp that gain below one: decay at 0.99 for the plate,
//! damping at 0.9 for the ring.
//!
//! ## Taps
//!
//! Output is read from fixed points inside the delay lines with read-only
//! taps (`get_sample`), never from the feedback state itself. Different
//! taps for left and right decorrelate the two channels.
//!
//! Delay and tap lengths are tables of sample counts at a reference rate,
//! rescaled to the running sample rate at `prepare`.

pub mod dattorro;
pub mod keith_barr;

pub use dattorro::DattorroReverb;
pub use keith_barr::KeithBarrReverb;

use crate::MAX_CHANNELS;

/// Rescale a sample count designed at `reference_rate` to `sample_rate`.
#[inline]
pub(crate) fn scaled(reference_samples: u32, reference_rate: f64, sample_rate: f64) -> usize {
    ((f64::from(reference_samples) * sample_rate / reference_rate).round() as usize).max(1)
}

/// Sum a frame of up to two channels to mono.
#[inline]
pub(crate) fn mono_sum(input: &[f32]) -> f32 {
    match input {
        [] => 0.0,
        [mono] => *mono,
        [left, right, ..] => 0.5 * (left + right),
    }
}

/// Write a stereo result to a frame of one or two channels.
#[inline]
pub(crate) fn write_stereo(output: &mut [f32], [left, right]: [f32; 2]) {
    match output {
        [] => {}
        [mono] => *mono = 0.5 * (left + right),
        [out_l, out_r, ..] => {
            *out_l = left;
            *out_r = right;
        }
    }
}

/// Drive a per-frame stereo reverb over a block. Input and output channel
/// counts may differ.
#[inline]
pub(crate) fn process_block(
    output: &mut [&mut [f32]],
    input: &[&[f32]],
    num_samples: usize,
    mut frame: impl FnMut(&[f32]) -> [f32; 2],
) {
    let in_channels = input.len().min(MAX_CHANNELS);
    let out_channels = output.len().min(MAX_CHANNELS);
    let len = crate::io_len(output, input, num_samples);

    let mut frame_in = [0.0; MAX_CHANNELS];
    let mut frame_out = [0.0; MAX_CHANNELS];

    for n in 0..len {
        for ch in 0..in_channels {
            frame_in[ch] = input[ch][n];
        }
        write_stereo(&mut frame_out[..out_channels], frame(&frame_in[..in_channels]));
        for ch in 0..out_channels {
            output[ch][n] = frame_out[ch];
        }
    }
}
