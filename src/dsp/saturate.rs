//! Saturation for feedback paths
//!
//! A regenerating loop with gain anywhere near one will, on some input,
//! build up until it explodes. Passing the fed-back signal through a soft
//! clipper caps how loud the loop can get while leaving quiet signals
//! almost untouched.
//!
//! # Soft Clip
//!
//!   f(x) = x / (1 + |x|)
//!
//!   - Output never reaches ±1, whatever the input
//!   - Slope 1 at zero, so low levels pass nearly unchanged
//!   - Smooth, so the clipping adds mostly low harmonics
//!
//! # Drive Values
//!
//!   1.0  = Gentle (only loud peaks are squashed)
//!   2-4  = Audible saturation
//!   5+   = Heavy

/// Soft clipping using x / (1 + |x|) transfer function.
#[inline]
pub fn soft_clip(sample: f32, drive: f32) -> f32 {
    let x = sample * drive;
    x / (1.0 + x.abs())
}

/// Soft clip every channel of a frame in place.
#[inline]
pub fn soft_clip_frame(frame: &mut [f32], drive: f32) {
    for sample in frame.iter_mut() {
        *sample = soft_clip(*sample, drive);
    }
}
