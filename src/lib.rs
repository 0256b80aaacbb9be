pub mod analysis; // Offline measurement helpers (RMS, spectrum)
pub mod dsp;
pub mod effect; // Bypass, dry/wet and parameter control around dsp blocks

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const MAX_CHANNELS: usize = 2;

/// Convert a duration in milliseconds to a (fractional) sample count.
#[inline]
pub(crate) fn ms_to_samples(ms: f32, sample_rate: f64) -> f32 {
    (f64::from(ms) * 0.001 * sample_rate) as f32
}

/// Number of channels a block call can safely touch.
#[inline]
pub(crate) fn block_channels(output: usize, input: usize) -> usize {
    output.min(input).min(MAX_CHANNELS)
}

/// Clamp a requested block length to what every channel slice can hold.
#[inline]
pub(crate) fn block_len(output: &[&mut [f32]], input: &[&[f32]], channels: usize, num_samples: usize) -> usize {
    let out_len = output[..channels].iter().map(|c| c.len()).min().unwrap_or(0);
    let in_len = input[..channels].iter().map(|c| c.len()).min().unwrap_or(0);
    num_samples.min(out_len).min(in_len)
}

/// Clamp a requested block length when input and output channel counts may
/// differ (mono in, stereo out).
#[inline]
pub(crate) fn io_len(output: &[&mut [f32]], input: &[&[f32]], num_samples: usize) -> usize {
    let out_len = output.iter().take(MAX_CHANNELS).map(|c| c.len()).min().unwrap_or(0);
    let in_len = input.iter().take(MAX_CHANNELS).map(|c| c.len()).min().unwrap_or(0);
    num_samples.min(out_len).min(in_len)
}

/// Copy channel 0 into the output channels a block call left unwritten
/// (mono input, or a processor prepared with fewer channels than the host
/// block carries).
#[inline]
pub(crate) fn fill_unwritten_channels(output: &mut [&mut [f32]], written: usize, len: usize) {
    let limit = output.len().min(MAX_CHANNELS);
    if written == 0 || written >= limit {
        return;
    }
    let (first, rest) = output.split_at_mut(1);
    let source = &first[0][..len];
    for channel in rest[written - 1..limit - 1].iter_mut() {
        let n = len.min(channel.len());
        channel[..n].copy_from_slice(&source[..n]);
    }
}
