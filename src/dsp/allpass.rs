//! All-pass diffuser.

/*
All-Pass Sections
=================

An all-pass filter passes every frequency at the same level and only moves
them in time. Chained with different delay lengths, all-passes smear a
single click into a dense cloud of echoes without colouring the sound. That
is what "diffusion" means in a reverb.

Per channel, with `s` the value the delay line returned last sample:

    v = x - c * s           ← goes into the delay line
    y = c * v + s           ← output
    s = delay(v)

          ┌──────────(-c)─────────┐
          │                       │
  x ──→ (+) ──→ v ──→ [ delay ] ──┴──→ s ──→ (+) ──→ y
                │                             ↑
                └─────────────(c)─────────────┘

The delay input is computed before the output. Because `c` is applied to
both the feedback and feedforward paths, the magnitude response is exactly
flat for |c| < 1. The coefficient is clamped to ±0.98 to keep a margin from
the unstable edge.

Modulated sections read the delay a fractional distance further back each
sample. The buffer reserves `modulation headroom` beyond the nominal delay
for that excursion.

The buffer is sized once, from the longest delay the section may be set
to (by default the construction delay). Later `set_delay_time` calls are
clamped to that bound, so the reported delay is always the applied one.
*/

use crate::dsp::delay::DelayLine;
use crate::{ms_to_samples, MAX_CHANNELS};

/// Largest coefficient magnitude accepted by [`AllPass::set_coeff`].
pub const MAX_COEFF: f32 = 0.98;

pub struct AllPass {
    delay: DelayLine,
    state: [f32; MAX_CHANNELS],
    coeff: f32,
    delay_ms: f32,
    max_delay_ms: f32,
    headroom_ms: f32,
    sample_rate: f64,
}

impl AllPass {
    /// Create a section with `delay_ms` of delay and feedback `coeff`.
    ///
    /// Buffers are sized for 48 kHz until [`prepare`](Self::prepare).
    pub fn new(delay_ms: f32, coeff: f32, num_channels: usize) -> Self {
        let mut allpass = Self {
            delay: DelayLine::new(1, num_channels),
            state: [0.0; MAX_CHANNELS],
            coeff: coeff.clamp(-MAX_COEFF, MAX_COEFF),
            delay_ms: delay_ms.max(0.0),
            max_delay_ms: delay_ms.max(0.0),
            headroom_ms: 0.0,
            sample_rate: 48_000.0,
        };
        allpass.prepare(48_000.0, num_channels);
        allpass
    }

    /// Reserve buffer space for modulated reads up to `headroom_ms` beyond
    /// the nominal delay.
    pub fn with_modulation_headroom(mut self, headroom_ms: f32) -> Self {
        self.headroom_ms = headroom_ms.max(0.0);
        let channels = self.delay.num_channels();
        self.prepare(self.sample_rate, channels);
        self
    }

    /// Allow [`set_delay_time`](Self::set_delay_time) to reach `max_delay_ms`.
    /// Never shorter than the current delay.
    pub fn with_max_delay_ms(mut self, max_delay_ms: f32) -> Self {
        self.max_delay_ms = max_delay_ms.max(self.delay_ms);
        let channels = self.delay.num_channels();
        self.prepare(self.sample_rate, channels);
        self
    }

    /// Resize for a new sample rate and channel count, then clear.
    pub fn prepare(&mut self, sample_rate: f64, num_channels: usize) {
        self.sample_rate = sample_rate.max(1.0);

        let longest = self.samples_for(self.max_delay_ms);
        // +1 for the interpolation neighbour of the deepest modulated read
        let headroom = ms_to_samples(self.headroom_ms, self.sample_rate).ceil() as usize + 1;

        self.delay.prepare(longest + headroom, num_channels);
        self.delay.set_delay_samples(self.delay_in_samples());
        self.clear();
    }

    pub fn clear(&mut self) {
        self.delay.clear();
        self.state = [0.0; MAX_CHANNELS];
    }

    /// Change the nominal delay, clamped to `[0, max_delay_ms]` and
    /// re-quantized at the current sample rate.
    pub fn set_delay_time(&mut self, delay_ms: f32) {
        self.delay_ms = delay_ms.clamp(0.0, self.max_delay_ms);
        let samples = self.delay_in_samples();
        self.delay.set_delay_samples(samples);
    }

    pub fn delay_time(&self) -> f32 {
        self.delay_ms
    }

    pub fn max_delay_time(&self) -> f32 {
        self.max_delay_ms
    }

    pub fn delay_samples(&self) -> usize {
        self.delay.delay_samples()
    }

    /// Set the feedback/feedforward coefficient, clamped to ±[`MAX_COEFF`].
    pub fn set_coeff(&mut self, coeff: f32) {
        self.coeff = coeff.clamp(-MAX_COEFF, MAX_COEFF);
    }

    pub fn coeff(&self) -> f32 {
        self.coeff
    }

    pub fn num_channels(&self) -> usize {
        self.delay.num_channels()
    }

    /// Read-only tap into the section's delay line.
    #[inline]
    pub fn get_sample(&self, channel: usize, index: usize) -> f32 {
        self.delay.get_sample(channel, index)
    }

    #[inline]
    pub fn process_frame(&mut self, output: &mut [f32], input: &[f32]) {
        let channels = output.len().min(input.len()).min(self.delay.num_channels());

        let mut delay_in = [0.0; MAX_CHANNELS];
        for ch in 0..channels {
            delay_in[ch] = input[ch] - self.coeff * self.state[ch];
            output[ch] = self.coeff * delay_in[ch] + self.state[ch];
        }

        self.delay
            .process_frame(&mut self.state[..channels], &delay_in[..channels]);
    }

    /// One frame with an extra fractional delay per channel, in samples.
    #[inline]
    pub fn process_frame_modulated(&mut self, output: &mut [f32], input: &[f32], modulation: &[f32]) {
        let channels = output
            .len()
            .min(input.len())
            .min(modulation.len())
            .min(self.delay.num_channels());

        let mut delay_in = [0.0; MAX_CHANNELS];
        for ch in 0..channels {
            delay_in[ch] = input[ch] - self.coeff * self.state[ch];
            output[ch] = self.coeff * delay_in[ch] + self.state[ch];
        }

        self.delay.process_frame_modulated(
            &mut self.state[..channels],
            &delay_in[..channels],
            &modulation[..channels],
        );
    }

    /// Single-channel convenience for mono diffusers.
    #[inline]
    pub fn process_mono(&mut self, input: f32) -> f32 {
        let mut out = [0.0];
        self.process_frame(&mut out, &[input]);
        out[0]
    }

    #[inline]
    pub fn process_mono_modulated(&mut self, input: f32, modulation: f32) -> f32 {
        let mut out = [0.0];
        self.process_frame_modulated(&mut out, &[input], &[modulation]);
        out[0]
    }

    pub fn process(&mut self, output: &mut [&mut [f32]], input: &[&[f32]], num_samples: usize) {
        let channels = crate::block_channels(output.len(), input.len()).min(self.num_channels());
        let len = crate::block_len(output, input, channels, num_samples);

        let mut frame_in = [0.0; MAX_CHANNELS];
        let mut frame_out = [0.0; MAX_CHANNELS];

        for n in 0..len {
            for ch in 0..channels {
                frame_in[ch] = input[ch][n];
            }
            self.process_frame(&mut frame_out[..channels], &frame_in[..channels]);
            for ch in 0..channels {
                output[ch][n] = frame_out[ch];
            }
        }
        crate::fill_unwritten_channels(output, channels, len);
    }

    pub fn process_modulated(
        &mut self,
        output: &mut [&mut [f32]],
        input: &[&[f32]],
        modulation: &[&[f32]],
        num_samples: usize,
    ) {
        let channels = crate::block_channels(output.len(), input.len())
            .min(modulation.len())
            .min(self.num_channels());
        let mod_len = modulation[..channels].iter().map(|m| m.len()).min().unwrap_or(0);
        let len = crate::block_len(output, input, channels, num_samples).min(mod_len);

        let mut frame_in = [0.0; MAX_CHANNELS];
        let mut frame_mod = [0.0; MAX_CHANNELS];
        let mut frame_out = [0.0; MAX_CHANNELS];

        for n in 0..len {
            for ch in 0..channels {
                frame_in[ch] = input[ch][n];
                frame_mod[ch] = modulation[ch][n];
            }
            self.process_frame_modulated(
                &mut frame_out[..channels],
                &frame_in[..channels],
                &frame_mod[..channels],
            );
            for ch in 0..channels {
                output[ch][n] = frame_out[ch];
            }
        }
        crate::fill_unwritten_channels(output, channels, len);
    }

    fn delay_in_samples(&self) -> usize {
        self.samples_for(self.delay_ms)
    }

    fn samples_for(&self, ms: f32) -> usize {
        (ms_to_samples(ms, self.sample_rate).round() as usize).max(1)
    }
}
