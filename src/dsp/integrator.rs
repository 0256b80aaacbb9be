//! One-pole low-pass ("leaky integrator").
//!
//! ```text
//! y[n] = c * x[n] + (1 - c) * y[n-1]
//! ```
//!
//! `c = 1` passes the input untouched; smaller values integrate more of the
//! past and roll off more highs. The coefficient moves through a [`Ramp`] so
//! brightness and damping changes do not click. Used as the plate's tone
//! control and as the damping filter inside reverb feedback loops, where each
//! trip around the loop loses a little more top end.

use crate::dsp::ramp::{Ramp, DEFAULT_RAMP_MS};
use crate::MAX_CHANNELS;

pub struct LeakyIntegrator {
    coeff: Ramp,
    state: [f32; MAX_CHANNELS],
}

impl LeakyIntegrator {
    pub fn new(coeff: f32) -> Self {
        let mut ramp = Ramp::new(DEFAULT_RAMP_MS);
        ramp.set_target(coeff.clamp(0.0, 1.0), true);

        Self {
            coeff: ramp,
            state: [0.0; MAX_CHANNELS],
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        let target = self.coeff.target();
        self.coeff.prepare(sample_rate, true, target);
        self.clear();
    }

    pub fn clear(&mut self) {
        self.state = [0.0; MAX_CHANNELS];
    }

    /// Set the coefficient, clamped to `[0, 1]` and smoothed.
    pub fn set_coeff(&mut self, coeff: f32) {
        self.coeff.set_target(coeff.clamp(0.0, 1.0), false);
    }

    pub fn coeff(&self) -> f32 {
        self.coeff.target()
    }

    /// Filter one frame in place. The coefficient advances once per frame.
    #[inline]
    pub fn process_frame(&mut self, frame: &mut [f32]) {
        let c = self.coeff.get_next();
        for (sample, state) in frame.iter_mut().zip(self.state.iter_mut()) {
            *state = c * *sample + (1.0 - c) * *state;
            *sample = *state;
        }
    }

    #[inline]
    pub fn process_mono(&mut self, input: f32) -> f32 {
        let mut frame = [input];
        self.process_frame(&mut frame);
        frame[0]
    }

    pub fn process(&mut self, output: &mut [&mut [f32]], input: &[&[f32]], num_samples: usize) {
        let channels = crate::block_channels(output.len(), input.len());
        let len = crate::block_len(output, input, channels, num_samples);

        let mut frame = [0.0; MAX_CHANNELS];
        for n in 0..len {
            for ch in 0..channels {
                frame[ch] = input[ch][n];
            }
            self.process_frame(&mut frame[..channels]);
            for ch in 0..channels {
                output[ch][n] = frame[ch];
            }
        }
        crate::fill_unwritten_channels(output, channels, len);
    }
}
