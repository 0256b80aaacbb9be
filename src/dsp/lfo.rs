//! Low Frequency Oscillator (LFO) for delay modulation.

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running below the audible range. Nobody listens to
it directly; it moves some other parameter. Here it moves the read position
of a delay line, which is what gives a plate reverb tank its slow chorus.

Vocabulary
----------

  control-rate    Frequencies below hearing: ~0.01 Hz to ~20 Hz.

  unipolar        Output stays in 0.0 to 1.0. Delay offsets cannot go
                  negative, so both shapes here are unipolar:

                      sine:      0.5 + 0.5 * sin(phase)
                      triangle:  |phase - π| / π

  depth           How far the modulated delay swings, in milliseconds.
                  Converted to samples at `prepare`.

  offset          A constant added on top, in milliseconds. Lets the swing
                  sit away from the nominal delay.

  quadrature      The stereo output runs a second phase 90° ahead of the
                  first. Left and right tanks then drift apart instead of
                  moving in lockstep.

Output
------

Each call returns, per channel, a delay excursion in samples:

    out = wave(phase) * depth + offset

Depth and offset are smoothed through ramps, so changing them while audio
is running glides instead of jumping. Switching the shape restarts the phase.

Typical rates for reverb modulation sit around 0.1 - 2 Hz. One period is
`sample_rate / frequency` samples (0.5 Hz at 48 kHz = 96000 samples).
*/

use std::f32::consts::{FRAC_PI_2, PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::ramp::{Ramp, DEFAULT_RAMP_MS};
use crate::ms_to_samples;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LfoShape {
    Sine,
    Triangle,
}

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
#[inline]
pub fn bipolar_to_unipolar(bipolar: f32) -> f32 {
    (bipolar + 1.0) * 0.5
}

pub struct Lfo {
    shape: LfoShape,
    frequency_hz: f32,
    depth_ms: f32,
    offset_ms: f32,
    sample_rate: f64,
    phase: f32,
    phase_inc: f32,
    depth: Ramp,
    offset: Ramp,
}

impl Lfo {
    pub fn new(shape: LfoShape, frequency_hz: f32, depth_ms: f32, offset_ms: f32) -> Self {
        let mut lfo = Self {
            shape,
            frequency_hz: frequency_hz.max(0.0),
            depth_ms: depth_ms.max(0.0),
            offset_ms: offset_ms.max(0.0),
            sample_rate: 48_000.0,
            phase: 0.0,
            phase_inc: 0.0,
            depth: Ramp::new(DEFAULT_RAMP_MS),
            offset: Ramp::new(DEFAULT_RAMP_MS),
        };
        lfo.prepare(48_000.0);
        lfo
    }

    /// Recompute the phase increment and sample-based depth/offset for a new
    /// rate. Restarts the phase.
    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate.max(1.0);
        self.phase = 0.0;
        self.update_increment();
        self.depth
            .prepare(self.sample_rate, true, ms_to_samples(self.depth_ms, self.sample_rate));
        self.offset
            .prepare(self.sample_rate, true, ms_to_samples(self.offset_ms, self.sample_rate));
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Change waveform. Restarts the phase.
    pub fn set_shape(&mut self, shape: LfoShape) {
        self.shape = shape;
        self.phase = 0.0;
    }

    pub fn shape(&self) -> LfoShape {
        self.shape
    }

    /// Set rate in Hz; negative values are treated as zero.
    pub fn set_frequency(&mut self, frequency_hz: f32) {
        self.frequency_hz = frequency_hz.max(0.0);
        self.update_increment();
    }

    pub fn frequency(&self) -> f32 {
        self.frequency_hz
    }

    pub fn set_depth(&mut self, depth_ms: f32) {
        self.depth_ms = depth_ms.max(0.0);
        self.depth
            .set_target(ms_to_samples(self.depth_ms, self.sample_rate), false);
    }

    pub fn depth(&self) -> f32 {
        self.depth_ms
    }

    pub fn set_offset(&mut self, offset_ms: f32) {
        self.offset_ms = offset_ms.max(0.0);
        self.offset
            .set_target(ms_to_samples(self.offset_ms, self.sample_rate), false);
    }

    pub fn offset(&self) -> f32 {
        self.offset_ms
    }

    /// Next excursion in samples for a single consumer.
    #[inline]
    pub fn process_mono(&mut self) -> f32 {
        let wave = self.wave(self.phase);
        let out = wave * self.depth.get_next() + self.offset.get_next();
        self.advance();
        out
    }

    /// Next excursion pair in samples; right runs 90° ahead of left.
    #[inline]
    pub fn process_stereo(&mut self) -> [f32; 2] {
        let left = self.wave(self.phase);
        let right = self.wave((self.phase + FRAC_PI_2) % TAU);

        let depth = self.depth.get_next();
        let offset = self.offset.get_next();
        self.advance();

        [left * depth + offset, right * depth + offset]
    }

    #[inline]
    fn wave(&self, phase: f32) -> f32 {
        match self.shape {
            LfoShape::Sine => bipolar_to_unipolar(phase.sin()),
            LfoShape::Triangle => (phase - PI).abs() / PI,
        }
    }

    #[inline]
    fn advance(&mut self) {
        self.phase += self.phase_inc;
        if self.phase >= TAU {
            self.phase %= TAU;
        }
    }

    fn update_increment(&mut self) {
        self.phase_inc = (f64::from(TAU) * f64::from(self.frequency_hz) / self.sample_rate) as f32;
    }
}
