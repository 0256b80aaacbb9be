//! Shimmer: pitch-shifted, regenerating reverb.

/*
Shimmer
=======

The shimmer effect feeds a reverb with copies of its own input shifted up
and down in pitch. With regeneration on, the shifted reverb tail is shifted
again on every pass, climbing (or falling) in octaves while it decays.

Basic Shimmer
-------------

                       ┌──→ [shift 1] ──┐
  in ──→ [buildup] ────┤                ├──→ 0.5 · (a + b) ──→ out
                       └──→ [shift 2] ──┘

`buildup` is a short delay (1 - 100 ms) whose length glides over half a
second when changed, so sweeping it bends the pitch slightly instead of
clicking. Shift ratios default to 2.0 (octave up) and 0.5 (octave down).

Shimmer Reverb
--------------

  in ─┬──→ (+) ──→ [Shimmer] ──→ [Keith Barr ring] ──┬──→ tail
      │     ↑                                       │
      │     └── amount × soft_clip([EQ]) ←──────────┘
      │
      └──→ (+) ←── tail
            │
            └──→ [Dattorro plate] ──→ out

The ring reverb turns the shifted signal into a diffuse tail. That tail is
equalized, soft clipped and fed back into the shifter (`amount`, at most
0.5), and is also mixed with the dry input into the plate, whose output is
the wet signal. The soft clip bounds the regeneration path, so no in-range
setting can run away.
*/

use crate::dsp::delay::DelayLine;
use crate::dsp::equalizer::{BandShape, EqBand, ParametricEqualizer};
use crate::dsp::pitch::{GranularPitchShifter, DEFAULT_GRAIN_MS, MAX_PITCH_RATIO, MIN_PITCH_RATIO};
use crate::dsp::ramp::{Ramp, DEFAULT_RAMP_MS};
use crate::dsp::reverb::{mono_sum, process_block, DattorroReverb, KeithBarrReverb};
use crate::dsp::saturate::soft_clip_frame;
use crate::{ms_to_samples, MAX_CHANNELS};

pub const MIN_BUILDUP_MS: f32 = 1.0;
pub const DEFAULT_MAX_BUILDUP_MS: f32 = 100.0;
pub const BUILDUP_RAMP_MS: f32 = 500.0;
pub const MAX_AMOUNT: f32 = 0.5;

/// Buildup delay feeding two parallel pitch shifters.
pub struct Shimmer {
    sample_rate: f64,
    max_buildup_ms: f32,
    buildup_ms: f32,
    buildup: Ramp,
    delay: DelayLine,
    shifters: [GranularPitchShifter; 2],
}

impl Default for Shimmer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BUILDUP_MS, DEFAULT_GRAIN_MS, MAX_CHANNELS)
    }
}

impl Shimmer {
    /// `max_buildup_ms` bounds the buildup delay; `grain_ms` sizes the
    /// shifters' grains.
    pub fn new(max_buildup_ms: f32, grain_ms: f32, num_channels: usize) -> Self {
        let mut shifters = [
            GranularPitchShifter::new(grain_ms, num_channels),
            GranularPitchShifter::new(grain_ms, num_channels),
        ];
        shifters[0].set_pitch_ratio(2.0);
        shifters[1].set_pitch_ratio(0.5);

        let max_buildup_ms = max_buildup_ms.max(MIN_BUILDUP_MS);
        let mut shimmer = Self {
            sample_rate: 48_000.0,
            max_buildup_ms,
            buildup_ms: 10.0_f32.min(max_buildup_ms),
            buildup: Ramp::new(BUILDUP_RAMP_MS),
            delay: DelayLine::new(1, num_channels),
            shifters,
        };
        shimmer.prepare(48_000.0, num_channels);
        shimmer
    }

    pub fn prepare(&mut self, sample_rate: f64, num_channels: usize) {
        self.sample_rate = sample_rate.max(1.0);

        let max_samples = ms_to_samples(self.max_buildup_ms, self.sample_rate).ceil() as usize;
        // Fixed part is one sample; the buildup rides on top as modulation
        self.delay.prepare(max_samples + 2, num_channels);
        self.delay.set_delay_samples(1);

        for shifter in &mut self.shifters {
            shifter.prepare(self.sample_rate, num_channels);
        }

        self.buildup
            .prepare(self.sample_rate, true, ms_to_samples(self.buildup_ms, self.sample_rate));
    }

    pub fn clear(&mut self) {
        self.delay.clear();
        for shifter in &mut self.shifters {
            shifter.clear();
        }
    }

    /// Buildup delay in ms, clamped to `[1, max_buildup_ms]`. Glides over
    /// half a second.
    pub fn set_buildup(&mut self, buildup_ms: f32) {
        self.buildup_ms = buildup_ms.clamp(MIN_BUILDUP_MS, self.max_buildup_ms);
        self.buildup
            .set_target(ms_to_samples(self.buildup_ms, self.sample_rate), false);
    }

    pub fn buildup(&self) -> f32 {
        self.buildup_ms
    }

    /// Ratio of the first shifter, clamped to `[0.25, 2]`.
    pub fn set_shift_1(&mut self, ratio: f32) {
        self.shifters[0].set_pitch_ratio(ratio.clamp(MIN_PITCH_RATIO, MAX_PITCH_RATIO));
    }

    /// Ratio of the second shifter, clamped to `[0.25, 2]`.
    pub fn set_shift_2(&mut self, ratio: f32) {
        self.shifters[1].set_pitch_ratio(ratio.clamp(MIN_PITCH_RATIO, MAX_PITCH_RATIO));
    }

    pub fn shift_1(&self) -> f32 {
        self.shifters[0].pitch_ratio()
    }

    pub fn shift_2(&self) -> f32 {
        self.shifters[1].pitch_ratio()
    }

    pub fn num_channels(&self) -> usize {
        self.delay.num_channels()
    }

    #[inline]
    pub fn process_frame(&mut self, output: &mut [f32], input: &[f32]) {
        let channels = output
            .len()
            .min(input.len())
            .min(self.delay.num_channels());

        let offset = self.buildup.get_next();
        let modulation = [offset; MAX_CHANNELS];

        let mut delayed = [0.0; MAX_CHANNELS];
        self.delay.process_frame_modulated(
            &mut delayed[..channels],
            &input[..channels],
            &modulation[..channels],
        );

        let mut up = [0.0; MAX_CHANNELS];
        let mut down = [0.0; MAX_CHANNELS];
        self.shifters[0].process_frame(&mut up[..channels], &delayed[..channels]);
        self.shifters[1].process_frame(&mut down[..channels], &delayed[..channels]);

        for ch in 0..channels {
            output[ch] = 0.5 * (up[ch] + down[ch]);
        }
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
}

/// Full shimmer chain: shimmer → ring reverb with regeneration → plate.
pub struct ShimmerReverb {
    shimmer: Shimmer,
    ring: KeithBarrReverb,
    plate: DattorroReverb,
    equalizer: ParametricEqualizer,
    amount: Ramp,
    regen: [f32; MAX_CHANNELS],
}

impl Default for ShimmerReverb {
    fn default() -> Self {
        Self::new()
    }
}

impl ShimmerReverb {
    /// Amount 0.25, ring damping 0.5, plate brightness and decay 0.5.
    pub fn new() -> Self {
        let mut amount = Ramp::new(DEFAULT_RAMP_MS);
        amount.set_target(0.25, true);

        let mut reverb = Self {
            shimmer: Shimmer::default(),
            ring: KeithBarrReverb::new(),
            plate: DattorroReverb::new(),
            equalizer: ParametricEqualizer::new(),
            amount,
            regen: [0.0; MAX_CHANNELS],
        };
        reverb.prepare(48_000.0);
        reverb
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.shimmer.prepare(sample_rate, MAX_CHANNELS);
        self.ring.prepare(sample_rate);
        self.plate.prepare(sample_rate);
        self.equalizer.prepare(sample_rate);
        let amount = self.amount.target();
        self.amount.prepare(sample_rate, true, amount);
        self.regen = [0.0; MAX_CHANNELS];
    }

    pub fn clear(&mut self) {
        self.shimmer.clear();
        self.ring.clear();
        self.plate.clear();
        self.equalizer.clear();
        self.regen = [0.0; MAX_CHANNELS];
    }

    pub fn set_buildup(&mut self, buildup_ms: f32) {
        self.shimmer.set_buildup(buildup_ms);
    }

    pub fn set_shift_1(&mut self, ratio: f32) {
        self.shimmer.set_shift_1(ratio);
    }

    pub fn set_shift_2(&mut self, ratio: f32) {
        self.shimmer.set_shift_2(ratio);
    }

    /// Regeneration gain, clamped to `[0, MAX_AMOUNT]` and smoothed.
    pub fn set_amount(&mut self, amount: f32) {
        self.amount.set_target(amount.clamp(0.0, MAX_AMOUNT), false);
    }

    pub fn amount(&self) -> f32 {
        self.amount.target()
    }

    /// Ring reverb damping, clamped to `[0, 0.9]`.
    pub fn set_damping(&mut self, damping: f32) {
        self.ring.set_damping(damping);
    }

    /// Plate damping filter coefficient, `[0, 1]`.
    pub fn set_brightness(&mut self, brightness: f32) {
        self.plate.set_brightness(brightness);
    }

    /// Plate decay, clamped to `[0, 0.99]`.
    pub fn set_decay(&mut self, decay: f32) {
        self.plate.set_decay(decay);
    }

    /// Reshape one band of the regeneration equalizer.
    pub fn set_eq_band(&mut self, index: usize, shape: BandShape, freq_hz: f32, gain_db: f32, q: f32) {
        self.equalizer.set_band(index, shape, freq_hz, gain_db, q);
    }

    pub fn eq_band(&self, index: usize) -> Option<EqBand> {
        self.equalizer.band(index)
    }

    pub fn shimmer(&self) -> &Shimmer {
        &self.shimmer
    }

    pub fn ring(&self) -> &KeithBarrReverb {
        &self.ring
    }

    pub fn plate(&self) -> &DattorroReverb {
        &self.plate
    }

    /// One frame of one or two input channels in, stereo out.
    #[inline]
    pub fn process_frame(&mut self, input: &[f32]) -> [f32; 2] {
        let dry = match input {
            [] => [0.0; 2],
            [mono] => [*mono; 2],
            [left, right, ..] => [*left, *right],
        };

        let amount = self.amount.get_next();
        let send = [dry[0] + amount * self.regen[0], dry[1] + amount * self.regen[1]];

        let mut shifted = [0.0; 2];
        self.shimmer.process_frame(&mut shifted, &send);

        let tail = self.ring.process_frame(&shifted);

        let mut regen = tail;
        self.equalizer.process_frame(&mut regen);
        soft_clip_frame(&mut regen, 1.0);
        self.regen = regen;

        self.plate
            .process_frame(&[dry[0] + tail[0], dry[1] + tail[1]])
    }

    pub fn process(&mut self, output: &mut [&mut [f32]], input: &[&[f32]], num_samples: usize) {
        process_block(output, input, num_samples, |frame| self.process_frame(frame));
    }

    /// Mono level of the regeneration path after the last frame.
    pub fn regen_level(&self) -> f32 {
        mono_sum(&self.regen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn test_default_ratios() {
        let shimmer = Shimmer::default();
        assert_eq!(shimmer.shift_1(), 2.0);
        assert_eq!(shimmer.shift_2(), 0.5);
        assert_eq!(shimmer.buildup(), 10.0);
    }

    #[test]
    fn test_setters_clamp() {
        let mut shimmer = Shimmer::default();
        shimmer.set_shift_1(4.0);
        shimmer.set_shift_2(0.1);
        shimmer.set_buildup(0.0);
        assert_eq!(shimmer.shift_1(), 2.0);
        assert_eq!(shimmer.shift_2(), 0.25);
        assert_eq!(shimmer.buildup(), MIN_BUILDUP_MS);

        shimmer.set_buildup(500.0);
        assert_eq!(shimmer.buildup(), DEFAULT_MAX_BUILDUP_MS);

        let mut reverb = ShimmerReverb::new();
        reverb.set_amount(0.9);
        assert_eq!(reverb.amount(), MAX_AMOUNT);
        reverb.set_damping(2.0);
        assert_eq!(reverb.ring().damping(), 0.9);
    }

    #[test]
    fn test_unity_ratios_pass_delayed_signal() {
        let mut shimmer = Shimmer::new(DEFAULT_MAX_BUILDUP_MS, DEFAULT_GRAIN_MS, 1);
        shimmer.set_shift_1(1.0);
        shimmer.set_shift_2(1.0);

        let input: Vec<f32> = (0..9_600).map(|n| (TAU * 300.0 * n as f32 / 48_000.0).sin()).collect();
        let mut peak = 0.0f32;
        for (n, &x) in input.iter().enumerate() {
            let mut y = [0.0];
            shimmer.process_frame(&mut y, &[x]);
            if n > 4_800 {
                peak = peak.max(y[0].abs());
            }
        }
        assert!((peak - 1.0).abs() < 0.02, "peak {}", peak);
    }

    #[test]
    fn test_shimmer_reverb_silence_in_silence_out() {
        let mut reverb = ShimmerReverb::new();
        for _ in 0..4_800 {
            assert_eq!(reverb.process_frame(&[0.0, 0.0]), [0.0, 0.0]);
        }
    }

    #[test]
    fn test_shimmer_reverb_produces_tail() {
        let mut reverb = ShimmerReverb::new();
        let mut tail_energy = 0.0;
        for n in 0..96_000 {
            let x = if n < 4_800 { (TAU * 440.0 * n as f32 / 48_000.0).sin() } else { 0.0 };
            let [l, r] = reverb.process_frame(&[x]);
            if n > 48_000 {
                tail_energy += l * l + r * r;
            }
        }
        assert!(tail_energy > 1e-3, "tail energy {}", tail_energy);
    }

    #[test]
    fn test_regeneration_bounded() {
        let mut reverb = ShimmerReverb::new();
        reverb.set_amount(MAX_AMOUNT);
        reverb.set_damping(0.9);
        reverb.set_decay(0.99);
        reverb.set_brightness(1.0);

        for n in 0..96_000 {
            let x = (TAU * 220.0 * n as f32 / 48_000.0).sin();
            let [l, r] = reverb.process_frame(&[x, x]);
            assert!(l.is_finite() && r.is_finite(), "sample {} not finite", n);
            assert!(reverb.regen_level().abs() < 1.0);
        }
    }

    #[test]
    fn test_clear_keeps_settings() {
        let mut reverb = ShimmerReverb::new();
        reverb.set_amount(0.4);
        reverb.set_eq_band(1, BandShape::Bell, 2_000.0, 3.0, 1.0);
        for n in 0..4_800 {
            reverb.process_frame(&[(n as f32 * 0.02).sin()]);
        }

        reverb.clear();
        assert_eq!(reverb.amount(), 0.4);
        assert_eq!(reverb.eq_band(1).map(|band| band.gain_db), Some(3.0));
        assert_eq!(reverb.regen_level(), 0.0);
        for _ in 0..4_800 {
            assert_eq!(reverb.process_frame(&[0.0]), [0.0, 0.0]);
        }
    }

    #[test]
    fn test_mono_shimmer_fills_stereo_block() {
        let mut shimmer = Shimmer::new(DEFAULT_MAX_BUILDUP_MS, DEFAULT_GRAIN_MS, 1);
        shimmer.prepare(48_000.0, 1);

        let input: Vec<f32> = (0..4_096).map(|n| (TAU * 440.0 * n as f32 / 48_000.0).sin()).collect();
        let mut left = vec![0.0; 4_096];
        let mut right = vec![9.0; 4_096];
        shimmer.process(&mut [&mut left[..], &mut right[..]], &[&input[..], &input[..]], 4_096);

        assert!(left.iter().any(|&x| x != 0.0), "left should carry signal");
        assert_eq!(left, right, "unprepared right channel should mirror left");
    }
}
