//! Dattorro plate reverb.

/*
Plate Reverb (Dattorro Figure-Eight)
====================================

                     ┌──────────────── right tank out ←─────────────────┐
                     ↓                                                  │
  mono ──→ pre-delay ──→ tone ──→ 4× all-pass ──┬──→ (+) ──→ LEFT TANK ──┤
                                                │                       │
                                                └──→ (+) ──→ RIGHT TANK ─┘
                                                      ↑
                                                      └─── left tank out

One tank half, per sample:

  in ──→ [mod all-pass] ──→ [delay 1] ──→ [damping] ──→ × decay
     ──→ [all-pass 2]   ──→ [delay 2] ──→ × decay ──→ out

The mod all-pass reads its delay line at a position swept by the LFO; the
left and right halves get quadrature LFO phases. Damping is a one-pole
low-pass ("brightness": 1.0 = no damping). Decay scales the signal twice per
half, so one trip around the figure eight is multiplied by decay⁴.

Output
------

Each channel sums seven taps at ±0.6, taken from the delay lines and second
all-passes of both halves. Tap offsets come from the classic design at a
reference rate of 30 kHz and are rescaled at `prepare`.

  left out                          right out
  + right delay 1   @  266          + left delay 1    @  353
  + right delay 1   @ 2974          + left delay 1    @ 3627
  - right all-pass 2 @ 1913         - left all-pass 2  @ 1228
  + right delay 2   @ 1996          + left delay 2    @ 2673
  - left delay 1    @ 1990          - right delay 1   @ 2111
  - left all-pass 2  @  187         - right all-pass 2 @  335
  - left delay 2    @ 1066          - right delay 2   @  121
*/

use crate::dsp::allpass::AllPass;
use crate::dsp::delay::DelayLine;
use crate::dsp::integrator::LeakyIntegrator;
use crate::dsp::lfo::{Lfo, LfoShape};
use crate::dsp::ramp::{Ramp, DEFAULT_RAMP_MS};
use crate::ms_to_samples;

use super::{mono_sum, process_block, scaled};

const REFERENCE_RATE: f64 = 30_000.0;

const INPUT_DIFFUSION: [u32; 4] = [142, 107, 379, 277];
const DECAY_DIFFUSION_1: [u32; 2] = [672, 908];
const DELAY_1: [u32; 2] = [4453, 4217];
const DECAY_DIFFUSION_2: [u32; 2] = [1800, 2656];
const DELAY_2: [u32; 2] = [3720, 3163];

pub const TAP_GAIN: f32 = 0.6;
pub const MAX_DECAY: f32 = 0.99;
pub const MAX_PRE_DELAY_MS: f32 = 100.0;
pub const MAX_LFO_DEPTH_MS: f32 = 4.0;
pub const MAX_LFO_OFFSET_MS: f32 = 2.0;

const LEFT: usize = 0;
const RIGHT: usize = 1;

#[derive(Debug, Clone, Copy)]
enum TapPoint {
    Delay1,
    Diffuser2,
    Delay2,
}

#[derive(Debug, Clone, Copy)]
struct Tap {
    half: usize,
    point: TapPoint,
    offset: u32,
    sign: f32,
}

const fn tap(half: usize, point: TapPoint, offset: u32, sign: f32) -> Tap {
    Tap {
        half,
        point,
        offset,
        sign,
    }
}

const OUTPUT_TAPS: [[Tap; 7]; 2] = [
    [
        tap(RIGHT, TapPoint::Delay1, 266, 1.0),
        tap(RIGHT, TapPoint::Delay1, 2974, 1.0),
        tap(RIGHT, TapPoint::Diffuser2, 1913, -1.0),
        tap(RIGHT, TapPoint::Delay2, 1996, 1.0),
        tap(LEFT, TapPoint::Delay1, 1990, -1.0),
        tap(LEFT, TapPoint::Diffuser2, 187, -1.0),
        tap(LEFT, TapPoint::Delay2, 1066, -1.0),
    ],
    [
        tap(LEFT, TapPoint::Delay1, 353, 1.0),
        tap(LEFT, TapPoint::Delay1, 3627, 1.0),
        tap(LEFT, TapPoint::Diffuser2, 1228, -1.0),
        tap(LEFT, TapPoint::Delay2, 2673, 1.0),
        tap(RIGHT, TapPoint::Delay1, 2111, -1.0),
        tap(RIGHT, TapPoint::Diffuser2, 335, -1.0),
        tap(RIGHT, TapPoint::Delay2, 121, -1.0),
    ],
];

fn reference_ms(samples: u32) -> f32 {
    (f64::from(samples) * 1000.0 / REFERENCE_RATE) as f32
}

/// One side of the figure-eight.
struct TankHalf {
    modulated: AllPass,
    delay_1: DelayLine,
    diffuser: AllPass,
    delay_2: DelayLine,
}

impl TankHalf {
    fn new(side: usize, decay_diffusion_1: f32, decay_diffusion_2: f32) -> Self {
        Self {
            modulated: AllPass::new(reference_ms(DECAY_DIFFUSION_1[side]), decay_diffusion_1, 1)
                .with_modulation_headroom(MAX_LFO_DEPTH_MS + MAX_LFO_OFFSET_MS),
            delay_1: DelayLine::new(1, 1),
            diffuser: AllPass::new(reference_ms(DECAY_DIFFUSION_2[side]), decay_diffusion_2, 1),
            delay_2: DelayLine::new(1, 1),
        }
    }

    fn prepare(&mut self, side: usize, sample_rate: f64) {
        self.modulated.prepare(sample_rate, 1);
        self.diffuser.prepare(sample_rate, 1);

        let delay_1 = scaled(DELAY_1[side], REFERENCE_RATE, sample_rate);
        self.delay_1.prepare(delay_1, 1);
        self.delay_1.set_delay_samples(delay_1);

        let delay_2 = scaled(DELAY_2[side], REFERENCE_RATE, sample_rate);
        self.delay_2.prepare(delay_2, 1);
        self.delay_2.set_delay_samples(delay_2);
    }

    fn clear(&mut self) {
        self.modulated.clear();
        self.delay_1.clear();
        self.diffuser.clear();
        self.delay_2.clear();
    }

    fn read(&self, point: TapPoint, offset: usize) -> f32 {
        match point {
            TapPoint::Delay1 => self.delay_1.get_sample(0, offset),
            TapPoint::Diffuser2 => self.diffuser.get_sample(0, offset),
            TapPoint::Delay2 => self.delay_2.get_sample(0, offset),
        }
    }
}

pub struct DattorroReverb {
    sample_rate: f64,
    pre_delay_ms: f32,
    pre_delay: DelayLine,
    tone: LeakyIntegrator,
    input_diffusers: [AllPass; 4],
    lfo: Lfo,
    tank: [TankHalf; 2],
    damping: LeakyIntegrator,
    decay: Ramp,
    feedback: [f32; 2],
    tap_offsets: [[usize; 7]; 2],
}

impl Default for DattorroReverb {
    fn default() -> Self {
        Self::new()
    }
}

impl DattorroReverb {
    /// Plate with 20 ms pre-delay, decay 0.5 and brightness 0.5.
    pub fn new() -> Self {
        let mut reverb = Self {
            sample_rate: 48_000.0,
            pre_delay_ms: 20.0,
            pre_delay: DelayLine::new(1, 1),
            tone: LeakyIntegrator::new(0.9995),
            input_diffusers: [
                AllPass::new(reference_ms(INPUT_DIFFUSION[0]), 0.75, 1),
                AllPass::new(reference_ms(INPUT_DIFFUSION[1]), 0.75, 1),
                AllPass::new(reference_ms(INPUT_DIFFUSION[2]), 0.625, 1),
                AllPass::new(reference_ms(INPUT_DIFFUSION[3]), 0.625, 1),
            ],
            lfo: Lfo::new(LfoShape::Sine, 0.5, 2.0, 1.0),
            tank: [TankHalf::new(LEFT, 0.7, 0.5), TankHalf::new(RIGHT, 0.7, 0.5)],
            damping: LeakyIntegrator::new(0.5),
            decay: Ramp::new(DEFAULT_RAMP_MS),
            feedback: [0.0; 2],
            tap_offsets: [[1; 7]; 2],
        };
        reverb.decay.set_target(0.5, true);
        reverb.prepare(48_000.0);
        reverb
    }

    /// Resize every line for `sample_rate` and clear the tail.
    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate.max(1.0);
        let sample_rate = self.sample_rate;

        let max_pre_delay = ms_to_samples(MAX_PRE_DELAY_MS, sample_rate).ceil() as usize;
        self.pre_delay.prepare(max_pre_delay, 1);
        self.set_pre_delay(self.pre_delay_ms);

        self.tone.prepare(sample_rate);
        for diffuser in &mut self.input_diffusers {
            diffuser.prepare(sample_rate, 1);
        }
        self.lfo.prepare(sample_rate);
        for (side, half) in self.tank.iter_mut().enumerate() {
            half.prepare(side, sample_rate);
        }
        self.damping.prepare(sample_rate);
        let decay = self.decay.target();
        self.decay.prepare(sample_rate, true, decay);

        for (offsets, taps) in self.tap_offsets.iter_mut().zip(OUTPUT_TAPS.iter()) {
            for (offset, tap) in offsets.iter_mut().zip(taps.iter()) {
                *offset = scaled(tap.offset, REFERENCE_RATE, sample_rate);
            }
        }

        self.clear();
    }

    /// Silence the tail. Settings are kept.
    pub fn clear(&mut self) {
        self.pre_delay.clear();
        self.tone.clear();
        for diffuser in &mut self.input_diffusers {
            diffuser.clear();
        }
        for half in &mut self.tank {
            half.clear();
        }
        self.damping.clear();
        self.lfo.reset();
        self.feedback = [0.0; 2];
    }

    /// Pre-delay in ms, clamped to `[0, MAX_PRE_DELAY_MS]`.
    pub fn set_pre_delay(&mut self, pre_delay_ms: f32) {
        self.pre_delay_ms = pre_delay_ms.clamp(0.0, MAX_PRE_DELAY_MS);
        let samples = ms_to_samples(self.pre_delay_ms, self.sample_rate).round() as usize;
        self.pre_delay.set_delay_samples(samples);
    }

    pub fn pre_delay(&self) -> f32 {
        self.pre_delay_ms
    }

    /// Input bandwidth (tone) coefficient, `[0, 1]`.
    pub fn set_tone(&mut self, coeff: f32) {
        self.tone.set_coeff(coeff);
    }

    pub fn tone(&self) -> f32 {
        self.tone.coeff()
    }

    /// Coefficient of the first two input diffusers.
    pub fn set_input_diffusion_1(&mut self, coeff: f32) {
        self.input_diffusers[0].set_coeff(coeff);
        self.input_diffusers[1].set_coeff(coeff);
    }

    /// Coefficient of the last two input diffusers.
    pub fn set_input_diffusion_2(&mut self, coeff: f32) {
        self.input_diffusers[2].set_coeff(coeff);
        self.input_diffusers[3].set_coeff(coeff);
    }

    pub fn input_diffusion_1(&self) -> f32 {
        self.input_diffusers[0].coeff()
    }

    pub fn input_diffusion_2(&self) -> f32 {
        self.input_diffusers[2].coeff()
    }

    /// Coefficient of the modulated tank all-passes.
    pub fn set_decay_diffusion_1(&mut self, coeff: f32) {
        for half in &mut self.tank {
            half.modulated.set_coeff(coeff);
        }
    }

    /// Coefficient of the second tank all-passes.
    pub fn set_decay_diffusion_2(&mut self, coeff: f32) {
        for half in &mut self.tank {
            half.diffuser.set_coeff(coeff);
        }
    }

    pub fn decay_diffusion_1(&self) -> f32 {
        self.tank[LEFT].modulated.coeff()
    }

    pub fn decay_diffusion_2(&self) -> f32 {
        self.tank[LEFT].diffuser.coeff()
    }

    pub fn set_lfo_shape(&mut self, shape: LfoShape) {
        self.lfo.set_shape(shape);
    }

    pub fn set_lfo_frequency(&mut self, frequency_hz: f32) {
        self.lfo.set_frequency(frequency_hz);
    }

    /// LFO swing in ms, clamped to `[0, MAX_LFO_DEPTH_MS]`.
    pub fn set_lfo_depth(&mut self, depth_ms: f32) {
        self.lfo.set_depth(depth_ms.clamp(0.0, MAX_LFO_DEPTH_MS));
    }

    /// LFO offset in ms, clamped to `[0, MAX_LFO_OFFSET_MS]`.
    pub fn set_lfo_offset(&mut self, offset_ms: f32) {
        self.lfo.set_offset(offset_ms.clamp(0.0, MAX_LFO_OFFSET_MS));
    }

    pub fn lfo(&self) -> &Lfo {
        &self.lfo
    }

    /// Damping filter coefficient: 1.0 leaves the tank bright, lower values
    /// darken each pass.
    pub fn set_brightness(&mut self, coeff: f32) {
        self.damping.set_coeff(coeff);
    }

    pub fn brightness(&self) -> f32 {
        self.damping.coeff()
    }

    /// Tank decay, clamped to `[0, MAX_DECAY]` and smoothed.
    pub fn set_decay(&mut self, decay: f32) {
        self.decay.set_target(decay.clamp(0.0, MAX_DECAY), false);
    }

    pub fn decay(&self) -> f32 {
        self.decay.target()
    }

    /// One frame of one or two input channels in, stereo out.
    #[inline]
    pub fn process_frame(&mut self, input: &[f32]) -> [f32; 2] {
        // Feedforward
        let mut mono = self.pre_delay.process_mono(mono_sum(input));
        mono = self.tone.process_mono(mono);
        for diffuser in &mut self.input_diffusers {
            mono = diffuser.process_mono(mono);
        }

        // Tank
        let modulation = self.lfo.process_stereo();
        let decay = self.decay.get_next();

        let mut damped = [0.0; 2];
        for (side, half) in self.tank.iter_mut().enumerate() {
            let x = mono + self.feedback[side];
            let x = half.modulated.process_mono_modulated(x, modulation[side]);
            damped[side] = half.delay_1.process_mono(x);
        }

        self.damping.process_frame(&mut damped);

        let mut tank_out = [0.0; 2];
        for (side, half) in self.tank.iter_mut().enumerate() {
            let x = half.diffuser.process_mono(damped[side] * decay);
            tank_out[side] = half.delay_2.process_mono(x) * decay;
        }

        // Figure-eight: each half feeds the other
        self.feedback = [tank_out[RIGHT], tank_out[LEFT]];

        let mut out = [0.0; 2];
        for (channel, taps) in OUTPUT_TAPS.iter().enumerate() {
            for (tap, &offset) in taps.iter().zip(self.tap_offsets[channel].iter()) {
                out[channel] += tap.sign * TAP_GAIN * self.tank[tap.half].read(tap.point, offset);
            }
        }
        out
    }

    /// Process a block. Input may be mono or stereo; a mono output receives
    /// the average of both tap sums.
    pub fn process(&mut self, output: &mut [&mut [f32]], input: &[&[f32]], num_samples: usize) {
        process_block(output, input, num_samples, |frame| self.process_frame(frame));
    }
}
