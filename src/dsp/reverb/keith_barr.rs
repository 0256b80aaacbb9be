//! Keith Barr style all-pass ring reverb.

/*
All-Pass Ring
=============

  mono ──→ 4× all-pass ──┬──────────────┬──────────────┬──────────────┐
                         ↓              ↓              ↓              ↓
                   ┌──→ (+) → node₁ ──→ (+) → node₂ ──→ (+) → node₃ ──→ (+) → node₄ ──┐
                   │                                                                  │
                   └──────────────────────────────────────────────────────────────────┘

  node = all-pass → delay → brightness low-pass → × damping (on the way out)

Every node is an all-pass followed by a plain delay. A node's output,
low-passed by its brightness filter and scaled by `damping`, is added to the
diffused input of the next node on the following sample. Node 4 feeds
node 1, closing the ring.

The all-passes and delays are lossless, so `damping` is the only gain that
decides whether the ring decays or grows. It is clamped to [0, 0.9].

Output
------

  NodeSum     Sum of the four node outputs (before damping), same value
              on both channels.

  StereoTaps  Four taps per channel at 0.25 each, one from every node's
              delay line, at different offsets for left and right.

Lengths are sample counts at a 48 kHz reference rate.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::allpass::AllPass;
use crate::dsp::delay::DelayLine;
use crate::dsp::integrator::LeakyIntegrator;

use super::{mono_sum, process_block, scaled};

const REFERENCE_RATE: f64 = 48_000.0;

const INPUT_DIFFUSION: [u32; 4] = [142, 107, 379, 277];
const RING_DIFFUSION: [u32; 4] = [130, 83, 340, 250];
const RING_DELAY: [u32; 4] = [453, 720, 217, 163];
const LEFT_TAPS: [u32; 4] = [303, 209, 180, 67];
const RIGHT_TAPS: [u32; 4] = [172, 655, 113, 121];

pub const ALLPASS_COEFF: f32 = 0.5;
pub const TAP_GAIN: f32 = 0.25;
pub const MAX_DAMPING: f32 = 0.9;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RingOutput {
    #[default]
    NodeSum,
    StereoTaps,
}

fn reference_ms(samples: u32) -> f32 {
    (f64::from(samples) * 1000.0 / REFERENCE_RATE) as f32
}

struct RingNode {
    allpass: AllPass,
    delay: DelayLine,
    brightness: LeakyIntegrator,
}

pub struct KeithBarrReverb {
    input_diffusers: [AllPass; 4],
    nodes: [RingNode; 4],
    damping: f32,
    feedback: [f32; 4],
    output_mode: RingOutput,
    tap_offsets: [[usize; 4]; 2],
}

impl Default for KeithBarrReverb {
    fn default() -> Self {
        Self::new()
    }
}

impl KeithBarrReverb {
    /// Ring with damping 0.5, fully bright nodes and summed output.
    pub fn new() -> Self {
        let mut reverb = Self {
            input_diffusers: INPUT_DIFFUSION
                .map(|samples| AllPass::new(reference_ms(samples), ALLPASS_COEFF, 1)),
            nodes: [0usize, 1, 2, 3].map(|k| RingNode {
                allpass: AllPass::new(reference_ms(RING_DIFFUSION[k]), ALLPASS_COEFF, 1),
                delay: DelayLine::new(1, 1),
                brightness: LeakyIntegrator::new(1.0),
            }),
            damping: 0.5,
            feedback: [0.0; 4],
            output_mode: RingOutput::default(),
            tap_offsets: [[1; 4]; 2],
        };
        reverb.prepare(48_000.0);
        reverb
    }

    /// Choose how the stereo output is formed.
    pub fn with_output(mut self, mode: RingOutput) -> Self {
        self.output_mode = mode;
        self
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        let sample_rate = sample_rate.max(1.0);

        for diffuser in &mut self.input_diffusers {
            diffuser.prepare(sample_rate, 1);
        }
        for (k, node) in self.nodes.iter_mut().enumerate() {
            node.allpass.prepare(sample_rate, 1);
            let length = scaled(RING_DELAY[k], REFERENCE_RATE, sample_rate);
            node.delay.prepare(length, 1);
            node.delay.set_delay_samples(length);
            node.brightness.prepare(sample_rate);
        }
        for k in 0..4 {
            self.tap_offsets[0][k] = scaled(LEFT_TAPS[k], REFERENCE_RATE, sample_rate);
            self.tap_offsets[1][k] = scaled(RIGHT_TAPS[k], REFERENCE_RATE, sample_rate);
        }

        self.clear();
    }

    pub fn clear(&mut self) {
        for diffuser in &mut self.input_diffusers {
            diffuser.clear();
        }
        for node in &mut self.nodes {
            node.allpass.clear();
            node.delay.clear();
            node.brightness.clear();
        }
        self.feedback = [0.0; 4];
    }

    /// Ring feedback gain, clamped to `[0, MAX_DAMPING]`.
    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping.clamp(0.0, MAX_DAMPING);
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Low-pass coefficient on every node's feedback, `[0, 1]`.
    pub fn set_brightness(&mut self, coeff: f32) {
        for node in &mut self.nodes {
            node.brightness.set_coeff(coeff);
        }
    }

    pub fn brightness(&self) -> f32 {
        self.nodes[0].brightness.coeff()
    }

    pub fn set_output(&mut self, mode: RingOutput) {
        self.output_mode = mode;
    }

    pub fn output(&self) -> RingOutput {
        self.output_mode
    }

    #[inline]
    pub fn process_frame(&mut self, input: &[f32]) -> [f32; 2] {
        let mut diffused = mono_sum(input);
        for diffuser in &mut self.input_diffusers {
            diffused = diffuser.process_mono(diffused);
        }

        let mut node_out = [0.0; 4];
        for (k, node) in self.nodes.iter_mut().enumerate() {
            let x = diffused + self.feedback[(k + 3) % 4];
            let x = node.allpass.process_mono(x);
            node_out[k] = node.delay.process_mono(x);
        }

        for (k, node) in self.nodes.iter_mut().enumerate() {
            self.feedback[k] = node.brightness.process_mono(node_out[k]) * self.damping;
        }

        match self.output_mode {
            RingOutput::NodeSum => {
                let sum = node_out.iter().sum();
                [sum, sum]
            }
            RingOutput::StereoTaps => {
                let mut out = [0.0; 2];
                for (channel, offsets) in self.tap_offsets.iter().enumerate() {
                    for (node, &offset) in self.nodes.iter().zip(offsets.iter()) {
                        out[channel] += TAP_GAIN * node.delay.get_sample(0, offset);
                    }
                }
                out
            }
        }
    }

    pub fn process(&mut self, output: &mut [&mut [f32]], input: &[&[f32]], num_samples: usize) {
        process_block(output, input, num_samples, |frame| self.process_frame(frame));
    }
}
