//! Granular pitch shifting.

/*
Granular Pitch Shifting
=======================

Reading a recording faster than it was written raises its pitch. The catch
is that a read head moving faster than the write head eventually overtakes
it, and a slower one falls further and further behind. The fix is to chop
the read side into short "grains" and keep restarting read heads near the
write head.

Vocabulary
----------

  grain         A short stretch of buffered audio read back at `ratio`
                samples per output sample. 20 ms by default.

  ratio         Playback speed. 2.0 = up an octave, 0.5 = down an octave,
                1.0 = unchanged. Clamped to [0.25, 2.0].

  safe delay    How far behind the newest sample a fresh head starts. Large
                enough that a head running at the maximum ratio for its
                whole life never reads past the write position.

Two Heads
---------

Two read heads are always active. At every grain boundary the head that
was fading in carries on and starts fading out, and a fresh head is placed
`safe delay` behind the write position to fade in:

  grain:     |─── k ───|── k+1 ──|── k+2 ──|
  head A:    ╱‾‾‾‾‾‾‾‾‾‾╲        ╱‾‾‾‾‾‾‾‾‾
  head B:    ‾‾‾‾╲       ╱‾‾‾‾‾‾‾‾‾╲

Each head lives two grains: one fading in, one fading out. The fades are
squared quarter sine/cosine curves over one grain,

    fade_in  = sin²(π/2 · n/N)
    fade_out = cos²(π/2 · n/N)

which always sum to one. At ratio 1.0 the continuing head and the fresh
head sit on the same sample, so the output is an exact copy of the input
delayed by the safe delay.

Reads between samples are linearly interpolated. The 1 second ring buffer
leaves room for the slowest ratio to drift behind without being lapped.

Block Size
----------

The grain counter and fade position advance once per sample and carry over
between `process` calls. A grain can start in one host block and end in the
next, so the output for a given input is the same whether it arrives in
blocks of 32 samples or 2048. Envelopes that restart at every block
boundary would instead tie the grain length to the host's buffer size.
*/

use std::f32::consts::FRAC_PI_2;

use crate::{ms_to_samples, MAX_CHANNELS};

pub const MIN_PITCH_RATIO: f32 = 0.25;
pub const MAX_PITCH_RATIO: f32 = 2.0;
pub const DEFAULT_GRAIN_MS: f32 = 20.0;

pub struct GranularPitchShifter {
    buffers: Vec<Vec<f32>>,
    grain_ms: f32,
    grain_samples: usize,
    safe_delay: usize,
    ratio: f32,
    write_index: usize,
    grain_pos: usize,
    fade_in_head: f32,
    fade_out_head: f32,
}

impl GranularPitchShifter {
    pub fn new(grain_ms: f32, num_channels: usize) -> Self {
        let mut shifter = Self {
            buffers: Vec::new(),
            grain_ms: grain_ms.max(1.0),
            grain_samples: 1,
            safe_delay: 1,
            ratio: 1.0,
            write_index: 0,
            grain_pos: 0,
            fade_in_head: 0.0,
            fade_out_head: 0.0,
        };
        shifter.prepare(48_000.0, num_channels);
        shifter
    }

    /// Allocate the ring buffer for `sample_rate` and reset the heads.
    pub fn prepare(&mut self, sample_rate: f64, num_channels: usize) {
        let sample_rate = sample_rate.max(1.0);
        let num_channels = num_channels.clamp(1, MAX_CHANNELS);

        self.grain_samples = (ms_to_samples(self.grain_ms, sample_rate).ceil() as usize).max(2);

        // A head runs two grains at up to MAX_PITCH_RATIO
        let drift = 2.0 * self.grain_samples as f32 * (MAX_PITCH_RATIO - 1.0);
        self.safe_delay = (drift.ceil() as usize + 2).max(self.grain_samples);

        let length = (sample_rate.ceil() as usize).max(self.safe_delay + 4 * self.grain_samples);

        self.buffers.resize_with(num_channels, Vec::new);
        for buffer in &mut self.buffers {
            buffer.clear();
            buffer.resize(length, 0.0);
        }

        self.clear();
    }

    /// Zero the buffer and restart the grain cycle.
    pub fn clear(&mut self) {
        for buffer in &mut self.buffers {
            buffer.fill(0.0);
        }
        let length = self.buffers.first().map_or(1, |buffer| buffer.len());
        self.write_index = 0;
        self.grain_pos = 0;
        // Park both heads where the first fresh head will start
        self.fade_in_head = wrap(-(self.safe_delay as f32), length);
        self.fade_out_head = self.fade_in_head;
    }

    /// Set playback speed, clamped to `[MIN_PITCH_RATIO, MAX_PITCH_RATIO]`.
    pub fn set_pitch_ratio(&mut self, ratio: f32) {
        self.ratio = ratio.clamp(MIN_PITCH_RATIO, MAX_PITCH_RATIO);
    }

    pub fn pitch_ratio(&self) -> f32 {
        self.ratio
    }

    pub fn grain_samples(&self) -> usize {
        self.grain_samples
    }

    /// Delay between input and output at ratio 1.0, in samples.
    pub fn latency_samples(&self) -> usize {
        self.safe_delay
    }

    pub fn num_channels(&self) -> usize {
        self.buffers.len()
    }

    #[inline]
    pub fn process_frame(&mut self, output: &mut [f32], input: &[f32]) {
        let channels = output.len().min(input.len()).min(self.buffers.len());
        let length = self.buffers[0].len();

        for ch in 0..channels {
            self.buffers[ch][self.write_index] = input[ch];
        }

        if self.grain_pos == 0 {
            let newest = self.write_index as f32;
            self.fade_out_head = self.fade_in_head;
            self.fade_in_head = wrap(newest - self.safe_delay as f32, length);
        }

        let phase = self.grain_pos as f32 / self.grain_samples as f32;
        let fade_in = (FRAC_PI_2 * phase).sin().powi(2);
        let fade_out = 1.0 - fade_in;

        for ch in 0..channels {
            let buffer = &self.buffers[ch];
            let incoming = read_interpolated(buffer, self.fade_in_head);
            let outgoing = read_interpolated(buffer, self.fade_out_head);
            output[ch] = incoming * fade_in + outgoing * fade_out;
        }

        self.fade_in_head = wrap(self.fade_in_head + self.ratio, length);
        self.fade_out_head = wrap(self.fade_out_head + self.ratio, length);
        self.grain_pos = (self.grain_pos + 1) % self.grain_samples;
        self.write_index = (self.write_index + 1) % length;
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

#[inline]
fn wrap(position: f32, length: usize) -> f32 {
    position.rem_euclid(length as f32)
}

#[inline]
fn read_interpolated(buffer: &[f32], position: f32) -> f32 {
    let length = buffer.len();
    let floor = position.floor();
    let frac = position - floor;
    let index_0 = (floor as usize) % length;
    let index_1 = (index_0 + 1) % length;
    buffer[index_0] * (1.0 - frac) + buffer[index_1] * frac
}
