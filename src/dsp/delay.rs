//! Circular delay buffer with fixed, modulated and tap reads.

/*
Delay Lines
===========

A delay line is a ring of samples with one write cursor. Every sample, the
newest input overwrites the oldest slot and the cursor moves on. Reading
`d` slots behind the cursor gives the input from `d` samples ago.

      write_index
          ↓
  ┌───┬───┬───┬───┬───┬───┬───┐
  │ e │ f │ g │ a │ b │ c │ d │   capacity = max_delay + 1
  └───┴───┴───┴───┴───┴───┴───┘
              ↑
       write_index - delay  (mod capacity)

The extra guard slot keeps the longest delay from landing on the slot that
is written in the same step. The delay length lives in [1, capacity - 1];
zero is refused because it would read the sample just written.

Three Ways to Read
------------------

  fixed       `process_frame` writes first, then reads `delay` slots back.
              Cursor advances once per frame.

  modulated   `process_frame_modulated` reads `delay + m` slots back, with
              `m` a per-channel, non-negative, fractional offset. The two
              slots bracketing that position are blended by the fractional
              part of `m`, then the input is written.

                  out = read(k) * (1 - frac) + read(k + 1) * frac
                  k   = delay + floor(m)

  tap         `get_sample(channel, index)` looks `index` slots behind the
              cursor without touching any state. Reverbs use taps to build
              their output from inside the feedback network. Called before
              a frame is processed, tap `L` returns the input from exactly
              `L` frames earlier.
*/

use crate::MAX_CHANNELS;

/// Per-channel circular delay buffer.
pub struct DelayLine {
    buffers: Vec<Vec<f32>>,
    capacity: usize,
    delay_samples: usize,
    write_index: usize,
}

impl DelayLine {
    /// Allocate `num_channels` buffers able to hold `max_length_samples` of
    /// delay. The delay starts at the maximum length.
    pub fn new(max_length_samples: usize, num_channels: usize) -> Self {
        let mut delay_line = Self {
            buffers: Vec::new(),
            capacity: 0,
            delay_samples: 1,
            write_index: 0,
        };
        delay_line.prepare(max_length_samples, num_channels);
        delay_line.delay_samples = delay_line.capacity - 1;
        delay_line
    }

    /// Reallocate for a new maximum length and channel count.
    ///
    /// Buffers are cleared and the write cursor reset. The current delay is
    /// kept, clamped to the new capacity. Not realtime-safe.
    pub fn prepare(&mut self, max_length_samples: usize, num_channels: usize) {
        let num_channels = num_channels.clamp(1, MAX_CHANNELS);
        self.capacity = max_length_samples.max(1) + 1;

        self.buffers.resize_with(num_channels, Vec::new);
        for buffer in &mut self.buffers {
            buffer.clear();
            buffer.resize(self.capacity, 0.0);
        }

        self.write_index = 0;
        self.set_delay_samples(self.delay_samples);
    }

    /// Set the delay length, clamped to `[1, capacity - 1]`.
    pub fn set_delay_samples(&mut self, delay_samples: usize) {
        self.delay_samples = delay_samples.clamp(1, self.capacity - 1);
    }

    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    /// Total slots per channel (max delay + guard slot).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn num_channels(&self) -> usize {
        self.buffers.len()
    }

    /// Zero the buffer contents. Delay length and cursor are untouched.
    pub fn clear(&mut self) {
        for buffer in &mut self.buffers {
            buffer.fill(0.0);
        }
    }

    /// Read-only tap `index` slots behind the write cursor.
    ///
    /// `index` is clamped to `[1, capacity - 1]`. Out of range channels read
    /// silence.
    #[inline]
    pub fn get_sample(&self, channel: usize, index: usize) -> f32 {
        let index = index.clamp(1, self.capacity - 1);
        let read_index = (self.write_index + self.capacity - index) % self.capacity;
        self.buffers
            .get(channel)
            .map_or(0.0, |buffer| buffer[read_index])
    }

    /// Fixed delay, one frame: write each channel, then read `delay` back.
    #[inline]
    pub fn process_frame(&mut self, output: &mut [f32], input: &[f32]) {
        let channels = output.len().min(input.len()).min(self.buffers.len());
        let read_index = (self.write_index + self.capacity - self.delay_samples) % self.capacity;

        for ch in 0..channels {
            let buffer = &mut self.buffers[ch];
            buffer[self.write_index] = input[ch];
            output[ch] = buffer[read_index];
        }

        self.advance();
    }

    /// Modulated delay, one frame. `modulation` holds the extra delay per
    /// channel in samples; negative values are treated as zero.
    #[inline]
    pub fn process_frame_modulated(&mut self, output: &mut [f32], input: &[f32], modulation: &[f32]) {
        let channels = output
            .len()
            .min(input.len())
            .min(modulation.len())
            .min(self.buffers.len());

        // Deepest readable slot is `capacity` back: read happens before write
        let max_offset = (self.capacity - 1 - self.delay_samples) as f32;

        for ch in 0..channels {
            let m = modulation[ch].clamp(0.0, max_offset);
            let m_floor = m.floor();
            let frac = m - m_floor;

            let back = self.delay_samples + m_floor as usize;
            let index_0 = (self.write_index + self.capacity - back) % self.capacity;
            let index_1 = (index_0 + self.capacity - 1) % self.capacity;

            let buffer = &mut self.buffers[ch];
            let read_0 = buffer[index_0];
            let read_1 = buffer[index_1];

            buffer[self.write_index] = input[ch];
            output[ch] = read_0 * (1.0 - frac) + read_1 * frac;
        }

        self.advance();
    }

    /// Single-channel convenience for mono lines.
    #[inline]
    pub fn process_mono(&mut self, input: f32) -> f32 {
        let mut out = [0.0];
        self.process_frame(&mut out, &[input]);
        out[0]
    }

    /// Fixed delay over a block.
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

    /// Modulated delay over a block, one modulation slice per channel.
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

    #[inline]
    fn advance(&mut self) {
        self.write_index = (self.write_index + 1) % self.capacity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse(len: usize) -> Vec<f32> {
        let mut signal = vec![0.0; len];
        signal[0] = 1.0;
        signal
    }

    #[test]
    fn test_impulse_delayed_by_five() {
        let mut dl = DelayLine::new(10, 1);
        dl.set_delay_samples(5);

        let mut output = Vec::new();
        for &x in &impulse(10) {
            let mut y = [0.0];
            dl.process_frame(&mut y, &[x]);
            output.push(y[0]);
        }

        assert_eq!(output, vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_delay_clamped_to_valid_range() {
        let mut dl = DelayLine::new(10, 1);
        assert_eq!(dl.capacity(), 11);
        assert_eq!(dl.delay_samples(), 10);

        dl.set_delay_samples(0);
        assert_eq!(dl.delay_samples(), 1);

        dl.set_delay_samples(500);
        assert_eq!(dl.delay_samples(), 10);
    }

    #[test]
    fn test_zero_sizes_floored() {
        let dl = DelayLine::new(0, 0);
        assert_eq!(dl.capacity(), 2);
        assert_eq!(dl.num_channels(), 1);
        assert_eq!(dl.delay_samples(), 1);
    }

    #[test]
    fn test_tap_reads_history_without_advancing() {
        let mut dl = DelayLine::new(8, 1);
        for x in 1..=4 {
            dl.process_frame(&mut [0.0], &[x as f32]);
        }

        // Most recent write is one slot back
        assert_eq!(dl.get_sample(0, 1), 4.0);
        assert_eq!(dl.get_sample(0, 4), 1.0);
        // Repeated taps see the same value
        assert_eq!(dl.get_sample(0, 4), 1.0);
        // Clamped: index 0 reads one slot back
        assert_eq!(dl.get_sample(0, 0), 4.0);
    }

    #[test]
    fn test_tap_identity_for_every_length() {
        let max = 16;
        for length in 1..=max {
            let mut dl = DelayLine::new(max, 1);
            let input = impulse(3 * max);

            for (step, &x) in input.iter().enumerate() {
                let tap = dl.get_sample(0, length);
                let expected = if step == length { 1.0 } else { 0.0 };
                assert_eq!(tap, expected, "length {} step {}", length, step);
                dl.process_frame(&mut [0.0], &[x]);
            }
        }
    }

    #[test]
    fn test_modulated_integer_offset_matches_fixed() {
        let mut fixed = DelayLine::new(32, 1);
        let mut modulated = DelayLine::new(32, 1);
        fixed.set_delay_samples(7);
        modulated.set_delay_samples(4);

        for n in 0..64 {
            let x = (n as f32 * 0.37).sin();
            let mut a = [0.0];
            let mut b = [0.0];
            fixed.process_frame(&mut a, &[x]);
            modulated.process_frame_modulated(&mut b, &[x], &[3.0]);
            assert!((a[0] - b[0]).abs() < 1e-6, "sample {}: {} vs {}", n, a[0], b[0]);
        }
    }

    #[test]
    fn test_modulated_fractional_interpolates() {
        let mut dl = DelayLine::new(16, 1);
        dl.set_delay_samples(1);

        // Ramp input: x[n] = n
        let mut last = 0.0;
        for n in 0..10 {
            let mut y = [0.0];
            dl.process_frame_modulated(&mut y, &[n as f32], &[0.5]);
            last = y[0];
        }

        // At n = 9: halfway between x[8] and x[7]
        assert!((last - 7.5).abs() < 1e-6, "got {}", last);
    }

    #[test]
    fn test_negative_modulation_treated_as_zero() {
        let mut a = DelayLine::new(16, 1);
        let mut b = DelayLine::new(16, 1);
        a.set_delay_samples(3);
        b.set_delay_samples(3);

        for n in 0..20 {
            let x = n as f32;
            let mut ya = [0.0];
            let mut yb = [0.0];
            a.process_frame_modulated(&mut ya, &[x], &[-4.0]);
            b.process_frame_modulated(&mut yb, &[x], &[0.0]);
            assert_eq!(ya, yb);
        }
    }

    #[test]
    fn test_stereo_block_process() {
        let mut dl = DelayLine::new(4, 2);
        dl.set_delay_samples(2);

        let left = [1.0, 2.0, 3.0, 4.0, 5.0];
        let right = [-1.0, -2.0, -3.0, -4.0, -5.0];
        let mut out_l = [0.0; 5];
        let mut out_r = [0.0; 5];
        {
            let mut output: [&mut [f32]; 2] = [&mut out_l, &mut out_r];
            dl.process(&mut output, &[&left, &right], 5);
        }

        assert_eq!(out_l, [0.0, 0.0, 1.0, 2.0, 3.0]);
        assert_eq!(out_r, [0.0, 0.0, -1.0, -2.0, -3.0]);
    }

    #[test]
    fn test_clear_keeps_configuration() {
        let mut dl = DelayLine::new(10, 1);
        dl.set_delay_samples(3);
        for _ in 0..5 {
            dl.process_frame(&mut [0.0], &[1.0]);
        }

        dl.clear();
        assert_eq!(dl.delay_samples(), 3);
        for k in 1..dl.capacity() {
            assert_eq!(dl.get_sample(0, k), 0.0);
        }
    }

    #[test]
    fn test_prepare_reallocates_and_clears() {
        let mut dl = DelayLine::new(10, 1);
        dl.set_delay_samples(8);
        dl.process_frame(&mut [0.0], &[1.0]);

        dl.prepare(4, 2);
        assert_eq!(dl.capacity(), 5);
        assert_eq!(dl.num_channels(), 2);
        assert_eq!(dl.delay_samples(), 4);
        assert_eq!(dl.get_sample(0, 1), 0.0);
    }
}
