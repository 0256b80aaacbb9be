//! Parameter smoothing.

/*
Ramps
=====

Jumping a gain or coefficient from one value to another between two samples
puts a step into the audio, which we hear as a click. A ramp spreads the
change across a short, fixed time instead.

Vocabulary
----------

  current     The value handed to the audio path on this sample.

  target      Where the ramp is heading. Set from the control side.

  ramp time   How long a full transition takes, in milliseconds. Fixed at
              construction; converted to a step count at `prepare`.

  increment   How much `current` moves per sample:

                  increment = (target - current) / steps

The Shape
---------

  value
   v1 ┤            ___________
      │          ╱
      │        ╱
      │      ╱
   v0 ┤_____╱
      └─────┬──────┬──────────→ samples
         set_target  + steps

Linear ramps are monotonic and land exactly on the target: the final step
assigns `target` instead of adding the increment, so floating point error
never carries the value past it.

One ramp value is shared by every channel of a sample. `apply_gain` on a
stereo block advances the ramp once per sample, not once per channel.
*/

/// Default smoothing time used by coefficient ramps across the crate.
pub const DEFAULT_RAMP_MS: f32 = 10.0;

/// Linear parameter smoother.
#[derive(Debug, Clone)]
pub struct Ramp {
    ramp_time_ms: f32,
    ramp_samples: u32,
    current: f32,
    target: f32,
    increment: f32,
    steps_left: u32,
}

impl Ramp {
    /// Create a ramp that takes `ramp_time_ms` to reach a new target.
    ///
    /// The step count assumes 48 kHz until [`prepare`](Self::prepare) is
    /// called with the real sample rate.
    pub fn new(ramp_time_ms: f32) -> Self {
        let ramp_time_ms = ramp_time_ms.max(0.0);
        Self {
            ramp_time_ms,
            ramp_samples: Self::steps_for(ramp_time_ms, 48_000.0),
            current: 0.0,
            target: 0.0,
            increment: 0.0,
            steps_left: 0,
        }
    }

    fn steps_for(ramp_time_ms: f32, sample_rate: f64) -> u32 {
        (f64::from(ramp_time_ms) * 0.001 * sample_rate).round().max(0.0) as u32
    }

    /// Recompute the step count for a new sample rate.
    ///
    /// With `skip_ramp` the ramp snaps to `init_value`; otherwise it keeps
    /// heading toward its current target at the new rate.
    pub fn prepare(&mut self, sample_rate: f64, skip_ramp: bool, init_value: f32) {
        self.ramp_samples = Self::steps_for(self.ramp_time_ms, sample_rate.max(1.0));

        if skip_ramp {
            self.set_target(init_value, true);
        } else {
            let target = self.target;
            self.set_target(target, false);
        }
    }

    /// Set a new destination. `force` jumps straight to it.
    pub fn set_target(&mut self, target: f32, force: bool) {
        self.target = target;

        if force || self.ramp_samples == 0 || target == self.current {
            self.current = target;
            self.increment = 0.0;
            self.steps_left = 0;
            return;
        }

        self.steps_left = self.ramp_samples;
        self.increment = (target - self.current) / self.ramp_samples as f32;
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn get_next(&mut self) -> f32 {
        if self.steps_left > 0 {
            self.steps_left -= 1;
            if self.steps_left == 0 {
                self.current = self.target;
            } else {
                self.current += self.increment;
            }
        }
        self.current
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_ramping(&self) -> bool {
        self.steps_left > 0
    }

    /// Multiply every channel of one frame by the next ramp value.
    #[inline]
    pub fn apply_gain_frame(&mut self, frame: &mut [f32]) {
        let gain = self.get_next();
        for sample in frame.iter_mut() {
            *sample *= gain;
        }
    }

    /// Add the next ramp value to every channel of one frame.
    #[inline]
    pub fn apply_sum_frame(&mut self, frame: &mut [f32]) {
        let offset = self.get_next();
        for sample in frame.iter_mut() {
            *sample += offset;
        }
    }

    /// Multiply a block by the ramp, one step per sample.
    pub fn apply_gain(&mut self, block: &mut [&mut [f32]], num_samples: usize) {
        self.apply_with(block, num_samples, |sample, value| *sample *= value);
    }

    /// Multiply a block by `1 - ramp`, one step per sample.
    ///
    /// Pairs with [`apply_gain`](Self::apply_gain) on a second buffer to
    /// crossfade between two signals with one ramp.
    pub fn apply_inverse_gain(&mut self, block: &mut [&mut [f32]], num_samples: usize) {
        self.apply_with(block, num_samples, |sample, value| *sample *= 1.0 - value);
    }

    /// Add the ramp to a block, one step per sample.
    pub fn apply_sum(&mut self, block: &mut [&mut [f32]], num_samples: usize) {
        self.apply_with(block, num_samples, |sample, value| *sample += value);
    }

    #[inline]
    fn apply_with(&mut self, block: &mut [&mut [f32]], num_samples: usize, op: impl Fn(&mut f32, f32)) {
        let len = block
            .iter()
            .map(|channel| channel.len())
            .min()
            .unwrap_or(0)
            .min(num_samples);

        // Fast path once the ramp has settled
        if !self.is_ramping() {
            let value = self.current;
            for channel in block.iter_mut() {
                for sample in channel[..len].iter_mut() {
                    op(sample, value);
                }
            }
            return;
        }

        for n in 0..len {
            let value = self.get_next();
            for channel in block.iter_mut() {
                op(&mut channel[n], value);
            }
        }
    }
}
