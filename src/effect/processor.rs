use crate::dsp::ramp::Ramp;
use crate::effect::message::{ControlMessage, ControlReceiver};
use crate::effect::node::Effect;
use crate::{MAX_BLOCK_SIZE, MAX_CHANNELS};

/*
Effect Processor
================

Wraps an effect with the two controls every host exposes: bypass and
dry/wet mix.

  dry ──┬─────────────────────────────→ × (1 - g) ──→ (+) ──→ out
        │                                            ↑
        └──→ [effect] ──→ wet ──────────→ × g ───────┘

        g = enable × mix

Both `enable` and `mix` are ramps (50 ms), so toggling bypass or moving
the mix knob fades instead of clicking. Once the enable ramp reaches zero
the output is exactly the dry signal.

The effect keeps running while bypassed, so its tail is already there
when it is switched back on.

Control Messages
----------------

Messages from another thread are drained only at the start of a block,
never in the middle of one.
*/

pub const CONTROL_RAMP_MS: f32 = 50.0;

pub struct EffectProcessor<E: Effect> {
    effect: E,
    enable: Ramp,
    mix: Ramp,
    wet: [Vec<f32>; MAX_CHANNELS],
    gain: Vec<f32>,
    sample_rate: f64,
    num_channels: usize,
    max_block_size: usize,
}

impl<E: Effect> EffectProcessor<E> {
    /// Enabled, fully wet, prepared for 48 kHz stereo.
    pub fn new(effect: E) -> Self {
        let mut enable = Ramp::new(CONTROL_RAMP_MS);
        enable.set_target(1.0, true);
        let mut mix = Ramp::new(CONTROL_RAMP_MS);
        mix.set_target(1.0, true);

        let mut processor = Self {
            effect,
            enable,
            mix,
            wet: [Vec::new(), Vec::new()],
            gain: Vec::new(),
            sample_rate: 48_000.0,
            num_channels: MAX_CHANNELS,
            max_block_size: MAX_BLOCK_SIZE,
        };
        processor.prepare(48_000.0, MAX_CHANNELS, MAX_BLOCK_SIZE);
        processor
    }

    pub fn with_mix(mut self, mix: f32) -> Self {
        self.mix.set_target(mix.clamp(0.0, 1.0), true);
        self
    }

    pub fn prepare(&mut self, sample_rate: f64, num_channels: usize, max_block_size: usize) {
        self.sample_rate = sample_rate.max(1.0);
        self.num_channels = num_channels.clamp(1, MAX_CHANNELS);
        self.max_block_size = max_block_size.max(1);

        for channel in &mut self.wet {
            channel.clear();
            channel.resize(self.max_block_size, 0.0);
        }
        self.gain.clear();
        self.gain.resize(self.max_block_size, 0.0);

        let enable = self.enable.target();
        self.enable.prepare(self.sample_rate, true, enable);
        let mix = self.mix.target();
        self.mix.prepare(self.sample_rate, true, mix);

        self.effect
            .prepare(self.sample_rate, self.num_channels, self.max_block_size);
    }

    pub fn clear(&mut self) {
        self.effect.clear();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enable.set_target(if enabled { 1.0 } else { 0.0 }, false);
    }

    pub fn is_enabled(&self) -> bool {
        self.enable.target() > 0.5
    }

    /// Dry/wet balance, `[0, 1]`.
    pub fn set_mix(&mut self, mix: f32) {
        self.mix.set_target(mix.clamp(0.0, 1.0), false);
    }

    pub fn mix(&self) -> f32 {
        self.mix.target()
    }

    pub fn set_param(&mut self, param: E::Param, value: f32) {
        self.effect.set_param(param, value);
    }

    pub fn get_param(&self, param: E::Param) -> f32 {
        self.effect.get_param(param)
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    pub fn effect_mut(&mut self) -> &mut E {
        &mut self.effect
    }

    pub fn apply(&mut self, message: ControlMessage<E::Param>) {
        match message {
            ControlMessage::SetParam { param, value } => self.effect.set_param(param, value),
            ControlMessage::SetEnabled(enabled) => self.set_enabled(enabled),
            ControlMessage::SetMix(mix) => self.set_mix(mix),
            ControlMessage::Clear => self.effect.clear(),
        }
    }

    /// Apply every pending message.
    pub fn drain<R: ControlReceiver<E::Param>>(&mut self, receiver: &mut R) {
        while let Some(message) = receiver.pop() {
            self.apply(message);
        }
    }

    /// Drain `receiver`, then process one block in place.
    pub fn process_block<R: ControlReceiver<E::Param>>(
        &mut self,
        receiver: &mut R,
        buffer: &mut [&mut [f32]],
        num_samples: usize,
    ) {
        self.drain(receiver);
        self.process_in_place(buffer, num_samples);
    }

    /// Replace `buffer` with the dry/wet blend of itself and the effect.
    pub fn process_in_place(&mut self, buffer: &mut [&mut [f32]], num_samples: usize) {
        let channels = buffer.len().min(self.num_channels);
        if channels == 0 {
            return;
        }
        let len = buffer[..channels]
            .iter()
            .map(|channel| channel.len())
            .min()
            .unwrap_or(0)
            .min(num_samples);

        let mut start = 0;
        while start < len {
            let chunk = (len - start).min(self.max_block_size);
            self.process_chunk(buffer, channels, start, chunk);
            start += chunk;
        }
    }

    fn process_chunk(&mut self, buffer: &mut [&mut [f32]], channels: usize, start: usize, len: usize) {
        let end = start + len;

        {
            let [wet_left, wet_right] = &mut self.wet;
            let mut wet: [&mut [f32]; MAX_CHANNELS] = [&mut wet_left[..len], &mut wet_right[..len]];

            let dry: [&[f32]; MAX_CHANNELS] = [
                &buffer[0][start..end],
                &buffer[channels - 1][start..end],
            ];

            self.effect
                .process(&mut wet[..channels], &dry[..channels], len);
        }

        for g in &mut self.gain[..len] {
            *g = self.enable.get_next() * self.mix.get_next();
        }

        for (ch, channel) in buffer[..channels].iter_mut().enumerate() {
            let wet = &self.wet[ch][..len];
            for ((out, &wet), &g) in channel[start..end].iter_mut().zip(wet).zip(&self.gain[..len]) {
                *out = *out * (1.0 - g) + wet * g;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::message::NoControl;

    /// Inverts its input; parameter 0 is an output gain.
    struct Invert {
        gain: f32,
        prepared_block: usize,
    }

    impl Effect for Invert {
        type Param = u8;

        fn prepare(&mut self, _sample_rate: f64, _num_channels: usize, max_block_size: usize) {
            self.prepared_block = max_block_size;
        }

        fn process(&mut self, output: &mut [&mut [f32]], input: &[&[f32]], num_samples: usize) {
            assert!(num_samples <= self.prepared_block);
            for (out, inp) in output.iter_mut().zip(input) {
                for (o, i) in out[..num_samples].iter_mut().zip(&inp[..num_samples]) {
                    *o = -i * self.gain;
                }
            }
        }

        fn clear(&mut self) {}

        fn set_param(&mut self, _param: u8, value: f32) {
            self.gain = value;
        }

        fn get_param(&self, _param: u8) -> f32 {
            self.gain
        }
    }

    fn invert() -> Invert {
        Invert { gain: 1.0, prepared_block: 0 }
    }

    #[test]
    fn test_fully_wet_is_effect_output() {
        let mut processor = EffectProcessor::new(invert());
        let mut left = vec![0.5; 64];
        let mut right = vec![-0.25; 64];
        processor.process_in_place(&mut [&mut left[..], &mut right[..]], 64);

        assert!(left.iter().all(|&x| x == -0.5));
        assert!(right.iter().all(|&x| x == 0.25));
    }

    #[test]
    fn test_mix_zero_is_dry() {
        let mut processor = EffectProcessor::new(invert()).with_mix(0.0);
        let mut left = vec![0.5; 64];
        processor.process_in_place(&mut [&mut left[..]], 64);
        assert!(left.iter().all(|&x| x == 0.5));
    }

    #[test]
    fn test_half_mix_blends() {
        let mut processor = EffectProcessor::new(invert()).with_mix(0.5);
        let mut left = vec![1.0; 16];
        processor.process_in_place(&mut [&mut left[..]], 16);
        assert!(left.iter().all(|&x| x.abs() < 1e-6), "{:?}", left);
    }

    #[test]
    fn test_bypass_round_trip_converges_to_dry() {
        let mut processor = EffectProcessor::new(invert());
        processor.set_enabled(false);

        // 50 ms at 48 kHz is 2400 samples
        let mut block = vec![1.0; 512];
        let mut last = Vec::new();
        for _ in 0..10 {
            block.fill(1.0);
            processor.process_in_place(&mut [&mut block[..]], 512);
            last = block.clone();
        }
        assert!(last.iter().all(|&x| x == 1.0), "bypassed output should be dry");

        processor.set_enabled(true);
        processor.set_enabled(false);
        for _ in 0..10 {
            block.fill(1.0);
            processor.process_in_place(&mut [&mut block[..]], 512);
        }
        assert!(block.iter().all(|&x| x == 1.0));
    }

    #[test]
    fn test_disable_fades_without_jump() {
        let mut processor = EffectProcessor::new(invert());
        processor.set_enabled(false);

        let mut block = vec![1.0; 4_096];
        processor.process_in_place(&mut [&mut block[..]], 4_096);
        for pair in block.windows(2) {
            assert!((pair[1] - pair[0]).abs() < 0.01, "jump {} -> {}", pair[0], pair[1]);
        }
        assert_eq!(block[4_095], 1.0);
    }

    #[test]
    fn test_long_blocks_are_chunked() {
        let mut processor = EffectProcessor::new(invert());
        processor.prepare(48_000.0, 1, 100);

        let mut block = vec![0.25; 1_000];
        processor.process_in_place(&mut [&mut block[..]], 1_000);
        assert!(block.iter().all(|&x| x == -0.25));
    }

    #[test]
    fn test_short_slices_limit_length() {
        let mut processor = EffectProcessor::new(invert());
        let mut left = vec![1.0; 8];
        let mut right = vec![1.0; 4];
        processor.process_in_place(&mut [&mut left[..], &mut right[..]], 8);
        assert_eq!(&left[..4], &[-1.0; 4]);
        assert_eq!(&left[4..], &[1.0; 4]);
    }

    #[test]
    fn test_messages_apply_at_block_start() {
        let mut processor = EffectProcessor::new(invert());
        processor.apply(ControlMessage::SetParam { param: 0, value: 2.0 });
        assert_eq!(processor.get_param(0), 2.0);

        processor.apply(ControlMessage::SetMix(3.0));
        assert_eq!(processor.mix(), 1.0);

        processor.apply(ControlMessage::SetEnabled(false));
        assert!(!processor.is_enabled());

        let mut block = vec![0.0; 8];
        processor.process_block(&mut NoControl, &mut [&mut block[..]], 8);
        assert!(block.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_boxed_effect() {
        let boxed: Box<dyn Effect<Param = u8>> = Box::new(invert());
        let mut processor = EffectProcessor::new(boxed);
        processor.set_param(0, 0.5);

        let mut block = vec![1.0; 8];
        processor.process_in_place(&mut [&mut block[..]], 8);
        assert!(block.iter().all(|&x| x == -0.5));
    }
}
