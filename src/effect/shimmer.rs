#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::shimmer::{Shimmer, ShimmerReverb};
use crate::effect::node::Effect;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShimmerParam {
    /// Buildup delay in ms
    Buildup,
    /// First shifter ratio (0.25 - 2)
    Shift1,
    /// Second shifter ratio (0.25 - 2)
    Shift2,
}

impl Effect for Shimmer {
    type Param = ShimmerParam;

    fn prepare(&mut self, sample_rate: f64, num_channels: usize, _max_block_size: usize) {
        Shimmer::prepare(self, sample_rate, num_channels);
    }

    fn process(&mut self, output: &mut [&mut [f32]], input: &[&[f32]], num_samples: usize) {
        Shimmer::process(self, output, input, num_samples);
    }

    fn clear(&mut self) {
        Shimmer::clear(self);
    }

    fn set_param(&mut self, param: ShimmerParam, value: f32) {
        match param {
            ShimmerParam::Buildup => self.set_buildup(value),
            ShimmerParam::Shift1 => self.set_shift_1(value),
            ShimmerParam::Shift2 => self.set_shift_2(value),
        }
    }

    fn get_param(&self, param: ShimmerParam) -> f32 {
        match param {
            ShimmerParam::Buildup => self.buildup(),
            ShimmerParam::Shift1 => self.shift_1(),
            ShimmerParam::Shift2 => self.shift_2(),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShimmerReverbParam {
    Buildup,
    Shift1,
    Shift2,
    /// Regeneration gain (0 - 0.5)
    Amount,
    /// Ring reverb feedback (0 - 0.9)
    Damping,
    /// Plate damping coefficient (0 - 1)
    Brightness,
    /// Plate decay (0 - 0.99)
    Decay,
}

impl Effect for ShimmerReverb {
    type Param = ShimmerReverbParam;

    fn prepare(&mut self, sample_rate: f64, _num_channels: usize, _max_block_size: usize) {
        ShimmerReverb::prepare(self, sample_rate);
    }

    fn process(&mut self, output: &mut [&mut [f32]], input: &[&[f32]], num_samples: usize) {
        ShimmerReverb::process(self, output, input, num_samples);
    }

    fn clear(&mut self) {
        ShimmerReverb::clear(self);
    }

    fn set_param(&mut self, param: ShimmerReverbParam, value: f32) {
        match param {
            ShimmerReverbParam::Buildup => self.set_buildup(value),
            ShimmerReverbParam::Shift1 => self.set_shift_1(value),
            ShimmerReverbParam::Shift2 => self.set_shift_2(value),
            ShimmerReverbParam::Amount => self.set_amount(value),
            ShimmerReverbParam::Damping => self.set_damping(value),
            ShimmerReverbParam::Brightness => self.set_brightness(value),
            ShimmerReverbParam::Decay => self.set_decay(value),
        }
    }

    fn get_param(&self, param: ShimmerReverbParam) -> f32 {
        match param {
            ShimmerReverbParam::Buildup => self.shimmer().buildup(),
            ShimmerReverbParam::Shift1 => self.shimmer().shift_1(),
            ShimmerReverbParam::Shift2 => self.shimmer().shift_2(),
            ShimmerReverbParam::Amount => self.amount(),
            ShimmerReverbParam::Damping => self.ring().damping(),
            ShimmerReverbParam::Brightness => self.plate().brightness(),
            ShimmerReverbParam::Decay => self.plate().decay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shimmer_params() {
        let mut shimmer = Shimmer::default();
        Effect::set_param(&mut shimmer, ShimmerParam::Buildup, 40.0);
        Effect::set_param(&mut shimmer, ShimmerParam::Shift1, 1.5);
        assert_eq!(shimmer.get_param(ShimmerParam::Buildup), 40.0);
        assert_eq!(shimmer.get_param(ShimmerParam::Shift1), 1.5);
        assert_eq!(shimmer.get_param(ShimmerParam::Shift2), 0.5);
    }

    #[test]
    fn test_shimmer_reverb_params_clamp() {
        let mut reverb = ShimmerReverb::new();
        let cases = [
            (ShimmerReverbParam::Amount, 1.0, 0.5),
            (ShimmerReverbParam::Damping, 1.0, 0.9),
            (ShimmerReverbParam::Decay, 1.0, 0.99),
            (ShimmerReverbParam::Shift2, 0.0, 0.25),
            (ShimmerReverbParam::Buildup, 0.0, 1.0),
        ];
        for (param, value, expected) in cases {
            Effect::set_param(&mut reverb, param, value);
            assert_eq!(reverb.get_param(param), expected, "{:?}", param);
        }
    }
}
