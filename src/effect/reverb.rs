#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::lfo::LfoShape;
use crate::dsp::reverb::{DattorroReverb, KeithBarrReverb};
use crate::effect::node::Effect;

/// Plate reverb parameters. Units match the matching `DattorroReverb`
/// setter.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DattorroParam {
    /// Pre-delay in ms (0 - 100)
    PreDelay,
    /// Input low-pass coefficient (0.0 = dark, 1.0 = open)
    Tone,
    InputDiffusion1,
    InputDiffusion2,
    DecayDiffusion1,
    DecayDiffusion2,
    /// 0.0 = sine, 1.0 = triangle
    LfoShape,
    LfoFrequency,
    /// Modulation swing in ms (0 - 4)
    LfoDepth,
    /// Modulation offset in ms (0 - 2)
    LfoOffset,
    /// Tank damping coefficient (0.0 = dark, 1.0 = bright)
    Brightness,
    /// Tank feedback (0 - 0.99)
    Decay,
}

fn shape_from_value(value: f32) -> LfoShape {
    if value >= 0.5 {
        LfoShape::Triangle
    } else {
        LfoShape::Sine
    }
}

fn shape_to_value(shape: LfoShape) -> f32 {
    match shape {
        LfoShape::Sine => 0.0,
        LfoShape::Triangle => 1.0,
    }
}

impl Effect for DattorroReverb {
    type Param = DattorroParam;

    // Stereo out from one or two input channels whatever the host layout
    fn prepare(&mut self, sample_rate: f64, _num_channels: usize, _max_block_size: usize) {
        DattorroReverb::prepare(self, sample_rate);
    }

    fn process(&mut self, output: &mut [&mut [f32]], input: &[&[f32]], num_samples: usize) {
        DattorroReverb::process(self, output, input, num_samples);
    }

    fn clear(&mut self) {
        DattorroReverb::clear(self);
    }

    fn set_param(&mut self, param: DattorroParam, value: f32) {
        match param {
            DattorroParam::PreDelay => self.set_pre_delay(value),
            DattorroParam::Tone => self.set_tone(value),
            DattorroParam::InputDiffusion1 => self.set_input_diffusion_1(value),
            DattorroParam::InputDiffusion2 => self.set_input_diffusion_2(value),
            DattorroParam::DecayDiffusion1 => self.set_decay_diffusion_1(value),
            DattorroParam::DecayDiffusion2 => self.set_decay_diffusion_2(value),
            DattorroParam::LfoShape => self.set_lfo_shape(shape_from_value(value)),
            DattorroParam::LfoFrequency => self.set_lfo_frequency(value),
            DattorroParam::LfoDepth => self.set_lfo_depth(value),
            DattorroParam::LfoOffset => self.set_lfo_offset(value),
            DattorroParam::Brightness => self.set_brightness(value),
            DattorroParam::Decay => self.set_decay(value),
        }
    }

    fn get_param(&self, param: DattorroParam) -> f32 {
        match param {
            DattorroParam::PreDelay => self.pre_delay(),
            DattorroParam::Tone => self.tone(),
            DattorroParam::InputDiffusion1 => self.input_diffusion_1(),
            DattorroParam::InputDiffusion2 => self.input_diffusion_2(),
            DattorroParam::DecayDiffusion1 => self.decay_diffusion_1(),
            DattorroParam::DecayDiffusion2 => self.decay_diffusion_2(),
            DattorroParam::LfoShape => shape_to_value(self.lfo().shape()),
            DattorroParam::LfoFrequency => self.lfo().frequency(),
            DattorroParam::LfoDepth => self.lfo().depth(),
            DattorroParam::LfoOffset => self.lfo().offset(),
            DattorroParam::Brightness => self.brightness(),
            DattorroParam::Decay => self.decay(),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeithBarrParam {
    /// Ring feedback gain (0 - 0.9)
    Damping,
    /// Per-node low-pass coefficient (0.0 = dark, 1.0 = bright)
    Brightness,
}

impl Effect for KeithBarrReverb {
    type Param = KeithBarrParam;

    fn prepare(&mut self, sample_rate: f64, _num_channels: usize, _max_block_size: usize) {
        KeithBarrReverb::prepare(self, sample_rate);
    }

    fn process(&mut self, output: &mut [&mut [f32]], input: &[&[f32]], num_samples: usize) {
        KeithBarrReverb::process(self, output, input, num_samples);
    }

    fn clear(&mut self) {
        KeithBarrReverb::clear(self);
    }

    fn set_param(&mut self, param: KeithBarrParam, value: f32) {
        match param {
            KeithBarrParam::Damping => self.set_damping(value),
            KeithBarrParam::Brightness => self.set_brightness(value),
        }
    }

    fn get_param(&self, param: KeithBarrParam) -> f32 {
        match param {
            KeithBarrParam::Damping => self.damping(),
            KeithBarrParam::Brightness => self.brightness(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dattorro_lfo_shape_param() {
        let mut reverb = DattorroReverb::new();
        assert_eq!(reverb.get_param(DattorroParam::LfoShape), 0.0);
        Effect::set_param(&mut reverb, DattorroParam::LfoShape, 1.0);
        assert_eq!(reverb.lfo().shape(), LfoShape::Triangle);
        assert_eq!(reverb.get_param(DattorroParam::LfoShape), 1.0);
    }

    #[test]
    fn test_dattorro_params_clamp() {
        let mut reverb = DattorroReverb::new();
        Effect::set_param(&mut reverb, DattorroParam::Decay, 1.5);
        Effect::set_param(&mut reverb, DattorroParam::PreDelay, 500.0);
        Effect::set_param(&mut reverb, DattorroParam::LfoDepth, 10.0);
        assert_eq!(reverb.get_param(DattorroParam::Decay), 0.99);
        assert_eq!(reverb.get_param(DattorroParam::PreDelay), 100.0);
        assert_eq!(reverb.get_param(DattorroParam::LfoDepth), 4.0);
    }

    #[test]
    fn test_keith_barr_damping_param_clamps() {
        let mut reverb = KeithBarrReverb::new();
        Effect::set_param(&mut reverb, KeithBarrParam::Damping, 0.95);
        assert_eq!(reverb.get_param(KeithBarrParam::Damping), 0.9);
    }

    #[test]
    fn test_mono_in_stereo_out_through_trait() {
        let mut reverb = DattorroReverb::new();
        Effect::prepare(&mut reverb, 48_000.0, 2, 512);

        let mut input = vec![0.0; 4_800];
        input[0] = 1.0;
        let mut left = vec![0.0; 4_800];
        let mut right = vec![0.0; 4_800];
        Effect::process(&mut reverb, &mut [&mut left[..], &mut right[..]], &[&input[..]], 4_800);

        assert!(left.iter().any(|&x| x != 0.0));
        assert!(right.iter().any(|&x| x != 0.0));
    }
}
