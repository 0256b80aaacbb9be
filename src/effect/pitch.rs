#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::pitch::GranularPitchShifter;
use crate::effect::node::Effect;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PitchParam {
    /// Playback rate, 0.5 = octave down, 2.0 = octave up
    Ratio,
}

impl Effect for GranularPitchShifter {
    type Param = PitchParam;

    fn prepare(&mut self, sample_rate: f64, num_channels: usize, _max_block_size: usize) {
        GranularPitchShifter::prepare(self, sample_rate, num_channels);
    }

    fn process(&mut self, output: &mut [&mut [f32]], input: &[&[f32]], num_samples: usize) {
        GranularPitchShifter::process(self, output, input, num_samples);
    }

    fn clear(&mut self) {
        GranularPitchShifter::clear(self);
    }

    fn set_param(&mut self, param: PitchParam, value: f32) {
        match param {
            PitchParam::Ratio => self.set_pitch_ratio(value),
        }
    }

    fn get_param(&self, param: PitchParam) -> f32 {
        match param {
            PitchParam::Ratio => self.pitch_ratio(),
        }
    }
}
