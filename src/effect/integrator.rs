#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::integrator::LeakyIntegrator;
use crate::effect::node::Effect;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegratorParam {
    /// Input weight, 0.0 = frozen, 1.0 = passthrough
    Coeff,
}

impl Effect for LeakyIntegrator {
    type Param = IntegratorParam;

    // Always stereo; channel count only limits what `process` touches
    fn prepare(&mut self, sample_rate: f64, _num_channels: usize, _max_block_size: usize) {
        LeakyIntegrator::prepare(self, sample_rate);
    }

    fn process(&mut self, output: &mut [&mut [f32]], input: &[&[f32]], num_samples: usize) {
        LeakyIntegrator::process(self, output, input, num_samples);
    }

    fn clear(&mut self) {
        LeakyIntegrator::clear(self);
    }

    fn set_param(&mut self, param: IntegratorParam, value: f32) {
        match param {
            IntegratorParam::Coeff => self.set_coeff(value),
        }
    }

    fn get_param(&self, param: IntegratorParam) -> f32 {
        match param {
            IntegratorParam::Coeff => self.coeff(),
        }
    }
}
