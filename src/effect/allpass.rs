#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::allpass::AllPass;
use crate::effect::node::Effect;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllPassParam {
    /// Delay time in ms
    DelayTime,
    /// Feedback/feedforward coefficient (clamped to ±0.98)
    Coeff,
}

impl Effect for AllPass {
    type Param = AllPassParam;

    fn prepare(&mut self, sample_rate: f64, num_channels: usize, _max_block_size: usize) {
        AllPass::prepare(self, sample_rate, num_channels);
    }

    fn process(&mut self, output: &mut [&mut [f32]], input: &[&[f32]], num_samples: usize) {
        AllPass::process(self, output, input, num_samples);
    }

    fn clear(&mut self) {
        AllPass::clear(self);
    }

    fn set_param(&mut self, param: AllPassParam, value: f32) {
        match param {
            AllPassParam::DelayTime => self.set_delay_time(value),
            AllPassParam::Coeff => self.set_coeff(value),
        }
    }

    fn get_param(&self, param: AllPassParam) -> f32 {
        match param {
            AllPassParam::DelayTime => self.delay_time(),
            AllPassParam::Coeff => self.coeff(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_round_trip_through_trait() {
        let mut allpass = AllPass::new(10.0, 0.5, 1);
        Effect::set_param(&mut allpass, AllPassParam::Coeff, 2.0);
        Effect::set_param(&mut allpass, AllPassParam::DelayTime, 4.0);
        assert_eq!(allpass.get_param(AllPassParam::Coeff), 0.98);
        assert_eq!(allpass.get_param(AllPassParam::DelayTime), 4.0);
    }

    #[test]
    fn test_prepare_through_trait_sets_channels() {
        let mut allpass = AllPass::new(10.0, 0.5, 1);
        Effect::prepare(&mut allpass, 44_100.0, 2, 256);
        assert_eq!(allpass.num_channels(), 2);
        assert_eq!(allpass.delay_samples(), 441);
    }

    #[test]
    fn test_delay_time_reports_applied_value() {
        let mut allpass = AllPass::new(10.0, 0.5, 1);
        Effect::set_param(&mut allpass, AllPassParam::DelayTime, 20.0);
        let reported = allpass.get_param(AllPassParam::DelayTime);
        assert_eq!(reported, 10.0);
        assert_eq!(allpass.delay_samples(), 480, "reported {} ms", reported);

        let mut allpass = AllPass::new(10.0, 0.5, 1).with_max_delay_ms(30.0);
        Effect::set_param(&mut allpass, AllPassParam::DelayTime, 20.0);
        assert_eq!(allpass.get_param(AllPassParam::DelayTime), 20.0);
        assert_eq!(allpass.delay_samples(), 960);
    }
}
