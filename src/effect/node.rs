/// A block processor with named, clampable parameters.
///
/// Every `dsp` component that a host would expose as a standalone effect
/// implements this, so it can be wrapped in an
/// [`EffectProcessor`](crate::effect::EffectProcessor) and driven by
/// [`ControlMessage`](crate::effect::ControlMessage)s.
pub trait Effect: Send {
    type Param: Copy + Send;

    /// Size buffers for the stream. Must be safe to call again with new
    /// values; never called on the audio thread.
    fn prepare(&mut self, sample_rate: f64, num_channels: usize, max_block_size: usize);

    fn process(&mut self, output: &mut [&mut [f32]], input: &[&[f32]], num_samples: usize);

    /// Zero transient state, keep parameters.
    fn clear(&mut self);

    /// Set a parameter. Out-of-range values are clamped, never rejected.
    fn set_param(&mut self, param: Self::Param, value: f32);

    fn get_param(&self, param: Self::Param) -> f32;
}

/// Allow boxed effects to be used as effects (for dynamic dispatch)
impl<P: Copy + Send + 'static> Effect for Box<dyn Effect<Param = P>> {
    type Param = P;

    fn prepare(&mut self, sample_rate: f64, num_channels: usize, max_block_size: usize) {
        (**self).prepare(sample_rate, num_channels, max_block_size)
    }

    fn process(&mut self, output: &mut [&mut [f32]], input: &[&[f32]], num_samples: usize) {
        (**self).process(output, input, num_samples)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn set_param(&mut self, param: P, value: f32) {
        (**self).set_param(param, value)
    }

    fn get_param(&self, param: P) -> f32 {
        (**self).get_param(param)
    }
}
