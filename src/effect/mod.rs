//! Effect layer: the host-facing wrapper around `dsp` components
//!
//! Each standalone processor implements [`Effect`], which gives it a
//! parameter enum and a uniform `prepare`/`process`/`clear` surface.
//! [`EffectProcessor`] adds bypass and dry/wet on top, and takes
//! [`ControlMessage`]s from another thread through a lock-free queue.
//!
//! ```ignore
//! let (mut tx, mut rx) = control_channel(64);
//! let mut shimmer = EffectProcessor::new(ShimmerReverb::new()).with_mix(0.4);
//!
//! // control thread
//! tx.push(ControlMessage::SetParam { param: ShimmerReverbParam::Amount, value: 0.35 })?;
//!
//! // audio thread
//! shimmer.process_block(&mut rx, &mut [left, right], num_samples);
//! ```

pub mod allpass;
pub mod integrator;
pub mod message;
pub mod node;
pub mod pitch;
pub mod processor;
pub mod reverb;
pub mod shimmer;

pub use allpass::AllPassParam;
pub use integrator::IntegratorParam;
#[cfg(feature = "rtrb")]
pub use message::control_channel;
pub use message::{ControlMessage, ControlReceiver, NoControl};
pub use node::Effect;
pub use pitch::PitchParam;
pub use processor::EffectProcessor;
pub use reverb::{DattorroParam, KeithBarrParam};
pub use shimmer::{ShimmerParam, ShimmerReverbParam};
