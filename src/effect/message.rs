#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Control change for an [`EffectProcessor`](crate::effect::EffectProcessor),
/// sent from a UI/control thread and applied at the next block boundary.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ControlMessage<P> {
    SetParam { param: P, value: f32 },
    SetEnabled(bool),
    SetMix(f32),
    Clear,
}

pub trait ControlReceiver<P> {
    fn pop(&mut self) -> Option<ControlMessage<P>>;
}

#[cfg(feature = "rtrb")]
impl<P> ControlReceiver<P> for Consumer<ControlMessage<P>> {
    fn pop(&mut self) -> Option<ControlMessage<P>> {
        Consumer::pop(self).ok()
    }
}

/// Lock-free single-producer/single-consumer control queue.
#[cfg(feature = "rtrb")]
pub fn control_channel<P>(
    capacity: usize,
) -> (Producer<ControlMessage<P>>, Consumer<ControlMessage<P>>) {
    RingBuffer::<ControlMessage<P>>::new(capacity.max(1))
}

/// Receiver that never has anything to deliver.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoControl;

impl<P> ControlReceiver<P> for NoControl {
    fn pop(&mut self) -> Option<ControlMessage<P>> {
        None
    }
}
