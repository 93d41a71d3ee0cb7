//! Audio source nodes (generators)
//!
//! Every generator shares the same one-way lifecycle: it is silent until
//! started, and once stopped it can never run again.

mod constant;
mod noise;
pub(crate) mod oscillator;
mod shaped;

pub use constant::{Constant, ConstantMessage};
pub use noise::{Noise, NoiseMessage};
pub use oscillator::{Oscillator, OscillatorMessage};
pub use shaped::{ShapedMessage, ShapedOscillator};

/// Lifecycle of a generator node
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Playback {
    Idle,
    Running,
    Stopped,
}

impl Playback {
    pub(crate) fn start(&mut self) {
        if *self == Playback::Idle {
            *self = Playback::Running;
        }
    }

    pub(crate) fn stop(&mut self) {
        *self = Playback::Stopped;
    }
}
