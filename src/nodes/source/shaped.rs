//! Per-sample shaped oscillator
//!
//! The custom-processor counterpart of [`Oscillator`](super::Oscillator):
//! instead of swapping wave tables when the shape changes, the waveform is
//! computed analytically each sample from an automatable shaping value.

use dasp_graph::{Buffer, Input};

use crate::node::{AudioNode, ProcessContext};
use crate::nodes::param::{AutomatedParam, ParamEvent};
use crate::nodes::source::oscillator::Phasor;
use crate::nodes::source::Playback;
use crate::wave::{self, Waveform};

/// Messages to control a [`ShapedOscillator`]
#[derive(Clone, Copy, Debug)]
pub enum ShapedMessage {
    Frequency(ParamEvent),
    /// Pulse width or sine symmetry, depending on the waveform
    Shaping(ParamEvent),
    Start,
    Stop,
}

pub struct ShapedOscillator {
    waveform: Waveform,
    shaping: AutomatedParam,
    phasor: Phasor,
    playback: Playback,
}

impl ShapedOscillator {
    pub fn new(waveform: Waveform, frequency: f32, shaping: f32) -> Self {
        let shaping = match waveform {
            Waveform::Pulse => AutomatedParam::bounded(shaping, 0.01, 0.99),
            _ => AutomatedParam::bounded(shaping, -1.0, 1.0),
        };
        Self {
            waveform,
            shaping,
            phasor: Phasor::new(frequency),
            playback: Playback::Idle,
        }
    }

    #[inline]
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    #[inline]
    pub fn shaping(&self) -> f32 {
        self.shaping.value()
    }
}

impl AudioNode for ShapedOscillator {
    type Message = ShapedMessage;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = ShapedMessage>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                ShapedMessage::Frequency(event) => self.phasor.frequency.schedule(event),
                ShapedMessage::Shaping(event) => self.shaping.schedule(event),
                ShapedMessage::Start => self.playback.start(),
                ShapedMessage::Stop => self.playback.stop(),
            }
        }

        let Some((first, rest)) = outputs.split_first_mut() else {
            return;
        };

        if self.playback != Playback::Running {
            first.iter_mut().for_each(|s| *s = 0.0);
        } else {
            self.phasor.read_cv(inputs);
            for i in 0..first.len() {
                let shaping = self.shaping.tick(ctx, ctx.frame + i as u64);
                let phase = self.phasor.step(ctx, i);
                first[i] = wave::sample(self.waveform, phase, shaping);
            }
        }

        for buffer in rest.iter_mut() {
            buffer.copy_from_slice(first);
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }
}
