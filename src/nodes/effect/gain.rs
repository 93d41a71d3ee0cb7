//! Amplitude-scaling node

use dasp_graph::{Buffer, Input};

use crate::node::{mix_inputs, AudioNode, ProcessContext};
use crate::nodes::param::{AutomatedParam, ParamEvent};

/// Messages to control gain
#[derive(Clone, Copy, Debug)]
pub enum GainMessage {
    Gain(ParamEvent),
}

/// Sums its inputs and scales them by an automatable gain.
///
/// Used for pin amplitudes, waveform levels and output bus VCAs.
pub struct Gain {
    gain: AutomatedParam,
}

impl Gain {
    /// Gain node starting at `gain`
    pub fn new(gain: f32) -> Self {
        Self {
            gain: AutomatedParam::new(gain),
        }
    }

    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain.value()
    }
}

impl AudioNode for Gain {
    type Message = GainMessage;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = GainMessage>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                GainMessage::Gain(event) => self.gain.schedule(event),
            }
        }

        let Some((first, rest)) = outputs.split_first_mut() else {
            return;
        };

        mix_inputs(inputs, first);
        for (i, sample) in first.iter_mut().enumerate() {
            *sample *= self.gain.tick(ctx, ctx.frame + i as u64);
        }

        for buffer in rest.iter_mut() {
            buffer.copy_from_slice(first);
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }
}
