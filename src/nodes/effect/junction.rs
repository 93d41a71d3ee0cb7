//! Summing junction

use dasp_graph::{Buffer, Input};

use crate::node::{mix_inputs, AudioNode, ProcessContext};

/// Where several patch cords meet: voice taps, bus inputs, pitch CV.
///
/// Everything patched in is folded to mono and summed at unity gain, so a
/// junction with nothing connected outputs silence.
#[derive(Default)]
pub struct Junction;

impl AudioNode for Junction {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        if let Some(out) = outputs.first_mut() {
            mix_inputs(inputs, out);
        }
    }

    fn num_inputs(&self) -> usize {
        usize::MAX
    }
}
