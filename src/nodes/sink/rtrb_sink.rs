//! Ring buffer output for offline rendering and capture

use dasp_graph::{Buffer, Input};
use rtrb::Producer;

use crate::node::{mix_inputs, AudioNode, ProcessContext};

/// Hands the master bus to another thread through an rtrb ring buffer.
///
/// The master signal is mono; with `channels > 1` every frame is written
/// that many times, interleaved. A block is written whole or not at all.
pub struct RtrbSink {
    producer: Producer<f32>,
    channels: usize,
    scratch: Buffer,
    dropped_blocks: u64,
}

impl RtrbSink {
    pub fn new(producer: Producer<f32>, channels: usize) -> Self {
        Self {
            producer,
            channels: channels.max(1),
            scratch: Buffer::default(),
            dropped_blocks: 0,
        }
    }

    pub fn mono(producer: Producer<f32>) -> Self {
        Self::new(producer, 1)
    }

    /// Blocks skipped because the reader fell behind
    #[inline]
    pub fn dropped_blocks(&self) -> u64 {
        self.dropped_blocks
    }
}

impl AudioNode for RtrbSink {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        inputs: &[Input],
        _outputs: &mut [Buffer],
    ) {
        if inputs.is_empty() {
            return;
        }

        let needed = self.scratch.len() * self.channels;
        let Ok(chunk) = self.producer.write_chunk_uninit(needed) else {
            self.dropped_blocks += 1;
            return;
        };

        mix_inputs(inputs, &mut self.scratch);
        let frames = self
            .scratch
            .iter()
            .flat_map(|&sample| core::iter::repeat(sample).take(self.channels));
        chunk.fill_from_iter(frames);
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { 0 }
}
