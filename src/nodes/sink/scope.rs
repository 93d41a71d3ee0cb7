//! Monitor input (oscilloscope channel)

use dasp_graph::{Buffer, Input};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::node::{mix_inputs, AudioNode, ProcessContext, BLOCK_LEN};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeMessage {
    /// Every connection into this monitor is gone; stop capturing
    SignalLost,
}

/// Captures whatever is patched into a monitor input.
///
/// Captured samples go to a ring buffer read by the display through a
/// [`ScopeReader`]. After [`ScopeMessage::SignalLost`] the scope freezes
/// until signal arrives on its inputs again. The node's own output is
/// always silent. Like every node it has a keepalive edge into the graph's
/// root, which is what gets it processed each block.
pub struct Scope {
    producer: Producer<f32>,
    scratch: Buffer,
    frozen: bool,
}

impl Scope {
    /// Create a scope and the reader for its captured samples
    pub fn new(capacity: usize) -> (Self, ScopeReader) {
        let (producer, consumer) = RingBuffer::new(capacity.max(BLOCK_LEN));
        let scope = Self {
            producer,
            scratch: Buffer::default(),
            frozen: false,
        };
        (scope, ScopeReader { consumer })
    }
}

impl AudioNode for Scope {
    type Message = ScopeMessage;

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        messages: impl Iterator<Item = ScopeMessage>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                ScopeMessage::SignalLost => self.frozen = true,
            }
        }

        for buffer in outputs.iter_mut() {
            buffer.iter_mut().for_each(|s| *s = 0.0);
        }

        if inputs.is_empty() {
            return;
        }
        self.frozen = false;

        mix_inputs(inputs, &mut self.scratch);
        // a reader that falls behind misses the newest samples
        for &sample in self.scratch.iter() {
            if self.producer.push(sample).is_err() {
                break;
            }
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { usize::MAX }
}

impl Scope {
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

/// Display-side half of a [`Scope`]
pub struct ScopeReader {
    consumer: Consumer<f32>,
}

impl ScopeReader {
    /// Drain everything captured so far
    pub fn drain(&mut self) -> Vec<f32> {
        core::iter::from_fn(|| self.consumer.pop().ok()).collect()
    }

    /// Peak absolute level of everything captured so far (drains)
    pub fn peak(&mut self) -> f32 {
        self.drain().into_iter().fold(0.0, |acc, s| acc.max(s.abs()))
    }
}
