//! Core node trait and types

use core::fmt;

use dasp_graph::{Buffer, Input};

/// Frames per processing block (fixed by `dasp_graph`)
pub const BLOCK_LEN: usize = 64;

/// Context available during audio processing
#[derive(Clone, Copy, Debug)]
pub struct ProcessContext {
    pub sample_rate: u32,
    pub buffer_size: usize,
    /// Frame index of the first sample in the current block
    pub frame: u64,
}

impl ProcessContext {
    /// Seconds → frames at this context's sample rate
    #[inline]
    pub fn frames(&self, seconds: f32) -> f32 {
        seconds * self.sample_rate as f32
    }
}

/// Unique identifier for a node within a graph
///
/// Ids are never reused, so an id held after its node was removed simply
/// stops resolving.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Build an id from its raw value.
    ///
    /// Intended for alternative [`AudioRuntime`](crate::AudioRuntime)
    /// implementations that mint their own ids.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The core trait for audio processing nodes
///
/// Nodes receive parameter updates via an iterator of messages,
/// processed at the start of each audio block.
pub trait AudioNode: Send + 'static {
    /// Message type for parameter updates (use `()` if none needed)
    type Message: Send + 'static;

    /// Process one block of audio
    ///
    /// 1. Drain and handle all pending messages
    /// 2. Read from inputs, write to outputs
    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = Self::Message>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    );

    /// Number of input channels (0 for sources)
    fn num_inputs(&self) -> usize { 0 }

    /// Number of output channels
    fn num_outputs(&self) -> usize { 1 }
}

/// Sum every channel of every input into `out`.
///
/// Matrix signals are mono; multi-channel inputs are folded down.
pub(crate) fn mix_inputs(inputs: &[Input], out: &mut Buffer) {
    out.iter_mut().for_each(|s| *s = 0.0);
    for input in inputs {
        for buffer in input.buffers() {
            for (o, i) in out.iter_mut().zip(buffer.iter()) {
                *o += *i;
            }
        }
    }
}
