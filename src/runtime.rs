//! The audio runtime capability surface
//!
//! The routing engine never touches samples. Everything it does to the
//! audio graph goes through [`AudioRuntime`]: create nodes, wire them,
//! start generators and schedule parameter changes. [`AudioGraph`](crate::AudioGraph)
//! is the in-crate implementation; tests substitute recording runtimes.

use crate::error::RuntimeError;
use crate::node::NodeId;
use crate::nodes::ParamEvent;
use crate::wave::{PeriodicWave, Waveform};

/// What a runtime can do beyond the required surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Custom per-sample processors addressed by parameter messages
    pub custom_processors: bool,
}

/// Description of a node to create
#[derive(Clone, Debug)]
pub enum NodeSpec {
    /// Periodic generator reading a wave table
    Oscillator { wave: PeriodicWave, frequency: f32 },
    /// Custom per-sample processor; needs [`Capabilities::custom_processors`]
    ShapedOscillator {
        waveform: Waveform,
        frequency: f32,
        shaping: f32,
    },
    Noise { colour: f32, seed: u64 },
    Constant { value: f32 },
    /// Amplitude scaling with a settable, automatable scalar
    Gain { gain: f32 },
    /// Unity-gain mixing point
    Sum,
}

/// Automatable parameters addressed by [`AudioRuntime::schedule`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Param {
    Frequency,
    Gain,
    Value,
}

/// The runtime's view of a generator's lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    Start,
    Stop,
}

/// Capabilities consumed by the routing engine.
///
/// All calls happen on the control thread and return as soon as the
/// topology or parameter change is queued; the runtime makes them safe for
/// its render thread.
pub trait AudioRuntime {
    fn capabilities(&self) -> Capabilities;

    /// Whether the render clock is running
    fn is_running(&self) -> bool;

    /// Frame the render clock will produce next
    fn current_frame(&self) -> u64;

    fn sample_rate(&self) -> u32;

    fn create(&mut self, spec: NodeSpec) -> Result<NodeId, RuntimeError>;

    fn contains(&self, node: NodeId) -> bool;

    /// Remove a node along with every edge touching it
    fn remove(&mut self, node: NodeId) -> Result<(), RuntimeError>;

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), RuntimeError>;

    /// Remove one `from → to` edge
    fn disconnect(&mut self, from: NodeId, to: NodeId) -> Result<(), RuntimeError>;

    /// Start or stop a generator. Stopping is final.
    fn transport(&mut self, node: NodeId, transport: Transport) -> Result<(), RuntimeError>;

    fn schedule(&mut self, node: NodeId, param: Param, event: ParamEvent) -> Result<(), RuntimeError>;

    /// Replace the wave table of an oscillator
    fn set_periodic_wave(&mut self, node: NodeId, wave: PeriodicWave) -> Result<(), RuntimeError>;

    /// Send a shaping update to a custom processor
    fn post_shaping(&mut self, node: NodeId, event: ParamEvent) -> Result<(), RuntimeError>;

    fn start(&mut self, node: NodeId) -> Result<(), RuntimeError> {
        self.transport(node, Transport::Start)
    }

    fn stop(&mut self, node: NodeId) -> Result<(), RuntimeError> {
        self.transport(node, Transport::Stop)
    }
}
