//! Destination inputs: output buses and monitor channels
//!
//! Output buses exist from construction on (sum → VCA level → master).
//! Monitor inputs are attached on demand by whatever displays them, so a
//! pin into a monitor nobody attached is an unresolved endpoint rather than
//! an unmapped one.

use hashbrown::HashMap;
use tracing::debug;

use crate::error::RuntimeError;
use crate::gain::vca_voltage_to_gain;
use crate::graph::{AudioGraph, NodeHandle};
use crate::node::NodeId;
use crate::nodes::{ParamEvent, Scope, ScopeMessage, ScopeReader};
use crate::runtime::{AudioRuntime, NodeSpec, Param};
use crate::voice::PARAM_GLIDE;

/// Samples a monitor keeps for its display
pub const MONITOR_CAPACITY: usize = 4096;

/// Lookup of destination inputs for the connection ledger
pub trait DestinationRegistry {
    /// Summing input of an output bus
    fn output_bus(&self, index: usize) -> Option<NodeId>;

    /// Input of a monitor channel; `None` until one is attached
    fn monitor_input(&self, channel: usize) -> Option<NodeId>;

    /// No connection feeds `channel` any more
    fn monitor_silent(&mut self, channel: usize);
}

/// Notifications for the display side
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorEvent {
    SignalLost(usize),
}

#[derive(Clone, Copy, Debug)]
struct OutputBus {
    input: NodeId,
    vca: NodeId,
}

/// Output buses and monitors living in an [`AudioGraph`]
pub struct BusRegistry {
    master: NodeId,
    buses: Vec<OutputBus>,
    monitors: HashMap<usize, NodeHandle<ScopeMessage>>,
    events: Vec<MonitorEvent>,
}

impl BusRegistry {
    /// Create `output_buses` buses at unity level, all summed into a master node
    pub fn new(runtime: &mut dyn AudioRuntime, output_buses: usize) -> Result<Self, RuntimeError> {
        let master = runtime.create(NodeSpec::Sum)?;
        let buses = (0..output_buses)
            .map(|_| -> Result<OutputBus, RuntimeError> {
                let input = runtime.create(NodeSpec::Sum)?;
                let vca = runtime.create(NodeSpec::Gain {
                    gain: vca_voltage_to_gain(0.0),
                })?;
                runtime.connect(input, vca)?;
                runtime.connect(vca, master)?;
                Ok(OutputBus { input, vca })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(buses = buses.len(), %master, "output buses ready");
        Ok(Self {
            master,
            buses,
            monitors: HashMap::new(),
            events: Vec::new(),
        })
    }

    /// Node every output bus ends in
    pub fn master(&self) -> NodeId {
        self.master
    }

    pub fn bus_count(&self) -> usize {
        self.buses.len()
    }

    /// Set an output bus level in control volts
    pub fn set_output_level(
        &mut self,
        runtime: &mut dyn AudioRuntime,
        index: usize,
        volts: f32,
    ) -> Result<bool, RuntimeError> {
        let Some(bus) = self.buses.get(index) else {
            return Ok(false);
        };
        let gain = vca_voltage_to_gain(volts);
        runtime.schedule(bus.vca, Param::Gain, ParamEvent::glide(gain, PARAM_GLIDE))?;
        Ok(true)
    }

    /// Attach a monitor to `channel`; `None` if one is already attached
    pub fn attach_monitor(&mut self, graph: &mut AudioGraph, channel: usize) -> Option<ScopeReader> {
        if self.monitors.contains_key(&channel) {
            return None;
        }
        let (scope, reader) = Scope::new(MONITOR_CAPACITY);
        let handle = graph.add(scope);
        debug!(channel, node = %handle.id(), "monitor attached");
        self.monitors.insert(channel, handle);
        Some(reader)
    }

    /// Drain queued monitor notifications
    pub fn take_events(&mut self) -> Vec<MonitorEvent> {
        core::mem::take(&mut self.events)
    }
}

impl DestinationRegistry for BusRegistry {
    fn output_bus(&self, index: usize) -> Option<NodeId> {
        self.buses.get(index).map(|bus| bus.input)
    }

    fn monitor_input(&self, channel: usize) -> Option<NodeId> {
        self.monitors.get(&channel).map(NodeHandle::id)
    }

    fn monitor_silent(&mut self, channel: usize) {
        if let Some(handle) = self.monitors.get_mut(&channel) {
            if handle.send(ScopeMessage::SignalLost).is_err() {
                debug!(channel, "monitor queue full, signal-lost not delivered");
            }
        }
        self.events.push(MonitorEvent::SignalLost(channel));
    }
}
