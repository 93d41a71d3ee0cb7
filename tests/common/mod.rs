#![allow(dead_code)]

use hashbrown::{HashMap, HashSet};
use patchmatrix::{
    AudioRuntime, Capabilities, DestinationRegistry, NodeId, NodeSpec, Param, ParamEvent,
    PeriodicWave, RuntimeError, Transport,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Which kind of node a spec created
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Oscillator,
    Shaped,
    Noise,
    Constant,
    Gain,
    Sum,
}

impl Kind {
    fn of(spec: &NodeSpec) -> Self {
        match spec {
            NodeSpec::Oscillator { .. } => Kind::Oscillator,
            NodeSpec::ShapedOscillator { .. } => Kind::Shaped,
            NodeSpec::Noise { .. } => Kind::Noise,
            NodeSpec::Constant { .. } => Kind::Constant,
            NodeSpec::Gain { .. } => Kind::Gain,
            NodeSpec::Sum => Kind::Sum,
        }
    }

    fn is_generator(self) -> bool {
        matches!(self, Kind::Oscillator | Kind::Shaped | Kind::Noise | Kind::Constant)
    }
}

/// A runtime that only keeps books: nodes, edges, transport and schedules
#[derive(Default)]
pub struct RecordingRuntime {
    pub running: bool,
    pub custom_processors: bool,
    /// Refuse every connect into this node
    pub refuse_connections_to: Option<NodeId>,
    next: u32,
    pub nodes: HashMap<NodeId, Kind>,
    pub edges: Vec<(NodeId, NodeId)>,
    pub started: HashSet<NodeId>,
    pub stopped: HashSet<NodeId>,
    pub scheduled: Vec<(NodeId, Param, ParamEvent)>,
    pub waves: Vec<NodeId>,
    pub shapings: Vec<(NodeId, ParamEvent)>,
}

impl RecordingRuntime {
    pub fn running() -> Self {
        Self {
            running: true,
            custom_processors: true,
            ..Self::default()
        }
    }

    pub fn count(&self, kind: Kind) -> usize {
        self.nodes.values().filter(|k| **k == kind).count()
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.edges.contains(&(from, to))
    }

    /// Every edge endpoint is a live node
    pub fn assert_no_dangling_edges(&self) {
        for (from, to) in &self.edges {
            assert!(self.nodes.contains_key(from), "edge from removed node {from}");
            assert!(self.nodes.contains_key(to), "edge into removed node {to}");
        }
    }

    fn check(&self, node: NodeId) -> Result<(), RuntimeError> {
        if self.nodes.contains_key(&node) {
            Ok(())
        } else {
            Err(RuntimeError::UnknownNode(node))
        }
    }
}

impl AudioRuntime for RecordingRuntime {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            custom_processors: self.custom_processors,
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn current_frame(&self) -> u64 {
        0
    }

    fn sample_rate(&self) -> u32 {
        48_000
    }

    fn create(&mut self, spec: NodeSpec) -> Result<NodeId, RuntimeError> {
        if matches!(spec, NodeSpec::ShapedOscillator { .. }) && !self.custom_processors {
            return Err(RuntimeError::NoCustomProcessors);
        }
        let id = NodeId::from_raw(self.next);
        self.next += 1;
        self.nodes.insert(id, Kind::of(&spec));
        Ok(id)
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn remove(&mut self, node: NodeId) -> Result<(), RuntimeError> {
        self.nodes.remove(&node).ok_or(RuntimeError::UnknownNode(node))?;
        self.edges.retain(|(from, to)| *from != node && *to != node);
        Ok(())
    }

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), RuntimeError> {
        self.check(from)?;
        self.check(to)?;
        if self.refuse_connections_to == Some(to) {
            return Err(RuntimeError::Unsupported {
                node: to,
                operation: "inputs",
            });
        }
        self.edges.push((from, to));
        Ok(())
    }

    fn disconnect(&mut self, from: NodeId, to: NodeId) -> Result<(), RuntimeError> {
        let pos = self
            .edges
            .iter()
            .position(|edge| *edge == (from, to))
            .ok_or(RuntimeError::NotConnected { from, to })?;
        self.edges.remove(pos);
        Ok(())
    }

    fn transport(&mut self, node: NodeId, transport: Transport) -> Result<(), RuntimeError> {
        let kind = *self.nodes.get(&node).ok_or(RuntimeError::UnknownNode(node))?;
        if !kind.is_generator() {
            return Err(RuntimeError::Unsupported {
                node,
                operation: "start/stop",
            });
        }
        match transport {
            Transport::Start if self.stopped.contains(&node) => Err(RuntimeError::AlreadyStopped(node)),
            Transport::Start if !self.started.insert(node) => Err(RuntimeError::AlreadyStarted(node)),
            Transport::Start => Ok(()),
            Transport::Stop => {
                self.stopped.insert(node);
                Ok(())
            }
        }
    }

    fn schedule(&mut self, node: NodeId, param: Param, event: ParamEvent) -> Result<(), RuntimeError> {
        self.check(node)?;
        self.scheduled.push((node, param, event));
        Ok(())
    }

    fn set_periodic_wave(&mut self, node: NodeId, _wave: PeriodicWave) -> Result<(), RuntimeError> {
        self.check(node)?;
        self.waves.push(node);
        Ok(())
    }

    fn post_shaping(&mut self, node: NodeId, event: ParamEvent) -> Result<(), RuntimeError> {
        self.check(node)?;
        self.shapings.push((node, event));
        Ok(())
    }
}

/// Fixed buses and monitors backed by sum nodes in a [`RecordingRuntime`]
pub struct FixedRegistry {
    pub buses: Vec<NodeId>,
    pub monitors: HashMap<usize, NodeId>,
    pub silenced: Vec<usize>,
}

impl FixedRegistry {
    pub fn new(runtime: &mut RecordingRuntime, buses: usize, monitors: &[usize]) -> Self {
        let buses = (0..buses)
            .map(|_| runtime.create(NodeSpec::Sum).unwrap())
            .collect();
        let monitors = monitors
            .iter()
            .map(|&channel| (channel, runtime.create(NodeSpec::Sum).unwrap()))
            .collect();
        Self {
            buses,
            monitors,
            silenced: Vec::new(),
        }
    }
}

impl DestinationRegistry for FixedRegistry {
    fn output_bus(&self, index: usize) -> Option<NodeId> {
        self.buses.get(index).copied()
    }

    fn monitor_input(&self, channel: usize) -> Option<NodeId> {
        self.monitors.get(&channel).copied()
    }

    fn monitor_silent(&mut self, channel: usize) {
        self.silenced.push(channel);
    }
}
