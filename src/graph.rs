//! Audio graph - owns nodes and message queues
//!
//! [`AudioGraph`] is a `dasp_graph` processor over a petgraph
//! `StableGraph`, so node ids stay valid while pins come and go. It is the
//! crate's implementation of [`AudioRuntime`].

use alloc::boxed::Box;
use core::marker::PhantomData;

use dasp_graph::{Buffer, Input, NodeData, Processor};
use hashbrown::HashMap;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use rtrb::{Producer, PushError, RingBuffer};
use tracing::trace;

use crate::error::RuntimeError;
use crate::node::{AudioNode, NodeId, ProcessContext, BLOCK_LEN};
use crate::nodes::{
    Constant, ConstantMessage, Gain, GainMessage, Junction, Noise, NoiseMessage, Oscillator,
    OscillatorMessage, ParamEvent, Playback, ShapedMessage, ShapedOscillator,
};
use crate::runtime::{AudioRuntime, Capabilities, NodeSpec, Param, Transport};
use crate::wave::PeriodicWave;

const DEFAULT_QUEUE_SIZE: usize = 64;

/// Handle to send messages to a node in an [`AudioGraph`]
pub struct NodeHandle<M: Send + 'static> {
    pub(crate) id: NodeId,
    pub(crate) sender: Producer<M>,
    pub(crate) _marker: PhantomData<M>,
}

impl<M: Send + 'static> NodeHandle<M> {
    /// Send a message to the node (applied next process cycle)
    ///
    /// Returns Err if the queue is full (message dropped)
    pub fn send(&mut self, msg: M) -> Result<(), M> {
        self.sender.push(msg).map_err(|PushError::Full(v)| v)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }
}

// Type-erased wrapper so we can store heterogeneous nodes
trait ErasedNode: Send {
    fn process_erased(&mut self, ctx: &ProcessContext, inputs: &[Input], outputs: &mut [Buffer]);
}

struct NodeWrapper<N: AudioNode> {
    node: N,
    receiver: rtrb::Consumer<N::Message>,
}

impl<N: AudioNode> ErasedNode for NodeWrapper<N> {
    fn process_erased(&mut self, ctx: &ProcessContext, inputs: &[Input], outputs: &mut [Buffer]) {
        let receiver = &mut self.receiver;
        let node = &mut self.node;

        let messages = core::iter::from_fn(|| receiver.pop().ok());
        node.process(ctx, messages, inputs, outputs);
    }
}

// Adapter for dasp_graph
struct DaspAdapter {
    node: Box<dyn ErasedNode>,
    ctx: ProcessContext,
}

impl dasp_graph::Node for DaspAdapter {
    fn process(&mut self, inputs: &[Input], outputs: &mut [Buffer]) {
        self.node.process_erased(&self.ctx, inputs, outputs);
    }
}

/// Hidden node every other node feeds, so the processor pulls the whole
/// graph each block. Started generators keep running (and keep draining
/// their message queues) whether or not anything is patched to them.
struct Root;

impl AudioNode for Root {
    type Message = ();

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        _messages: impl Iterator<Item = ()>,
        _inputs: &[Input],
        _outputs: &mut [Buffer],
    ) {
    }
}

/// Message queues of the built-in node kinds, keyed by node id
enum Control {
    Oscillator(Producer<OscillatorMessage>),
    Shaped(Producer<ShapedMessage>),
    Noise(Producer<NoiseMessage>),
    Constant(Producer<ConstantMessage>),
    Gain(Producer<GainMessage>),
    Passive,
}

fn push<M>(producer: &mut Producer<M>, node: NodeId, msg: M) -> Result<(), RuntimeError> {
    producer.push(msg).map_err(|_| RuntimeError::QueueFull(node))
}

type InnerGraph = StableGraph<NodeData<DaspAdapter>, ()>;

/// An audio processing graph at a fixed sample rate
pub struct AudioGraph {
    graph: InnerGraph,
    processor: Processor<InnerGraph>,
    ctx: ProcessContext,
    root: NodeIndex,

    node_indices: HashMap<NodeId, NodeIndex>,
    controls: HashMap<NodeId, Control>,
    generators: HashMap<NodeId, Playback>,
    next_node_id: u32,

    capabilities: Capabilities,
    running: bool,
}

impl AudioGraph {
    /// Create a new, suspended graph with the given sample rate
    pub fn new(sample_rate: u32) -> Self {
        let ctx = ProcessContext {
            sample_rate,
            buffer_size: BLOCK_LEN,
            frame: 0,
        };

        let mut graph = InnerGraph::with_capacity(256, 512);
        let (_, receiver) = RingBuffer::new(1);
        let root = graph.add_node(NodeData::new1(DaspAdapter {
            node: Box::new(NodeWrapper { node: Root, receiver }),
            ctx,
        }));

        Self {
            graph,
            processor: Processor::with_capacity(256),
            ctx,
            root,
            node_indices: HashMap::new(),
            controls: HashMap::new(),
            generators: HashMap::new(),
            next_node_id: 0,
            capabilities: Capabilities {
                custom_processors: true,
            },
            running: false,
        }
    }

    /// Override the advertised capabilities (builder pattern)
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Only offer the wave-table path for oscillator shaping
    pub fn without_custom_processors(self) -> Self {
        self.with_capabilities(Capabilities {
            custom_processors: false,
        })
    }

    /// Start the render clock
    pub fn resume(&mut self) {
        self.running = true;
    }

    /// Stop the render clock; [`process`](Self::process) becomes a no-op
    pub fn suspend(&mut self) {
        self.running = false;
    }

    /// Number of live nodes (excluding internal bookkeeping)
    pub fn node_count(&self) -> usize {
        self.node_indices.len()
    }

    /// Number of user-visible edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count() - self.node_indices.len()
    }

    /// Whether at least one `from → to` edge exists
    pub fn is_connected(&self, from: NodeId, to: NodeId) -> bool {
        match (self.node_indices.get(&from), self.node_indices.get(&to)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Add a node, returns a handle for sending messages
    pub fn add<N: AudioNode>(&mut self, node: N) -> NodeHandle<N::Message> {
        self.add_with_queue_size(node, DEFAULT_QUEUE_SIZE)
    }

    /// Add a node with a custom message queue size
    pub fn add_with_queue_size<N: AudioNode>(&mut self, node: N, queue_size: usize) -> NodeHandle<N::Message> {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let (producer, consumer) = RingBuffer::new(queue_size);

        let num_outputs = node.num_outputs();
        let wrapper = NodeWrapper { node, receiver: consumer };
        let adapter = DaspAdapter {
            node: Box::new(wrapper),
            ctx: self.ctx,
        };

        let node_data = match num_outputs {
            // 0 outputs = sink, but dasp_graph still needs a buffer for inputs
            0 | 1 => NodeData::new1(adapter),
            2 => NodeData::new2(adapter),
            n => NodeData::new(adapter, vec![Buffer::default(); n]),
        };

        let idx = self.graph.add_node(node_data);
        self.graph.add_edge(idx, self.root, ());
        self.node_indices.insert(id, idx);
        self.controls.insert(id, Control::Passive);

        NodeHandle {
            id,
            sender: producer,
            _marker: PhantomData,
        }
    }

    fn index(&self, node: NodeId) -> Result<NodeIndex, RuntimeError> {
        self.node_indices
            .get(&node)
            .copied()
            .ok_or(RuntimeError::UnknownNode(node))
    }

    fn control(&mut self, node: NodeId) -> Result<&mut Control, RuntimeError> {
        self.controls
            .get_mut(&node)
            .ok_or(RuntimeError::UnknownNode(node))
    }

    fn add_generator<N: AudioNode>(&mut self, node: N, wrap: fn(Producer<N::Message>) -> Control) -> NodeId {
        let handle = self.add(node);
        self.controls.insert(handle.id, wrap(handle.sender));
        self.generators.insert(handle.id, Playback::Idle);
        handle.id
    }

    /// Process one block of audio through the graph
    pub fn process(&mut self) {
        if !self.running {
            return;
        }

        let frame = self.ctx.frame;
        for idx in self.node_indices.values() {
            if let Some(data) = self.graph.node_weight_mut(*idx) {
                data.node.ctx.frame = frame;
            }
        }

        self.processor.process(&mut self.graph, self.root);
        self.ctx.frame += BLOCK_LEN as u64;
    }
}

impl AudioRuntime for AudioGraph {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn current_frame(&self) -> u64 {
        self.ctx.frame
    }

    fn sample_rate(&self) -> u32 {
        self.ctx.sample_rate
    }

    fn create(&mut self, spec: NodeSpec) -> Result<NodeId, RuntimeError> {
        let id = match spec {
            NodeSpec::Oscillator { wave, frequency } => {
                self.add_generator(Oscillator::new(wave, frequency), Control::Oscillator)
            }
            NodeSpec::ShapedOscillator {
                waveform,
                frequency,
                shaping,
            } => {
                if !self.capabilities.custom_processors {
                    return Err(RuntimeError::NoCustomProcessors);
                }
                self.add_generator(ShapedOscillator::new(waveform, frequency, shaping), Control::Shaped)
            }
            NodeSpec::Noise { colour, seed } => self.add_generator(Noise::new(colour, seed), Control::Noise),
            NodeSpec::Constant { value } => self.add_generator(Constant::new(value), Control::Constant),
            NodeSpec::Gain { gain } => {
                let handle = self.add(Gain::new(gain));
                self.controls.insert(handle.id, Control::Gain(handle.sender));
                handle.id
            }
            NodeSpec::Sum => self.add(Junction).id,
        };
        trace!(node = %id, "created node");
        Ok(id)
    }

    fn contains(&self, node: NodeId) -> bool {
        self.node_indices.contains_key(&node)
    }

    fn remove(&mut self, node: NodeId) -> Result<(), RuntimeError> {
        let idx = self
            .node_indices
            .remove(&node)
            .ok_or(RuntimeError::UnknownNode(node))?;
        self.graph.remove_node(idx);
        self.controls.remove(&node);
        self.generators.remove(&node);
        trace!(%node, "removed node");
        Ok(())
    }

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), RuntimeError> {
        let a = self.index(from)?;
        let b = self.index(to)?;
        self.graph.add_edge(a, b, ());
        Ok(())
    }

    fn disconnect(&mut self, from: NodeId, to: NodeId) -> Result<(), RuntimeError> {
        let a = self.index(from)?;
        let b = self.index(to)?;
        let edge = self
            .graph
            .find_edge(a, b)
            .ok_or(RuntimeError::NotConnected { from, to })?;
        self.graph.remove_edge(edge);
        Ok(())
    }

    fn transport(&mut self, node: NodeId, transport: Transport) -> Result<(), RuntimeError> {
        let known = self.contains(node);
        let Some(state) = self.generators.get_mut(&node) else {
            return Err(if known {
                RuntimeError::Unsupported {
                    node,
                    operation: "start/stop",
                }
            } else {
                RuntimeError::UnknownNode(node)
            });
        };

        match (transport, *state) {
            (Transport::Start, Playback::Idle) => state.start(),
            (Transport::Start, Playback::Running) => return Err(RuntimeError::AlreadyStarted(node)),
            (Transport::Start, Playback::Stopped) => return Err(RuntimeError::AlreadyStopped(node)),
            (Transport::Stop, Playback::Stopped) => return Ok(()),
            (Transport::Stop, _) => state.stop(),
        }

        match self.control(node)? {
            Control::Oscillator(p) => push(p, node, match transport {
                Transport::Start => OscillatorMessage::Start,
                Transport::Stop => OscillatorMessage::Stop,
            }),
            Control::Shaped(p) => push(p, node, match transport {
                Transport::Start => ShapedMessage::Start,
                Transport::Stop => ShapedMessage::Stop,
            }),
            Control::Noise(p) => push(p, node, match transport {
                Transport::Start => NoiseMessage::Start,
                Transport::Stop => NoiseMessage::Stop,
            }),
            Control::Constant(p) => push(p, node, match transport {
                Transport::Start => ConstantMessage::Start,
                Transport::Stop => ConstantMessage::Stop,
            }),
            Control::Gain(_) | Control::Passive => Err(RuntimeError::Unsupported {
                node,
                operation: "start/stop",
            }),
        }
    }

    fn schedule(&mut self, node: NodeId, param: Param, event: ParamEvent) -> Result<(), RuntimeError> {
        match (self.control(node)?, param) {
            (Control::Oscillator(p), Param::Frequency) => push(p, node, OscillatorMessage::Frequency(event)),
            (Control::Shaped(p), Param::Frequency) => push(p, node, ShapedMessage::Frequency(event)),
            (Control::Gain(p), Param::Gain) => push(p, node, GainMessage::Gain(event)),
            (Control::Constant(p), Param::Value) => push(p, node, ConstantMessage::Value(event)),
            // noise colour has no automation; only the destination value matters
            (Control::Noise(p), Param::Value) => push(p, node, NoiseMessage::Colour(event.target_value())),
            _ => Err(RuntimeError::Unsupported {
                node,
                operation: "this parameter",
            }),
        }
    }

    fn set_periodic_wave(&mut self, node: NodeId, wave: PeriodicWave) -> Result<(), RuntimeError> {
        match self.control(node)? {
            Control::Oscillator(p) => push(p, node, OscillatorMessage::Wave(wave)),
            _ => Err(RuntimeError::Unsupported {
                node,
                operation: "periodic waves",
            }),
        }
    }

    fn post_shaping(&mut self, node: NodeId, event: ParamEvent) -> Result<(), RuntimeError> {
        match self.control(node)? {
            Control::Shaped(p) => push(p, node, ShapedMessage::Shaping(event)),
            _ => Err(RuntimeError::Unsupported {
                node,
                operation: "shaping messages",
            }),
        }
    }
}
