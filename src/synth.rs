//! The instrument: two matrices over one audio graph
//!
//! [`Synth`] ties the pieces together and is the entry point for the panel:
//! pin toggles, knob moves, output levels and monitors all go through here.

use tracing::{debug, warn};

use crate::blueprint::Blueprint;
use crate::coords::{compile, CompiledMatrix};
use crate::blueprint::DestinationDescriptor;
use crate::destinations::{BusRegistry, DestinationRegistry, MonitorEvent};
use crate::error::{RuntimeError, VoiceError};
use crate::gain::GainTable;
use crate::graph::AudioGraph;
use crate::ledger::{ConnectionLedger, MatrixKind, RoutingContext};
use crate::node::{AudioNode, NodeId};
use crate::nodes::ScopeReader;
use crate::runtime::{AudioRuntime, Capabilities};
use crate::voice::{VoiceGraphCache, VoiceState, VoiceSlot};
use crate::wave::Waveform;

/// Engine construction settings
#[derive(Clone, Debug)]
pub struct SynthConfig {
    pub sample_rate: u32,
    pub output_buses: usize,
    pub custom_processors: bool,
}

impl SynthConfig {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            output_buses: 8,
            custom_processors: true,
        }
    }

    pub fn with_output_buses(mut self, output_buses: usize) -> Self {
        self.output_buses = output_buses;
        self
    }

    /// Whether oscillator shaping may use per-sample processors
    pub fn with_custom_processors(mut self, enabled: bool) -> Self {
        self.custom_processors = enabled;
        self
    }

    pub fn build(self) -> Result<Synth, RuntimeError> {
        Synth::new(self)
    }
}

pub struct Synth {
    graph: AudioGraph,
    voices: VoiceGraphCache,
    buses: BusRegistry,
    audio: ConnectionLedger,
    control: ConnectionLedger,
}

impl Synth {
    /// Create an engine with empty matrices; load blueprints with [`load`](Self::load)
    pub fn new(config: SynthConfig) -> Result<Self, RuntimeError> {
        let mut graph = AudioGraph::new(config.sample_rate).with_capabilities(Capabilities {
            custom_processors: config.custom_processors,
        });
        let voices = VoiceGraphCache::new(&graph);
        let buses = BusRegistry::new(&mut graph, config.output_buses)?;

        debug!(
            sample_rate = config.sample_rate,
            buses = config.output_buses,
            shaper = voices.shaper().name(),
            "synth ready"
        );

        Ok(Self {
            graph,
            voices,
            buses,
            audio: ConnectionLedger::new(MatrixKind::Audio, CompiledMatrix::default(), GainTable::default()),
            control: ConnectionLedger::new(MatrixKind::Control, CompiledMatrix::default(), GainTable::default()),
        })
    }

    /// Run `f` on one ledger with a routing context over the shared engine.
    ///
    /// Monitors are fed by both matrices, so the context only reports a
    /// monitor silent once the other ledger has no pin into it either.
    fn with_ledger<R>(&mut self, kind: MatrixKind, f: impl FnOnce(&mut ConnectionLedger, &mut RoutingContext<'_>) -> R) -> R {
        let Synth {
            graph,
            voices,
            buses,
            audio,
            control,
        } = self;
        let (ledger, other) = match kind {
            MatrixKind::Audio => (audio, &*control),
            MatrixKind::Control => (control, &*audio),
        };
        let mut destinations = SharedMonitors { buses, other };
        let mut ctx = RoutingContext {
            runtime: graph,
            voices,
            destinations: &mut destinations,
        };
        f(ledger, &mut ctx)
    }

    /// Compile and install a blueprint, dropping every pin of that matrix
    pub fn load(&mut self, kind: MatrixKind, blueprint: &Blueprint) -> &CompiledMatrix {
        let matrix = compile(blueprint);
        self.with_ledger(kind, |ledger, ctx| ledger.rebind(matrix, ctx));
        self.ledger(kind).matrix()
    }

    /// Install a gain table and retune live pins; returns how many changed
    pub fn set_gains(&mut self, kind: MatrixKind, gains: GainTable) -> usize {
        self.with_ledger(kind, |ledger, ctx| {
            ledger.set_gains(gains);
            ledger.retune(ctx.runtime)
        })
    }

    /// Toggle a pin.
    ///
    /// Returns `false` only when the caller must revert the toggle widget.
    /// Activating an already active pin is a no-op success.
    pub fn set_toggle(&mut self, kind: MatrixKind, row: usize, col: usize, activate: bool) -> bool {
        if !activate {
            self.with_ledger(kind, |ledger, ctx| ledger.deactivate(row, col, ctx));
            return true;
        }
        if self.ledger(kind).is_active(row, col) {
            return true;
        }
        let outcome = self.with_ledger(kind, |ledger, ctx| ledger.activate(row, col, ctx));
        // the activation may have rebuilt a voice the other matrix is wired to
        self.with_ledger(kind.other(), |ledger, ctx| ledger.repair(ctx));
        match outcome {
            Ok(_) => true,
            Err(err) => {
                warn!(%kind, row, col, error = %err, "pin activation failed");
                false
            }
        }
    }

    pub fn ledger(&self, kind: MatrixKind) -> &ConnectionLedger {
        match kind {
            MatrixKind::Audio => &self.audio,
            MatrixKind::Control => &self.control,
        }
    }

    /// Feed the master bus into `sink`
    pub fn attach_output<N: AudioNode>(&mut self, sink: N) -> Result<NodeId, RuntimeError> {
        let id = self.graph.add(sink).id();
        self.graph.connect(self.buses.master(), id)?;
        Ok(id)
    }

    pub fn graph(&self) -> &AudioGraph {
        &self.graph
    }

    pub fn voices(&self) -> &VoiceGraphCache {
        &self.voices
    }

    pub fn resume(&mut self) {
        self.graph.resume();
    }

    pub fn suspend(&mut self) {
        self.graph.suspend();
    }

    pub fn is_running(&self) -> bool {
        self.graph.is_running()
    }

    /// Render one block
    pub fn process(&mut self) {
        self.graph.process();
    }

    pub fn voice_state(&self, slot: VoiceSlot) -> VoiceState {
        self.voices.state(slot)
    }

    pub fn set_frequency(&mut self, oscillator: usize, hz: f32) -> Result<(), VoiceError> {
        self.voices.set_frequency(oscillator, hz, &mut self.graph)
    }

    pub fn set_level(&mut self, oscillator: usize, waveform: Waveform, level: f32) -> Result<(), VoiceError> {
        self.voices.set_level(oscillator, waveform, level, &mut self.graph)
    }

    pub fn set_pulse_width(&mut self, oscillator: usize, width: f32) -> Result<(), VoiceError> {
        self.voices.set_pulse_width(oscillator, width, &mut self.graph)
    }

    pub fn set_symmetry(&mut self, oscillator: usize, symmetry: f32) -> Result<(), VoiceError> {
        self.voices.set_symmetry(oscillator, symmetry, &mut self.graph)
    }

    pub fn set_noise_colour(&mut self, noise: usize, colour: f32) -> Result<(), VoiceError> {
        self.voices.set_noise_colour(noise, colour, &mut self.graph)
    }

    pub fn set_noise_level(&mut self, noise: usize, level: f32) -> Result<(), VoiceError> {
        self.voices.set_noise_level(noise, level, &mut self.graph)
    }

    pub fn set_joystick(&mut self, joystick: usize, x: f32, y: f32) -> Result<(), VoiceError> {
        self.voices.set_joystick(joystick, x, y, &mut self.graph)
    }

    /// Set an output bus level in control volts; `false` if there is no such bus
    pub fn set_output_level(&mut self, bus: usize, volts: f32) -> Result<bool, RuntimeError> {
        self.buses.set_output_level(&mut self.graph, bus, volts)
    }

    /// Attach a display to a monitor channel; `None` if one is already attached
    pub fn attach_monitor(&mut self, channel: usize) -> Option<ScopeReader> {
        self.buses.attach_monitor(&mut self.graph, channel)
    }

    pub fn take_monitor_events(&mut self) -> Vec<MonitorEvent> {
        self.buses.take_events()
    }

    /// Drop every pin of both matrices, then every voice.
    ///
    /// Voice parameters are kept; voices come back as they were left the
    /// next time a pin needs them.
    pub fn reset(&mut self) {
        for kind in [MatrixKind::Audio, MatrixKind::Control] {
            self.with_ledger(kind, |ledger, ctx| ledger.clear(ctx));
        }
        self.voices.reset(&mut self.graph);
        debug!("synth reset");
    }
}

/// Bus registry as seen from one ledger while the other one is live
struct SharedMonitors<'a> {
    buses: &'a mut BusRegistry,
    other: &'a ConnectionLedger,
}

impl DestinationRegistry for SharedMonitors<'_> {
    fn output_bus(&self, index: usize) -> Option<NodeId> {
        self.buses.output_bus(index)
    }

    fn monitor_input(&self, channel: usize) -> Option<NodeId> {
        self.buses.monitor_input(channel)
    }

    fn monitor_silent(&mut self, channel: usize) {
        let remaining = self.other.references_to(&DestinationDescriptor::MonitorInput { channel });
        if remaining > 0 {
            debug!(other = %self.other.kind(), channel, remaining, "monitor still fed by the other matrix");
            return;
        }
        self.buses.monitor_silent(channel);
    }
}
