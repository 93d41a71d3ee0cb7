//! The connection ledger: matrix pins as reversible graph wiring
//!
//! Each active pin owns exactly one amplitude node wired
//! `source tap → amplitude → destination input`. The ledger entry is the
//! only record that a pin is on; deactivating removes the amplitude node and
//! with it every edge the pin added.

use core::fmt;

use alloc::rc::Rc;
use hashbrown::HashMap;
use itertools::Itertools;
use tracing::{debug, trace, warn};

use crate::blueprint::DestinationDescriptor;
use crate::coords::CompiledMatrix;
use crate::destinations::DestinationRegistry;
use crate::error::{Endpoint, RoutingError};
use crate::gain::{resolve_gain, GainTable};
use crate::node::NodeId;
use crate::nodes::ParamEvent;
use crate::runtime::{AudioRuntime, NodeSpec, Param};
use crate::voice::{VoiceGraph, VoiceGraphCache, VoiceSlot, PARAM_GLIDE};

/// The two independent matrices of the instrument
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatrixKind {
    Audio,
    Control,
}

impl MatrixKind {
    pub fn other(self) -> Self {
        match self {
            MatrixKind::Audio => MatrixKind::Control,
            MatrixKind::Control => MatrixKind::Audio,
        }
    }
}

impl fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixKind::Audio => f.write_str("audio"),
            MatrixKind::Control => f.write_str("control"),
        }
    }
}

/// A pin by physical indices
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pin {
    pub row: usize,
    pub col: usize,
}

impl Pin {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// The wiring behind one active pin
#[derive(Clone, Debug)]
pub struct Connection {
    /// Voice tap the pin reads from
    pub source: NodeId,
    /// Input the pin feeds
    pub destination: NodeId,
    /// Amplitude node owned by the pin
    pub amplitude: NodeId,
    pub dest: DestinationDescriptor,
    pub gain: f32,
    voice: Rc<VoiceGraph>,
}

impl Connection {
    /// The voice the source tap belongs to
    pub fn voice(&self) -> &Rc<VoiceGraph> {
        &self.voice
    }

    pub fn slot(&self) -> VoiceSlot {
        self.voice.slot()
    }
}

/// Outcome of a successful activation
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Activation {
    Connected { gain: f32 },
    /// Nothing is mapped behind the pin; there is nothing to do
    Unmapped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deactivation {
    Removed,
    NotConnected,
}

/// Everything a ledger touches outside itself
pub struct RoutingContext<'a> {
    pub runtime: &'a mut dyn AudioRuntime,
    pub voices: &'a mut VoiceGraphCache,
    pub destinations: &'a mut dyn DestinationRegistry,
}

/// Live connections of one matrix
pub struct ConnectionLedger {
    kind: MatrixKind,
    matrix: CompiledMatrix,
    gains: GainTable,
    connections: HashMap<Pin, Connection>,
}

impl ConnectionLedger {
    pub fn new(kind: MatrixKind, matrix: CompiledMatrix, gains: GainTable) -> Self {
        Self {
            kind,
            matrix,
            gains,
            connections: HashMap::new(),
        }
    }

    pub fn kind(&self) -> MatrixKind {
        self.kind
    }

    pub fn matrix(&self) -> &CompiledMatrix {
        &self.matrix
    }

    pub fn gains(&self) -> &GainTable {
        &self.gains
    }

    /// Turn a pin on.
    ///
    /// Either the pin ends up fully wired and recorded, or nothing changed.
    /// Acquiring a voice may rebuild it; pins of this ledger that were wired
    /// to the discarded graph are re-wired afterwards (see [`repair`](Self::repair)).
    pub fn activate(&mut self, row: usize, col: usize, ctx: &mut RoutingContext<'_>) -> Result<Activation, RoutingError> {
        let outcome = self.connect(row, col, ctx);
        self.repair(ctx);
        outcome
    }

    fn connect(&mut self, row: usize, col: usize, ctx: &mut RoutingContext<'_>) -> Result<Activation, RoutingError> {
        let kind = self.kind;
        let (Some(source), Some(dest)) = (self.matrix.source_at(row), self.matrix.destination_at(col)) else {
            trace!(%kind, row, col, "pin unmapped");
            return Ok(Activation::Unmapped);
        };
        let dest = *dest;
        let Some((slot, channel)) = VoiceSlot::for_source(source) else {
            trace!(%kind, row, col, "pin source unrecognized");
            return Ok(Activation::Unmapped);
        };

        if !ctx.runtime.is_running() {
            return Err(RoutingError::RuntimeUnavailable);
        }

        let unresolved = |endpoint: Endpoint, reason: String| RoutingError::UnresolvedEndpoint {
            row,
            col,
            endpoint,
            reason,
        };

        let voice = ctx
            .voices
            .acquire(slot, ctx.runtime)
            .map_err(|e| unresolved(Endpoint::Source, e.to_string()))?;
        let tap = voice
            .tap(channel)
            .map_err(|e| unresolved(Endpoint::Source, e.to_string()))?;

        let input = match dest {
            DestinationDescriptor::OutputBus { bus_index } => ctx
                .destinations
                .output_bus(bus_index)
                .ok_or_else(|| format!("no output bus {bus_index}")),
            DestinationDescriptor::MonitorInput { channel } => ctx
                .destinations
                .monitor_input(channel)
                .ok_or_else(|| format!("monitor {channel} is not attached")),
            DestinationDescriptor::OscillatorFrequency { generator_index } => ctx
                .voices
                .acquire(VoiceSlot::Oscillator(generator_index), ctx.runtime)
                .map_err(|e| e.to_string())
                .and_then(|target| {
                    target
                        .cv_input()
                        .ok_or_else(|| format!("oscillator {generator_index} has no pitch input"))
                }),
            DestinationDescriptor::Unrecognized => Err("unrecognized destination".to_owned()),
        }
        .map_err(|reason| unresolved(Endpoint::Destination, reason))?;

        let gain = resolve_gain(row, col, &self.matrix, &self.gains);
        let wiring = |source| RoutingError::Wiring { row, col, source };

        let amplitude = ctx.runtime.create(NodeSpec::Gain { gain }).map_err(wiring)?;
        let wired = ctx
            .runtime
            .connect(tap, amplitude)
            .and_then(|_| ctx.runtime.connect(amplitude, input));
        if let Err(source) = wired {
            // removing the node takes any half-made edge with it
            let _ = ctx.runtime.remove(amplitude);
            return Err(wiring(source));
        }

        debug!(%kind, row, col, %slot, channel, %tap, %input, %amplitude, gain, "pin connected");
        let connection = Connection {
            source: tap,
            destination: input,
            amplitude,
            dest,
            gain,
            voice,
        };
        if let Some(previous) = self.connections.insert(Pin::new(row, col), connection) {
            debug!(%kind, row, col, "pin was already active, replacing its wiring");
            Self::unwire(kind, Pin::new(row, col), &previous, ctx.runtime);
        }

        Ok(Activation::Connected { gain })
    }

    /// Turn a pin off. Never fails; runtime errors while unwiring are logged.
    pub fn deactivate(&mut self, row: usize, col: usize, ctx: &mut RoutingContext<'_>) -> Deactivation {
        let pin = Pin::new(row, col);
        let Some(connection) = self.connections.remove(&pin) else {
            return Deactivation::NotConnected;
        };

        Self::unwire(self.kind, pin, &connection, ctx.runtime);
        debug!(kind = %self.kind, row, col, amplitude = %connection.amplitude, "pin disconnected");

        self.release_monitor(&connection.dest, ctx);
        Deactivation::Removed
    }

    fn release_monitor(&self, dest: &DestinationDescriptor, ctx: &mut RoutingContext<'_>) {
        if let DestinationDescriptor::MonitorInput { channel } = *dest {
            if self.references_to(dest) == 0 {
                debug!(kind = %self.kind, channel, "monitor lost its last connection");
                ctx.destinations.monitor_silent(channel);
            }
        }
    }

    fn is_stale(connection: &Connection, ctx: &RoutingContext<'_>) -> bool {
        !ctx.voices.is_live(&connection.voice)
            || [connection.source, connection.amplitude, connection.destination]
                .into_iter()
                .any(|node| !ctx.runtime.contains(node))
    }

    /// Re-wire pins whose voice graph was rebuilt or whose nodes are gone.
    ///
    /// A pin that can no longer be wired is dropped. Returns the number of
    /// pins re-wired. Does nothing while the runtime is stopped.
    pub fn repair(&mut self, ctx: &mut RoutingContext<'_>) -> usize {
        if !ctx.runtime.is_running() {
            return 0;
        }
        let stale = {
            let ctx = &*ctx;
            self.connections
                .iter()
                .filter(|(_, connection)| Self::is_stale(connection, ctx))
                .map(|(pin, _)| *pin)
                .sorted()
                .collect_vec()
        };

        let kind = self.kind;
        let mut repaired = 0;
        for pin in stale {
            let Some(previous) = self.connections.remove(&pin) else {
                continue;
            };
            Self::unwire(kind, pin, &previous, ctx.runtime);
            match self.connect(pin.row, pin.col, ctx) {
                Ok(Activation::Connected { .. }) => {
                    debug!(%kind, row = pin.row, col = pin.col, "pin re-wired to rebuilt voice");
                    repaired += 1;
                }
                Ok(Activation::Unmapped) => self.release_monitor(&previous.dest, ctx),
                Err(err) => {
                    warn!(%kind, row = pin.row, col = pin.col, error = %err, "dropping pin that could not be re-wired");
                    self.release_monitor(&previous.dest, ctx);
                }
            }
        }
        repaired
    }

    fn unwire(kind: MatrixKind, pin: Pin, connection: &Connection, runtime: &mut dyn AudioRuntime) {
        let Connection {
            source,
            destination,
            amplitude,
            ..
        } = *connection;

        let steps = [
            runtime.disconnect(source, amplitude),
            runtime.disconnect(amplitude, destination),
            runtime.remove(amplitude),
        ];
        for err in steps.into_iter().filter_map(Result::err) {
            debug!(%kind, row = pin.row, col = pin.col, error = %err, "ignoring unwire error");
        }
    }

    pub fn is_active(&self, row: usize, col: usize) -> bool {
        self.connections.contains_key(&Pin::new(row, col))
    }

    pub fn connection(&self, row: usize, col: usize) -> Option<&Connection> {
        self.connections.get(&Pin::new(row, col))
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Active pins in row-major order
    pub fn connections(&self) -> impl Iterator<Item = (Pin, &Connection)> + '_ {
        self.connections
            .iter()
            .sorted_by_key(|(pin, _)| **pin)
            .map(|(pin, connection)| (*pin, connection))
    }

    /// Number of active pins per destination
    pub fn references(&self) -> HashMap<DestinationDescriptor, usize> {
        self.connections.values().map(|c| c.dest).counts().into_iter().collect()
    }

    /// Number of active pins into `dest`
    pub fn references_to(&self, dest: &DestinationDescriptor) -> usize {
        self.connections.values().filter(|c| c.dest == *dest).count()
    }

    /// Replace the gain table; call [`retune`](Self::retune) to apply it to live pins
    pub fn set_gains(&mut self, gains: GainTable) {
        self.gains = gains;
    }

    /// Re-resolve every live pin's gain and glide the ones that changed.
    ///
    /// Returns the number of pins retuned.
    pub fn retune(&mut self, runtime: &mut dyn AudioRuntime) -> usize {
        let kind = self.kind;
        let mut retuned = 0;
        for (pin, connection) in self.connections.iter_mut() {
            let gain = resolve_gain(pin.row, pin.col, &self.matrix, &self.gains);
            if gain == connection.gain {
                continue;
            }
            match runtime.schedule(connection.amplitude, Param::Gain, ParamEvent::glide(gain, PARAM_GLIDE)) {
                Ok(()) => {
                    connection.gain = gain;
                    retuned += 1;
                }
                Err(err) => debug!(%kind, row = pin.row, col = pin.col, error = %err, "retune failed"),
            }
        }
        if retuned > 0 {
            debug!(%kind, retuned, "pin gains retuned");
        }
        retuned
    }

    /// Deactivate every pin
    pub fn clear(&mut self, ctx: &mut RoutingContext<'_>) -> usize {
        let pins = self.connections.keys().copied().sorted().collect_vec();
        for pin in &pins {
            self.deactivate(pin.row, pin.col, ctx);
        }
        pins.len()
    }

    /// Swap in a recompiled matrix, clearing every pin compiled against the old one
    pub fn rebind(&mut self, matrix: CompiledMatrix, ctx: &mut RoutingContext<'_>) {
        self.clear(ctx);
        self.matrix = matrix;
    }
}
