//! Voice graphs: lazily built sound sources with output taps
//!
//! Every matrix source row points at a voice slot (an oscillator bank, a
//! noise generator or a joystick). The slot's nodes are only created the
//! first time a pin needs them and are then shared by every pin reading the
//! same slot. Parameters live in per-slot state, so a voice rebuilt after a
//! reset comes back sounding the way it was left.

use alloc::rc::Rc;
use core::fmt;

use hashbrown::HashMap;
use tracing::{debug, trace};

use crate::blueprint::SourceDescriptor;
use crate::error::{RuntimeError, VoiceError};
use crate::node::NodeId;
use crate::nodes::ParamEvent;
use crate::runtime::{AudioRuntime, Capabilities, NodeSpec, Param};
use crate::wave::{clamp_pulse_width, clamp_symmetry, PeriodicWave, Waveform};

/// Smoothing time constant for parameter changes, in seconds
pub const PARAM_GLIDE: f32 = 0.01;

const NOISE_SEED: u64 = 0x6e6f_6973_65;

/// A sound source addressed by matrix rows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VoiceSlot {
    Oscillator(usize),
    Noise(usize),
    Joystick(usize),
}

impl VoiceSlot {
    /// Slot and output tap a source descriptor reads from
    pub fn for_source(source: &SourceDescriptor) -> Option<(VoiceSlot, usize)> {
        match *source {
            SourceDescriptor::Generator {
                generator_index,
                channel_id,
            } => Some((VoiceSlot::Oscillator(generator_index), channel_id.unwrap_or(0))),
            SourceDescriptor::NoiseSource { index } => Some((VoiceSlot::Noise(index), 0)),
            SourceDescriptor::Joystick { index, axis } => Some((VoiceSlot::Joystick(index), axis.tap())),
            SourceDescriptor::Unrecognized => None,
        }
    }
}

impl fmt::Display for VoiceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceSlot::Oscillator(i) => write!(f, "oscillator {i}"),
            VoiceSlot::Noise(i) => write!(f, "noise {i}"),
            VoiceSlot::Joystick(i) => write!(f, "joystick {i}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OscillatorState {
    pub frequency: f32,
    /// Output level per waveform, in [`Waveform::ALL`] order
    pub levels: [f32; 4],
    pub pulse_width: f32,
    pub symmetry: f32,
}

impl Default for OscillatorState {
    fn default() -> Self {
        Self {
            frequency: 440.0,
            levels: [0.0; 4],
            pulse_width: 0.5,
            symmetry: 0.0,
        }
    }
}

impl OscillatorState {
    pub fn level(&self, waveform: Waveform) -> f32 {
        self.levels[wave_index(waveform)]
    }

    fn shaping(&self, waveform: Waveform) -> f32 {
        match waveform {
            Waveform::Pulse => self.pulse_width,
            Waveform::Sine => self.symmetry,
            other => other.neutral_shaping(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NoiseState {
    pub colour: f32,
    pub level: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct JoystickState {
    pub x: f32,
    pub y: f32,
}

/// Authoritative parameters of one voice slot
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VoiceState {
    Oscillator(OscillatorState),
    Noise(NoiseState),
    Joystick(JoystickState),
}

fn wave_index(waveform: Waveform) -> usize {
    match waveform {
        Waveform::Sine => 0,
        Waveform::Sawtooth => 1,
        Waveform::Pulse => 2,
        Waveform::Triangle => 3,
    }
}

/// How pulse width and sine symmetry reach the oscillators
pub trait WaveformShaper {
    fn name(&self) -> &'static str;

    /// Node to create for one waveform of an oscillator bank
    fn generator(&self, waveform: Waveform, frequency: f32, shaping: f32) -> NodeSpec;

    /// Apply a new shaping value to a running generator
    fn reshape(
        &self,
        runtime: &mut dyn AudioRuntime,
        node: NodeId,
        waveform: Waveform,
        shaping: f32,
    ) -> Result<(), RuntimeError>;
}

/// Shapeable waveforms run as custom processors fed parameter messages
pub struct ProcessorShaper;

impl WaveformShaper for ProcessorShaper {
    fn name(&self) -> &'static str {
        "processor"
    }

    fn generator(&self, waveform: Waveform, frequency: f32, shaping: f32) -> NodeSpec {
        if waveform.is_shapeable() {
            NodeSpec::ShapedOscillator {
                waveform,
                frequency,
                shaping,
            }
        } else {
            NodeSpec::Oscillator {
                wave: PeriodicWave::render(waveform, shaping),
                frequency,
            }
        }
    }

    fn reshape(
        &self,
        runtime: &mut dyn AudioRuntime,
        node: NodeId,
        _waveform: Waveform,
        shaping: f32,
    ) -> Result<(), RuntimeError> {
        runtime.post_shaping(node, ParamEvent::glide(shaping, PARAM_GLIDE))
    }
}

/// Every waveform is a wave table, regenerated when its shape changes
pub struct TableShaper;

impl WaveformShaper for TableShaper {
    fn name(&self) -> &'static str {
        "table"
    }

    fn generator(&self, waveform: Waveform, frequency: f32, shaping: f32) -> NodeSpec {
        NodeSpec::Oscillator {
            wave: PeriodicWave::render(waveform, shaping),
            frequency,
        }
    }

    fn reshape(
        &self,
        runtime: &mut dyn AudioRuntime,
        node: NodeId,
        waveform: Waveform,
        shaping: f32,
    ) -> Result<(), RuntimeError> {
        runtime.set_periodic_wave(node, PeriodicWave::render(waveform, shaping))
    }
}

/// Pick the shaping strategy a runtime supports
pub fn shaper_for(capabilities: Capabilities) -> Box<dyn WaveformShaper> {
    if capabilities.custom_processors {
        Box::new(ProcessorShaper)
    } else {
        Box::new(TableShaper)
    }
}

/// The nodes of one built voice
#[derive(Debug)]
pub struct VoiceGraph {
    slot: VoiceSlot,
    epoch: u64,
    /// Sources; waveform order for oscillator banks
    generators: Vec<NodeId>,
    /// Level node per generator (empty for joysticks)
    levels: Vec<NodeId>,
    taps: Vec<NodeId>,
    cv: Option<NodeId>,
    nodes: Vec<NodeId>,
}

impl VoiceGraph {
    pub fn slot(&self) -> VoiceSlot {
        self.slot
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Output tap `channel`
    pub fn tap(&self, channel: usize) -> Result<NodeId, VoiceError> {
        self.taps.get(channel).copied().ok_or(VoiceError::NoSuchTap {
            slot: self.slot,
            channel,
        })
    }

    pub fn taps(&self) -> &[NodeId] {
        &self.taps
    }

    /// Pitch CV summing input of an oscillator bank
    pub fn cv_input(&self) -> Option<NodeId> {
        self.cv
    }

    /// Every node owned by this voice
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    fn is_complete(&self, runtime: &dyn AudioRuntime) -> bool {
        self.nodes.iter().all(|&node| runtime.contains(node))
    }
}

/// Records nodes as they are created so a failed build can be undone
struct Builder<'a> {
    runtime: &'a mut dyn AudioRuntime,
    created: Vec<NodeId>,
}

impl<'a> Builder<'a> {
    fn create(&mut self, spec: NodeSpec) -> Result<NodeId, RuntimeError> {
        let node = self.runtime.create(spec)?;
        self.created.push(node);
        Ok(node)
    }

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), RuntimeError> {
        self.runtime.connect(from, to)
    }

    fn abandon(self) {
        for node in self.created {
            let _ = self.runtime.remove(node);
        }
    }
}

/// Memoized voice graphs, one per slot.
///
/// Entries are handed out as `Rc`s; two requests for the same slot return
/// the same allocation until [`reset`](Self::reset) starts a new epoch.
pub struct VoiceGraphCache {
    shaper: Box<dyn WaveformShaper>,
    entries: HashMap<VoiceSlot, Rc<VoiceGraph>>,
    oscillators: HashMap<usize, OscillatorState>,
    noises: HashMap<usize, NoiseState>,
    joysticks: HashMap<usize, JoystickState>,
    epoch: u64,
}

impl VoiceGraphCache {
    /// Create a cache for `runtime`, fixing the shaping strategy for its lifetime
    pub fn new(runtime: &dyn AudioRuntime) -> Self {
        Self::with_shaper(shaper_for(runtime.capabilities()))
    }

    pub fn with_shaper(shaper: Box<dyn WaveformShaper>) -> Self {
        Self {
            shaper,
            entries: HashMap::new(),
            oscillators: HashMap::new(),
            noises: HashMap::new(),
            joysticks: HashMap::new(),
            epoch: 0,
        }
    }

    pub fn shaper(&self) -> &dyn WaveformShaper {
        self.shaper.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The built voice for `slot`, if any, without building it
    pub fn get(&self, slot: VoiceSlot) -> Option<Rc<VoiceGraph>> {
        self.entries.get(&slot).cloned()
    }

    /// Whether `voice` is the current entry of its slot
    pub fn is_live(&self, voice: &VoiceGraph) -> bool {
        voice.epoch == self.epoch
            && self
                .entries
                .get(&voice.slot)
                .map_or(false, |entry| core::ptr::eq(entry.as_ref(), voice))
    }

    /// Return the voice for `slot`, building it on first use
    pub fn acquire(&mut self, slot: VoiceSlot, runtime: &mut dyn AudioRuntime) -> Result<Rc<VoiceGraph>, VoiceError> {
        if let Some(entry) = self.entries.get(&slot) {
            if entry.is_complete(runtime) {
                return Ok(Rc::clone(entry));
            }
            debug!(%slot, "voice graph incomplete, rebuilding");
            if let Some(stale) = self.entries.remove(&slot) {
                discard(&stale, runtime);
            }
        }

        let voice = Rc::new(self.build(slot, runtime)?);
        debug!(
            %slot,
            epoch = self.epoch,
            nodes = voice.nodes.len(),
            shaper = self.shaper.name(),
            "built voice graph"
        );
        self.entries.insert(slot, Rc::clone(&voice));
        Ok(voice)
    }

    fn build(&self, slot: VoiceSlot, runtime: &mut dyn AudioRuntime) -> Result<VoiceGraph, VoiceError> {
        let mut builder = Builder {
            runtime,
            created: Vec::new(),
        };

        let layout = match slot {
            VoiceSlot::Oscillator(index) => self.build_oscillator(index, &mut builder),
            VoiceSlot::Noise(index) => self.build_noise(index, &mut builder),
            VoiceSlot::Joystick(index) => self.build_joystick(index, &mut builder),
        };

        let started = layout.and_then(|layout| {
            for &generator in &layout.generators {
                builder.runtime.start(generator)?;
            }
            Ok(layout)
        });

        match started {
            Ok(layout) => Ok(VoiceGraph {
                slot,
                epoch: self.epoch,
                generators: layout.generators,
                levels: layout.levels,
                taps: layout.taps,
                cv: layout.cv,
                nodes: builder.created,
            }),
            Err(source) => {
                debug!(%slot, error = %source, "voice build failed, removing partial graph");
                builder.abandon();
                Err(VoiceError::Build { slot, source })
            }
        }
    }

    fn build_oscillator(&self, index: usize, b: &mut Builder<'_>) -> Result<Layout, RuntimeError> {
        let state = self.oscillators.get(&index).copied().unwrap_or_default();

        let cv = b.create(NodeSpec::Sum)?;
        let mut generators = Vec::with_capacity(4);
        let mut levels = Vec::with_capacity(4);
        for waveform in Waveform::ALL {
            let spec = self
                .shaper
                .generator(waveform, state.frequency, state.shaping(waveform));
            let generator = b.create(spec)?;
            let level = b.create(NodeSpec::Gain {
                gain: state.level(waveform),
            })?;
            b.connect(cv, generator)?;
            b.connect(generator, level)?;
            generators.push(generator);
            levels.push(level);
        }

        let low = b.create(NodeSpec::Sum)?;
        let high = b.create(NodeSpec::Sum)?;
        b.connect(levels[wave_index(Waveform::Sine)], low)?;
        b.connect(levels[wave_index(Waveform::Sawtooth)], low)?;
        b.connect(levels[wave_index(Waveform::Pulse)], high)?;
        b.connect(levels[wave_index(Waveform::Triangle)], high)?;

        Ok(Layout {
            generators,
            levels,
            taps: vec![low, high],
            cv: Some(cv),
        })
    }

    fn build_noise(&self, index: usize, b: &mut Builder<'_>) -> Result<Layout, RuntimeError> {
        let state = self.noises.get(&index).copied().unwrap_or_default();

        let noise = b.create(NodeSpec::Noise {
            colour: state.colour,
            seed: NOISE_SEED.wrapping_add(index as u64),
        })?;
        let level = b.create(NodeSpec::Gain { gain: state.level })?;
        b.connect(noise, level)?;

        Ok(Layout {
            generators: vec![noise],
            levels: vec![level],
            taps: vec![level],
            cv: None,
        })
    }

    fn build_joystick(&self, index: usize, b: &mut Builder<'_>) -> Result<Layout, RuntimeError> {
        let state = self.joysticks.get(&index).copied().unwrap_or_default();

        let x = b.create(NodeSpec::Constant { value: state.x })?;
        let y = b.create(NodeSpec::Constant { value: state.y })?;

        Ok(Layout {
            generators: vec![x, y],
            levels: Vec::new(),
            taps: vec![x, y],
            cv: None,
        })
    }

    /// Stop and remove every voice; handles from before the reset stop being live
    pub fn reset(&mut self, runtime: &mut dyn AudioRuntime) {
        for (_, voice) in self.entries.drain() {
            discard(&voice, runtime);
        }
        self.epoch += 1;
        debug!(epoch = self.epoch, "voice cache reset");
    }

    /// Current parameters of a slot (defaults if never touched)
    pub fn state(&self, slot: VoiceSlot) -> VoiceState {
        match slot {
            VoiceSlot::Oscillator(i) => VoiceState::Oscillator(self.oscillators.get(&i).copied().unwrap_or_default()),
            VoiceSlot::Noise(i) => VoiceState::Noise(self.noises.get(&i).copied().unwrap_or_default()),
            VoiceSlot::Joystick(i) => VoiceState::Joystick(self.joysticks.get(&i).copied().unwrap_or_default()),
        }
    }

    pub fn set_frequency(&mut self, index: usize, hz: f32, runtime: &mut dyn AudioRuntime) -> Result<(), VoiceError> {
        self.oscillators.entry(index).or_default().frequency = hz;
        let slot = VoiceSlot::Oscillator(index);
        let Some(voice) = self.entries.get(&slot) else {
            return Ok(());
        };
        for &generator in &voice.generators {
            runtime
                .schedule(generator, Param::Frequency, ParamEvent::glide(hz, PARAM_GLIDE))
                .map_err(|source| VoiceError::Update { slot, source })?;
        }
        Ok(())
    }

    pub fn set_level(
        &mut self,
        index: usize,
        waveform: Waveform,
        level: f32,
        runtime: &mut dyn AudioRuntime,
    ) -> Result<(), VoiceError> {
        self.oscillators.entry(index).or_default().levels[wave_index(waveform)] = level;
        let slot = VoiceSlot::Oscillator(index);
        match self.entries.get(&slot) {
            Some(voice) => schedule_glide(runtime, slot, voice.levels[wave_index(waveform)], Param::Gain, level),
            None => Ok(()),
        }
    }

    pub fn set_pulse_width(&mut self, index: usize, width: f32, runtime: &mut dyn AudioRuntime) -> Result<(), VoiceError> {
        let width = clamp_pulse_width(width);
        self.oscillators.entry(index).or_default().pulse_width = width;
        self.reshape(index, Waveform::Pulse, width, runtime)
    }

    pub fn set_symmetry(&mut self, index: usize, symmetry: f32, runtime: &mut dyn AudioRuntime) -> Result<(), VoiceError> {
        let symmetry = clamp_symmetry(symmetry);
        self.oscillators.entry(index).or_default().symmetry = symmetry;
        self.reshape(index, Waveform::Sine, symmetry, runtime)
    }

    fn reshape(
        &self,
        index: usize,
        waveform: Waveform,
        shaping: f32,
        runtime: &mut dyn AudioRuntime,
    ) -> Result<(), VoiceError> {
        let slot = VoiceSlot::Oscillator(index);
        let Some(voice) = self.entries.get(&slot) else {
            return Ok(());
        };
        trace!(%slot, ?waveform, shaping, "reshaping");
        self.shaper
            .reshape(runtime, voice.generators[wave_index(waveform)], waveform, shaping)
            .map_err(|source| VoiceError::Update { slot, source })
    }

    pub fn set_noise_colour(&mut self, index: usize, colour: f32, runtime: &mut dyn AudioRuntime) -> Result<(), VoiceError> {
        let colour = colour.clamp(0.0, 1.0);
        self.noises.entry(index).or_default().colour = colour;
        let slot = VoiceSlot::Noise(index);
        match self.entries.get(&slot) {
            Some(voice) => schedule_glide(runtime, slot, voice.generators[0], Param::Value, colour),
            None => Ok(()),
        }
    }

    pub fn set_noise_level(&mut self, index: usize, level: f32, runtime: &mut dyn AudioRuntime) -> Result<(), VoiceError> {
        self.noises.entry(index).or_default().level = level;
        let slot = VoiceSlot::Noise(index);
        match self.entries.get(&slot) {
            Some(voice) => schedule_glide(runtime, slot, voice.levels[0], Param::Gain, level),
            None => Ok(()),
        }
    }

    pub fn set_joystick(&mut self, index: usize, x: f32, y: f32, runtime: &mut dyn AudioRuntime) -> Result<(), VoiceError> {
        let (x, y) = (x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0));
        *self.joysticks.entry(index).or_default() = JoystickState { x, y };
        let slot = VoiceSlot::Joystick(index);
        let Some(voice) = self.entries.get(&slot) else {
            return Ok(());
        };
        schedule_glide(runtime, slot, voice.generators[0], Param::Value, x)?;
        schedule_glide(runtime, slot, voice.generators[1], Param::Value, y)
    }
}

struct Layout {
    generators: Vec<NodeId>,
    levels: Vec<NodeId>,
    taps: Vec<NodeId>,
    cv: Option<NodeId>,
}

fn schedule_glide(
    runtime: &mut dyn AudioRuntime,
    slot: VoiceSlot,
    node: NodeId,
    param: Param,
    value: f32,
) -> Result<(), VoiceError> {
    runtime
        .schedule(node, param, ParamEvent::glide(value, PARAM_GLIDE))
        .map_err(|source| VoiceError::Update { slot, source })
}

/// Best-effort teardown; nodes may already be gone
fn discard(voice: &VoiceGraph, runtime: &mut dyn AudioRuntime) {
    for &generator in &voice.generators {
        let _ = runtime.stop(generator);
    }
    for &node in &voice.nodes {
        if runtime.contains(node) {
            let _ = runtime.remove(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AudioGraph;

    #[test]
    fn acquire_is_memoized() {
        let mut rt = AudioGraph::new(48_000);
        let mut cache = VoiceGraphCache::new(&rt);

        let a = cache.acquire(VoiceSlot::Oscillator(0), &mut rt).unwrap();
        let nodes = rt.node_count();
        let b = cache.acquire(VoiceSlot::Oscillator(0), &mut rt).unwrap();

        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(rt.node_count(), nodes);
        assert_eq!(a.taps().len(), 2);
        assert!(a.cv_input().is_some());
        assert!(cache.is_live(&a));
    }

    #[test]
    fn oscillator_bank_layout() {
        let mut rt = AudioGraph::new(48_000);
        let mut cache = VoiceGraphCache::new(&rt);
        let voice = cache.acquire(VoiceSlot::Oscillator(2), &mut rt).unwrap();

        // cv + 4 generators + 4 levels + 2 taps
        assert_eq!(voice.nodes().len(), 11);
        let cv = voice.cv_input().unwrap();
        for &generator in &voice.generators {
            assert!(rt.is_connected(cv, generator));
        }
        let low = voice.tap(0).unwrap();
        let high = voice.tap(1).unwrap();
        assert!(rt.is_connected(voice.levels[0], low));
        assert!(rt.is_connected(voice.levels[1], low));
        assert!(rt.is_connected(voice.levels[2], high));
        assert!(rt.is_connected(voice.levels[3], high));
        assert_eq!(
            voice.tap(2),
            Err(VoiceError::NoSuchTap {
                slot: VoiceSlot::Oscillator(2),
                channel: 2
            })
        );
    }

    #[test]
    fn incomplete_entry_is_rebuilt() {
        let mut rt = AudioGraph::new(48_000);
        let mut cache = VoiceGraphCache::new(&rt);
        let first = cache.acquire(VoiceSlot::Noise(0), &mut rt).unwrap();
        rt.remove(first.tap(0).unwrap()).unwrap();

        let second = cache.acquire(VoiceSlot::Noise(0), &mut rt).unwrap();
        assert!(!Rc::ptr_eq(&first, &second));
        assert!(!cache.is_live(&first));
        assert_eq!(rt.node_count(), 2);
    }

    #[test]
    fn failed_build_leaves_nothing() {
        let mut rt = AudioGraph::new(48_000).without_custom_processors();
        let mut cache = VoiceGraphCache::with_shaper(Box::new(ProcessorShaper));

        let err = cache.acquire(VoiceSlot::Oscillator(0), &mut rt).unwrap_err();
        assert!(matches!(
            err,
            VoiceError::Build {
                source: RuntimeError::NoCustomProcessors,
                ..
            }
        ));
        assert_eq!(rt.node_count(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn shaper_follows_capabilities() {
        let rt = AudioGraph::new(48_000);
        assert_eq!(VoiceGraphCache::new(&rt).shaper().name(), "processor");
        let rt = AudioGraph::new(48_000).without_custom_processors();
        assert_eq!(VoiceGraphCache::new(&rt).shaper().name(), "table");
    }

    #[test]
    fn reset_starts_a_new_epoch() {
        let mut rt = AudioGraph::new(48_000);
        let mut cache = VoiceGraphCache::new(&rt);
        let old = cache.acquire(VoiceSlot::Joystick(0), &mut rt).unwrap();

        cache.reset(&mut rt);
        assert!(!cache.is_live(&old));
        assert_eq!(rt.node_count(), 0);

        let new = cache.acquire(VoiceSlot::Joystick(0), &mut rt).unwrap();
        assert_eq!(new.epoch(), 1);
        assert!(cache.is_live(&new));
    }

    #[test]
    fn state_survives_without_a_graph() {
        let mut rt = AudioGraph::new(48_000);
        let mut cache = VoiceGraphCache::new(&rt);
        cache.set_frequency(1, 110.0, &mut rt).unwrap();
        cache.set_pulse_width(1, 2.0, &mut rt).unwrap();
        cache.set_level(1, Waveform::Pulse, 0.5, &mut rt).unwrap();
        assert_eq!(rt.node_count(), 0);

        let VoiceState::Oscillator(state) = cache.state(VoiceSlot::Oscillator(1)) else {
            panic!("wrong state kind");
        };
        assert_eq!(state.frequency, 110.0);
        assert_eq!(state.pulse_width, 0.99);
        assert_eq!(state.level(Waveform::Pulse), 0.5);
        assert_eq!(state.level(Waveform::Sine), 0.0);
    }

    #[test]
    fn source_descriptors_pick_slot_and_tap() {
        use crate::blueprint::Axis;

        assert_eq!(
            VoiceSlot::for_source(&SourceDescriptor::Generator {
                generator_index: 3,
                channel_id: None
            }),
            Some((VoiceSlot::Oscillator(3), 0))
        );
        assert_eq!(
            VoiceSlot::for_source(&SourceDescriptor::Joystick {
                index: 1,
                axis: Axis::Y
            }),
            Some((VoiceSlot::Joystick(1), 1))
        );
        assert_eq!(VoiceSlot::for_source(&SourceDescriptor::Unrecognized), None);
    }
}
