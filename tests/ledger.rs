mod common;

use std::rc::Rc;

use common::{init_tracing, FixedRegistry, Kind, RecordingRuntime};
use patchmatrix::{
    compile, Activation, AudioRuntime, Axis, Blueprint, ConnectionLedger, Deactivation, DestinationDescriptor,
    Endpoint, GainTable, MatrixKind, Param, RoutingContext, RoutingError, SourceDescriptor,
    VoiceGraphCache, VoiceSlot,
};

// rows (label → physical): 1 → 0 osc 0 tap 0, 2 → 1 osc 0 tap 1, 3 → 2 noise 0,
// 4 → 3 joystick 0 y, 5 hidden, 6 → 4 unmapped
// cols: 1 bus 0, 2 monitor 0, 3 monitor 1, 4 osc 1 pitch, 5 bus 9, 6 unmapped
fn blueprint() -> Blueprint {
    let mut bp = Blueprint::with_grid(6, 6)
        .source(
            1,
            SourceDescriptor::Generator {
                generator_index: 0,
                channel_id: None,
            },
        )
        .source(
            2,
            SourceDescriptor::Generator {
                generator_index: 0,
                channel_id: Some(1),
            },
        )
        .source(3, SourceDescriptor::NoiseSource { index: 0 })
        .source(4, SourceDescriptor::Joystick { index: 0, axis: Axis::Y })
        .destination(1, DestinationDescriptor::OutputBus { bus_index: 0 })
        .destination(2, DestinationDescriptor::MonitorInput { channel: 0 })
        .destination(3, DestinationDescriptor::MonitorInput { channel: 1 })
        .destination(4, DestinationDescriptor::OscillatorFrequency { generator_index: 1 })
        .destination(5, DestinationDescriptor::OutputBus { bus_index: 9 });
    bp.ui.hidden_rows0 = Some(vec![4]);
    bp
}

struct Rig {
    rt: RecordingRuntime,
    voices: VoiceGraphCache,
    registry: FixedRegistry,
    ledger: ConnectionLedger,
}

impl Rig {
    fn new() -> Self {
        Self::with_gains(GainTable::default())
    }

    fn with_gains(gains: GainTable) -> Self {
        init_tracing();
        let mut rt = RecordingRuntime::running();
        let voices = VoiceGraphCache::new(&rt);
        let registry = FixedRegistry::new(&mut rt, 2, &[0]);
        let ledger = ConnectionLedger::new(MatrixKind::Audio, compile(&blueprint()), gains);
        Self {
            rt,
            voices,
            registry,
            ledger,
        }
    }

    fn activate(&mut self, row: usize, col: usize) -> Result<Activation, RoutingError> {
        let mut ctx = RoutingContext {
            runtime: &mut self.rt,
            voices: &mut self.voices,
            destinations: &mut self.registry,
        };
        self.ledger.activate(row, col, &mut ctx)
    }

    fn deactivate(&mut self, row: usize, col: usize) -> Deactivation {
        let mut ctx = RoutingContext {
            runtime: &mut self.rt,
            voices: &mut self.voices,
            destinations: &mut self.registry,
        };
        self.ledger.deactivate(row, col, &mut ctx)
    }

    fn clear(&mut self) -> usize {
        let mut ctx = RoutingContext {
            runtime: &mut self.rt,
            voices: &mut self.voices,
            destinations: &mut self.registry,
        };
        self.ledger.clear(&mut ctx)
    }

    /// Route through `ledger` with this rig's runtime, voices and registry
    fn with_ctx<R>(&mut self, f: impl FnOnce(&mut RoutingContext<'_>) -> R) -> R {
        let mut ctx = RoutingContext {
            runtime: &mut self.rt,
            voices: &mut self.voices,
            destinations: &mut self.registry,
        };
        f(&mut ctx)
    }

    /// Remove one node of `kind` from a voice without telling the cache
    fn break_voice(&mut self, slot: VoiceSlot, kind: Kind) {
        let voice = self.voices.get(slot).unwrap();
        let node = voice
            .nodes()
            .iter()
            .copied()
            .find(|node| self.rt.nodes.get(node) == Some(&kind))
            .unwrap();
        self.rt.remove(node).unwrap();
    }

    fn amplitude_nodes(&self) -> usize {
        self.ledger.connections().count()
    }
}

#[test]
fn unmapped_pins_succeed_without_touching_the_graph() {
    let mut rig = Rig::new();
    let nodes = rig.rt.nodes.len();

    assert_eq!(rig.activate(4, 0), Ok(Activation::Unmapped));
    assert_eq!(rig.activate(0, 5), Ok(Activation::Unmapped));
    assert_eq!(rig.activate(40, 40), Ok(Activation::Unmapped));

    assert_eq!(rig.rt.nodes.len(), nodes);
    assert!(rig.ledger.is_empty());
}

#[test]
fn unmapped_wins_over_a_stopped_runtime() {
    let mut rig = Rig::new();
    rig.rt.running = false;
    assert_eq!(rig.activate(4, 0), Ok(Activation::Unmapped));
}

#[test]
fn stopped_runtime_fails_early() {
    let mut rig = Rig::new();
    rig.rt.running = false;
    let nodes = rig.rt.nodes.len();

    assert_eq!(rig.activate(0, 0), Err(RoutingError::RuntimeUnavailable));
    assert_eq!(rig.rt.nodes.len(), nodes);
    assert!(rig.voices.is_empty());
}

#[test]
fn activation_wires_tap_through_amplitude_to_bus() {
    let mut rig = Rig::new();

    assert_eq!(rig.activate(0, 0), Ok(Activation::Connected { gain: 1.0 }));

    let voice = rig.voices.get(VoiceSlot::Oscillator(0)).unwrap();
    let conn = rig.ledger.connection(0, 0).unwrap();
    assert_eq!(conn.source, voice.tap(0).unwrap());
    assert_eq!(conn.destination, rig.registry.buses[0]);
    assert!(rig.rt.has_edge(conn.source, conn.amplitude));
    assert!(rig.rt.has_edge(conn.amplitude, conn.destination));
    assert_eq!(rig.rt.nodes.get(&conn.amplitude), Some(&Kind::Gain));
    assert!(rig.ledger.is_active(0, 0));
}

#[test]
fn deactivate_is_idempotent_and_leaves_no_edges() {
    let mut rig = Rig::new();
    rig.activate(0, 0).unwrap();
    let voice_edges = rig.rt.edges.len() - 2;
    let amplitude = rig.ledger.connection(0, 0).unwrap().amplitude;

    assert_eq!(rig.deactivate(0, 0), Deactivation::Removed);
    assert_eq!(rig.deactivate(0, 0), Deactivation::NotConnected);
    assert_eq!(rig.deactivate(3, 3), Deactivation::NotConnected);

    assert!(!rig.rt.nodes.contains_key(&amplitude));
    assert_eq!(rig.rt.edges.len(), voice_edges);
    rig.rt.assert_no_dangling_edges();
}

#[test]
fn toggling_many_pins_leaves_only_voice_wiring() {
    let mut rig = Rig::new();
    let pins = [(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (3, 3), (1, 3)];

    for &(row, col) in &pins {
        assert!(matches!(rig.activate(row, col), Ok(Activation::Connected { .. })));
    }
    assert_eq!(rig.amplitude_nodes(), pins.len());
    let with_pins = rig.rt.edges.len();

    for &(row, col) in pins.iter().rev() {
        rig.deactivate(row, col);
    }
    assert_eq!(rig.rt.edges.len(), with_pins - 2 * pins.len());
    // level nodes of oscillators 0 and 1 plus the noise level
    assert_eq!(rig.rt.count(Kind::Gain), 4 + 4 + 1);
    rig.rt.assert_no_dangling_edges();
}

#[test]
fn monitor_goes_silent_only_after_its_last_pin() {
    let mut rig = Rig::new();
    rig.activate(0, 1).unwrap();
    rig.activate(2, 1).unwrap();
    rig.activate(0, 0).unwrap();

    rig.deactivate(0, 1);
    assert!(rig.registry.silenced.is_empty());

    rig.deactivate(0, 0);
    assert!(rig.registry.silenced.is_empty());

    rig.deactivate(2, 1);
    assert_eq!(rig.registry.silenced, vec![0]);

    rig.deactivate(2, 1);
    assert_eq!(rig.registry.silenced, vec![0]);
}

#[test]
fn unattached_monitor_is_unresolved_and_leaves_nothing() {
    let mut rig = Rig::new();
    // build the voice up front so only pin wiring could change the counts
    rig.activate(0, 0).unwrap();
    rig.deactivate(0, 0);
    let nodes = rig.rt.nodes.len();
    let edges = rig.rt.edges.len();

    let err = rig.activate(0, 2).unwrap_err();
    assert!(matches!(
        err,
        RoutingError::UnresolvedEndpoint {
            row: 0,
            col: 2,
            endpoint: Endpoint::Destination,
            ..
        }
    ));
    assert_eq!(rig.rt.nodes.len(), nodes);
    assert_eq!(rig.rt.edges.len(), edges);
    assert!(!rig.ledger.is_active(0, 2));
}

#[test]
fn missing_output_bus_is_unresolved() {
    let mut rig = Rig::new();
    let err = rig.activate(2, 4).unwrap_err();
    assert!(matches!(
        err,
        RoutingError::UnresolvedEndpoint {
            endpoint: Endpoint::Destination,
            ..
        }
    ));
    assert!(rig.ledger.is_empty());
}

#[test]
fn failed_source_build_is_unresolved() {
    let mut rig = Rig::new();
    rig.rt.custom_processors = false;

    let err = rig.activate(0, 0).unwrap_err();
    assert!(matches!(
        err,
        RoutingError::UnresolvedEndpoint {
            endpoint: Endpoint::Source,
            ..
        }
    ));
    assert!(rig.voices.is_empty());
    assert_eq!(rig.rt.count(Kind::Oscillator) + rig.rt.count(Kind::Shaped), 0);
}

#[test]
fn wiring_failure_removes_the_amplitude_node() {
    let mut rig = Rig::new();
    rig.rt.refuse_connections_to = Some(rig.registry.buses[0]);
    rig.activate(2, 1).unwrap();
    let gains = rig.rt.count(Kind::Gain);

    let err = rig.activate(0, 0).unwrap_err();
    assert!(matches!(err, RoutingError::Wiring { row: 0, col: 0, .. }));
    // the oscillator bank brought its own four level nodes
    assert_eq!(rig.rt.count(Kind::Gain), gains + 4);
    assert!(!rig.ledger.is_active(0, 0));
    rig.rt.assert_no_dangling_edges();
}

#[test]
fn pins_share_one_voice() {
    let mut rig = Rig::new();
    rig.activate(0, 0).unwrap();
    rig.activate(1, 0).unwrap();
    rig.activate(0, 1).unwrap();

    let a = rig.ledger.connection(0, 0).unwrap().voice().clone();
    let b = rig.ledger.connection(1, 0).unwrap().voice().clone();
    let c = rig.ledger.connection(0, 1).unwrap().voice().clone();
    assert!(Rc::ptr_eq(&a, &b));
    assert!(Rc::ptr_eq(&a, &c));
    assert_ne!(
        rig.ledger.connection(0, 0).unwrap().source,
        rig.ledger.connection(1, 0).unwrap().source
    );

    // four generators, each started exactly once
    assert_eq!(rig.rt.started.len(), 4);
}

#[test]
fn pitch_destination_feeds_the_target_oscillator() {
    let mut rig = Rig::new();
    rig.activate(3, 3).unwrap();

    let target = rig.voices.get(VoiceSlot::Oscillator(1)).unwrap();
    let joystick = rig.voices.get(VoiceSlot::Joystick(0)).unwrap();
    let conn = rig.ledger.connection(3, 3).unwrap();
    assert_eq!(Some(conn.destination), target.cv_input());
    assert_eq!(conn.source, joystick.tap(1).unwrap());
}

#[test]
fn gains_resolve_per_pin_and_retune() {
    let gains = GainTable::default().with_range(0.0, 2.0).with_pin(1, 1, 1.5);
    let mut rig = Rig::with_gains(gains);

    assert_eq!(rig.activate(0, 0), Ok(Activation::Connected { gain: 1.5 }));
    assert_eq!(rig.activate(2, 0), Ok(Activation::Connected { gain: 1.0 }));

    rig.ledger.set_gains(GainTable::default().with_col(1, 0.25));
    assert_eq!(rig.ledger.retune(&mut rig.rt), 2);
    assert_eq!(rig.ledger.connection(0, 0).unwrap().gain, 0.25);

    let amplitude = rig.ledger.connection(2, 0).unwrap().amplitude;
    assert!(rig
        .rt
        .scheduled
        .iter()
        .any(|(node, param, event)| *node == amplitude && *param == Param::Gain && event.target_value() == 0.25));

    assert_eq!(rig.ledger.retune(&mut rig.rt), 0);
}

#[test]
fn references_count_pins_per_destination() {
    let mut rig = Rig::new();
    rig.activate(0, 0).unwrap();
    rig.activate(2, 0).unwrap();
    rig.activate(2, 1).unwrap();

    let refs = rig.ledger.references();
    assert_eq!(refs.get(&DestinationDescriptor::OutputBus { bus_index: 0 }), Some(&2));
    assert_eq!(refs.get(&DestinationDescriptor::MonitorInput { channel: 0 }), Some(&1));

    let pins: Vec<_> = rig.ledger.connections().map(|(pin, _)| (pin.row, pin.col)).collect();
    assert_eq!(pins, vec![(0, 0), (2, 0), (2, 1)]);
}

#[test]
fn clear_drops_every_pin() {
    let mut rig = Rig::new();
    rig.activate(0, 0).unwrap();
    rig.activate(2, 1).unwrap();

    assert_eq!(rig.clear(), 2);
    assert!(rig.ledger.is_empty());
    assert_eq!(rig.registry.silenced, vec![0]);
    rig.rt.assert_no_dangling_edges();
}

#[test]
fn reset_voices_are_rebuilt_on_next_activation() {
    let mut rig = Rig::new();
    rig.activate(2, 0).unwrap();
    let old = rig.ledger.connection(2, 0).unwrap().voice().clone();
    rig.clear();
    rig.voices.reset(&mut rig.rt);
    assert!(!rig.voices.is_live(&old));

    rig.activate(2, 0).unwrap();
    let new = rig.ledger.connection(2, 0).unwrap().voice().clone();
    assert!(!Rc::ptr_eq(&old, &new));
    assert!(rig.voices.is_live(&new));
    rig.rt.assert_no_dangling_edges();
}

#[test]
fn rebuilt_voice_takes_its_live_pins_along() {
    let mut rig = Rig::new();
    rig.activate(2, 0).unwrap();
    let old = rig.ledger.connection(2, 0).unwrap().clone();

    rig.break_voice(VoiceSlot::Noise(0), Kind::Noise);
    rig.activate(2, 1).unwrap();

    let rebuilt = rig.voices.get(VoiceSlot::Noise(0)).unwrap();
    assert!(!Rc::ptr_eq(old.voice(), &rebuilt));
    assert!(!rig.voices.is_live(old.voice()));
    for col in [0, 1] {
        let conn = rig.ledger.connection(2, col).unwrap();
        assert!(Rc::ptr_eq(conn.voice(), &rebuilt));
        assert_eq!(conn.source, rebuilt.tap(0).unwrap());
        assert!(rig.rt.has_edge(conn.source, conn.amplitude));
        assert!(rig.rt.has_edge(conn.amplitude, conn.destination));
    }
    assert!(!rig.rt.nodes.contains_key(&old.amplitude));
    // the noise level node plus one amplitude per pin
    assert_eq!(rig.rt.count(Kind::Gain), 1 + 2);
    assert!(rig.registry.silenced.is_empty());
    rig.rt.assert_no_dangling_edges();
}

#[test]
fn other_ledger_follows_a_rebuilt_pitch_input() {
    let mut rig = Rig::new();
    let mut control = ConnectionLedger::new(MatrixKind::Control, compile(&blueprint()), GainTable::default());
    rig.with_ctx(|ctx| control.activate(3, 3, ctx)).unwrap();
    let old = control.connection(3, 3).unwrap().clone();

    rig.break_voice(VoiceSlot::Oscillator(1), Kind::Shaped);
    // noise into the same pitch input rebuilds oscillator 1
    rig.activate(2, 3).unwrap();
    assert!(!rig.rt.nodes.contains_key(&old.destination));

    assert_eq!(rig.with_ctx(|ctx| control.repair(ctx)), 1);
    let target = rig.voices.get(VoiceSlot::Oscillator(1)).unwrap();
    let conn = control.connection(3, 3).unwrap();
    assert_eq!(Some(conn.destination), target.cv_input());
    assert_eq!(Some(rig.ledger.connection(2, 3).unwrap().destination), target.cv_input());
    assert!(rig.rt.has_edge(conn.amplitude, conn.destination));
    rig.rt.assert_no_dangling_edges();

    assert_eq!(rig.with_ctx(|ctx| control.repair(ctx)), 0);
}

#[test]
fn repair_waits_for_a_running_runtime() {
    let mut rig = Rig::new();
    rig.activate(2, 0).unwrap();
    rig.break_voice(VoiceSlot::Noise(0), Kind::Noise);
    rig.rt.running = false;

    let mut ctx = RoutingContext {
        runtime: &mut rig.rt,
        voices: &mut rig.voices,
        destinations: &mut rig.registry,
    };
    assert_eq!(rig.ledger.repair(&mut ctx), 0);
    assert!(rig.ledger.is_active(2, 0));
}
