//! Patch-matrix routing for a modular synthesizer emulation.
//!
//! A [`Blueprint`] describes a pin matrix in the labels printed on the
//! hardware. [`compile`] turns it into physical lookup tables, a
//! [`ConnectionLedger`] turns pin toggles into wiring on an
//! [`AudioRuntime`], and a [`VoiceGraphCache`] builds the sound sources the
//! pins read from the first time they are needed.
//!
//! [`Synth`] bundles all of it over the in-crate [`AudioGraph`]:
//!
//! ```no_run
//! use patchmatrix::{Blueprint, MatrixKind, SynthConfig};
//!
//! let blueprint = Blueprint::from_path("audio_matrix.json").unwrap();
//! let mut synth = SynthConfig::new(48_000).with_output_buses(8).build().unwrap();
//! synth.load(MatrixKind::Audio, &blueprint);
//! synth.resume();
//!
//! if !synth.set_toggle(MatrixKind::Audio, 0, 0, true) {
//!     // revert the toggle on the panel
//! }
//! synth.process();
//! ```

extern crate alloc;

pub mod blueprint;
pub mod coords;
pub mod destinations;
pub mod error;
pub mod gain;
pub mod graph;
pub mod ledger;
pub mod node;
pub mod nodes;
pub mod runtime;
pub mod synth;
pub mod voice;
pub mod wave;

pub use blueprint::{Axis, Blueprint, DestinationDescriptor, SourceDescriptor};
pub use coords::{compile, CompiledMatrix, DropReason, DroppedEntry};
pub use destinations::{BusRegistry, DestinationRegistry, MonitorEvent};
pub use error::{ConfigError, Endpoint, RoutingError, RuntimeError, VoiceError};
pub use gain::{resolve_gain, vca_voltage_to_gain, GainTable, PinKey};
pub use graph::{AudioGraph, NodeHandle};
pub use ledger::{Activation, Connection, ConnectionLedger, Deactivation, MatrixKind, Pin, RoutingContext};
pub use node::{AudioNode, NodeId, ProcessContext, BLOCK_LEN};
pub use nodes::ParamEvent;
pub use runtime::{AudioRuntime, Capabilities, NodeSpec, Param, Transport};
pub use synth::{Synth, SynthConfig};
pub use voice::{VoiceGraph, VoiceGraphCache, VoiceSlot, VoiceState, WaveformShaper};
pub use wave::{PeriodicWave, Waveform};

// Re-export for node implementors
pub use dasp_graph::{Buffer, Input};
