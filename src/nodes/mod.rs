//! Built-in audio nodes.
//!
//! Nodes are organized into three categories:
//!
//! ## Sources ([`source`])
//!
//! Generators with no audio inputs (apart from pitch CV):
//! - [`Oscillator`] - Wave-table oscillator
//! - [`ShapedOscillator`] - Per-sample oscillator with automatable shaping
//! - [`Noise`] - Coloured noise
//! - [`Constant`] - DC level (joystick axes)
//!
//! ## Effects ([`effect`])
//!
//! - [`Gain`] - Automatable amplitude scaling
//! - [`Junction`] - Unity-gain summing point
//!
//! ## Sinks ([`sink`])
//!
//! - [`RtrbSink`] - Write to ring buffer
//! - [`Scope`] - Monitor input feeding a display
//! - [`CpalSink`] - Output to system audio device (requires `cpal_sink` feature)
//!
//! Parameter automation shared by all of them lives in [`param`].

pub mod effect;
pub mod param;
pub mod sink;
pub mod source;

pub use effect::{Gain, GainMessage, Junction};
pub use param::{AutomatedParam, ParamEvent};
pub use sink::{RtrbSink, Scope, ScopeMessage, ScopeReader};
pub use source::{
    Constant, ConstantMessage, Noise, NoiseMessage, Oscillator, OscillatorMessage, Playback,
    ShapedMessage, ShapedOscillator,
};

#[cfg(feature = "cpal_sink")]
pub use sink::CpalSink;
