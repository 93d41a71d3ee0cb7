//! Error types

use std::path::PathBuf;

use crate::node::NodeId;
use crate::voice::VoiceSlot;

/// Errors raised by an [`AudioRuntime`](crate::AudioRuntime)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("node {0} was already started")]
    AlreadyStarted(NodeId),
    #[error("node {0} was stopped and cannot be restarted")]
    AlreadyStopped(NodeId),
    #[error("node {from} is not connected to {to}")]
    NotConnected { from: NodeId, to: NodeId },
    #[error("node {node} does not accept {operation}")]
    Unsupported { node: NodeId, operation: &'static str },
    #[error("runtime has no custom processor support")]
    NoCustomProcessors,
    #[error("message queue of node {0} is full")]
    QueueFull(NodeId),
}

/// Errors raised while building or updating a voice graph
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoiceError {
    #[error("failed to build voice {slot}: {source}")]
    Build {
        slot: VoiceSlot,
        #[source]
        source: RuntimeError,
    },
    #[error("failed to update voice {slot}: {source}")]
    Update {
        slot: VoiceSlot,
        #[source]
        source: RuntimeError,
    },
    #[error("voice {slot} has no tap {channel}")]
    NoSuchTap { slot: VoiceSlot, channel: usize },
}

/// Which end of a pin could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Destination,
}

impl core::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Endpoint::Source => f.write_str("source"),
            Endpoint::Destination => f.write_str("destination"),
        }
    }
}

/// Reasons a pin activation failed.
///
/// Unmapped pins are not errors; see [`Activation::Unmapped`](crate::Activation::Unmapped).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoutingError {
    #[error("audio runtime is not running")]
    RuntimeUnavailable,
    #[error("{endpoint} of pin ({row}, {col}) is not available: {reason}")]
    UnresolvedEndpoint {
        row: usize,
        col: usize,
        endpoint: Endpoint,
        reason: String,
    },
    #[error("wiring pin ({row}, {col}) failed: {source}")]
    Wiring {
        row: usize,
        col: usize,
        #[source]
        source: RuntimeError,
    },
}

/// Errors loading blueprints and gain tables
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid document: {0}")]
    Json(#[from] serde_json::Error),
}
