//! Matrix blueprints
//!
//! A blueprint describes one patch matrix in the labels printed on the
//! hardware: the grid size and label bases, which rows and columns are
//! hidden, and which sound source or destination sits behind each label.
//! It is read from JSON and compiled into physical lookup tables by
//! [`compile`](crate::compile).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One patch matrix, as authored
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub grid: Grid,
    #[serde(default)]
    pub ui: UiHints,
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    #[serde(default)]
    pub destinations: Vec<DestinationEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    #[serde(default)]
    pub coord_system: CoordSystem,
}

/// Label printed on the first row and column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordSystem {
    #[serde(default = "one")]
    pub row_base: u32,
    #[serde(default = "one")]
    pub col_base: u32,
}

fn one() -> u32 {
    1
}

impl Default for CoordSystem {
    fn default() -> Self {
        Self {
            row_base: 1,
            col_base: 1,
        }
    }
}

/// Hidden rows and columns.
///
/// `hidden_rows0`/`hidden_cols0` are 0-based slots (`label - base`) and win
/// when present; the `*_synth` lists are the legacy form keyed by label.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_rows0: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_cols0: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden_rows_synth: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden_cols_synth: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceEntry {
    pub row_synth: u32,
    pub source: SourceDescriptor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationEntry {
    pub col_synth: u32,
    pub dest: DestinationDescriptor,
}

/// Joystick axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn tap(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }
}

/// What feeds a matrix row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SourceDescriptor {
    #[serde(rename_all = "camelCase")]
    Generator {
        generator_index: usize,
        /// Output tap of the generator; 0 when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channel_id: Option<usize>,
    },
    NoiseSource { index: usize },
    Joystick { index: usize, axis: Axis },
    /// Any kind this build does not know; dropped by the compiler
    #[serde(other)]
    Unrecognized,
}

/// What a matrix column feeds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DestinationDescriptor {
    #[serde(rename_all = "camelCase")]
    OutputBus { bus_index: usize },
    MonitorInput { channel: usize },
    /// Pitch CV input of an oscillator (control matrix)
    #[serde(rename_all = "camelCase")]
    OscillatorFrequency { generator_index: usize },
    #[serde(other)]
    Unrecognized,
}

impl Blueprint {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// An empty blueprint of the given size with labels starting at 1
    pub fn with_grid(rows: usize, cols: usize) -> Self {
        Self {
            grid: Grid {
                rows,
                cols,
                coord_system: CoordSystem::default(),
            },
            ..Self::default()
        }
    }

    pub fn source(mut self, row_synth: u32, source: SourceDescriptor) -> Self {
        self.sources.push(SourceEntry { row_synth, source });
        self
    }

    pub fn destination(mut self, col_synth: u32, dest: DestinationDescriptor) -> Self {
        self.destinations.push(DestinationEntry { col_synth, dest });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_descriptors() {
        let bp = Blueprint::from_json(
            r#"{
                "grid": { "rows": 4, "cols": 3, "coordSystem": { "rowBase": 67, "colBase": 1 } },
                "ui": { "hiddenRows0": [1] },
                "sources": [
                    { "rowSynth": 67, "source": { "kind": "generator", "generatorIndex": 2, "channelId": 1 } },
                    { "rowSynth": 68, "source": { "kind": "joystick", "index": 0, "axis": "y" } },
                    { "rowSynth": 69, "source": { "kind": "tapeLoop", "reel": 3 } }
                ],
                "destinations": [
                    { "colSynth": 1, "dest": { "kind": "outputBus", "busIndex": 4 } },
                    { "colSynth": 2, "dest": { "kind": "oscillatorFrequency", "generatorIndex": 0 } }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(bp.grid.coord_system.row_base, 67);
        assert_eq!(bp.ui.hidden_rows0, Some(vec![1]));
        assert_eq!(
            bp.sources[0].source,
            SourceDescriptor::Generator {
                generator_index: 2,
                channel_id: Some(1)
            }
        );
        assert_eq!(
            bp.sources[1].source,
            SourceDescriptor::Joystick {
                index: 0,
                axis: Axis::Y
            }
        );
        assert_eq!(bp.sources[2].source, SourceDescriptor::Unrecognized);
        assert_eq!(
            bp.destinations[1].dest,
            DestinationDescriptor::OscillatorFrequency { generator_index: 0 }
        );
    }

    #[test]
    fn missing_sections_default() {
        let bp = Blueprint::from_json(r#"{ "grid": { "rows": 2, "cols": 2 } }"#).unwrap();
        assert_eq!(bp.grid.coord_system, CoordSystem::default());
        assert!(bp.sources.is_empty());
        assert!(bp.ui.hidden_rows0.is_none());
    }
}
