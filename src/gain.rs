//! Pin gain resolution
//!
//! A pin's attenuation comes from a [`GainTable`]: a per-pin override if one
//! exists, otherwise the product of its row and column defaults. Either way
//! the per-pin factors are clamped into `gain_range` and then scaled by the
//! global `matrix_gain`.

use core::fmt;
use core::str::FromStr;
use std::path::Path;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::coords::CompiledMatrix;
use crate::error::ConfigError;

/// A pin addressed by synth labels, written `"row:col"` in gain documents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PinKey {
    pub row: u32,
    pub col: u32,
}

impl PinKey {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for PinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

impl FromStr for PinKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = s
            .split_once(':')
            .ok_or_else(|| format!("pin key `{s}` is not of the form row:col"))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| format!("pin key `{s}`: {e}"))
        };
        Ok(Self::new(parse(row)?, parse(col)?))
    }
}

impl TryFrom<String> for PinKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PinKey> for String {
    fn from(key: PinKey) -> Self {
        key.to_string()
    }
}

/// Clamp range applied to every per-pin factor
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GainRange {
    pub min: f32,
    pub max: f32,
}

impl Default for GainRange {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl GainRange {
    #[inline]
    fn clamp(&self, gain: f32) -> f32 {
        // a malformed range (min > max) must not panic
        gain.max(self.min).min(self.max)
    }
}

/// Gain configuration for one matrix
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GainTable {
    #[serde(default = "unity")]
    pub matrix_gain: f32,
    #[serde(default)]
    pub gain_range: GainRange,
    #[serde(default)]
    pub pin_gains: HashMap<PinKey, f32>,
    #[serde(default)]
    pub row_gains: HashMap<u32, f32>,
    #[serde(default)]
    pub col_gains: HashMap<u32, f32>,
}

fn unity() -> f32 {
    1.0
}

impl Default for GainTable {
    fn default() -> Self {
        Self {
            matrix_gain: 1.0,
            gain_range: GainRange::default(),
            pin_gains: HashMap::new(),
            row_gains: HashMap::new(),
            col_gains: HashMap::new(),
        }
    }
}

impl GainTable {
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

    pub fn with_matrix_gain(mut self, gain: f32) -> Self {
        self.matrix_gain = gain;
        self
    }

    pub fn with_range(mut self, min: f32, max: f32) -> Self {
        self.gain_range = GainRange { min, max };
        self
    }

    pub fn with_pin(mut self, row: u32, col: u32, gain: f32) -> Self {
        self.pin_gains.insert(PinKey::new(row, col), gain);
        self
    }

    pub fn with_row(mut self, row: u32, gain: f32) -> Self {
        self.row_gains.insert(row, gain);
        self
    }

    pub fn with_col(mut self, col: u32, gain: f32) -> Self {
        self.col_gains.insert(col, gain);
        self
    }

    /// Gain of a pin addressed by synth labels
    pub fn resolve_synth(&self, row: u32, col: u32) -> f32 {
        self.resolve_labels(Some(row), Some(col))
    }

    fn resolve_labels(&self, row: Option<u32>, col: Option<u32>) -> f32 {
        let range = &self.gain_range;

        if let (Some(row), Some(col)) = (row, col) {
            if let Some(&pin) = self.pin_gains.get(&PinKey::new(row, col)) {
                return range.clamp(pin) * self.matrix_gain;
            }
        }

        let row_gain = row.and_then(|r| self.row_gains.get(&r)).copied().unwrap_or(1.0);
        let col_gain = col.and_then(|c| self.col_gains.get(&c)).copied().unwrap_or(1.0);
        range.clamp(row_gain) * range.clamp(col_gain) * self.matrix_gain
    }
}

/// Gain of a pin addressed by physical indices.
///
/// Physical indices that do not map back to a synth label fall through to
/// the row × column path with unity defaults.
pub fn resolve_gain(row: usize, col: usize, matrix: &CompiledMatrix, table: &GainTable) -> f32 {
    table.resolve_labels(matrix.physical_row_to_synth(row), matrix.physical_col_to_synth(col))
}

const VCA_DB_PER_VOLT: f32 = 10.0;
const VCA_CUTOFF_VOLTAGE: f32 = -12.0;
const VCA_LINEAR_THRESHOLD: f32 = 0.0;
const VCA_HARD_LIMIT: f32 = 3.0;
const VCA_SOFTNESS: f32 = 2.0;

/// Output VCA response: control volts to linear gain.
///
/// 10 dB per volt below 0 V, fully closed at or below −12 V. Positive
/// voltages are compressed towards the 3 V limit so the gain saturates
/// instead of growing without bound.
pub fn vca_voltage_to_gain(volts: f32) -> f32 {
    if volts <= VCA_CUTOFF_VOLTAGE {
        return 0.0;
    }

    let effective = if volts <= VCA_LINEAR_THRESHOLD {
        volts
    } else {
        let width = VCA_HARD_LIMIT - VCA_LINEAR_THRESHOLD;
        let ratio = (volts - VCA_LINEAR_THRESHOLD) / width;
        VCA_LINEAR_THRESHOLD + width * ratio / (1.0 + ratio * VCA_SOFTNESS)
    };

    10f32.powf(effective * VCA_DB_PER_VOLT / 20.0)
}
