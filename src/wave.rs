//! Waveform shapes and periodic wave tables

use alloc::sync::Arc;
use core::f32::consts::TAU;

/// Number of samples in one cycle of a [`PeriodicWave`]
pub const TABLE_LEN: usize = 2048;

/// The four waveforms of a matrix oscillator
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Waveform {
    Sine,
    Sawtooth,
    Pulse,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Sawtooth,
        Waveform::Pulse,
        Waveform::Triangle,
    ];

    /// Whether this waveform reacts to a shaping value at all
    pub fn is_shapeable(self) -> bool {
        matches!(self, Waveform::Sine | Waveform::Pulse)
    }

    /// Neutral shaping value (pure sine, square pulse)
    pub fn neutral_shaping(self) -> f32 {
        match self {
            Waveform::Pulse => 0.5,
            _ => 0.0,
        }
    }
}

/// Clamp a pulse width so the pulse never degenerates into DC
#[inline]
pub fn clamp_pulse_width(width: f32) -> f32 {
    width.clamp(0.01, 0.99)
}

/// Clamp a sine symmetry to the usable range
#[inline]
pub fn clamp_symmetry(symmetry: f32) -> f32 {
    symmetry.clamp(-1.0, 1.0)
}

/// Evaluate one sample of a waveform at `phase` (0..1).
///
/// `shaping` is the pulse width for [`Waveform::Pulse`] and the symmetry
/// (-1..1, 0 = pure sine) for [`Waveform::Sine`]; other shapes ignore it.
/// Both the table generator and the per-sample processor go through here so
/// the two paths produce the same wave.
#[inline]
pub fn sample(waveform: Waveform, phase: f32, shaping: f32) -> f32 {
    match waveform {
        Waveform::Sine => {
            // Move the zero crossing; 0.05..0.95 keeps both halves audible
            let pivot = 0.5 + 0.45 * clamp_symmetry(shaping);
            let warped = if phase < pivot {
                0.5 * phase / pivot
            } else {
                0.5 + 0.5 * (phase - pivot) / (1.0 - pivot)
            };
            (warped * TAU).sin()
        }
        Waveform::Sawtooth => 2.0 * phase - 1.0,
        Waveform::Pulse => {
            if phase < clamp_pulse_width(shaping) {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
    }
}

/// One cycle of a waveform, sampled into a shared table.
///
/// Cloning is cheap; the table is reference counted so it can be handed to
/// the audio thread through a message queue.
#[derive(Clone, Debug)]
pub struct PeriodicWave {
    table: Arc<[f32]>,
}

impl PeriodicWave {
    /// Render a waveform with the given shaping into a table
    pub fn render(waveform: Waveform, shaping: f32) -> Self {
        let table: Vec<f32> = (0..TABLE_LEN)
            .map(|i| sample(waveform, i as f32 / TABLE_LEN as f32, shaping))
            .collect();
        Self { table: table.into() }
    }

    /// Build a wave from an arbitrary single-cycle table
    pub fn from_table(table: Vec<f32>) -> Self {
        Self { table: table.into() }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Linearly interpolated lookup at `phase` (0..1)
    #[inline]
    pub fn at(&self, phase: f32) -> f32 {
        let len = self.table.len();
        if len == 0 {
            return 0.0;
        }
        let pos = phase.rem_euclid(1.0) * len as f32;
        let i = pos as usize % len;
        let frac = pos - pos.floor();
        let a = self.table[i];
        let b = self.table[(i + 1) % len];
        a + (b - a) * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_width_moves_the_edge() {
        assert_eq!(sample(Waveform::Pulse, 0.2, 0.25), 1.0);
        assert_eq!(sample(Waveform::Pulse, 0.3, 0.25), -1.0);
        // out of range widths are clamped rather than producing DC
        assert_eq!(sample(Waveform::Pulse, 0.995, 2.0), -1.0);
    }

    #[test]
    fn neutral_symmetry_is_a_sine() {
        for i in 0..16 {
            let phase = i as f32 / 16.0;
            let expected = (phase * TAU).sin();
            assert!((sample(Waveform::Sine, phase, 0.0) - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn symmetry_keeps_zero_crossings_at_cycle_edges() {
        let skewed = PeriodicWave::render(Waveform::Sine, 0.8);
        assert!(skewed.at(0.0).abs() < 1e-3);
        // the positive lobe is stretched, so a quarter cycle is still rising
        assert!(skewed.at(0.25) > 0.0);
        assert!(skewed.at(0.25) < 0.9);
    }

    #[test]
    fn table_lookup_wraps() {
        let saw = PeriodicWave::render(Waveform::Sawtooth, 0.0);
        assert_eq!(saw.len(), TABLE_LEN);
        assert!((saw.at(1.25) - saw.at(0.25)).abs() < 1e-6);
        assert!((saw.at(0.5) - 0.0).abs() < 1e-3);
    }
}
