//! Wave-table oscillator

use dasp_graph::{Buffer, Input};

use crate::node::{mix_inputs, AudioNode, ProcessContext};
use crate::nodes::param::{AutomatedParam, ParamEvent};
use crate::nodes::source::Playback;
use crate::wave::PeriodicWave;

/// Messages to control an [`Oscillator`]
#[derive(Clone, Debug)]
pub enum OscillatorMessage {
    Frequency(ParamEvent),
    /// Swap the wave table (e.g. after a pulse-width change)
    Wave(PeriodicWave),
    Start,
    Stop,
}

/// Phase accumulator with exponential frequency modulation.
///
/// Input signals are read as pitch CV: a sample value of 1.0 raises the
/// frequency by one octave.
pub(crate) struct Phasor {
    pub(crate) frequency: AutomatedParam,
    phase: f32,
    cv: Buffer,
}

impl Phasor {
    pub(crate) fn new(frequency: f32) -> Self {
        Self {
            frequency: AutomatedParam::bounded(frequency, 0.0, 24_000.0),
            phase: 0.0,
            cv: Buffer::default(),
        }
    }

    /// Fill the CV scratch buffer from the node's inputs
    pub(crate) fn read_cv(&mut self, inputs: &[Input]) {
        mix_inputs(inputs, &mut self.cv);
    }

    /// Return the phase for sample `i` of the block, then advance
    #[inline]
    pub(crate) fn step(&mut self, ctx: &ProcessContext, i: usize) -> f32 {
        let base = self.frequency.tick(ctx, ctx.frame + i as u64);
        let hz = base * self.cv[i].exp2();
        let phase = self.phase;
        self.phase = (self.phase + hz / ctx.sample_rate as f32).rem_euclid(1.0);
        phase
    }
}

/// A periodic oscillator that reads its cycle from a [`PeriodicWave`].
///
/// Silent until started; once stopped it stays silent for good.
pub struct Oscillator {
    wave: PeriodicWave,
    phasor: Phasor,
    playback: Playback,
}

impl Oscillator {
    pub fn new(wave: PeriodicWave, frequency: f32) -> Self {
        Self {
            wave,
            phasor: Phasor::new(frequency),
            playback: Playback::Idle,
        }
    }

    #[inline]
    pub fn frequency(&self) -> f32 {
        self.phasor.frequency.value()
    }

    #[inline]
    pub fn playback(&self) -> Playback {
        self.playback
    }
}

impl AudioNode for Oscillator {
    type Message = OscillatorMessage;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = OscillatorMessage>,
        inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                OscillatorMessage::Frequency(event) => self.phasor.frequency.schedule(event),
                OscillatorMessage::Wave(wave) => self.wave = wave,
                OscillatorMessage::Start => self.playback.start(),
                OscillatorMessage::Stop => self.playback.stop(),
            }
        }

        let Some((first, rest)) = outputs.split_first_mut() else {
            return;
        };

        if self.playback != Playback::Running {
            first.iter_mut().for_each(|s| *s = 0.0);
        } else {
            self.phasor.read_cv(inputs);
            for i in 0..first.len() {
                let phase = self.phasor.step(ctx, i);
                first[i] = self.wave.at(phase);
            }
        }

        for buffer in rest.iter_mut() {
            buffer.copy_from_slice(first);
        }
    }

    #[inline]
    fn num_inputs(&self) -> usize { 1 }

    #[inline]
    fn num_outputs(&self) -> usize { 1 }
}
