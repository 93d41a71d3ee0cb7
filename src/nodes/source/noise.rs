//! Noise generator

use dasp_graph::{Buffer, Input};
use oorandom::Rand32;

use crate::node::{AudioNode, ProcessContext};
use crate::nodes::source::Playback;

#[derive(Clone, Copy, Debug)]
pub enum NoiseMessage {
    /// 0.0 = white, 1.0 = darkest
    Colour(f32),
    Start,
    Stop,
}

/// White noise through a one-pole lowpass whose cutoff follows the colour
pub struct Noise {
    rng: Rand32,
    colour: f32,
    state: f32,
    playback: Playback,
}

impl Noise {
    pub fn new(colour: f32, seed: u64) -> Self {
        Self {
            rng: Rand32::new(seed),
            colour: colour.clamp(0.0, 1.0),
            state: 0.0,
            playback: Playback::Idle,
        }
    }

    #[inline]
    pub fn colour(&self) -> f32 {
        self.colour
    }
}

impl AudioNode for Noise {
    type Message = NoiseMessage;

    fn process(
        &mut self,
        _ctx: &ProcessContext,
        messages: impl Iterator<Item = NoiseMessage>,
        _inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                NoiseMessage::Colour(c) => self.colour = c.clamp(0.0, 1.0),
                NoiseMessage::Start => self.playback.start(),
                NoiseMessage::Stop => self.playback.stop(),
            }
        }

        let Some((first, rest)) = outputs.split_first_mut() else {
            return;
        };

        if self.playback != Playback::Running {
            first.iter_mut().for_each(|s| *s = 0.0);
        } else {
            let coeff = 1.0 - 0.98 * self.colour;
            // darker noise loses energy in the filter; make some of it back
            let makeup = 1.0 + 2.0 * self.colour;
            for sample in first.iter_mut() {
                let white = self.rng.rand_float() * 2.0 - 1.0;
                self.state += coeff * (white - self.state);
                *sample = (self.state * makeup).clamp(-1.0, 1.0);
            }
        }

        for buffer in rest.iter_mut() {
            buffer.copy_from_slice(first);
        }
    }
}
