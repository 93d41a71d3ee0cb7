//! Constant (DC) source, used for joystick axes

use dasp_graph::{Buffer, Input};

use crate::node::{AudioNode, ProcessContext};
use crate::nodes::param::{AutomatedParam, ParamEvent};
use crate::nodes::source::Playback;

#[derive(Clone, Copy, Debug)]
pub enum ConstantMessage {
    Value(ParamEvent),
    Start,
    Stop,
}

pub struct Constant {
    value: AutomatedParam,
    playback: Playback,
}

impl Constant {
    pub fn new(value: f32) -> Self {
        Self {
            value: AutomatedParam::bounded(value, -1.0, 1.0),
            playback: Playback::Idle,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value.value()
    }
}

impl AudioNode for Constant {
    type Message = ConstantMessage;

    fn process(
        &mut self,
        ctx: &ProcessContext,
        messages: impl Iterator<Item = ConstantMessage>,
        _inputs: &[Input],
        outputs: &mut [Buffer],
    ) {
        for msg in messages {
            match msg {
                ConstantMessage::Value(event) => self.value.schedule(event),
                ConstantMessage::Start => self.playback.start(),
                ConstantMessage::Stop => self.playback.stop(),
            }
        }

        let Some((first, rest)) = outputs.split_first_mut() else {
            return;
        };

        let running = self.playback == Playback::Running;
        for (i, sample) in first.iter_mut().enumerate() {
            let v = self.value.tick(ctx, ctx.frame + i as u64);
            *sample = if running { v } else { 0.0 };
        }

        for buffer in rest.iter_mut() {
            buffer.copy_from_slice(first);
        }
    }
}
