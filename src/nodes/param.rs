//! Sample-accurate parameter automation
//!
//! Every automatable node parameter is an [`AutomatedParam`]. The control
//! thread schedules [`ParamEvent`]s through the node's message queue; the
//! audio thread evaluates the parameter once per sample.

use crate::node::ProcessContext;

/// A scheduled change to a node parameter.
///
/// Frame positions are absolute (see [`AudioRuntime::current_frame`](crate::AudioRuntime::current_frame)).
/// Events at or before the current frame take effect immediately.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamEvent {
    /// Jump to `value` at `frame`
    SetValueAtTime { value: f32, frame: u64 },
    /// Ramp linearly from the current value, reaching `value` at `frame`
    LinearRampToValueAtTime { value: f32, frame: u64 },
    /// Approach `target` exponentially from `frame` with the given time constant
    SetTargetAtTime {
        target: f32,
        frame: u64,
        time_constant: f32,
    },
}

impl ParamEvent {
    /// Set `value` right now
    pub fn now(value: f32) -> Self {
        ParamEvent::SetValueAtTime { value, frame: 0 }
    }

    /// The value the parameter ends up at once this event has played out
    pub fn target_value(&self) -> f32 {
        match *self {
            ParamEvent::SetValueAtTime { value, .. } => value,
            ParamEvent::LinearRampToValueAtTime { value, .. } => value,
            ParamEvent::SetTargetAtTime { target, .. } => target,
        }
    }

    /// Glide towards `target` starting now
    pub fn glide(target: f32, time_constant: f32) -> Self {
        ParamEvent::SetTargetAtTime {
            target,
            frame: 0,
            time_constant,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Segment {
    Hold,
    Linear {
        from: f32,
        to: f32,
        start: u64,
        end: u64,
    },
    Target {
        target: f32,
        coeff: f32,
    },
}

/// A parameter value with at most one pending and one running automation.
///
/// Scheduling a new event replaces whatever was pending or running, which is
/// all the routing engine needs (knob moves and gain retunes).
#[derive(Clone, Debug)]
pub struct AutomatedParam {
    value: f32,
    min: f32,
    max: f32,
    segment: Segment,
    pending: Option<ParamEvent>,
}

impl AutomatedParam {
    pub fn new(value: f32) -> Self {
        Self::bounded(value, f32::MIN, f32::MAX)
    }

    pub fn bounded(value: f32, min: f32, max: f32) -> Self {
        Self {
            value: value.clamp(min, max),
            min,
            max,
            segment: Segment::Hold,
            pending: None,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Queue an event; it starts on the first sample at or after its frame
    pub fn schedule(&mut self, event: ParamEvent) {
        self.pending = Some(event);
    }

    /// Whether the value will change on upcoming samples
    pub fn is_moving(&self) -> bool {
        self.pending.is_some() || !matches!(self.segment, Segment::Hold)
    }

    /// Advance to `frame` and return the value for that sample
    #[inline]
    pub fn tick(&mut self, ctx: &ProcessContext, frame: u64) -> f32 {
        if let Some(event) = self.pending {
            if Self::starts_at(&event) <= frame {
                self.pending = None;
                self.begin(ctx, event, frame);
            }
        }

        match self.segment {
            Segment::Hold => {}
            Segment::Linear { from, to, start, end } => {
                if frame >= end {
                    self.value = to;
                    self.segment = Segment::Hold;
                } else {
                    let t = (frame - start) as f32 / (end - start) as f32;
                    self.value = from + (to - from) * t;
                }
            }
            Segment::Target { target, coeff } => {
                self.value = target + coeff * (self.value - target);
                if (self.value - target).abs() < 1e-6 {
                    self.value = target;
                    self.segment = Segment::Hold;
                }
            }
        }

        self.value = self.value.clamp(self.min, self.max);
        self.value
    }

    fn starts_at(event: &ParamEvent) -> u64 {
        match *event {
            ParamEvent::SetValueAtTime { frame, .. } => frame,
            // ramps run from "now" and end at their frame
            ParamEvent::LinearRampToValueAtTime { .. } => 0,
            ParamEvent::SetTargetAtTime { frame, .. } => frame,
        }
    }

    fn begin(&mut self, ctx: &ProcessContext, event: ParamEvent, now: u64) {
        self.segment = match event {
            ParamEvent::SetValueAtTime { value, .. } => {
                self.value = value;
                Segment::Hold
            }
            ParamEvent::LinearRampToValueAtTime { value, frame } => {
                if frame <= now {
                    self.value = value;
                    Segment::Hold
                } else {
                    Segment::Linear {
                        from: self.value,
                        to: value,
                        start: now,
                        end: frame,
                    }
                }
            }
            ParamEvent::SetTargetAtTime {
                target,
                time_constant,
                ..
            } => {
                let samples = ctx.frames(time_constant);
                if samples <= 1.0 {
                    self.value = target;
                    Segment::Hold
                } else {
                    Segment::Target {
                        target,
                        coeff: (-1.0 / samples).exp(),
                    }
                }
            }
        };
    }
}
