// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
//! Single-input nodes that reshape their input over time and forward it to a
//! list of connections.

use std::collections::VecDeque;
use std::fmt;

use crate::control_value::ControlValue;

use super::{MixContext, Output, PassState};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FadeState {
    value: f64,
    last_time_ms: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlickerState {
    value: f64,
    target: f64,
    last_time_ms: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispenserState {
    was_on: bool,
    index: Option<usize>,
}

/// The kind of an effect, with its parameters and per-pass state.
#[derive(Debug, Clone)]
pub enum EffectKind {
    /// Scales the input by the current audio level.
    AudioLevel,
    /// Scales the input by a fixed value.
    Constant { value: ControlValue },
    /// Replays the input `delay_in_ms` later.
    Delay {
        delay_in_ms: f64,
        history: PassState<VecDeque<(f64, ControlValue)>>,
    },
    /// Sends the input to one connection at a time, moving to the next one
    /// every time the input turns on.
    Dispenser { state: PassState<DispenserState> },
    /// Follows the input at a limited speed, in full ranges per second. A
    /// speed of zero follows immediately.
    Fade {
        fade_up_speed: f64,
        fade_down_speed: f64,
        state: PassState<FadeState>,
    },
    /// Wanders randomly between 0 and 1, moving at `speed` full ranges per
    /// second, and scales the input by where it is.
    Flicker {
        speed: f64,
        state: PassState<FlickerState>,
    },
    /// Outputs the inverse of its input.
    Inverter,
    /// Blinks the input on for `on_ms` and off for `off_ms`, starting when the
    /// input turns on.
    Pulse {
        on_ms: f64,
        off_ms: f64,
        start: PassState<Option<f64>>,
    },
    /// Maps `[lower, upper]` onto the full range; below is off, above is full.
    Threshold {
        lower: ControlValue,
        upper: ControlValue,
    },
}

impl EffectKind {
    pub fn audio_level() -> EffectKind {
        EffectKind::AudioLevel
    }

    pub fn constant(value: ControlValue) -> EffectKind {
        EffectKind::Constant { value }
    }

    pub fn delay(delay_in_ms: f64) -> EffectKind {
        EffectKind::Delay {
            delay_in_ms,
            history: PassState::default(),
        }
    }

    pub fn dispenser() -> EffectKind {
        EffectKind::Dispenser {
            state: PassState::default(),
        }
    }

    pub fn fade(fade_up_speed: f64, fade_down_speed: f64) -> EffectKind {
        EffectKind::Fade {
            fade_up_speed,
            fade_down_speed,
            state: PassState::default(),
        }
    }

    pub fn flicker(speed: f64) -> EffectKind {
        EffectKind::Flicker {
            speed,
            state: PassState::default(),
        }
    }

    pub fn inverter() -> EffectKind {
        EffectKind::Inverter
    }

    pub fn pulse(on_ms: f64, off_ms: f64) -> EffectKind {
        EffectKind::Pulse {
            on_ms,
            off_ms,
            start: PassState::default(),
        }
    }

    pub fn threshold(lower: ControlValue, upper: ControlValue) -> EffectKind {
        EffectKind::Threshold { lower, upper }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::AudioLevel => "audio level",
            EffectKind::Constant { .. } => "constant",
            EffectKind::Delay { .. } => "delay",
            EffectKind::Dispenser { .. } => "dispenser",
            EffectKind::Fade { .. } => "fade",
            EffectKind::Flicker { .. } => "flicker",
            EffectKind::Inverter => "inverter",
            EffectKind::Pulse { .. } => "pulse",
            EffectKind::Threshold { .. } => "threshold",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Moves `value` towards `target` by at most `step`, without overshooting.
fn approach(value: f64, target: f64, step: f64) -> f64 {
    if value < target {
        (value + step).min(target)
    } else {
        (value - step).max(target)
    }
}

/// An effect node.
#[derive(Debug, Clone)]
pub struct Effect {
    kind: EffectKind,
    connections: Vec<Output>,
}

impl Effect {
    pub fn new(kind: EffectKind) -> Effect {
        Effect {
            kind,
            connections: Vec::new(),
        }
    }

    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    pub fn connections(&self) -> &[Output] {
        &self.connections
    }

    pub(crate) fn add_connection(&mut self, output: Output) {
        self.connections.push(output);
    }

    pub(crate) fn remove_target(&mut self, target: Output) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| *c != target);
        before != self.connections.len()
    }

    fn send(&self, value: ControlValue, ctx: &mut MixContext<'_>) {
        for connection in &self.connections {
            ctx.mix_input(*connection, value);
        }
    }

    pub fn mix(&mut self, input: ControlValue, ctx: &mut MixContext<'_>) {
        let timing = ctx.timing();
        let now = timing.time_in_ms();
        let is_primary = ctx.is_primary();
        let output = match &mut self.kind {
            EffectKind::AudioLevel => ControlValue::multiply_values(
                input,
                ControlValue::fraction(u32::from(timing.audio_level()), u32::from(u16::MAX)),
            ),
            EffectKind::Constant { value } => ControlValue::multiply_values(input, *value),
            EffectKind::Delay {
                delay_in_ms,
                history,
            } => {
                let history = history.get_mut(is_primary);
                history.push_back((now, input));
                let cutoff = now - *delay_in_ms;
                // Keep the newest sample at or before the cutoff.
                while history.len() > 1 && history[1].0 <= cutoff {
                    history.pop_front();
                }
                match history.front() {
                    Some((time, value)) if *time <= cutoff => *value,
                    _ => ControlValue::zero(),
                }
            }
            EffectKind::Dispenser { state } => {
                let state = state.get_mut(is_primary);
                let is_on = !input.is_zero();
                if is_on && !state.was_on && !self.connections.is_empty() {
                    state.index = Some(match state.index {
                        Some(index) => (index + 1) % self.connections.len(),
                        None => 0,
                    });
                }
                state.was_on = is_on;
                if let Some(connection) = state
                    .index
                    .and_then(|index| self.connections.get(index))
                    .copied()
                {
                    ctx.mix_input(connection, input);
                }
                return;
            }
            EffectKind::Fade {
                fade_up_speed,
                fade_down_speed,
                state,
            } => {
                let state = state.get_mut(is_primary);
                let target = input.ratio();
                let speed = if target > state.value {
                    *fade_up_speed
                } else {
                    *fade_down_speed
                };
                state.value = match state.last_time_ms {
                    Some(last) if speed > 0.0 => {
                        approach(state.value, target, speed * (now - last).max(0.0) / 1000.0)
                    }
                    _ => target,
                };
                state.last_time_ms = Some(now);
                ControlValue::from_ratio(state.value)
            }
            EffectKind::Flicker { speed, state } => {
                let state = state.get_mut(is_primary);
                let elapsed = state.last_time_ms.map_or(0.0, |last| (now - last).max(0.0));
                state.last_time_ms = Some(now);
                state.value = approach(state.value, state.target, *speed * elapsed / 1000.0);
                if state.value == state.target {
                    state.target = f64::from(timing.draw_random_value(1001)) / 1000.0;
                }
                input.scale(state.value)
            }
            EffectKind::Inverter => input.invert(),
            EffectKind::Pulse {
                on_ms,
                off_ms,
                start,
            } => {
                let start = start.get_mut(is_primary);
                if input.is_zero() {
                    *start = None;
                    ControlValue::zero()
                } else {
                    let began = *start.get_or_insert(now);
                    let period = *on_ms + *off_ms;
                    if period <= 0.0 || (now - began).rem_euclid(period) < *on_ms {
                        input
                    } else {
                        ControlValue::zero()
                    }
                }
            }
            EffectKind::Threshold { lower, upper } => {
                if input < *lower {
                    ControlValue::zero()
                } else if input >= *upper {
                    ControlValue::max()
                } else {
                    ControlValue::fraction(input.uint() - lower.uint(), upper.uint() - lower.uint())
                }
            }
        };
        self.send(output, ctx);
    }
}
