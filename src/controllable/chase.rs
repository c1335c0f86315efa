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
use crate::control_value::ControlValue;
use crate::trigger::{Transition, Trigger};

use super::{MixContext, Output};

/// Loops through a sequence of outputs. The active step is a pure function of
/// the timing, so a chase carries no per-pass state.
#[derive(Debug, Clone)]
pub struct Chase {
    sequence: Vec<Output>,
    trigger: Trigger,
    transition: Transition,
    /// Shifts the delay-triggered cycle, in milliseconds.
    phase_offset: f64,
}

impl Chase {
    pub fn new(trigger: Trigger, transition: Transition) -> Chase {
        Chase {
            sequence: Vec::new(),
            trigger,
            transition,
            phase_offset: 0.0,
        }
    }

    pub fn sequence(&self) -> &[Output] {
        &self.sequence
    }

    pub(crate) fn add_step(&mut self, output: Output) {
        self.sequence.push(output);
    }

    /// Removes every step into `target`. Returns true if anything was removed.
    pub(crate) fn remove_target(&mut self, target: Output) -> bool {
        let before = self.sequence.len();
        self.sequence.retain(|step| *step != target);
        before != self.sequence.len()
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn transition(&self) -> Transition {
        self.transition
    }

    pub(crate) fn set_trigger(&mut self, trigger: Trigger) {
        self.trigger = trigger;
    }

    pub(crate) fn set_transition(&mut self, transition: Transition) {
        self.transition = transition;
    }

    /// The length of one step of a delay-triggered chase, hold plus
    /// transition.
    fn step_length(&self, delay_in_ms: f64) -> f64 {
        (delay_in_ms + self.transition.length_in_ms).max(0.0)
    }

    /// Where a delay-triggered chase is in its cycle at `time_in_ms`, from 0
    /// (inclusive) to 1 (exclusive).
    pub fn relative_phase(&self, time_in_ms: f64) -> f64 {
        let Trigger::Delay { ms } = self.trigger else {
            return 0.0;
        };
        let cycle = self.step_length(ms) * self.sequence.len() as f64;
        if cycle <= 0.0 {
            return 0.0;
        }
        (time_in_ms + self.phase_offset).rem_euclid(cycle) / cycle
    }

    /// Changes the delay and transition length of a delay-triggered chase
    /// without a visible jump: the relative phase at `current_time_ms` is the
    /// same before and after.
    pub(crate) fn shift_delay_trigger(
        &mut self,
        delay_in_ms: f64,
        transition_in_ms: f64,
        current_time_ms: f64,
    ) {
        let phase = self.relative_phase(current_time_ms);
        self.trigger = Trigger::Delay { ms: delay_in_ms };
        self.transition.length_in_ms = transition_in_ms;

        let cycle = self.step_length(delay_in_ms) * self.sequence.len() as f64;
        self.phase_offset = if cycle > 0.0 {
            (phase * cycle - current_time_ms).rem_euclid(cycle)
        } else {
            0.0
        };
    }

    pub fn mix(&mut self, input: ControlValue, ctx: &mut MixContext<'_>) {
        if input.is_zero() || self.sequence.is_empty() {
            return;
        }
        let len = self.sequence.len();
        let timing = ctx.timing();
        match self.trigger {
            Trigger::Beat { beats } => {
                let step = if beats > 0.0 {
                    (timing.beat_value() / beats).floor().max(0.0) as usize % len
                } else {
                    0
                };
                ctx.mix_input(self.sequence[step], input);
            }
            Trigger::Sync { syncs } => {
                let step = (timing.timestep_number() / syncs.max(1)) as usize % len;
                ctx.mix_input(self.sequence[step], input);
            }
            Trigger::Delay { ms } => {
                let step_length = self.step_length(ms);
                if step_length <= 0.0 {
                    ctx.mix_input(self.sequence[0], input);
                    return;
                }
                let cycle = step_length * len as f64;
                let phase = (timing.time_in_ms() + self.phase_offset).rem_euclid(cycle);
                let step = ((phase / step_length) as usize).min(len - 1);
                let within_step = phase - step as f64 * step_length;
                if within_step < ms || self.transition.length_in_ms <= 0.0 {
                    ctx.mix_input(self.sequence[step], input);
                } else {
                    let ratio = (within_step - ms) / self.transition.length_in_ms;
                    let next = self.sequence[(step + 1) % len];
                    self.transition
                        .mix(self.sequence[step], next, ratio, input, ctx);
                }
            }
        }
    }
}
