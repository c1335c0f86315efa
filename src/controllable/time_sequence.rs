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
use crate::timing::Timing;
use crate::trigger::{Transition, Trigger};

use super::{MixContext, Output, PassState};

/// One step of a time sequence. The step holds until its trigger fires and
/// then crossfades into the next step with its transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSequenceStep {
    pub output: Output,
    pub trigger: Trigger,
    pub transition: Transition,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct SequenceState {
    active: bool,
    step: usize,
    step_start_ms: f64,
    step_start_timestep: u64,
    step_start_beat: f64,
    transition_start_ms: Option<f64>,
    /// Completed passes through the whole sequence.
    repeats_done: u32,
    finished: bool,
}

impl SequenceState {
    fn started(timing: &Timing) -> SequenceState {
        let mut state = SequenceState {
            active: true,
            ..Default::default()
        };
        state.start_step(0, timing);
        state
    }

    fn start_step(&mut self, step: usize, timing: &Timing) {
        self.step = step;
        self.step_start_ms = timing.time_in_ms();
        self.step_start_timestep = timing.timestep_number();
        self.step_start_beat = timing.beat_value();
        self.transition_start_ms = None;
    }

    fn trigger_fired(&self, trigger: Trigger, timing: &Timing) -> bool {
        match trigger {
            Trigger::Delay { ms } => timing.time_in_ms() - self.step_start_ms >= ms,
            Trigger::Sync { syncs } => {
                timing.timestep_number().saturating_sub(self.step_start_timestep) >= syncs
            }
            Trigger::Beat { beats } => timing.beat_value() - self.step_start_beat >= beats,
        }
    }
}

/// A one-shot or repeating sequence of steps, each with its own trigger and
/// transition. Unlike a chase it keeps state, and restarts from the first
/// step every time its input turns on.
#[derive(Debug, Clone)]
pub struct TimeSequence {
    steps: Vec<TimeSequenceStep>,
    /// Passes through the sequence before it stops; 0 repeats forever.
    repeat_count: u32,
    /// Whether the last step keeps its value once the repeats are exhausted.
    sustain: bool,
    state: PassState<SequenceState>,
}

impl TimeSequence {
    pub fn new(repeat_count: u32, sustain: bool) -> TimeSequence {
        TimeSequence {
            steps: Vec::new(),
            repeat_count,
            sustain,
            state: PassState::default(),
        }
    }

    pub fn steps(&self) -> &[TimeSequenceStep] {
        &self.steps
    }

    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    pub fn sustain(&self) -> bool {
        self.sustain
    }

    pub(crate) fn add_step(&mut self, step: TimeSequenceStep) {
        self.steps.push(step);
        self.state.set_both(SequenceState::default());
    }

    pub(crate) fn remove_target(&mut self, target: Output) -> bool {
        let before = self.steps.len();
        self.steps.retain(|step| step.output != target);
        self.state.set_both(SequenceState::default());
        before != self.steps.len()
    }

    /// The step currently playing in the given pass.
    pub fn current_step(&self, is_primary: bool) -> Option<usize> {
        let state = self.state.get(is_primary);
        state.active.then_some(state.step)
    }

    pub fn is_finished(&self, is_primary: bool) -> bool {
        self.state.get(is_primary).finished
    }

    pub fn mix(&mut self, input: ControlValue, ctx: &mut MixContext<'_>) {
        let state = self.state.get_mut(ctx.is_primary());
        if input.is_zero() || self.steps.is_empty() {
            state.active = false;
            return;
        }
        let timing = ctx.timing();
        if !state.active {
            *state = SequenceState::started(timing);
        }

        let last = self.steps.len() - 1;
        if state.finished {
            if self.sustain {
                ctx.mix_input(self.steps[last].output, input);
            }
            return;
        }

        let step = self.steps[state.step];
        match state.transition_start_ms {
            None => {
                if !state.trigger_fired(step.trigger, timing) {
                    ctx.mix_input(step.output, input);
                    return;
                }
                let wraps = state.step == last;
                if wraps && self.repeat_count != 0 && state.repeats_done + 1 >= self.repeat_count {
                    state.repeats_done += 1;
                    state.finished = true;
                    if self.sustain {
                        ctx.mix_input(step.output, input);
                    }
                    return;
                }
                state.transition_start_ms = Some(timing.time_in_ms());
                if step.transition.length_in_ms > 0.0 {
                    let next = self.steps[(state.step + 1) % self.steps.len()];
                    step.transition.mix(step.output, next.output, 0.0, input, ctx);
                    return;
                }
            }
            Some(start) => {
                let ratio = if step.transition.length_in_ms > 0.0 {
                    (timing.time_in_ms() - start) / step.transition.length_in_ms
                } else {
                    1.0
                };
                if ratio < 1.0 {
                    let next = self.steps[(state.step + 1) % self.steps.len()];
                    step.transition.mix(step.output, next.output, ratio, input, ctx);
                    return;
                }
            }
        }

        // The transition into the next step is complete.
        let next = (state.step + 1) % self.steps.len();
        if next == 0 {
            state.repeats_done += 1;
        }
        state.start_step(next, timing);
        ctx.mix_input(self.steps[next].output, input);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::controllable::testing::{ids, Harness};
    use crate::controllable::ControllableId;
    use crate::trigger::TransitionType;

    fn sequence(
        targets: &[ControllableId],
        delay: f64,
        transition: Transition,
        repeat_count: u32,
        sustain: bool,
    ) -> TimeSequence {
        let mut sequence = TimeSequence::new(repeat_count, sustain);
        for target in targets {
            sequence.add_step(TimeSequenceStep {
                output: Output::new(*target, 0),
                trigger: Trigger::Delay { ms: delay },
                transition,
            });
        }
        sequence
    }

    fn active(harness: &Harness, targets: &[ControllableId]) -> Vec<f64> {
        targets.iter().map(|t| harness.ratio(*t)).collect()
    }

    #[test]
    fn test_steps_and_restart() {
        let targets = ids(3);
        let mut harness = Harness::new(&targets, 1);
        let mut seq = sequence(&targets, 100.0, Transition::default(), 0, false);

        // Activation happens at 1000, so that is where step 0 starts.
        harness.mix_at(1000.0, |ctx| seq.mix(ControlValue::max(), ctx));
        assert_eq!(active(&harness, &targets), vec![1.0, 0.0, 0.0]);
        harness.mix_at(1100.0, |ctx| seq.mix(ControlValue::max(), ctx));
        assert_eq!(active(&harness, &targets), vec![0.0, 1.0, 0.0]);
        assert_eq!(seq.current_step(true), Some(1));

        // Turning the input off and on again restarts at the first step.
        harness.mix_at(1150.0, |ctx| seq.mix(ControlValue::zero(), ctx));
        assert_eq!(seq.current_step(true), None);
        harness.mix_at(1160.0, |ctx| seq.mix(ControlValue::max(), ctx));
        assert_eq!(active(&harness, &targets), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_repeat_forever_wraps() {
        let targets = ids(2);
        let mut harness = Harness::new(&targets, 1);
        let mut seq = sequence(&targets, 10.0, Transition::default(), 0, false);
        let mut time = 0.0;
        for _ in 0..10 {
            harness.mix_at(time, |ctx| seq.mix(ControlValue::max(), ctx));
            time += 10.0;
        }
        assert!(!seq.is_finished(true));
        assert_eq!(seq.current_step(true), Some(1));
    }

    #[test]
    fn test_finite_repeat_freezes() {
        let targets = ids(2);
        let mut harness = Harness::new(&targets, 1);
        let mut held = sequence(&targets, 10.0, Transition::default(), 1, true);
        let mut dropped = sequence(&targets, 10.0, Transition::default(), 1, false);

        for time in [0.0, 10.0, 20.0, 30.0] {
            harness.mix_at(time, |ctx| held.mix(ControlValue::max(), ctx));
        }
        assert!(held.is_finished(true));
        assert_eq!(active(&harness, &targets), vec![0.0, 1.0]);

        for time in [0.0, 10.0, 20.0, 30.0] {
            harness.mix_at(time, |ctx| dropped.mix(ControlValue::max(), ctx));
        }
        assert!(dropped.is_finished(true));
        assert_eq!(active(&harness, &targets), vec![0.0, 0.0]);
    }

    #[test]
    fn test_transition_between_steps() {
        let targets = ids(2);
        let mut harness = Harness::new(&targets, 1);
        let mut seq = sequence(
            &targets,
            100.0,
            Transition::new(100.0, TransitionType::Fade),
            0,
            false,
        );
        harness.mix_at(0.0, |ctx| seq.mix(ControlValue::max(), ctx));
        harness.mix_at(100.0, |ctx| seq.mix(ControlValue::max(), ctx));
        assert_eq!(active(&harness, &targets), vec![1.0, 0.0]);
        harness.mix_at(150.0, |ctx| seq.mix(ControlValue::max(), ctx));
        let values = active(&harness, &targets);
        assert!((values[0] - 0.5).abs() < 1e-6 && (values[1] - 0.5).abs() < 1e-6);
        harness.mix_at(200.0, |ctx| seq.mix(ControlValue::max(), ctx));
        assert_eq!(active(&harness, &targets), vec![0.0, 1.0]);
        assert_eq!(seq.current_step(true), Some(1));
    }

    #[test]
    fn test_passes_are_independent() {
        let targets = ids(2);
        let mut harness = Harness::new(&targets, 1);
        let mut seq = sequence(&targets, 100.0, Transition::default(), 0, false);
        harness.mix_at(0.0, |ctx| seq.mix(ControlValue::max(), ctx));
        harness.mix_at(100.0, |ctx| seq.mix(ControlValue::max(), ctx));
        assert_eq!(seq.current_step(true), Some(1));
        assert_eq!(seq.current_step(false), None);

        let timing = Timing::new(100.0, 0, 0.0, 0, 0);
        harness.mix(&timing, false, |ctx| seq.mix(ControlValue::max(), ctx));
        assert_eq!(seq.current_step(false), Some(0));
        assert_eq!(seq.current_step(true), Some(1));
    }
}
