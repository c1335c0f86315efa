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
use std::fmt;

use crate::control_value::ControlValue;
use crate::controllable::{MixContext, Output};

/// What advances a chase or a time sequence to its next step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// After a fixed number of milliseconds.
    Delay { ms: f64 },
    /// After a number of engine ticks.
    Sync { syncs: u64 },
    /// After a number of beats.
    Beat { beats: f64 },
}

impl Default for Trigger {
    fn default() -> Self {
        Trigger::Delay { ms: 1000.0 }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Delay { ms } => write!(f, "{}ms", ms),
            Trigger::Sync { syncs } => write!(f, "{} syncs", syncs),
            Trigger::Beat { beats } => write!(f, "{} beats", beats),
        }
    }
}

/// The shape of the crossfade between two steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionType {
    /// Switch halfway through the transition.
    Cut,
    #[default]
    Fade,
    /// Fade the first step out completely before fading the next one in.
    FadeThroughBlack,
}

/// A crossfade between two outputs that lasts `length_in_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transition {
    pub length_in_ms: f64,
    pub transition_type: TransitionType,
}

impl Transition {
    pub fn new(length_in_ms: f64, transition_type: TransitionType) -> Transition {
        Transition {
            length_in_ms,
            transition_type,
        }
    }

    /// Returns the levels of the first and second step at `ratio` (0 to 1) of
    /// the way through the transition.
    pub fn levels(&self, ratio: f64) -> (f64, f64) {
        let ratio = ratio.clamp(0.0, 1.0);
        match self.transition_type {
            TransitionType::Cut => {
                if ratio < 0.5 {
                    (1.0, 0.0)
                } else {
                    (0.0, 1.0)
                }
            }
            TransitionType::Fade => (1.0 - ratio, ratio),
            TransitionType::FadeThroughBlack => {
                if ratio < 0.5 {
                    (1.0 - ratio * 2.0, 0.0)
                } else {
                    (0.0, ratio * 2.0 - 1.0)
                }
            }
        }
    }

    /// Mixes `value` into both outputs, weighted for `ratio` of the way
    /// through the transition.
    pub fn mix(
        &self,
        first: Output,
        second: Output,
        ratio: f64,
        value: ControlValue,
        ctx: &mut MixContext<'_>,
    ) {
        let (first_level, second_level) = self.levels(ratio);
        ctx.mix_input(first, value.scale(first_level));
        ctx.mix_input(second, value.scale(second_level));
    }
}
