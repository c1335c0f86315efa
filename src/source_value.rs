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
use crate::controllable::Output;
use crate::graph::arena::arena_key;

arena_key!(
    /// Handle to a source value.
    SourceValueId,
    "source-value"
);

/// One lane of a source value: a value that fades towards a target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SingleSourceValue {
    value: f64,
    target: f64,
    /// Full ranges per second. Zero jumps straight to the target.
    fade_speed: f64,
}

impl SingleSourceValue {
    pub fn value(&self) -> ControlValue {
        ControlValue::from_ratio(self.value)
    }

    pub fn target_value(&self) -> ControlValue {
        ControlValue::from_ratio(self.target)
    }

    pub fn fade_speed(&self) -> f64 {
        self.fade_speed
    }

    pub fn set(&mut self, target: ControlValue, fade_speed: f64) {
        self.target = target.ratio();
        self.fade_speed = fade_speed.max(0.0);
        if self.fade_speed == 0.0 {
            self.value = self.target;
        }
    }

    /// Moves the value towards the target by `fade_speed * elapsed`. Never
    /// overshoots.
    pub fn apply_fade(&mut self, elapsed_seconds: f64) {
        if self.fade_speed == 0.0 {
            self.value = self.target;
            return;
        }
        let step = self.fade_speed * elapsed_seconds.max(0.0);
        self.value = if self.value < self.target {
            (self.value + step).min(self.target)
        } else {
            (self.value - step).max(self.target)
        };
    }
}

/// Selects one of the two lanes of a source value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    /// Live: feeds the primary pass.
    A,
    /// Preview: feeds the secondary pass.
    B,
}

/// A user-facing intensity bound to one input of a controllable. Lane A
/// feeds the primary mix and lane B the secondary one, each with its own
/// fade.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceValue {
    target: Output,
    a: SingleSourceValue,
    b: SingleSourceValue,
}

impl SourceValue {
    pub fn new(target: Output) -> SourceValue {
        SourceValue {
            target,
            a: SingleSourceValue::default(),
            b: SingleSourceValue::default(),
        }
    }

    pub fn target(&self) -> Output {
        self.target
    }

    pub fn a(&self) -> &SingleSourceValue {
        &self.a
    }

    pub fn a_mut(&mut self) -> &mut SingleSourceValue {
        &mut self.a
    }

    pub fn b(&self) -> &SingleSourceValue {
        &self.b
    }

    pub fn b_mut(&mut self) -> &mut SingleSourceValue {
        &mut self.b
    }

    pub fn lane_mut(&mut self, lane: Lane) -> &mut SingleSourceValue {
        match lane {
            Lane::A => &mut self.a,
            Lane::B => &mut self.b,
        }
    }

    /// The lane that feeds the given pass.
    pub fn lane(&self, is_primary: bool) -> &SingleSourceValue {
        if is_primary {
            &self.a
        } else {
            &self.b
        }
    }

    pub fn apply_fades(&mut self, elapsed_seconds: f64) {
        self.a.apply_fade(elapsed_seconds);
        self.b.apply_fade(elapsed_seconds);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::controllable::testing::ids;

    #[test]
    fn test_immediate_set() {
        let mut lane = SingleSourceValue::default();
        lane.set(ControlValue::max(), 0.0);
        assert_eq!(lane.value(), ControlValue::max());
        assert_eq!(lane.target_value(), ControlValue::max());
    }

    #[test]
    fn test_fade_without_overshoot() {
        let mut lane = SingleSourceValue::default();
        // Full range in two seconds.
        lane.set(ControlValue::max(), 0.5);
        assert_eq!(lane.value(), ControlValue::zero());
        assert_eq!(lane.target_value(), ControlValue::max());

        let mut previous = 0.0;
        for _ in 0..100 {
            lane.apply_fade(0.025);
            let ratio = lane.value().ratio();
            assert!(ratio >= previous && ratio <= 1.0);
            previous = ratio;
        }
        assert_eq!(lane.value(), ControlValue::max());

        lane.set(ControlValue::zero(), 4.0);
        lane.apply_fade(0.125);
        assert!((lane.value().ratio() - 0.5).abs() < 1e-6);
        lane.apply_fade(10.0);
        assert_eq!(lane.value(), ControlValue::zero());
    }

    #[test]
    fn test_lanes_are_independent() {
        let mut source = SourceValue::new(Output::new(ids(1)[0], 0));
        source.a_mut().set(ControlValue::max(), 0.0);
        source.b_mut().set(ControlValue::max(), 1.0);
        source.apply_fades(0.5);
        assert_eq!(source.lane(true).value(), ControlValue::max());
        assert!((source.lane(false).value().ratio() - 0.5).abs() < 1e-6);
    }
}
