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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlackoutOperation {
    Blackout,
    Restore,
}

/// A global master over every intensity function of the live output.
///
/// The level fades towards 0 (blackout) or 1 (restore) at `fade_speed` full
/// ranges per second. A fade speed of zero switches immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct Blackout {
    level: f64,
    target: f64,
    fade_speed: f64,
}

impl Default for Blackout {
    fn default() -> Self {
        Blackout {
            level: 1.0,
            target: 1.0,
            fade_speed: 0.0,
        }
    }
}

impl Blackout {
    pub fn new() -> Blackout {
        Blackout::default()
    }

    pub fn start(&mut self, operation: BlackoutOperation, fade_speed: f64) {
        self.target = match operation {
            BlackoutOperation::Blackout => 0.0,
            BlackoutOperation::Restore => 1.0,
        };
        self.fade_speed = fade_speed.max(0.0);
        if self.fade_speed == 0.0 {
            self.level = self.target;
        }
    }

    pub fn apply_fade(&mut self, elapsed_ms: f64) {
        if self.fade_speed == 0.0 {
            self.level = self.target;
            return;
        }
        let step = self.fade_speed * elapsed_ms.max(0.0) / 1000.0;
        if self.level < self.target {
            self.level = (self.level + step).min(self.target);
        } else {
            self.level = (self.level - step).max(self.target);
        }
    }

    /// Scales an intensity value by the current blackout level.
    pub fn apply(&self, value: ControlValue) -> ControlValue {
        if self.level >= 1.0 {
            value
        } else {
            value.scale(self.level)
        }
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// True while the output is (partially) blacked out or fading.
    pub fn is_active(&self) -> bool {
        self.level < 1.0 || self.target < 1.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_immediate() {
        let mut blackout = Blackout::new();
        assert!(!blackout.is_active());
        blackout.start(BlackoutOperation::Blackout, 0.0);
        assert!(blackout.is_active());
        assert_eq!(blackout.apply(ControlValue::max()), ControlValue::zero());
        blackout.start(BlackoutOperation::Restore, 0.0);
        assert_eq!(blackout.apply(ControlValue::max()), ControlValue::max());
    }

    #[test]
    fn test_fade() {
        let mut blackout = Blackout::new();
        // Half a range per second: one second takes it halfway down.
        blackout.start(BlackoutOperation::Blackout, 0.5);
        assert_eq!(blackout.level(), 1.0);
        blackout.apply_fade(1000.0);
        assert!((blackout.level() - 0.5).abs() < 1e-9);
        blackout.apply_fade(5000.0);
        assert_eq!(blackout.level(), 0.0);

        blackout.start(BlackoutOperation::Restore, 1.0);
        blackout.apply_fade(250.0);
        assert!((blackout.level() - 0.25).abs() < 1e-9);
        blackout.apply_fade(1000.0);
        assert!(!blackout.is_active());
    }
}
