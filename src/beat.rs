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
use std::time::Duration;

/// A beat detection device. Absence or failure of the device is never fatal:
/// the engine falls back to a beat value of zero.
pub trait BeatFinder: Send {
    /// The number of beats counted so far, with the phase in the fraction,
    /// and the confidence of the detection. `None` when no beat is known.
    fn beat_value(&mut self) -> Option<(f64, f64)>;

    /// The current audio level, 0 to `u16::MAX`.
    fn audio_level(&mut self) -> u16;
}

/// Tracks manually tapped beats. Between taps the beat advances by the
/// elapsed time over the last tap interval; after `decay` without a tap the
/// device takes over again.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualBeat {
    decay_ms: f64,
    last_tap_ms: Option<f64>,
    interval_ms: Option<f64>,
    beat_at_last_tap: f64,
}

impl ManualBeat {
    pub fn new(decay: Duration) -> ManualBeat {
        ManualBeat {
            decay_ms: decay.as_secs_f64() * 1000.0,
            last_tap_ms: None,
            interval_ms: None,
            beat_at_last_tap: 0.0,
        }
    }

    /// Registers a tap at `time_in_ms`. Each tap lands on a whole beat.
    pub fn tap(&mut self, time_in_ms: f64) {
        match self.last_tap_ms {
            Some(last) if time_in_ms - last < self.decay_ms && time_in_ms > last => {
                self.beat_at_last_tap = (self.beat_at_last_tap + 1.0).floor();
                self.interval_ms = Some(time_in_ms - last);
            }
            _ => {
                self.beat_at_last_tap = 0.0;
                self.interval_ms = None;
            }
        }
        self.last_tap_ms = Some(time_in_ms);
    }

    /// The manual beat at `time_in_ms`, or `None` when there is no recent
    /// tempo and the device should be used.
    pub fn beat_value(&self, time_in_ms: f64) -> Option<f64> {
        let last = self.last_tap_ms?;
        let interval = self.interval_ms?;
        let since = time_in_ms - last;
        if since > self.decay_ms || interval <= 0.0 {
            return None;
        }
        Some(self.beat_at_last_tap + since.max(0.0) / interval)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_taps_set_tempo() {
        let mut beat = ManualBeat::new(Duration::from_secs(8));
        beat.tap(1000.0);
        // One tap alone has no tempo.
        assert_eq!(beat.beat_value(1100.0), None);
        beat.tap(1500.0);
        assert_eq!(beat.beat_value(1500.0), Some(1.0));
        assert_eq!(beat.beat_value(1750.0), Some(1.5));
        beat.tap(2000.0);
        assert_eq!(beat.beat_value(2250.0), Some(2.5));
    }

    #[test]
    fn test_decay() {
        let mut beat = ManualBeat::new(Duration::from_secs(8));
        beat.tap(0.0);
        beat.tap(500.0);
        assert!(beat.beat_value(8500.0).is_some());
        assert_eq!(beat.beat_value(8501.0), None);

        // A tap after the decay starts counting again.
        beat.tap(20_000.0);
        assert_eq!(beat.beat_value(20_100.0), None);
    }
}
