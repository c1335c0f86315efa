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

/// An immutable snapshot of "now" handed to every mix step of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    /// Milliseconds since the engine started.
    time_in_ms: f64,
    /// Monotonically increasing tick counter.
    timestep_number: u64,
    /// Number of beats counted so far, including the fractional phase.
    beat_value: f64,
    /// Current audio level, 0 to `u16::MAX`.
    audio_level: u16,
    /// A random draw made once per tick.
    random_value: u32,
}

impl Timing {
    pub fn new(
        time_in_ms: f64,
        timestep_number: u64,
        beat_value: f64,
        audio_level: u16,
        random_value: u32,
    ) -> Timing {
        Timing {
            time_in_ms,
            timestep_number,
            beat_value,
            audio_level,
            random_value,
        }
    }

    pub fn time_in_ms(&self) -> f64 {
        self.time_in_ms
    }

    pub fn timestep_number(&self) -> u64 {
        self.timestep_number
    }

    pub fn beat_value(&self) -> f64 {
        self.beat_value
    }

    pub fn audio_level(&self) -> u16 {
        self.audio_level
    }

    pub fn random_value(&self) -> u32 {
        self.random_value
    }

    /// Derives a value in `[0, max)` from this tick's random draw.
    pub fn draw_random_value(&self, max: u32) -> u32 {
        if max == 0 {
            0
        } else {
            self.random_value % max
        }
    }
}

#[cfg(test)]
mod test {
    use super::Timing;

    #[test]
    fn test_draw_random_value() {
        let timing = Timing::new(0.0, 0, 0.0, 0, 17);
        assert_eq!(timing.draw_random_value(5), 2);
        assert_eq!(timing.draw_random_value(0), 0);
    }
}
