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

use serde::Deserialize;

/// What a fixture function does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionType {
    Master,
    Red,
    Green,
    Blue,
    White,
    Amber,
    #[serde(rename = "uv")]
    UV,
    Lime,
    ColdWhite,
    WarmWhite,
    Strobe,
    Pan,
    Tilt,
    Zoom,
    ColorMacro,
    Effect,
    Unknown,
}

impl FunctionType {
    /// Returns true for functions that emit colored light.
    pub fn is_color(&self) -> bool {
        matches!(
            self,
            FunctionType::Red
                | FunctionType::Green
                | FunctionType::Blue
                | FunctionType::White
                | FunctionType::Amber
                | FunctionType::UV
                | FunctionType::Lime
                | FunctionType::ColdWhite
                | FunctionType::WarmWhite
        )
    }

    /// Returns true for functions whose value is an intensity, which a blackout
    /// should take down. Positions and macros are left alone.
    pub fn is_intensity(&self) -> bool {
        self.is_color() || matches!(self, FunctionType::Master | FunctionType::Strobe)
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FunctionType::Master => "master",
            FunctionType::Red => "red",
            FunctionType::Green => "green",
            FunctionType::Blue => "blue",
            FunctionType::White => "white",
            FunctionType::Amber => "amber",
            FunctionType::UV => "uv",
            FunctionType::Lime => "lime",
            FunctionType::ColdWhite => "cold white",
            FunctionType::WarmWhite => "warm white",
            FunctionType::Strobe => "strobe",
            FunctionType::Pan => "pan",
            FunctionType::Tilt => "tilt",
            FunctionType::Zoom => "zoom",
            FunctionType::ColorMacro => "color macro",
            FunctionType::Effect => "effect",
            FunctionType::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// One function of a fixture type: what it does and where it lives relative to
/// the fixture's first channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureTypeFunction {
    pub function_type: FunctionType,
    /// Offset of the (coarse) channel from the fixture's first channel.
    pub dmx_offset: usize,
    /// 16-bit functions occupy `dmx_offset` (high byte) and `dmx_offset + 1`.
    pub is_16_bit: bool,
}

impl FixtureTypeFunction {
    pub fn new(function_type: FunctionType, dmx_offset: usize, is_16_bit: bool) -> Self {
        Self {
            function_type,
            dmx_offset,
            is_16_bit,
        }
    }

    /// The number of channels this function spans.
    pub fn channel_count(&self) -> usize {
        if self.is_16_bit {
            2
        } else {
            1
        }
    }
}

/// A function of a patched fixture, resolved to absolute channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureFunction {
    pub function_type: FunctionType,
    pub universe: usize,
    /// Absolute, 0-based channel inside the universe.
    pub channel: usize,
    pub is_16_bit: bool,
}

impl FixtureFunction {
    /// Writes a value into a universe buffer, splitting 16-bit functions into
    /// a high byte followed by a low byte.
    pub fn write(&self, values: &mut [u8], value: u16, merge_highest: bool) {
        let bytes: [u8; 2] = value.to_be_bytes();
        if self.is_16_bit {
            Self::put(values, self.channel, bytes[0], merge_highest);
            Self::put(values, self.channel + 1, bytes[1], merge_highest);
        } else {
            Self::put(values, self.channel, bytes[0], merge_highest);
        }
    }

    fn put(values: &mut [u8], channel: usize, byte: u8, merge_highest: bool) {
        if let Some(slot) = values.get_mut(channel) {
            *slot = if merge_highest { (*slot).max(byte) } else { byte };
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(FunctionType::Red.is_color());
        assert!(!FunctionType::Master.is_color());
        assert!(FunctionType::Master.is_intensity());
        assert!(!FunctionType::Pan.is_intensity());
    }

    #[test]
    fn test_write_16_bit_high_byte_first() {
        let function = FixtureFunction {
            function_type: FunctionType::Pan,
            universe: 0,
            channel: 3,
            is_16_bit: true,
        };
        let mut values = [0u8; 8];
        function.write(&mut values, 0x1234, false);
        assert_eq!(values[3], 0x12);
        assert_eq!(values[4], 0x34);
    }

    #[test]
    fn test_write_highest_takes_precedence() {
        let function = FixtureFunction {
            function_type: FunctionType::Red,
            universe: 0,
            channel: 0,
            is_16_bit: false,
        };
        let mut values = [100u8; 1];
        function.write(&mut values, 50 << 8, true);
        assert_eq!(values[0], 100);
        function.write(&mut values, 200 << 8, true);
        assert_eq!(values[0], 200);
        function.write(&mut values, 10 << 8, false);
        assert_eq!(values[0], 10);
    }
}
