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

/// How two control values are combined when they land on the same input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MixStyle {
    /// Saturating sum.
    #[default]
    Default,
    HighestValue,
    LowestValue,
    Multiply,
    /// Keep the value that was already there.
    First,
    /// Keep the incoming value.
    Second,
}

/// A normalized 24-bit intensity.
///
/// All arithmetic saturates at [`ControlValue::MAX_UINT`], so no combination of
/// values can leave the `[0, 2^24 - 1]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ControlValue(u32);

impl ControlValue {
    /// The largest representable value.
    pub const MAX_UINT: u32 = (1 << 24) - 1;

    /// Creates a control value, clamping anything above the maximum.
    pub const fn new(value: u32) -> Self {
        if value > Self::MAX_UINT {
            Self(Self::MAX_UINT)
        } else {
            Self(value)
        }
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn max() -> Self {
        Self(Self::MAX_UINT)
    }

    /// Creates a value from a ratio in `[0, 1]`. Out of range ratios are clamped.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio.is_nan() || ratio <= 0.0 {
            return Self::zero();
        }
        if ratio >= 1.0 {
            return Self::max();
        }
        Self((ratio * f64::from(Self::MAX_UINT)).round() as u32)
    }

    /// Creates a value from an 8-bit DMX byte, mapping 255 onto the maximum.
    pub fn from_u8(value: u8) -> Self {
        Self((u32::from(value) << 16) | (u32::from(value) << 8) | u32::from(value))
    }

    /// Computes `numerator / denominator` as a control value, saturating at the
    /// maximum. Uses 64-bit intermediates so the full 24-bit precision survives.
    pub fn fraction(numerator: u32, denominator: u32) -> Self {
        if denominator == 0 {
            return if numerator == 0 {
                Self::zero()
            } else {
                Self::max()
            };
        }
        let scaled = u64::from(numerator) * u64::from(Self::MAX_UINT) / u64::from(denominator);
        Self(scaled.min(u64::from(Self::MAX_UINT)) as u32)
    }

    /// Multiplies two normalized values.
    pub fn multiply_values(a: ControlValue, b: ControlValue) -> Self {
        let product = (u64::from(a.0 >> 9) * u64::from(b.0 >> 9)) >> 6;
        Self(product.min(u64::from(Self::MAX_UINT)) as u32)
    }

    /// Combines two values according to the given style.
    pub fn mix(a: ControlValue, b: ControlValue, style: MixStyle) -> Self {
        match style {
            MixStyle::Default => Self((a.0 + b.0).min(Self::MAX_UINT)),
            MixStyle::HighestValue => a.max_of(b),
            MixStyle::LowestValue => a.min_of(b),
            MixStyle::Multiply => Self::multiply_values(a, b),
            MixStyle::First => a,
            MixStyle::Second => b,
        }
    }

    fn max_of(self, other: ControlValue) -> Self {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }

    fn min_of(self, other: ControlValue) -> Self {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }

    /// The inverse intensity, `MAX - self`.
    pub fn invert(self) -> Self {
        Self(Self::MAX_UINT - self.0)
    }

    /// Scales this value by a ratio in `[0, 1]`.
    pub fn scale(self, ratio: f64) -> Self {
        Self::from_ratio(self.ratio() * ratio)
    }

    pub const fn uint(self) -> u32 {
        self.0
    }

    pub fn ratio(self) -> f64 {
        f64::from(self.0) / f64::from(Self::MAX_UINT)
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// The most significant byte, as sent for an 8-bit DMX channel.
    pub const fn to_u8(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// The most significant 16 bits, as sent over a coarse/fine channel pair.
    pub const fn to_u16(self) -> u16 {
        (self.0 >> 8) as u16
    }
}

impl fmt::Display for ControlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.ratio() * 100.0)
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    #[test]
    fn test_highest_value_is_commutative_max() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let a = ControlValue::new(rng.gen_range(0..=ControlValue::MAX_UINT));
            let b = ControlValue::new(rng.gen_range(0..=ControlValue::MAX_UINT));
            let ab = ControlValue::mix(a, b, MixStyle::HighestValue);
            assert_eq!(ab, ControlValue::mix(b, a, MixStyle::HighestValue));
            assert_eq!(ab.uint(), a.uint().max(b.uint()));
        }
    }

    #[test]
    fn test_lowest_value() {
        let a = ControlValue::new(10);
        let b = ControlValue::new(20);
        assert_eq!(ControlValue::mix(a, b, MixStyle::LowestValue), a);
        assert_eq!(ControlValue::mix(b, a, MixStyle::LowestValue), a);
    }

    #[test]
    fn test_sum_saturates() {
        let big = ControlValue::new(ControlValue::MAX_UINT - 5);
        let sum = ControlValue::mix(big, ControlValue::new(100), MixStyle::Default);
        assert_eq!(sum, ControlValue::max());
        assert_eq!(
            ControlValue::mix(ControlValue::new(1), ControlValue::new(2), MixStyle::Default),
            ControlValue::new(3)
        );
    }

    #[test]
    fn test_first_and_second() {
        let a = ControlValue::new(1);
        let b = ControlValue::new(2);
        assert_eq!(ControlValue::mix(a, b, MixStyle::First), a);
        assert_eq!(ControlValue::mix(a, b, MixStyle::Second), b);
    }

    #[test]
    fn test_new_clamps() {
        assert_eq!(ControlValue::new(u32::MAX), ControlValue::max());
    }

    #[test]
    fn test_multiply() {
        let max = ControlValue::max();
        assert!(ControlValue::multiply_values(max, max).uint() <= ControlValue::MAX_UINT);
        assert!(ControlValue::multiply_values(max, max).to_u8() >= 254);
        assert_eq!(
            ControlValue::multiply_values(max, ControlValue::zero()),
            ControlValue::zero()
        );
        let half = ControlValue::from_ratio(0.5);
        let quarter = ControlValue::multiply_values(half, half);
        assert!((quarter.ratio() - 0.25).abs() < 0.001);
    }

    #[test]
    fn test_fraction() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let x = rng.gen_range(1..=u32::MAX);
            assert_eq!(ControlValue::fraction(x, x), ControlValue::max());
            assert_eq!(ControlValue::fraction(0, x), ControlValue::zero());
        }
        assert_eq!(ControlValue::fraction(0, 0), ControlValue::zero());
        assert_eq!(ControlValue::fraction(5, 0), ControlValue::max());
        assert_eq!(ControlValue::fraction(10, 5), ControlValue::max());
        let half = ControlValue::fraction(1, 2);
        assert!((half.ratio() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ratio_conversions() {
        assert_eq!(ControlValue::from_ratio(0.0), ControlValue::zero());
        assert_eq!(ControlValue::from_ratio(1.0), ControlValue::max());
        assert_eq!(ControlValue::from_ratio(-3.0), ControlValue::zero());
        assert_eq!(ControlValue::from_ratio(f64::NAN), ControlValue::zero());
        assert_eq!(ControlValue::max().to_u8(), 255);
        assert_eq!(ControlValue::max().to_u16(), u16::MAX);
        assert_eq!(ControlValue::from_u8(255), ControlValue::max());
        assert_eq!(ControlValue::from_u8(128).to_u8(), 128);
    }

    #[test]
    fn test_invert() {
        assert_eq!(ControlValue::max().invert(), ControlValue::zero());
        assert_eq!(ControlValue::zero().invert(), ControlValue::max());
    }
}
