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
use serde::Deserialize;

use super::function::{FixtureTypeFunction, FunctionType};

/// Built-in fixture types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum StockFixture {
    Light1Ch,
    #[serde(rename = "RGBLight3Ch")]
    RgbLight3Ch,
    #[serde(rename = "RGBWLight4Ch")]
    RgbwLight4Ch,
    #[serde(rename = "RGBALight4Ch")]
    RgbaLight4Ch,
    #[serde(rename = "RGBAWUVLight6Ch")]
    RgbawuvLight6Ch,
    #[serde(rename = "DimmerRGBLight4Ch")]
    DimmerRgbLight4Ch,
    MovingHead16Bit,
}

impl StockFixture {
    pub const ALL: [StockFixture; 7] = [
        StockFixture::Light1Ch,
        StockFixture::RgbLight3Ch,
        StockFixture::RgbwLight4Ch,
        StockFixture::RgbaLight4Ch,
        StockFixture::RgbawuvLight6Ch,
        StockFixture::DimmerRgbLight4Ch,
        StockFixture::MovingHead16Bit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StockFixture::Light1Ch => "Light1Ch",
            StockFixture::RgbLight3Ch => "RGBLight3Ch",
            StockFixture::RgbwLight4Ch => "RGBWLight4Ch",
            StockFixture::RgbaLight4Ch => "RGBALight4Ch",
            StockFixture::RgbawuvLight6Ch => "RGBAWUVLight6Ch",
            StockFixture::DimmerRgbLight4Ch => "DimmerRGBLight4Ch",
            StockFixture::MovingHead16Bit => "MovingHead16Bit",
        }
    }

    /// Looks a stock type up by its name.
    pub fn from_name(name: &str) -> Option<StockFixture> {
        Self::ALL.into_iter().find(|stock| stock.name() == name)
    }
}

/// The static description of a kind of physical device.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureType {
    name: String,
    functions: Vec<FixtureTypeFunction>,
}

impl FixtureType {
    pub fn new(name: impl Into<String>, functions: Vec<FixtureTypeFunction>) -> FixtureType {
        FixtureType {
            name: name.into(),
            functions,
        }
    }

    /// Creates one of the built-in types.
    pub fn stock(stock: StockFixture) -> FixtureType {
        use FunctionType::*;
        let sequential = |types: &[FunctionType]| -> Vec<FixtureTypeFunction> {
            types
                .iter()
                .enumerate()
                .map(|(offset, t)| FixtureTypeFunction::new(*t, offset, false))
                .collect()
        };
        let functions = match stock {
            StockFixture::Light1Ch => sequential(&[White]),
            StockFixture::RgbLight3Ch => sequential(&[Red, Green, Blue]),
            StockFixture::RgbwLight4Ch => sequential(&[Red, Green, Blue, White]),
            StockFixture::RgbaLight4Ch => sequential(&[Red, Green, Blue, Amber]),
            StockFixture::RgbawuvLight6Ch => sequential(&[Red, Green, Blue, Amber, White, UV]),
            StockFixture::DimmerRgbLight4Ch => sequential(&[Master, Red, Green, Blue]),
            StockFixture::MovingHead16Bit => vec![
                FixtureTypeFunction::new(Master, 0, false),
                FixtureTypeFunction::new(Pan, 1, true),
                FixtureTypeFunction::new(Tilt, 3, true),
                FixtureTypeFunction::new(Red, 5, false),
                FixtureTypeFunction::new(Green, 6, false),
                FixtureTypeFunction::new(Blue, 7, false),
            ],
        };
        FixtureType::new(stock.name(), functions)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn functions(&self) -> &[FixtureTypeFunction] {
        &self.functions
    }

    pub fn function_types(&self) -> Vec<FunctionType> {
        self.functions.iter().map(|f| f.function_type).collect()
    }

    /// The number of DMX channels the type occupies.
    pub fn channel_span(&self) -> usize {
        self.functions
            .iter()
            .map(|f| f.dmx_offset + f.channel_count())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_stock_names_round_trip() {
        for stock in StockFixture::ALL {
            assert_eq!(StockFixture::from_name(stock.name()), Some(stock));
            assert_eq!(FixtureType::stock(stock).name(), stock.name());
        }
        assert_eq!(StockFixture::from_name("nope"), None);
    }

    #[test]
    fn test_channel_span() {
        assert_eq!(FixtureType::stock(StockFixture::RgbLight3Ch).channel_span(), 3);
        assert_eq!(
            FixtureType::stock(StockFixture::MovingHead16Bit).channel_span(),
            8
        );
        assert_eq!(FixtureType::new("empty", vec![]).channel_span(), 0);
    }
}
