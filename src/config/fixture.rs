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
use tracing::debug;

use crate::control_value::ControlValue;
use crate::controllable::Output;
use crate::management::Show;
use crate::source_value::Lane;
use crate::theatre::StockFixture;

use super::error::ConfigError;

/// A YAML representation of a patched fixture.
#[derive(Deserialize, Clone, Debug)]
pub struct Fixture {
    /// The name of the fixture and of its fixture control.
    name: String,

    /// The name of a stock fixture type, e.g. RGBLight3Ch.
    #[serde(rename = "type")]
    fixture_type: String,

    /// The index of the universe, from 0.
    #[serde(default)]
    universe: usize,

    /// The first DMX channel, from 1.
    channel: usize,

    /// A level from 0 to 1 to hold every input of the fixture at.
    level: Option<f64>,
}

impl Fixture {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn universe(&self) -> usize {
        self.universe
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    pub fn stock_type(&self) -> Result<StockFixture, ConfigError> {
        StockFixture::from_name(&self.fixture_type)
            .ok_or_else(|| ConfigError::UnknownFixtureType(self.fixture_type.clone()))
    }

    /// Patches the fixture into the show with a fixture control at the root.
    pub(super) fn patch(&self, show: &mut Show) -> Result<(), ConfigError> {
        if self.channel == 0 {
            return Err(ConfigError::Invalid(format!(
                "fixture '{}': DMX channels start at 1",
                self.name
            )));
        }
        let root = show.folders().root();
        let fixture = show.add_fixture(&self.name, self.stock_type()?, self.universe, self.channel - 1)?;
        let control = show.add_fixture_control(&self.name, root, fixture)?;

        if let Some(level) = self.level {
            let value = ControlValue::from_ratio(level);
            let n_inputs = show
                .controllable(control)
                .map_or(0, |node| node.controllable().n_inputs());
            for input in 0..n_inputs {
                let sv = show.add_source_value(Output::new(control, input))?;
                show.set_source_value(sv, Lane::A, value, 0.0)?;
                show.set_source_value(sv, Lane::B, value, 0.0)?;
            }
        }
        debug!(
            name = self.name,
            universe = self.universe,
            channel = self.channel,
            "Patched fixture from config."
        );
        Ok(())
    }
}
