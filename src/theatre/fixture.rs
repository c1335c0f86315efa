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
use super::fixture_type::FixtureType;
use super::function::{FixtureFunction, FunctionType};
use super::FixtureTypeId;

/// A patched physical device.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    name: String,
    fixture_type: FixtureTypeId,
    universe: usize,
    first_channel: usize,
    functions: Vec<FixtureFunction>,
}

impl Fixture {
    /// Patches a fixture of the given type at a 0-based channel. There is one
    /// function per type function, so the counts always agree.
    pub(super) fn new(
        name: String,
        type_id: FixtureTypeId,
        fixture_type: &FixtureType,
        universe: usize,
        first_channel: usize,
    ) -> Fixture {
        let functions = fixture_type
            .functions()
            .iter()
            .map(|function| FixtureFunction {
                function_type: function.function_type,
                universe,
                channel: first_channel + function.dmx_offset,
                is_16_bit: function.is_16_bit,
            })
            .collect();
        Fixture {
            name,
            fixture_type: type_id,
            universe,
            first_channel,
            functions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fixture_type(&self) -> FixtureTypeId {
        self.fixture_type
    }

    pub fn universe(&self) -> usize {
        self.universe
    }

    pub fn first_channel(&self) -> usize {
        self.first_channel
    }

    pub fn functions(&self) -> &[FixtureFunction] {
        &self.functions
    }

    pub fn function_types(&self) -> Vec<FunctionType> {
        self.functions.iter().map(|f| f.function_type).collect()
    }
}
