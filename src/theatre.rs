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
use crate::error::GraphError;
use crate::graph::arena::{arena_key, Arena};

pub mod fixture;
pub mod fixture_type;
pub mod function;

pub use fixture::Fixture;
pub use fixture_type::{FixtureType, StockFixture};
pub use function::{FixtureFunction, FixtureTypeFunction, FunctionType};

/// A DMX universe is 512 channels.
pub const UNIVERSE_SIZE: usize = 512;

arena_key!(
    /// Handle to a fixture type.
    FixtureTypeId,
    "fixture-type"
);
arena_key!(
    /// Handle to a patched fixture.
    FixtureId,
    "fixture"
);

/// The static rig: fixture types and the fixtures patched from them.
#[derive(Default)]
pub struct Theatre {
    fixture_types: Arena<FixtureTypeId, FixtureType>,
    fixtures: Arena<FixtureId, Fixture>,
}

impl Theatre {
    pub fn new() -> Theatre {
        Theatre::default()
    }

    pub fn add_fixture_type(&mut self, fixture_type: FixtureType) -> FixtureTypeId {
        self.fixture_types.insert(fixture_type)
    }

    /// Returns the id of a stock type, adding it on first use.
    pub fn stock_fixture_type(&mut self, stock: StockFixture) -> FixtureTypeId {
        let existing = self
            .fixture_types
            .iter()
            .find(|(_, t)| t.name() == stock.name())
            .map(|(id, _)| id);
        existing.unwrap_or_else(|| self.add_fixture_type(FixtureType::stock(stock)))
    }

    pub fn fixture_type(&self, id: FixtureTypeId) -> Option<&FixtureType> {
        self.fixture_types.get(id)
    }

    /// Patches a fixture at a 0-based channel of a universe. The full channel
    /// span of the type has to fit inside the universe.
    pub fn add_fixture(
        &mut self,
        name: impl Into<String>,
        type_id: FixtureTypeId,
        universe: usize,
        first_channel: usize,
    ) -> Result<FixtureId, GraphError> {
        let fixture_type = self
            .fixture_types
            .get(type_id)
            .ok_or_else(|| GraphError::UnknownFixtureType(type_id.to_string()))?;
        let span = fixture_type.channel_span();
        if first_channel + span > UNIVERSE_SIZE {
            return Err(GraphError::ChannelOutOfRange {
                universe,
                channel: first_channel + span.saturating_sub(1),
            });
        }
        let fixture = Fixture::new(name.into(), type_id, fixture_type, universe, first_channel);
        Ok(self.fixtures.insert(fixture))
    }

    pub fn remove_fixture(&mut self, id: FixtureId) -> Option<Fixture> {
        self.fixtures.remove(id)
    }

    pub fn fixture(&self, id: FixtureId) -> Option<&Fixture> {
        self.fixtures.get(id)
    }

    pub fn fixtures(&self) -> impl Iterator<Item = (FixtureId, &Fixture)> + '_ {
        self.fixtures.iter()
    }

    pub fn fixture_count(&self) -> usize {
        self.fixtures.len()
    }

    /// The first channel after every fixture patched in the universe.
    pub fn first_free_channel(&self, universe: usize) -> usize {
        self.fixtures
            .values()
            .filter(|f| f.universe() == universe)
            .flat_map(|f| f.functions().iter())
            .map(|f| f.channel + if f.is_16_bit { 2 } else { 1 })
            .max()
            .unwrap_or(0)
    }
}
