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
use crate::filters::{FilterChain, FilterKind};
use crate::theatre::{FixtureId, FunctionType};

use super::{MixContext, PassState};

/// The sink node of the graph: one input per public function of a fixture.
/// The inputs run through the filter chain and the result is kept per pass,
/// ready to be written into the universe buffers.
#[derive(Debug, Clone)]
pub struct FixtureControl {
    fixture: FixtureId,
    fixture_types: Vec<FunctionType>,
    filters: FilterChain,
    values: PassState<Vec<ControlValue>>,
}

impl FixtureControl {
    pub fn new(fixture: FixtureId, fixture_types: Vec<FunctionType>) -> FixtureControl {
        let zeros = vec![ControlValue::zero(); fixture_types.len()];
        FixtureControl {
            fixture,
            fixture_types,
            filters: FilterChain::new(),
            values: PassState::new(zeros.clone(), zeros),
        }
    }

    pub fn fixture(&self) -> FixtureId {
        self.fixture
    }

    pub fn n_inputs(&self) -> usize {
        self.input_types().len()
    }

    pub fn input_types(&self) -> &[FunctionType] {
        self.filters.input_types(&self.fixture_types)
    }

    pub fn input_type(&self, index: usize) -> FunctionType {
        self.input_types()
            .get(index)
            .copied()
            .unwrap_or(FunctionType::Unknown)
    }

    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }

    /// Adds a filter at the public end of the chain. This changes the number
    /// of inputs, so callers are expected to rewire incoming edges.
    pub(crate) fn add_filter(&mut self, kind: FilterKind) {
        self.filters.push(kind, &self.fixture_types);
    }

    pub(crate) fn remove_filter(&mut self) -> bool {
        self.filters.pop().is_some()
    }

    /// The values for each of the fixture's own functions after the last mix
    /// of the given pass.
    pub fn values(&self, is_primary: bool) -> &[ControlValue] {
        self.values.get(is_primary)
    }

    pub fn mix(&mut self, inputs: &[ControlValue], ctx: &mut MixContext<'_>) {
        let values = self.values.get_mut(ctx.is_primary());
        self.filters.apply(inputs, values);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::blackout::Blackout;
    use crate::controllable::InputBuffers;
    use crate::theatre::{StockFixture, Theatre};
    use crate::timing::Timing;

    fn fixture_control(types: Vec<FunctionType>) -> FixtureControl {
        let mut theatre = Theatre::new();
        let type_id = theatre.stock_fixture_type(StockFixture::RgbLight3Ch);
        let fixture = theatre.add_fixture("par", type_id, 0, 0).unwrap();
        FixtureControl::new(fixture, types)
    }

    #[test]
    fn test_values_per_pass() {
        use FunctionType::*;
        let mut control = fixture_control(vec![Red, Green, Blue]);
        assert_eq!(control.n_inputs(), 3);
        assert_eq!(control.input_type(1), Green);

        let timing = Timing::new(0.0, 0, 0.0, 0, 0);
        let mut inputs = InputBuffers::new();
        let mut blackout = Blackout::new();
        let red = ControlValue::from_ratio(0.4);
        let mut ctx = MixContext::new(&timing, true, &mut inputs, &mut blackout);
        control.mix(&[red, ControlValue::zero(), ControlValue::max()], &mut ctx);

        assert_eq!(control.values(true), &[red, ControlValue::zero(), ControlValue::max()]);
        assert_eq!(control.values(false), &[ControlValue::zero(); 3]);
    }

    #[test]
    fn test_filter_changes_inputs() {
        use FunctionType::*;
        let mut control = fixture_control(vec![Red, Green, Blue]);
        control.add_filter(FilterKind::Monochrome);
        assert_eq!(control.input_types(), &[Master]);
        assert!(control.remove_filter());
        assert!(!control.remove_filter());
        assert_eq!(control.n_inputs(), 3);
    }
}
