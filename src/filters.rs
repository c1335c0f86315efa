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
//! Pure value transforms that sit between a fixture control's public inputs
//! and the fixture's native functions.

use serde::Deserialize;

use crate::control_value::ControlValue;
use crate::theatre::FunctionType;

mod auto_master;
mod monochrome;
mod rgb;

pub use auto_master::AutoMasterFilter;
pub use monochrome::MonochromeFilter;
pub use rgb::RgbFilter;

/// The kinds of filters that can be attached to a fixture control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    AutoMaster,
    Rgb,
    Monochrome,
}

/// A filter with its type signature resolved against the stage it feeds.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    AutoMaster(AutoMasterFilter),
    Rgb(RgbFilter),
    Monochrome(MonochromeFilter),
}

impl Filter {
    /// Creates a filter whose outputs are `output_types`; its input types are
    /// derived from them.
    pub fn new(kind: FilterKind, output_types: &[FunctionType]) -> Filter {
        match kind {
            FilterKind::AutoMaster => Filter::AutoMaster(AutoMasterFilter::new(output_types)),
            FilterKind::Rgb => Filter::Rgb(RgbFilter::new(output_types)),
            FilterKind::Monochrome => Filter::Monochrome(MonochromeFilter::new(output_types)),
        }
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            Filter::AutoMaster(_) => FilterKind::AutoMaster,
            Filter::Rgb(_) => FilterKind::Rgb,
            Filter::Monochrome(_) => FilterKind::Monochrome,
        }
    }

    pub fn input_types(&self) -> &[FunctionType] {
        match self {
            Filter::AutoMaster(f) => f.input_types(),
            Filter::Rgb(f) => f.input_types(),
            Filter::Monochrome(f) => f.input_types(),
        }
    }

    pub fn output_types(&self) -> &[FunctionType] {
        match self {
            Filter::AutoMaster(f) => f.output_types(),
            Filter::Rgb(f) => f.output_types(),
            Filter::Monochrome(f) => f.output_types(),
        }
    }

    /// Transforms `input` (one value per input type) into `output` (one value
    /// per output type).
    pub fn apply(&self, input: &[ControlValue], output: &mut [ControlValue]) {
        debug_assert_eq!(input.len(), self.input_types().len());
        debug_assert_eq!(output.len(), self.output_types().len());
        match self {
            Filter::AutoMaster(f) => f.apply(input, output),
            Filter::Rgb(f) => f.apply(input, output),
            Filter::Monochrome(f) => f.apply(input, output),
        }
    }
}

/// Copies every input whose type also appears as an output. Used by the
/// filters for the functions they leave untouched.
fn pass_through(
    input_types: &[FunctionType],
    input: &[ControlValue],
    output_type: FunctionType,
) -> Option<ControlValue> {
    input_types
        .iter()
        .position(|t| *t == output_type)
        .map(|index| input[index])
}

/// An ordered chain of filters. The filter at index 0 is closest to the
/// fixture; values flow from the last filter towards the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    pub fn new() -> FilterChain {
        FilterChain::default()
    }

    /// Appends a filter at the public end of the chain.
    pub fn push(&mut self, kind: FilterKind, fixture_types: &[FunctionType]) {
        let outputs = self.input_types(fixture_types).to_vec();
        self.filters.push(Filter::new(kind, &outputs));
    }

    /// Removes the filter at the public end of the chain.
    pub fn pop(&mut self) -> Option<Filter> {
        self.filters.pop()
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// The public input types: those of the last filter, or the fixture's own
    /// functions without filters.
    pub fn input_types<'a>(&'a self, fixture_types: &'a [FunctionType]) -> &'a [FunctionType] {
        match self.filters.last() {
            Some(filter) => filter.input_types(),
            None => fixture_types,
        }
    }

    /// Runs the public inputs through the chain, producing one value per
    /// fixture function.
    pub fn apply(&self, input: &[ControlValue], fixture_values: &mut Vec<ControlValue>) {
        let mut current = input.to_vec();
        for filter in self.filters.iter().rev() {
            let mut next = vec![ControlValue::zero(); filter.output_types().len()];
            filter.apply(&current, &mut next);
            current = next;
        }
        *fixture_values = current;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use FunctionType::*;

    #[test]
    fn test_empty_chain_is_identity() {
        let chain = FilterChain::new();
        let types = [Red, Green, Blue];
        assert_eq!(chain.input_types(&types), &types);
        let input = vec![ControlValue::new(1), ControlValue::new(2), ControlValue::new(3)];
        let mut output = Vec::new();
        chain.apply(&input, &mut output);
        assert_eq!(output, input);
    }

    #[test]
    fn test_rgb_then_auto_master() {
        // Fixture: master, red, green, blue, white.
        let fixture = [Master, Red, Green, Blue, White];
        let mut chain = FilterChain::new();
        chain.push(FilterKind::AutoMaster, &fixture);
        assert_eq!(chain.input_types(&fixture), &[Red, Green, Blue, White]);
        chain.push(FilterKind::Rgb, &fixture);
        assert_eq!(chain.input_types(&fixture), &[Red, Green, Blue]);

        let half = ControlValue::from_ratio(0.5);
        let mut output = Vec::new();
        chain.apply(&[half, half, half], &mut output);
        assert_eq!(output.len(), 5);
        // The master carries the intensity, the colors are scaled up to full.
        assert_eq!(output[0], half);
        assert_eq!(output[1], ControlValue::max());
        assert_eq!(output[4], ControlValue::max());
    }

    #[test]
    fn test_pop() {
        let fixture = [Red, Green, Blue, White];
        let mut chain = FilterChain::new();
        chain.push(FilterKind::Monochrome, &fixture);
        assert_eq!(chain.input_types(&fixture), &[Master]);
        assert_eq!(chain.pop().map(|f| f.kind()), Some(FilterKind::Monochrome));
        assert!(chain.is_empty());
    }
}
