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
use crate::control_value::{ControlValue, MixStyle};
use crate::theatre::FunctionType;

use super::pass_through;

/// Exposes plain red/green/blue inputs and derives whatever colors the next
/// stage has. Non-color functions pass through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbFilter {
    input_types: Vec<FunctionType>,
    output_types: Vec<FunctionType>,
}

impl RgbFilter {
    pub fn new(output_types: &[FunctionType]) -> RgbFilter {
        let mut input_types = vec![FunctionType::Red, FunctionType::Green, FunctionType::Blue];
        input_types.extend(output_types.iter().filter(|t| !t.is_color()));
        RgbFilter {
            input_types,
            output_types: output_types.to_vec(),
        }
    }

    pub fn input_types(&self) -> &[FunctionType] {
        &self.input_types
    }

    pub fn output_types(&self) -> &[FunctionType] {
        &self.output_types
    }

    pub fn apply(&self, input: &[ControlValue], output: &mut [ControlValue]) {
        let (r, g, b) = (input[0], input[1], input[2]);
        let lowest = |a: ControlValue, b: ControlValue| ControlValue::mix(a, b, MixStyle::LowestValue);
        for (value, output_type) in output.iter_mut().zip(self.output_types.iter()) {
            *value = match output_type {
                FunctionType::Red => r,
                FunctionType::Green => g,
                FunctionType::Blue => b,
                FunctionType::White | FunctionType::ColdWhite | FunctionType::WarmWhite => {
                    lowest(lowest(r, g), b)
                }
                FunctionType::Amber | FunctionType::Lime => lowest(r, g),
                FunctionType::UV => lowest(r, b),
                other => pass_through(&self.input_types[3..], &input[3..], *other)
                    .unwrap_or_default(),
            };
        }
    }
}
