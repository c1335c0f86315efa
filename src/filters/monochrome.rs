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
use crate::theatre::FunctionType;

use super::pass_through;

/// Drives every color (and the master) from one master input.
#[derive(Debug, Clone, PartialEq)]
pub struct MonochromeFilter {
    input_types: Vec<FunctionType>,
    output_types: Vec<FunctionType>,
}

impl MonochromeFilter {
    pub fn new(output_types: &[FunctionType]) -> MonochromeFilter {
        let mut input_types = vec![FunctionType::Master];
        input_types.extend(
            output_types
                .iter()
                .filter(|t| !t.is_color() && **t != FunctionType::Master),
        );
        MonochromeFilter {
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
        let level = input[0];
        for (value, output_type) in output.iter_mut().zip(self.output_types.iter()) {
            *value = if output_type.is_color() || *output_type == FunctionType::Master {
                level
            } else {
                pass_through(&self.input_types[1..], &input[1..], *output_type).unwrap_or_default()
            };
        }
    }
}
