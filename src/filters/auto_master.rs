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

/// Hides the master function. The master is driven by the brightest color and
/// the colors are scaled up so that `master * color` reproduces the input.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoMasterFilter {
    input_types: Vec<FunctionType>,
    output_types: Vec<FunctionType>,
}

impl AutoMasterFilter {
    pub fn new(output_types: &[FunctionType]) -> AutoMasterFilter {
        let has_master = output_types.contains(&FunctionType::Master);
        let input_types = if has_master {
            output_types
                .iter()
                .copied()
                .filter(|t| *t != FunctionType::Master)
                .collect()
        } else {
            output_types.to_vec()
        };
        AutoMasterFilter {
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
        let master = self
            .input_types
            .iter()
            .zip(input.iter())
            .filter(|(t, _)| t.is_color())
            .map(|(_, v)| *v)
            .max()
            .unwrap_or_default();
        let has_master = self.output_types.contains(&FunctionType::Master);

        for (value, output_type) in output.iter_mut().zip(self.output_types.iter()) {
            let incoming = pass_through(&self.input_types, input, *output_type);
            *value = match (output_type, incoming) {
                (FunctionType::Master, _) if has_master => master,
                (t, Some(v)) if has_master && t.is_color() => {
                    ControlValue::fraction(v.uint(), master.uint())
                }
                (_, Some(v)) => v,
                (_, None) => ControlValue::zero(),
            };
        }
    }
}
