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

use super::{MixContext, Output};

/// A stored value for one input of another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetValue {
    pub target: Output,
    pub value: ControlValue,
}

/// A stored look. Its single input scales every stored value.
#[derive(Debug, Clone, Default)]
pub struct PresetCollection {
    values: Vec<PresetValue>,
}

impl PresetCollection {
    pub fn new() -> PresetCollection {
        PresetCollection::default()
    }

    pub fn values(&self) -> &[PresetValue] {
        &self.values
    }

    pub(crate) fn add_value(&mut self, target: Output, value: ControlValue) {
        self.values.push(PresetValue { target, value });
    }

    pub(crate) fn set_values(&mut self, values: Vec<PresetValue>) {
        self.values = values;
    }

    /// Drops every stored value that targets `target`. Returns true if
    /// anything was removed.
    pub(crate) fn remove_target(&mut self, target: Output) -> bool {
        let before = self.values.len();
        self.values.retain(|v| v.target != target);
        before != self.values.len()
    }

    pub fn mix(&mut self, input: ControlValue, ctx: &mut MixContext<'_>) {
        if input.is_zero() {
            return;
        }
        for value in &self.values {
            ctx.mix_input(value.target, ControlValue::multiply_values(value.value, input));
        }
    }
}
