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
//! Controllables are the nodes of the mixing graph. Every node has a number of
//! inputs, which are accumulated from scratch on every mix pass, and a list of
//! outputs, which are edges into inputs of other nodes.

use crate::blackout::Blackout;
use crate::control_value::{ControlValue, MixStyle};
use crate::folder::FolderId;
use crate::graph::arena::{arena_key, Arena, ArenaKey};
use crate::theatre::FunctionType;
use crate::timing::Timing;

pub mod chase;
pub mod effect;
pub mod fixture_control;
pub mod preset_collection;
pub mod scene;
pub mod time_sequence;

pub use chase::Chase;
pub use effect::{Effect, EffectKind};
pub use fixture_control::FixtureControl;
pub use preset_collection::{PresetCollection, PresetValue};
pub use scene::Scene;
pub use time_sequence::{TimeSequence, TimeSequenceStep};

arena_key!(
    /// Handle to a node of the mixing graph.
    ControllableId,
    "controllable"
);

/// A directed edge into input `input` of `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Output {
    pub target: ControllableId,
    pub input: usize,
}

impl Output {
    pub fn new(target: ControllableId, input: usize) -> Output {
        Output { target, input }
    }
}

/// Keeps one copy of per-pass state for the secondary (preview) and one for
/// the primary (live) pass, so that running both passes in the same tick
/// doesn't advance stateful nodes twice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassState<T> {
    secondary: T,
    primary: T,
}

impl<T> PassState<T> {
    pub fn new(secondary: T, primary: T) -> PassState<T> {
        PassState { secondary, primary }
    }

    pub fn get(&self, is_primary: bool) -> &T {
        if is_primary {
            &self.primary
        } else {
            &self.secondary
        }
    }

    pub fn get_mut(&mut self, is_primary: bool) -> &mut T {
        if is_primary {
            &mut self.primary
        } else {
            &mut self.secondary
        }
    }

    /// Resets both passes.
    pub fn set_both(&mut self, value: T)
    where
        T: Clone,
    {
        self.secondary = value.clone();
        self.primary = value;
    }
}

/// Per-tick input accumulators, one vector per arena slot.
#[derive(Debug, Default)]
pub struct InputBuffers {
    values: Vec<Vec<ControlValue>>,
}

impl InputBuffers {
    pub fn new() -> InputBuffers {
        InputBuffers::default()
    }

    /// Zeroes every input, sizing each node's vector to its current arity.
    pub fn reset(&mut self, nodes: &Arena<ControllableId, Node>) {
        self.values.resize_with(nodes.capacity(), Vec::new);
        for values in self.values.iter_mut() {
            values.clear();
        }
        for (id, node) in nodes.iter() {
            self.values[id.index().slot()].resize(node.controllable().n_inputs(), ControlValue::zero());
        }
    }

    /// Combines `value` into the target input with a saturating sum.
    pub fn mix_input(&mut self, output: Output, value: ControlValue) {
        if let Some(current) = self
            .values
            .get_mut(output.target.index().slot())
            .and_then(|values| values.get_mut(output.input))
        {
            *current = ControlValue::mix(*current, value, MixStyle::Default);
        }
    }

    pub fn get(&self, id: ControllableId) -> &[ControlValue] {
        self.values
            .get(id.index().slot())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn value(&self, output: Output) -> ControlValue {
        self.get(output.target)
            .get(output.input)
            .copied()
            .unwrap_or_default()
    }

    fn take(&mut self, id: ControllableId) -> Vec<ControlValue> {
        self.values
            .get_mut(id.index().slot())
            .map(std::mem::take)
            .unwrap_or_default()
    }

    fn restore(&mut self, id: ControllableId, values: Vec<ControlValue>) {
        if let Some(slot) = self.values.get_mut(id.index().slot()) {
            *slot = values;
        }
    }
}

/// What a node's `mix` may touch: the tick's timing, the inputs of other
/// nodes, and the global blackout state.
pub struct MixContext<'a> {
    timing: &'a Timing,
    is_primary: bool,
    inputs: &'a mut InputBuffers,
    blackout: &'a mut Blackout,
}

impl<'a> MixContext<'a> {
    pub fn new(
        timing: &'a Timing,
        is_primary: bool,
        inputs: &'a mut InputBuffers,
        blackout: &'a mut Blackout,
    ) -> MixContext<'a> {
        MixContext {
            timing,
            is_primary,
            inputs,
            blackout,
        }
    }

    pub fn timing(&self) -> &'a Timing {
        self.timing
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn mix_input(&mut self, output: Output, value: ControlValue) {
        if !value.is_zero() {
            self.inputs.mix_input(output, value);
        }
    }

    pub fn blackout_mut(&mut self) -> &mut Blackout {
        self.blackout
    }

    /// Mixes the node `id` against its accumulated inputs.
    pub fn mix_node(&mut self, id: ControllableId, node: &mut Controllable) {
        let inputs = self.inputs.take(id);
        node.mix(&inputs, self);
        self.inputs.restore(id, inputs);
    }
}

/// The node variants of the mixing graph.
pub enum Controllable {
    FixtureControl(FixtureControl),
    PresetCollection(PresetCollection),
    Chase(Chase),
    TimeSequence(TimeSequence),
    Scene(Scene),
    Effect(Effect),
}

impl Controllable {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Controllable::FixtureControl(_) => "fixture control",
            Controllable::PresetCollection(_) => "preset collection",
            Controllable::Chase(_) => "chase",
            Controllable::TimeSequence(_) => "time sequence",
            Controllable::Scene(_) => "scene",
            Controllable::Effect(_) => "effect",
        }
    }

    pub fn n_inputs(&self) -> usize {
        match self {
            Controllable::FixtureControl(c) => c.n_inputs(),
            Controllable::Scene(_) => 0,
            Controllable::PresetCollection(_)
            | Controllable::Chase(_)
            | Controllable::TimeSequence(_)
            | Controllable::Effect(_) => 1,
        }
    }

    pub fn input_type(&self, index: usize) -> FunctionType {
        match self {
            Controllable::FixtureControl(c) => c.input_type(index),
            _ => FunctionType::Master,
        }
    }

    /// The edges leaving this node.
    pub fn outputs(&self) -> Vec<Output> {
        match self {
            Controllable::FixtureControl(_) => Vec::new(),
            Controllable::PresetCollection(c) => c.values().iter().map(|v| v.target).collect(),
            Controllable::Chase(c) => c.sequence().to_vec(),
            Controllable::TimeSequence(c) => c.steps().iter().map(|s| s.output).collect(),
            Controllable::Scene(c) => c.outputs(),
            Controllable::Effect(c) => c.connections().to_vec(),
        }
    }

    /// Removes every edge into `target`. Returns true if any edge was removed.
    pub(crate) fn remove_target(&mut self, target: Output) -> bool {
        match self {
            Controllable::FixtureControl(_) => false,
            Controllable::PresetCollection(c) => c.remove_target(target),
            Controllable::Chase(c) => c.remove_target(target),
            Controllable::TimeSequence(c) => c.remove_target(target),
            Controllable::Scene(c) => c.remove_target(target),
            Controllable::Effect(c) => c.remove_target(target),
        }
    }

    /// Reads the node's finalized inputs and pushes values into the inputs of
    /// the nodes it outputs to.
    pub fn mix(&mut self, inputs: &[ControlValue], ctx: &mut MixContext<'_>) {
        assert_eq!(
            inputs.len(),
            self.n_inputs(),
            "{} mixed with an inconsistent number of inputs",
            self.kind_name()
        );
        match self {
            Controllable::FixtureControl(c) => c.mix(inputs, ctx),
            Controllable::PresetCollection(c) => c.mix(inputs[0], ctx),
            Controllable::Chase(c) => c.mix(inputs[0], ctx),
            Controllable::TimeSequence(c) => c.mix(inputs[0], ctx),
            Controllable::Scene(c) => c.mix(ctx),
            Controllable::Effect(c) => c.mix(inputs[0], ctx),
        }
    }
}

/// A named node owned by the engine.
pub struct Node {
    name: String,
    folder: FolderId,
    controllable: Controllable,
}

impl Node {
    pub fn new(name: String, folder: FolderId, controllable: Controllable) -> Node {
        Node {
            name,
            folder,
            controllable,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn folder(&self) -> FolderId {
        self.folder
    }

    pub(crate) fn set_folder(&mut self, folder: FolderId) {
        self.folder = folder;
    }

    pub fn controllable(&self) -> &Controllable {
        &self.controllable
    }

    pub(crate) fn controllable_mut(&mut self) -> &mut Controllable {
        &mut self.controllable
    }
}
