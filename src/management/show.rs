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
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, info};

use crate::audio::AudioPlayer;
use crate::beat::ManualBeat;
use crate::blackout::{Blackout, BlackoutOperation};
use crate::control_value::ControlValue;
use crate::controllable::{
    Chase, Controllable, ControllableId, Effect, EffectKind, FixtureControl, InputBuffers,
    MixContext, Node, Output, PresetCollection, PresetValue, Scene, TimeSequence,
    TimeSequenceStep,
};
use crate::controllable::scene::{SceneItem, SceneItemId};
use crate::error::GraphError;
use crate::filters::FilterKind;
use crate::folder::{FolderId, Folders};
use crate::graph::arena::Arena;
use crate::graph::{dependency_graph, has_cycle, topological_sort, would_create_cycle};
use crate::snapshot::ValueSnapshot;
use crate::source_value::{Lane, SourceValue, SourceValueId};
use crate::theatre::{FixtureId, StockFixture, Theatre};
use crate::timing::Timing;
use crate::transport::UniverseType;
use crate::trigger::{Transition, Trigger};

/// Sent to subscribers when an object goes away, so they can drop handles to
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowEvent {
    ControllableRemoved(ControllableId),
    SourceValueRemoved(SourceValueId),
    FixtureRemoved(FixtureId),
}

/// Everything the mixing thread and the editors share: the graph, the rig,
/// the source values and the last published snapshots.
pub struct Show {
    nodes: Arena<ControllableId, Node>,
    source_values: Arena<SourceValueId, SourceValue>,
    theatre: Theatre,
    folders: Folders,
    universe_types: Vec<UniverseType>,
    inputs: InputBuffers,
    blackout: Blackout,
    manual_beat: ManualBeat,
    last_time_ms: Option<f64>,
    primary: Arc<ValueSnapshot>,
    secondary: Arc<ValueSnapshot>,
    subscribers: Vec<Sender<ShowEvent>>,
}

impl Show {
    pub fn new(universe_types: Vec<UniverseType>, beat_decay: Duration) -> Show {
        let n_universes = universe_types.len();
        Show {
            nodes: Arena::new(),
            source_values: Arena::new(),
            theatre: Theatre::new(),
            folders: Folders::new(),
            universe_types,
            inputs: InputBuffers::new(),
            blackout: Blackout::new(),
            manual_beat: ManualBeat::new(beat_decay),
            last_time_ms: None,
            primary: Arc::new(ValueSnapshot::new(n_universes)),
            secondary: Arc::new(ValueSnapshot::new(n_universes)),
            subscribers: Vec::new(),
        }
    }

    pub fn n_universes(&self) -> usize {
        self.universe_types.len()
    }

    pub fn universe_type(&self, universe: usize) -> Option<UniverseType> {
        self.universe_types.get(universe).copied()
    }

    /// The engine time of the last tick.
    pub fn time_in_ms(&self) -> f64 {
        self.last_time_ms.unwrap_or(0.0)
    }

    pub fn subscribe(&mut self) -> Receiver<ShowEvent> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        self.subscribers.push(sender);
        receiver
    }

    fn emit(&mut self, event: ShowEvent) {
        // Subscribers that hung up are dropped.
        self.subscribers.retain(|s| s.send(event).is_ok());
    }

    // Lookups.

    pub fn controllable(&self, id: ControllableId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn controllables(&self) -> impl Iterator<Item = (ControllableId, &Node)> + '_ {
        self.nodes.iter()
    }

    pub fn controllable_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn source_value(&self, id: SourceValueId) -> Option<&SourceValue> {
        self.source_values.get(id)
    }

    pub fn source_values(&self) -> impl Iterator<Item = (SourceValueId, &SourceValue)> + '_ {
        self.source_values.iter()
    }

    pub fn source_value_count(&self) -> usize {
        self.source_values.len()
    }

    pub fn theatre(&self) -> &Theatre {
        &self.theatre
    }

    pub fn folders(&self) -> &Folders {
        &self.folders
    }

    pub fn blackout_state(&self) -> &Blackout {
        &self.blackout
    }

    pub fn primary_snapshot(&self) -> Arc<ValueSnapshot> {
        self.primary.clone()
    }

    pub fn secondary_snapshot(&self) -> Arc<ValueSnapshot> {
        self.secondary.clone()
    }

    /// The accumulated inputs of a node after the last primary pass.
    pub fn input_values(&self, id: ControllableId) -> &[ControlValue] {
        self.inputs.get(id)
    }

    fn node(&self, id: ControllableId) -> Result<&Node, GraphError> {
        self.nodes
            .get(id)
            .ok_or_else(|| GraphError::UnknownControllable(id.to_string()))
    }

    fn node_mut(&mut self, id: ControllableId) -> Result<&mut Node, GraphError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| GraphError::UnknownControllable(id.to_string()))
    }

    fn check_kind(&self, id: ControllableId, kind: &'static str) -> Result<(), GraphError> {
        let node = self.node(id)?;
        if node.controllable().kind_name() != kind {
            return Err(GraphError::WrongKind(node.name().to_string(), kind));
        }
        Ok(())
    }

    fn successors(&self, id: ControllableId) -> Vec<ControllableId> {
        self.nodes
            .get(id)
            .map(|node| {
                node.controllable()
                    .outputs()
                    .into_iter()
                    .map(|o| o.target)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The current graph, rebuilt from the nodes' outputs.
    fn dependencies(&self) -> DiGraphMap<ControllableId, ()> {
        dependency_graph(self.nodes.keys(), |id| self.successors(id))
    }

    /// Checks that `target` names an existing input.
    fn check_target(&self, target: Output) -> Result<(), GraphError> {
        let node = self.node(target.target)?;
        let count = node.controllable().n_inputs();
        if target.input >= count {
            return Err(GraphError::InputOutOfRange {
                name: node.name().to_string(),
                input: target.input,
                count,
            });
        }
        Ok(())
    }

    /// Checks that a new edge `from -> target` is valid and keeps the graph
    /// acyclic.
    fn check_edge(&self, from: ControllableId, target: Output) -> Result<(), GraphError> {
        self.check_target(target)?;
        if would_create_cycle(&self.dependencies(), from, target.target) {
            return Err(GraphError::WouldCreateCycle {
                from: self.node(from)?.name().to_string(),
                to: self.node(target.target)?.name().to_string(),
            });
        }
        Ok(())
    }

    fn check_name(
        &self,
        folder: FolderId,
        name: &str,
        except: Option<ControllableId>,
    ) -> Result<(), GraphError> {
        if !self.folders.contains(folder) {
            return Err(GraphError::UnknownFolder(folder.to_string()));
        }
        let taken = self.folders.child(folder, name).is_some()
            || self
                .nodes
                .iter()
                .any(|(id, n)| n.folder() == folder && n.name() == name && Some(id) != except);
        if taken {
            return Err(GraphError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    // Structural edits.

    fn insert_node(
        &mut self,
        name: &str,
        folder: FolderId,
        controllable: Controllable,
    ) -> Result<ControllableId, GraphError> {
        self.check_name(folder, name, None)?;
        let kind = controllable.kind_name();
        let id = self
            .nodes
            .insert(Node::new(name.to_string(), folder, controllable));
        debug!(id = %id, name, kind, "Added controllable.");
        Ok(id)
    }

    /// Patches a stock fixture at a 0-based channel.
    pub fn add_fixture(
        &mut self,
        name: &str,
        stock: StockFixture,
        universe: usize,
        first_channel: usize,
    ) -> Result<FixtureId, GraphError> {
        if universe >= self.universe_types.len() {
            return Err(GraphError::UnknownUniverse(universe));
        }
        let type_id = self.theatre.stock_fixture_type(stock);
        let id = self
            .theatre
            .add_fixture(name, type_id, universe, first_channel)?;
        debug!(id = %id, name, universe, first_channel, "Patched fixture.");
        Ok(id)
    }

    /// Unpatches a fixture, removing every fixture control of it.
    pub fn remove_fixture(&mut self, id: FixtureId) -> Result<(), GraphError> {
        if self.theatre.fixture(id).is_none() {
            return Err(GraphError::UnknownFixture(id.to_string()));
        }
        let controls: Vec<ControllableId> = self
            .nodes
            .iter()
            .filter(|(_, node)| {
                matches!(node.controllable(), Controllable::FixtureControl(c) if c.fixture() == id)
            })
            .map(|(control, _)| control)
            .collect();
        for control in controls {
            // An earlier cascade may already have taken it.
            if self.nodes.contains(control) {
                self.remove_controllable(control)?;
            }
        }
        self.theatre.remove_fixture(id);
        self.emit(ShowEvent::FixtureRemoved(id));
        Ok(())
    }

    pub fn add_fixture_control(
        &mut self,
        name: &str,
        folder: FolderId,
        fixture: FixtureId,
    ) -> Result<ControllableId, GraphError> {
        let types = self
            .theatre
            .fixture(fixture)
            .ok_or_else(|| GraphError::UnknownFixture(fixture.to_string()))?
            .function_types();
        self.insert_node(
            name,
            folder,
            Controllable::FixtureControl(FixtureControl::new(fixture, types)),
        )
    }

    /// Adds a filter in front of a fixture control. Edges and source values
    /// into inputs that no longer exist are dropped.
    pub fn add_filter(&mut self, control: ControllableId, kind: FilterKind) -> Result<(), GraphError> {
        self.check_kind(control, "fixture control")?;
        if let Controllable::FixtureControl(c) = self.node_mut(control)?.controllable_mut() {
            c.add_filter(kind);
        }
        self.drop_dangling_inputs(control);
        Ok(())
    }

    /// Removes the public-most filter of a fixture control. Returns false if
    /// it had none.
    pub fn remove_filter(&mut self, control: ControllableId) -> Result<bool, GraphError> {
        self.check_kind(control, "fixture control")?;
        let removed = match self.node_mut(control)?.controllable_mut() {
            Controllable::FixtureControl(c) => c.remove_filter(),
            _ => false,
        };
        self.drop_dangling_inputs(control);
        Ok(removed)
    }

    fn drop_dangling_inputs(&mut self, id: ControllableId) {
        let count = self
            .nodes
            .get(id)
            .map_or(0, |n| n.controllable().n_inputs());
        for (_, node) in self.nodes.iter_mut() {
            let dangling: Vec<Output> = node
                .controllable()
                .outputs()
                .into_iter()
                .filter(|o| o.target == id && o.input >= count)
                .collect();
            for output in dangling {
                node.controllable_mut().remove_target(output);
            }
        }
        let bound: Vec<SourceValueId> = self
            .source_values
            .iter()
            .filter(|(_, sv)| sv.target().target == id && sv.target().input >= count)
            .map(|(sv, _)| sv)
            .collect();
        for sv in bound {
            self.source_values.remove(sv);
            self.emit(ShowEvent::SourceValueRemoved(sv));
        }
    }

    pub fn add_preset_collection(
        &mut self,
        name: &str,
        folder: FolderId,
    ) -> Result<ControllableId, GraphError> {
        self.insert_node(
            name,
            folder,
            Controllable::PresetCollection(PresetCollection::new()),
        )
    }

    pub fn add_chase(
        &mut self,
        name: &str,
        folder: FolderId,
        trigger: Trigger,
        transition: Transition,
    ) -> Result<ControllableId, GraphError> {
        self.insert_node(name, folder, Controllable::Chase(Chase::new(trigger, transition)))
    }

    pub fn add_time_sequence(
        &mut self,
        name: &str,
        folder: FolderId,
        repeat_count: u32,
        sustain: bool,
    ) -> Result<ControllableId, GraphError> {
        self.insert_node(
            name,
            folder,
            Controllable::TimeSequence(TimeSequence::new(repeat_count, sustain)),
        )
    }

    pub fn add_scene(&mut self, name: &str, folder: FolderId) -> Result<ControllableId, GraphError> {
        self.insert_node(name, folder, Controllable::Scene(Scene::new()))
    }

    pub fn add_effect(
        &mut self,
        name: &str,
        folder: FolderId,
        kind: EffectKind,
    ) -> Result<ControllableId, GraphError> {
        self.insert_node(name, folder, Controllable::Effect(Effect::new(kind)))
    }

    pub fn add_preset_value(
        &mut self,
        preset: ControllableId,
        target: Output,
        value: ControlValue,
    ) -> Result<(), GraphError> {
        self.check_kind(preset, "preset collection")?;
        self.check_edge(preset, target)?;
        if let Controllable::PresetCollection(c) = self.node_mut(preset)?.controllable_mut() {
            c.add_value(target, value);
        }
        Ok(())
    }

    pub fn add_chase_step(&mut self, chase: ControllableId, target: Output) -> Result<(), GraphError> {
        self.check_kind(chase, "chase")?;
        self.check_edge(chase, target)?;
        if let Controllable::Chase(c) = self.node_mut(chase)?.controllable_mut() {
            c.add_step(target);
        }
        Ok(())
    }

    /// Changes the timing of a chase. Going from one delay to another keeps
    /// the chase at the same point of its cycle.
    pub fn set_chase_timing(
        &mut self,
        chase: ControllableId,
        trigger: Trigger,
        transition: Transition,
    ) -> Result<(), GraphError> {
        self.check_kind(chase, "chase")?;
        let now = self.time_in_ms();
        if let Controllable::Chase(c) = self.node_mut(chase)?.controllable_mut() {
            match (c.trigger(), trigger) {
                (Trigger::Delay { .. }, Trigger::Delay { ms }) => {
                    c.shift_delay_trigger(ms, transition.length_in_ms, now);
                    c.set_transition(transition);
                }
                _ => {
                    c.set_trigger(trigger);
                    c.set_transition(transition);
                }
            }
        }
        Ok(())
    }

    pub fn add_sequence_step(
        &mut self,
        sequence: ControllableId,
        step: TimeSequenceStep,
    ) -> Result<(), GraphError> {
        self.check_kind(sequence, "time sequence")?;
        self.check_edge(sequence, step.output)?;
        if let Controllable::TimeSequence(s) = self.node_mut(sequence)?.controllable_mut() {
            s.add_step(step);
        }
        Ok(())
    }

    pub fn add_effect_connection(
        &mut self,
        effect: ControllableId,
        target: Output,
    ) -> Result<(), GraphError> {
        self.check_kind(effect, "effect")?;
        self.check_edge(effect, target)?;
        if let Controllable::Effect(e) = self.node_mut(effect)?.controllable_mut() {
            e.add_connection(target);
        }
        Ok(())
    }

    fn scene_mut(&mut self, scene: ControllableId) -> Result<&mut Scene, GraphError> {
        self.check_kind(scene, "scene")?;
        match self.node_mut(scene)?.controllable_mut() {
            Controllable::Scene(s) => Ok(s),
            _ => Err(GraphError::WrongKind(scene.to_string(), "scene")),
        }
    }

    pub fn add_scene_item(
        &mut self,
        scene: ControllableId,
        item: SceneItem,
    ) -> Result<SceneItemId, GraphError> {
        self.check_kind(scene, "scene")?;
        if let Some(target) = item.target() {
            self.check_edge(scene, target)?;
        }
        Ok(self.scene_mut(scene)?.add_item(item))
    }

    pub fn remove_scene_item(
        &mut self,
        scene: ControllableId,
        item: SceneItemId,
    ) -> Result<SceneItem, GraphError> {
        self.scene_mut(scene)?
            .remove_item(item)
            .ok_or(GraphError::UnknownSceneItem(item.value()))
    }

    pub fn set_scene_item_offset(
        &mut self,
        scene: ControllableId,
        item: SceneItemId,
        offset_ms: u64,
    ) -> Result<(), GraphError> {
        if self.scene_mut(scene)?.set_item_offset(item, offset_ms) {
            Ok(())
        } else {
            Err(GraphError::UnknownSceneItem(item.value()))
        }
    }

    pub fn set_scene_start_offset(
        &mut self,
        scene: ControllableId,
        start_offset_ms: f64,
    ) -> Result<(), GraphError> {
        self.scene_mut(scene)?.set_start_offset_ms(start_offset_ms);
        Ok(())
    }

    pub fn set_scene_audio(
        &mut self,
        scene: ControllableId,
        audio: Option<Box<dyn AudioPlayer>>,
    ) -> Result<(), GraphError> {
        self.scene_mut(scene)?.set_audio(audio);
        Ok(())
    }

    /// Starts a scene at the time of the last tick.
    pub fn start_scene(&mut self, scene: ControllableId) -> Result<(), GraphError> {
        let now = self.time_in_ms();
        self.scene_mut(scene)?.start(now);
        info!(scene = %scene, "Started scene.");
        Ok(())
    }

    pub fn stop_scene(&mut self, scene: ControllableId) -> Result<(), GraphError> {
        self.scene_mut(scene)?.stop();
        info!(scene = %scene, "Stopped scene.");
        Ok(())
    }

    /// Reports where the audio player of a scene is, for scenes whose audio
    /// is driven from outside the engine.
    pub fn scene_sync_update(
        &mut self,
        scene: ControllableId,
        audio_position_ms: f64,
    ) -> Result<(), GraphError> {
        let now = self.time_in_ms();
        self.scene_mut(scene)?.sync_update(audio_position_ms, now);
        Ok(())
    }

    /// Removes the edge `from -> target`.
    pub fn remove_output(&mut self, from: ControllableId, target: Output) -> Result<(), GraphError> {
        let node = self.node_mut(from)?;
        if node.controllable_mut().remove_target(target) {
            Ok(())
        } else {
            Err(GraphError::UnknownOutput {
                from: node.name().to_string(),
                to: format!("{} input {}", target.target, target.input),
            })
        }
    }

    /// Removes a controllable together with every controllable that outputs
    /// into it, transitively, and every source value bound to any of them.
    /// Returns the removed controllables.
    pub fn remove_controllable(
        &mut self,
        id: ControllableId,
    ) -> Result<Vec<ControllableId>, GraphError> {
        self.node(id)?;
        let mut doomed = vec![id];
        let mut next = 0;
        while next < doomed.len() {
            let current = doomed[next];
            next += 1;
            let producers: Vec<ControllableId> = self
                .nodes
                .iter()
                .filter(|(producer, node)| {
                    !doomed.contains(producer)
                        && node
                            .controllable()
                            .outputs()
                            .iter()
                            .any(|o| o.target == current)
                })
                .map(|(producer, _)| producer)
                .collect();
            doomed.extend(producers);
        }

        for removed in &doomed {
            if let Some(mut node) = self.nodes.remove(*removed) {
                if let Controllable::Scene(scene) = node.controllable_mut() {
                    scene.stop();
                }
                debug!(id = %removed, name = node.name(), "Removed controllable.");
            }
        }
        let bound: Vec<SourceValueId> = self
            .source_values
            .iter()
            .filter(|(_, sv)| doomed.contains(&sv.target().target))
            .map(|(sv, _)| sv)
            .collect();
        for sv in bound {
            self.source_values.remove(sv);
            self.emit(ShowEvent::SourceValueRemoved(sv));
        }
        for removed in &doomed {
            self.emit(ShowEvent::ControllableRemoved(*removed));
        }
        Ok(doomed)
    }

    // Source values.

    pub fn add_source_value(&mut self, target: Output) -> Result<SourceValueId, GraphError> {
        self.check_target(target)?;
        Ok(self.source_values.insert(SourceValue::new(target)))
    }

    pub fn remove_source_value(&mut self, id: SourceValueId) -> Result<(), GraphError> {
        self.source_values
            .remove(id)
            .ok_or_else(|| GraphError::UnknownSourceValue(id.to_string()))?;
        self.emit(ShowEvent::SourceValueRemoved(id));
        Ok(())
    }

    /// Sets a lane of a source value. `fade_speed` is in full ranges per
    /// second; zero applies the value on the next tick.
    pub fn set_source_value(
        &mut self,
        id: SourceValueId,
        lane: Lane,
        value: ControlValue,
        fade_speed: f64,
    ) -> Result<(), GraphError> {
        self.source_values
            .get_mut(id)
            .ok_or_else(|| GraphError::UnknownSourceValue(id.to_string()))?
            .lane_mut(lane)
            .set(value, fade_speed);
        Ok(())
    }

    // Folders.

    pub fn add_folder(&mut self, parent: FolderId, name: &str) -> Result<FolderId, GraphError> {
        self.check_name(parent, name, None)?;
        self.folders.add(parent, name)
    }

    /// Removes a folder that holds neither folders nor controllables.
    pub fn remove_folder(&mut self, id: FolderId) -> Result<(), GraphError> {
        if self.nodes.values().any(|n| n.folder() == id) {
            return Err(GraphError::FolderNotEmpty(self.folders.path(id)));
        }
        self.folders.remove(id).map(|_| ())
    }

    pub fn rename_folder(&mut self, id: FolderId, name: &str) -> Result<(), GraphError> {
        let parent = self
            .folders
            .get(id)
            .ok_or_else(|| GraphError::UnknownFolder(id.to_string()))?
            .parent();
        if let Some(parent) = parent {
            if self
                .nodes
                .values()
                .any(|n| n.folder() == parent && n.name() == name)
            {
                return Err(GraphError::DuplicateName(name.to_string()));
            }
        }
        self.folders.rename(id, name)
    }

    pub fn rename_controllable(&mut self, id: ControllableId, name: &str) -> Result<(), GraphError> {
        let folder = self.node(id)?.folder();
        self.check_name(folder, name, Some(id))?;
        self.node_mut(id)?.set_name(name.to_string());
        Ok(())
    }

    pub fn move_controllable(&mut self, id: ControllableId, folder: FolderId) -> Result<(), GraphError> {
        let name = self.node(id)?.name().to_string();
        self.check_name(folder, &name, Some(id))?;
        self.node_mut(id)?.set_folder(folder);
        Ok(())
    }

    /// The absolute path of a controllable, e.g. `/front/par 1`.
    pub fn path_of(&self, id: ControllableId) -> Result<String, GraphError> {
        let node = self.node(id)?;
        Ok(format!("{}{}", self.folders.path(node.folder()), node.name()))
    }

    pub fn find_by_path(&self, path: &str) -> Option<ControllableId> {
        let (folder, name) = path.rsplit_once('/').unwrap_or(("", path));
        let folder = self.folders.find(folder)?;
        self.nodes
            .iter()
            .find(|(_, n)| n.folder() == folder && n.name() == name)
            .map(|(id, _)| id)
    }

    // Live operations.

    pub fn blackout(&mut self, fade_speed: f64) {
        self.blackout.start(BlackoutOperation::Blackout, fade_speed);
        info!(fade_speed, "Blackout.");
    }

    pub fn restore(&mut self, fade_speed: f64) {
        self.blackout.start(BlackoutOperation::Restore, fade_speed);
        info!(fade_speed, "Restore.");
    }

    /// Taps a beat at engine time `time_in_ms`.
    pub fn manual_beat(&mut self, time_in_ms: f64) {
        self.manual_beat.tap(time_in_ms);
    }

    pub fn manual_beat_value(&self, time_in_ms: f64) -> Option<f64> {
        self.manual_beat.beat_value(time_in_ms)
    }

    /// Replaces the values of a preset with the fixture control inputs of
    /// the last primary pass that were on.
    pub fn preset_from_current(&mut self, preset: ControllableId) -> Result<usize, GraphError> {
        self.check_kind(preset, "preset collection")?;
        let mut values = Vec::new();
        for (id, node) in self.nodes.iter() {
            if !matches!(node.controllable(), Controllable::FixtureControl(_)) {
                continue;
            }
            for (input, value) in self.inputs.get(id).iter().enumerate() {
                if !value.is_zero() {
                    values.push(PresetValue {
                        target: Output::new(id, input),
                        value: *value,
                    });
                }
            }
        }
        let count = values.len();
        if let Controllable::PresetCollection(c) = self.node_mut(preset)?.controllable_mut() {
            c.set_values(values);
        }
        Ok(count)
    }

    pub fn has_cycle(&self) -> bool {
        has_cycle(&self.dependencies())
    }

    // Mixing.

    /// Advances source value and blackout fades to `time_in_ms`.
    pub(crate) fn advance(&mut self, time_in_ms: f64) {
        let elapsed_ms = self
            .last_time_ms
            .map_or(0.0, |last| (time_in_ms - last).max(0.0));
        self.last_time_ms = Some(time_in_ms);
        for (_, sv) in self.source_values.iter_mut() {
            sv.apply_fades(elapsed_ms / 1000.0);
        }
        self.blackout.apply_fade(elapsed_ms);
    }

    /// The order to mix in, consumers first.
    ///
    /// # Panics
    ///
    /// If the graph has a cycle. Every edit that adds an edge is checked, so
    /// this can't happen.
    pub(crate) fn mix_order(&self) -> Vec<ControllableId> {
        match topological_sort(&self.dependencies()) {
            Ok(order) => order,
            Err(e) => panic!("cycle in the mixing graph: {}", e),
        }
    }

    /// Runs one mixing pass and writes the fixture values into `snapshot`.
    pub(crate) fn mix(
        &mut self,
        order: &[ControllableId],
        timing: &Timing,
        is_primary: bool,
        snapshot: &mut ValueSnapshot,
    ) {
        self.inputs.reset(&self.nodes);
        for sv in self.source_values.values() {
            self.inputs
                .mix_input(sv.target(), sv.lane(is_primary).value());
        }

        let mut ctx = MixContext::new(timing, is_primary, &mut self.inputs, &mut self.blackout);
        for id in order.iter().rev() {
            if let Some(node) = self.nodes.get_mut(*id) {
                ctx.mix_node(*id, node.controllable_mut());
            }
        }

        self.write_fixtures(is_primary, snapshot);
    }

    /// Scatters every fixture control's values into its universe. Where
    /// fixtures overlap the highest value wins.
    fn write_fixtures(&self, is_primary: bool, snapshot: &mut ValueSnapshot) {
        snapshot.resize(self.universe_types.len());
        snapshot.clear();
        for node in self.nodes.values() {
            let Controllable::FixtureControl(control) = node.controllable() else {
                continue;
            };
            let Some(fixture) = self.theatre.fixture(control.fixture()) else {
                continue;
            };
            if self.universe_type(fixture.universe()) != Some(UniverseType::Output) {
                continue;
            }
            let Some(universe) = snapshot.universe_mut(fixture.universe()) else {
                continue;
            };
            for (function, value) in fixture.functions().iter().zip(control.values(is_primary)) {
                let value = if is_primary && function.function_type.is_intensity() {
                    self.blackout.apply(*value)
                } else {
                    *value
                };
                function.write(universe, value.to_u16(), true);
            }
        }
    }

    /// Publishes a new pair of snapshots, handing back the previous ones.
    pub(crate) fn publish(
        &mut self,
        primary: ValueSnapshot,
        secondary: ValueSnapshot,
    ) -> (Arc<ValueSnapshot>, Arc<ValueSnapshot>) {
        (
            std::mem::replace(&mut self.primary, Arc::new(primary)),
            std::mem::replace(&mut self.secondary, Arc::new(secondary)),
        )
    }
}
