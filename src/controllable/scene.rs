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
//! The scene player: a timeline of items played against the engine clock,
//! optionally following the position of an audio player.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::time::Duration;

use tracing::{debug, warn};

use crate::audio::AudioPlayer;
use crate::blackout::Blackout;

use super::{MixContext, Output};

pub mod item;

pub use item::{SceneItem, SceneItemId, SceneItemKind};

/// How many ticks a scene keeps playing after its last item ends.
const END_GRACE_TICKS: u32 = 5;

/// The fraction of the audio drift corrected per sync update.
const SYNC_CORRECTION: f64 = 0.05;

type ItemKey = (u64, SceneItemId);

pub struct Scene {
    /// Items ordered by offset; the id keeps equal offsets apart.
    items: BTreeMap<ItemKey, SceneItem>,
    offsets: HashMap<SceneItemId, u64>,
    next_item_id: u64,
    /// Where in the timeline playback starts.
    start_offset_ms: f64,
    /// The engine time at which relative time 0 would have been.
    start_time_ms: Option<f64>,
    started: Vec<ItemKey>,
    last_started: Option<ItemKey>,
    /// The relative time of the last `skip_to`.
    play_head_ms: Option<f64>,
    ticks_after_end: u32,
    audio: Option<Box<dyn AudioPlayer>>,
}

impl Default for Scene {
    fn default() -> Self {
        Scene::new()
    }
}

impl Scene {
    pub fn new() -> Scene {
        Scene {
            items: BTreeMap::new(),
            offsets: HashMap::new(),
            next_item_id: 0,
            start_offset_ms: 0.0,
            start_time_ms: None,
            started: Vec::new(),
            last_started: None,
            play_head_ms: None,
            ticks_after_end: 0,
            audio: None,
        }
    }

    pub(crate) fn add_item(&mut self, item: SceneItem) -> SceneItemId {
        let id = SceneItemId(self.next_item_id);
        self.next_item_id += 1;
        let key = (item.offset_ms(), id);
        self.offsets.insert(id, item.offset_ms());
        self.items.insert(key, item);
        self.catch_up(key);
        id
    }

    pub(crate) fn remove_item(&mut self, id: SceneItemId) -> Option<SceneItem> {
        let offset = self.offsets.remove(&id)?;
        let key = (offset, id);
        self.started.retain(|k| *k != key);
        self.items.remove(&key)
    }

    /// Moves an item on the timeline by taking it out and reinserting it
    /// under its new key.
    pub(crate) fn set_item_offset(&mut self, id: SceneItemId, offset_ms: u64) -> bool {
        let Some(mut item) = self.remove_item(id) else {
            return false;
        };
        item.set_offset_ms(offset_ms);
        self.offsets.insert(id, offset_ms);
        self.items.insert((offset_ms, id), item);
        self.catch_up((offset_ms, id));
        true
    }

    /// `skip_to` only starts items after the last started one. An item that
    /// lands behind it during playback joins the active set here if the play
    /// head is inside it. Its start side effects don't fire.
    fn catch_up(&mut self, key: ItemKey) {
        let (Some(play_head), Some(last)) = (self.play_head_ms, self.last_started) else {
            return;
        };
        if key > last {
            return;
        }
        if let Some(item) = self.items.get(&key) {
            if key.0 as f64 <= play_head && item.end_ms() as f64 > play_head {
                self.started.push(key);
            }
        }
    }

    /// Drops every control item driving `target`.
    pub(crate) fn remove_target(&mut self, target: Output) -> bool {
        let ids: Vec<SceneItemId> = self
            .items
            .iter()
            .filter(|(_, item)| item.target() == Some(target))
            .map(|((_, id), _)| *id)
            .collect();
        for id in &ids {
            self.remove_item(*id);
        }
        !ids.is_empty()
    }

    pub fn item(&self, id: SceneItemId) -> Option<&SceneItem> {
        let offset = self.offsets.get(&id)?;
        self.items.get(&(*offset, id))
    }

    /// Every item in timeline order.
    pub fn items(&self) -> impl Iterator<Item = (SceneItemId, &SceneItem)> + '_ {
        self.items.iter().map(|((_, id), item)| (*id, item))
    }

    pub fn outputs(&self) -> Vec<Output> {
        self.items.values().filter_map(SceneItem::target).collect()
    }

    pub fn start_offset_ms(&self) -> f64 {
        self.start_offset_ms
    }

    pub(crate) fn set_start_offset_ms(&mut self, start_offset_ms: f64) {
        self.start_offset_ms = start_offset_ms.max(0.0);
    }

    pub(crate) fn set_audio(&mut self, audio: Option<Box<dyn AudioPlayer>>) {
        if let Some(mut old) = self.audio.take() {
            old.stop();
        }
        self.audio = audio;
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.start_time_ms.is_some()
    }

    /// The ids of the items currently in the active set.
    pub fn active_items(&self) -> Vec<SceneItemId> {
        self.started.iter().map(|(_, id)| *id).collect()
    }

    /// Starts playback at engine time `time_in_ms`. An audio player that
    /// fails to start is dropped, and the scene plays without it.
    pub(crate) fn start(&mut self, time_in_ms: f64) {
        self.start_time_ms = Some(time_in_ms - self.start_offset_ms);
        self.started.clear();
        self.last_started = None;
        self.play_head_ms = None;
        self.ticks_after_end = 0;

        if let Some(audio) = self.audio.as_mut() {
            let offset = Duration::from_secs_f64(self.start_offset_ms / 1000.0);
            if let Err(e) = audio.play(offset) {
                warn!(player = %audio, err = %e, "Unable to play scene audio, continuing without it.");
                self.audio = None;
            }
        }
    }

    pub(crate) fn stop(&mut self) {
        self.start_time_ms = None;
        self.started.clear();
        self.last_started = None;
        self.play_head_ms = None;
        if let Some(audio) = self.audio.as_mut() {
            audio.stop();
        }
    }

    /// Nudges the start time towards where the audio says the scene should
    /// be. Only a fraction of the drift is corrected per update.
    pub(crate) fn sync_update(&mut self, audio_position_ms: f64, time_in_ms: f64) {
        if let Some(start) = self.start_time_ms.as_mut() {
            let drift = (time_in_ms - *start) - audio_position_ms;
            *start += drift * SYNC_CORRECTION;
        }
    }

    /// Brings the active set up to `relative_ms`: items whose offset has been
    /// crossed are started, and items that have ended are evicted.
    pub fn skip_to(&mut self, relative_ms: f64, blackout: &mut Blackout) {
        if relative_ms >= 0.0 {
            let upper: ItemKey = (relative_ms.floor() as u64, SceneItemId(u64::MAX));
            let lower = match self.last_started {
                Some(last) if last > upper => None,
                Some(last) => Some(Bound::Excluded(last)),
                None => Some(Bound::Unbounded),
            };
            if let Some(lower) = lower {
                for (key, item) in self.items.range((lower, Bound::Included(upper))) {
                    item.start(blackout);
                    self.started.push(*key);
                    self.last_started = Some(*key);
                }
            }
        }

        self.play_head_ms = Some(relative_ms);
        let items = &self.items;
        self.started.retain(|key| {
            items
                .get(key)
                .map_or(false, |item| item.end_ms() as f64 > relative_ms)
        });
    }

    fn all_items_ended(&self) -> bool {
        let none_pending = match self.last_started {
            Some(last) => self
                .items
                .range((Bound::Excluded(last), Bound::Unbounded))
                .next()
                .is_none(),
            None => self.items.is_empty(),
        };
        self.started.is_empty() && none_pending
    }

    pub fn mix(&mut self, ctx: &mut MixContext<'_>) {
        let Some(start) = self.start_time_ms else {
            return;
        };
        let now = ctx.timing().time_in_ms();
        let relative = now - start;

        if !ctx.is_primary() {
            // The preview follows the same timeline without side effects.
            for ((offset, _), item) in self.items.iter() {
                if *offset as f64 > relative {
                    break;
                }
                if item.end_ms() as f64 > relative {
                    item.mix(relative, ctx);
                }
            }
            return;
        }

        if let Some(position) = self.audio.as_ref().and_then(|audio| audio.position()) {
            self.sync_update(position.as_secs_f64() * 1000.0, now);
        }
        let relative = now - self.start_time_ms.unwrap_or(start);
        self.skip_to(relative, ctx.blackout_mut());
        for key in &self.started {
            if let Some(item) = self.items.get(key) {
                item.mix(relative, ctx);
            }
        }

        if self.all_items_ended() {
            self.ticks_after_end += 1;
            let audio_playing = self.audio.as_ref().map_or(false, |audio| audio.is_playing());
            if self.ticks_after_end > END_GRACE_TICKS && !audio_playing {
                debug!("Scene finished.");
                self.stop();
            }
        }
    }
}
