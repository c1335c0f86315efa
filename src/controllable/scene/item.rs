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
use std::fmt;

use crate::blackout::{Blackout, BlackoutOperation};
use crate::control_value::ControlValue;
use crate::controllable::{MixContext, Output};

/// Identifies an item within its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneItemId(pub(super) u64);

impl SceneItemId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SceneItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene-item#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneItemKind {
    /// A marker. Does nothing when it starts.
    Key,
    /// Ramps one input from `start_value` to `end_value` over the item's
    /// duration.
    Control {
        target: Output,
        start_value: ControlValue,
        end_value: ControlValue,
    },
    /// Blacks out or restores the output when the item starts.
    Blackout {
        operation: BlackoutOperation,
        fade_speed: f64,
    },
}

/// An entry on a scene's timeline, active over `[offset, offset + duration)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneItem {
    offset_ms: u64,
    duration_ms: u64,
    kind: SceneItemKind,
}

impl SceneItem {
    pub fn new(offset_ms: u64, duration_ms: u64, kind: SceneItemKind) -> SceneItem {
        SceneItem {
            offset_ms,
            duration_ms,
            kind,
        }
    }

    pub fn key(offset_ms: u64) -> SceneItem {
        SceneItem::new(offset_ms, 0, SceneItemKind::Key)
    }

    pub fn control(
        offset_ms: u64,
        duration_ms: u64,
        target: Output,
        start_value: ControlValue,
        end_value: ControlValue,
    ) -> SceneItem {
        SceneItem::new(
            offset_ms,
            duration_ms,
            SceneItemKind::Control {
                target,
                start_value,
                end_value,
            },
        )
    }

    pub fn blackout(offset_ms: u64, operation: BlackoutOperation, fade_speed: f64) -> SceneItem {
        SceneItem::new(
            offset_ms,
            0,
            SceneItemKind::Blackout {
                operation,
                fade_speed,
            },
        )
    }

    pub fn offset_ms(&self) -> u64 {
        self.offset_ms
    }

    /// Only the scene may change the offset, since it is the sort key.
    pub(super) fn set_offset_ms(&mut self, offset_ms: u64) {
        self.offset_ms = offset_ms;
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn end_ms(&self) -> u64 {
        self.offset_ms.saturating_add(self.duration_ms)
    }

    pub fn kind(&self) -> &SceneItemKind {
        &self.kind
    }

    pub fn target(&self) -> Option<Output> {
        match self.kind {
            SceneItemKind::Control { target, .. } => Some(target),
            _ => None,
        }
    }

    /// The one-shot side effect of crossing the item's offset.
    pub(super) fn start(&self, blackout: &mut Blackout) {
        if let SceneItemKind::Blackout {
            operation,
            fade_speed,
        } = self.kind
        {
            blackout.start(operation, fade_speed);
        }
    }

    /// The ramp value at `relative_ms` into the scene.
    pub fn value_at(&self, relative_ms: f64) -> Option<ControlValue> {
        let SceneItemKind::Control {
            start_value,
            end_value,
            ..
        } = self.kind
        else {
            return None;
        };
        let ratio = if self.duration_ms == 0 {
            1.0
        } else {
            ((relative_ms - self.offset_ms as f64) / self.duration_ms as f64).clamp(0.0, 1.0)
        };
        let start = start_value.ratio();
        Some(ControlValue::from_ratio(
            start + (end_value.ratio() - start) * ratio,
        ))
    }

    pub(super) fn mix(&self, relative_ms: f64, ctx: &mut MixContext<'_>) {
        if let (Some(target), Some(value)) = (self.target(), self.value_at(relative_ms)) {
            ctx.mix_input(target, value);
        }
    }
}
