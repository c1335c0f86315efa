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
//! A live lighting mixing engine. Controllables are wired into a graph, mixed
//! twice per tick (live and preview) and sent to DMX universes.

pub mod audio;
pub mod beat;
pub mod blackout;
pub mod config;
pub mod control_value;
pub mod controllable;
pub mod error;
pub mod filters;
pub mod folder;
pub mod graph;
pub mod management;
pub mod playsync;
pub mod snapshot;
pub mod source_value;
pub mod theatre;
pub mod thread_priority;
pub mod timing;
pub mod transport;
pub mod trigger;

#[cfg(test)]
mod testutil;
