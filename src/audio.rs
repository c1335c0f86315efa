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
use std::{error::Error, fmt, time::Duration};

pub mod mock;

/// Audio playback bound to a scene. Decoding and output live behind this
/// trait; the engine only starts, stops and follows the playback position.
pub trait AudioPlayer: fmt::Display + Send {
    /// Starts playing from `offset` into the audio.
    fn play(&mut self, offset: Duration) -> Result<(), Box<dyn Error>>;

    fn stop(&mut self);

    fn is_playing(&self) -> bool;

    /// The current playback position, if the player is playing and knows it.
    fn position(&self) -> Option<Duration>;
}
