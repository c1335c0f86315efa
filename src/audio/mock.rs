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
use std::{error::Error, fmt, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tracing::info;

#[derive(Debug, Default)]
struct State {
    is_playing: bool,
    position: Option<Duration>,
    plays: usize,
}

/// A mock player. Doesn't actually play anything; the position is whatever
/// the test sets it to.
#[derive(Clone)]
pub struct Player {
    name: String,
    fail: bool,
    state: Arc<Mutex<State>>,
}

impl Player {
    pub fn new(name: &str) -> Player {
        Player {
            name: name.to_string(),
            fail: false,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// A player whose `play` always fails, like one bound to an unreadable file.
    pub fn failing(name: &str) -> Player {
        Player {
            fail: true,
            ..Player::new(name)
        }
    }

    pub fn set_position(&self, position: Duration) {
        self.state.lock().position = Some(position);
    }

    /// Ends playback as if the audio ran out.
    pub fn finish(&self) {
        let mut state = self.state.lock();
        state.is_playing = false;
        state.position = None;
    }

    pub fn plays(&self) -> usize {
        self.state.lock().plays
    }
}

impl super::AudioPlayer for Player {
    fn play(&mut self, offset: Duration) -> Result<(), Box<dyn Error>> {
        if self.fail {
            return Err(format!("unable to open audio for {}", self.name).into());
        }
        info!(player = self.name, offset = ?offset, "Playing audio.");
        let mut state = self.state.lock();
        state.is_playing = true;
        state.position = Some(offset);
        state.plays += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.finish();
    }

    fn is_playing(&self) -> bool {
        self.state.lock().is_playing
    }

    fn position(&self) -> Option<Duration> {
        self.state.lock().position
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}
