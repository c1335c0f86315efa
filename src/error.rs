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

/// Errors raised by structural edits to the show. These are always reported at
/// the point of the offending edit; the mix thread never sees a rejected edit.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("controllable {0} does not exist")]
    UnknownControllable(String),
    #[error("source value {0} does not exist")]
    UnknownSourceValue(String),
    #[error("fixture {0} does not exist")]
    UnknownFixture(String),
    #[error("folder {0} does not exist")]
    UnknownFolder(String),
    #[error("scene item {0} does not exist")]
    UnknownSceneItem(u64),
    #[error("input {input} is out of range for '{name}' ({count} inputs)")]
    InputOutOfRange {
        name: String,
        input: usize,
        count: usize,
    },
    #[error("connecting '{from}' to '{to}' would create a cycle")]
    WouldCreateCycle { from: String, to: String },
    #[error("the graph contains a cycle")]
    Cycle,
    #[error("an object named '{0}' already exists in this folder")]
    DuplicateName(String),
    #[error("folder '{0}' is not empty")]
    FolderNotEmpty(String),
    #[error("'{0}' is not a {1}")]
    WrongKind(String, &'static str),
    #[error("channel {channel} of universe {universe} is out of range")]
    ChannelOutOfRange { universe: usize, channel: usize },
    #[error("universe {0} does not exist")]
    UnknownUniverse(usize),
    #[error("fixture type '{0}' does not exist")]
    UnknownFixtureType(String),
    #[error("'{from}' does not output to {to}")]
    UnknownOutput { from: String, to: String },
}

/// Errors raised by the lifetime of the mixing engine itself.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("the engine is already running")]
    AlreadyRunning,
    #[error("unable to spawn the mixing thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors raised by universe transports.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("unable to connect to OLA: {0}")]
    Connect(String),
    #[error("error sending DMX to universe {universe}: {message}")]
    Send { universe: u32, message: String },
    #[error("universe {0} does not exist")]
    UnknownUniverse(usize),
}
