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
use std::path::Path;
use std::time::Duration;

use config::{Config, File, FileFormat};
use duration_string::DurationString;
use serde::Deserialize;

use crate::management::{EngineSettings, Show};
use crate::transport::UniverseSpec;

use super::error::ConfigError;
use super::fixture::Fixture;
use super::universe::Universe;

/// The default tick period, 40 Hz.
pub const DEFAULT_SYNC_PERIOD: Duration = Duration::from_millis(25);

/// How long a tapped beat lasts without a new tap.
pub const DEFAULT_BEAT_DECAY: Duration = Duration::from_secs(8);

/// The port olad listens on by default.
pub const DEFAULT_OLA_PORT: u16 = 9010;

/// Where the engine sends its universes.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// No hardware; outputs are only kept in memory.
    #[default]
    Clock,
    Ola,
}

/// A YAML representation of the engine configuration.
#[derive(Deserialize, Clone, Debug)]
pub struct Engine {
    /// The universes, in index order.
    universes: Vec<Universe>,

    #[serde(default)]
    transport: TransportKind,

    ola_port: Option<u16>,

    /// The time between ticks, e.g. "25ms".
    sync_period: Option<String>,

    /// How long a tapped beat lasts, e.g. "8s".
    beat_decay: Option<String>,

    /// Priority of the mixing thread, 0 to 99.
    thread_priority: Option<u8>,

    #[serde(default)]
    fixtures: Vec<Fixture>,
}

impl Engine {
    /// Parses an engine configuration from a YAML file.
    pub fn deserialize(path: &Path) -> Result<Engine, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Engine>()?)
    }

    /// Parses an engine configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Engine, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize::<Engine>()?)
    }

    pub fn universes(&self) -> &[Universe] {
        &self.universes
    }

    pub fn transport(&self) -> TransportKind {
        self.transport
    }

    pub fn ola_port(&self) -> u16 {
        self.ola_port.unwrap_or(DEFAULT_OLA_PORT)
    }

    pub fn sync_period(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.sync_period, DEFAULT_SYNC_PERIOD)
    }

    pub fn beat_decay(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.beat_decay, DEFAULT_BEAT_DECAY)
    }

    pub fn thread_priority(&self) -> Option<u8> {
        self.thread_priority
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn settings(&self) -> Result<EngineSettings, ConfigError> {
        if let Some(priority) = self.thread_priority {
            if priority > 99 {
                return Err(ConfigError::Invalid(format!(
                    "thread priority {} is out of range (0-99)",
                    priority
                )));
            }
        }
        Ok(EngineSettings {
            beat_decay: self.beat_decay()?,
            thread_priority: self.thread_priority,
        })
    }

    pub fn universe_specs(&self) -> Result<Vec<UniverseSpec>, ConfigError> {
        let count = self.universes.len();
        self.universes
            .iter()
            .enumerate()
            .map(|(index, universe)| universe.to_spec(index, count))
            .collect()
    }

    /// Patches every configured fixture into the show.
    pub fn patch(&self, show: &mut Show) -> Result<(), ConfigError> {
        self.fixtures
            .iter()
            .try_for_each(|fixture| fixture.patch(show))
    }
}

fn parse_duration(value: &Option<String>, default: Duration) -> Result<Duration, ConfigError> {
    value.as_ref().map_or(Ok(default), |duration| {
        Ok(DurationString::from_string(duration.clone())?.into())
    })
}
