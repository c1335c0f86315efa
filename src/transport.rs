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
//! Universe transports: where the engine's output goes, where its input comes
//! from, and what paces the mixing loop.

use serde::Deserialize;

use crate::error::TransportError;

pub mod clock;
pub mod ola;

pub use clock::ClockTransport;
pub use ola::OlaTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UniverseType {
    Input,
    #[default]
    Output,
}

/// How values read from an input universe are merged into an output universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MergeFunction {
    /// The input replaces whatever the engine computed.
    Replace,
    /// Highest takes precedence.
    #[default]
    Htp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputMapping {
    pub merge_universe: usize,
    pub function: MergeFunction,
}

impl InputMapping {
    /// Merges `input` into `output` channel by channel.
    pub fn merge(&self, input: &[u8], output: &mut [u8]) {
        for (out, value) in output.iter_mut().zip(input.iter()) {
            *out = match self.function {
                MergeFunction::Replace => *value,
                MergeFunction::Htp => (*out).max(*value),
            };
        }
    }
}

/// The static description of one universe of a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniverseSpec {
    pub universe_type: UniverseType,
    /// Only meaningful for input universes.
    pub input_mapping: Option<InputMapping>,
    /// The universe number on the wire.
    pub ola_universe: u32,
}

impl UniverseSpec {
    pub fn output(ola_universe: u32) -> UniverseSpec {
        UniverseSpec {
            universe_type: UniverseType::Output,
            input_mapping: None,
            ola_universe,
        }
    }

    pub fn input(ola_universe: u32, input_mapping: Option<InputMapping>) -> UniverseSpec {
        UniverseSpec {
            universe_type: UniverseType::Input,
            input_mapping,
            ola_universe,
        }
    }
}

/// A set of universes and the clock that paces the engine.
pub trait Transport: Send + Sync {
    fn n_universes(&self) -> usize;

    fn universe_type(&self, universe: usize) -> UniverseType;

    fn input_mapping(&self, universe: usize) -> Option<InputMapping>;

    /// Blocks until the next sync point. Returns false if the wait was
    /// aborted, after which the engine stops.
    fn wait_for_next_sync(&self) -> bool;

    /// Interrupts `wait_for_next_sync`.
    fn abort(&self);

    fn set_output_values(&self, universe: usize, values: &[u8]) -> Result<(), TransportError>;

    /// Fills `values` with the latest values received on an input universe.
    fn input_values(&self, universe: usize, values: &mut [u8]);

    /// Releases whatever the transport holds open.
    fn close(&self) {}
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_merge() {
        let input = [10u8, 200, 0];
        let mut output = [50u8, 50, 50];
        InputMapping {
            merge_universe: 0,
            function: MergeFunction::Htp,
        }
        .merge(&input, &mut output);
        assert_eq!(output, [50, 200, 50]);

        InputMapping {
            merge_universe: 0,
            function: MergeFunction::Replace,
        }
        .merge(&input, &mut output);
        assert_eq!(output, input);
    }
}
