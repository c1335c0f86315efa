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
use serde::Deserialize;

use crate::transport::{InputMapping, MergeFunction, UniverseSpec, UniverseType};

use super::error::ConfigError;

/// A YAML representation of a universe.
#[derive(Deserialize, Clone, Debug)]
pub struct Universe {
    /// Input or output. Defaults to output.
    #[serde(rename = "type", default)]
    universe_type: UniverseType,

    /// The OpenLighting universe. Defaults to the position in the list, from 1.
    ola_universe: Option<u32>,

    /// For input universes: where the received values go.
    merge: Option<Merge>,
}

/// A YAML representation of an input merge.
#[derive(Deserialize, Clone, Debug)]
pub struct Merge {
    /// The index of the output universe to merge into.
    universe: usize,

    #[serde(default)]
    function: MergeFunction,
}

impl Universe {
    pub fn universe_type(&self) -> UniverseType {
        self.universe_type
    }

    /// Converts the universe at `index` of a list of `count` universes.
    pub(super) fn to_spec(&self, index: usize, count: usize) -> Result<UniverseSpec, ConfigError> {
        let ola_universe = self.ola_universe.unwrap_or(index as u32 + 1);
        match self.universe_type {
            UniverseType::Output => {
                if self.merge.is_some() {
                    return Err(ConfigError::Invalid(format!(
                        "universe {} is an output universe and can't be merged",
                        index
                    )));
                }
                Ok(UniverseSpec::output(ola_universe))
            }
            UniverseType::Input => {
                let mapping = match &self.merge {
                    Some(merge) if merge.universe >= count || merge.universe == index => {
                        return Err(ConfigError::Invalid(format!(
                            "universe {} can't be merged into universe {}",
                            index, merge.universe
                        )))
                    }
                    Some(merge) => Some(InputMapping {
                        merge_universe: merge.universe,
                        function: merge.function,
                    }),
                    None => None,
                };
                Ok(UniverseSpec::input(ola_universe, mapping))
            }
        }
    }
}
