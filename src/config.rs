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
use std::sync::Arc;

use tracing::info;

use crate::management::Management;
use crate::transport::{self, ClockTransport, OlaTransport, Transport};

mod engine;
mod error;
mod fixture;
mod universe;

pub use engine::{Engine, TransportKind};
pub use error::ConfigError;
pub use fixture::Fixture;
pub use universe::{Merge, Universe};

/// Loads an engine configuration from a YAML file.
pub fn load(path: &Path) -> Result<Engine, ConfigError> {
    Engine::deserialize(path)
}

/// Checks everything about a configuration short of opening the transport.
/// Returns the patched engine on a clock transport for inspection.
pub fn verify(engine: &Engine) -> Result<Management, ConfigError> {
    let settings = engine.settings()?;
    let transport = ClockTransport::new(engine.universe_specs()?, engine.sync_period()?);
    let management = Management::new(Arc::new(transport), &settings);
    engine.patch(&mut management.show())?;
    Ok(management)
}

/// Builds the transport an engine configuration asks for.
pub fn build_transport(engine: &Engine) -> Result<Arc<dyn Transport>, ConfigError> {
    let universes = engine.universe_specs()?;
    let period = engine.sync_period()?;
    Ok(match engine.transport() {
        TransportKind::Clock => Arc::new(ClockTransport::new(universes, period)),
        TransportKind::Ola => {
            let client = transport::ola::connect(engine.ola_port())?;
            Arc::new(OlaTransport::new(universes, period, client)?)
        }
    })
}

/// Creates an engine with its fixtures patched. The mix thread isn't started.
pub fn init_engine(engine: &Engine) -> Result<Management, ConfigError> {
    let settings = engine.settings()?;
    let management = Management::new(build_transport(engine)?, &settings);
    engine.patch(&mut management.show())?;
    info!(
        universes = engine.universes().len(),
        fixtures = engine.fixtures().len(),
        "Engine initialized."
    );
    Ok(management)
}
