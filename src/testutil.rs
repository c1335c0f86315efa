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
//! Builders for engine-level tests.

use std::sync::Arc;
use std::time::Duration;

use crate::control_value::ControlValue;
use crate::controllable::{ControllableId, Output};
use crate::management::{EngineSettings, Management};
use crate::source_value::{Lane, SourceValueId};
use crate::theatre::{FixtureId, StockFixture};
use crate::timing::Timing;
use crate::transport::{ClockTransport, UniverseSpec};

/// A timing at `time_in_ms` with everything else zeroed.
pub fn timing(time_in_ms: f64) -> Timing {
    Timing::new(time_in_ms, 0, 0.0, 0, 0)
}

/// An engine on a clock transport with the given universes.
pub fn engine(universes: Vec<UniverseSpec>) -> (Management, Arc<ClockTransport>) {
    let transport = Arc::new(ClockTransport::new(universes, Duration::from_millis(5)));
    let management = Management::new(transport.clone(), &EngineSettings::default());
    (management, transport)
}

/// A patched fixture and its fixture control.
pub struct Rig {
    pub management: Management,
    pub transport: Arc<ClockTransport>,
    pub fixture: FixtureId,
    pub control: ControllableId,
}

impl Rig {
    /// One output universe with a single fixture at channel 0, controlled by
    /// a fixture control named "par".
    pub fn new(stock: StockFixture) -> Rig {
        let (management, transport) = engine(vec![UniverseSpec::output(1)]);
        let (fixture, control) = {
            let mut show = management.show();
            let root = show.folders().root();
            let fixture = show.add_fixture("par", stock, 0, 0).unwrap();
            let control = show.add_fixture_control("par", root, fixture).unwrap();
            (fixture, control)
        };
        Rig {
            management,
            transport,
            fixture,
            control,
        }
    }

    /// Binds a source value to `target` with lane A set to `value`.
    pub fn source(&self, target: Output, value: ControlValue) -> SourceValueId {
        let mut show = self.management.show();
        let id = show.add_source_value(target).unwrap();
        show.set_source_value(id, Lane::A, value, 0.0).unwrap();
        id
    }

    /// The primary output of the first `n` channels of universe 0.
    pub fn channels(&self, n: usize) -> Vec<u8> {
        self.management.primary_snapshot().universe(0)[..n].to_vec()
    }

    pub fn process_at(&self, time_in_ms: f64) {
        self.management.process(&timing(time_in_ms));
    }
}
