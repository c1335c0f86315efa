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
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::TransportError;
use crate::playsync::CancelHandle;
use crate::theatre::UNIVERSE_SIZE;

use super::{InputMapping, Transport, UniverseSpec, UniverseType};

/// How much of each wait is left to `spin_sleep` instead of the condvar.
const SPIN_MARGIN: Duration = Duration::from_millis(1);

/// A transport without hardware: syncs come from a fixed-rate clock, output
/// values are recorded and input values are whatever was last fed in.
pub struct ClockTransport {
    universes: Vec<UniverseSpec>,
    period: Duration,
    next_sync: Mutex<Option<Instant>>,
    cancel_handle: CancelHandle,
    outputs: Mutex<Vec<Vec<u8>>>,
    inputs: Mutex<Vec<Vec<u8>>>,
    sent: Mutex<usize>,
}

impl ClockTransport {
    pub fn new(universes: Vec<UniverseSpec>, period: Duration) -> ClockTransport {
        let n = universes.len();
        ClockTransport {
            universes,
            period,
            next_sync: Mutex::new(None),
            cancel_handle: CancelHandle::new(),
            outputs: Mutex::new(vec![vec![0; UNIVERSE_SIZE]; n]),
            inputs: Mutex::new(vec![vec![0; UNIVERSE_SIZE]; n]),
            sent: Mutex::new(0),
        }
    }

    /// A transport with `n` plain output universes.
    pub fn with_outputs(n: usize, period: Duration) -> ClockTransport {
        let universes = (0..n).map(|u| UniverseSpec::output(u as u32 + 1)).collect();
        ClockTransport::new(universes, period)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// The values last sent to an output universe.
    pub fn output_values(&self, universe: usize) -> Vec<u8> {
        self.outputs
            .lock()
            .get(universe)
            .cloned()
            .unwrap_or_default()
    }

    /// How many universe updates have been sent.
    pub fn sent_count(&self) -> usize {
        *self.sent.lock()
    }

    /// Feeds values into an input universe.
    pub fn set_input_values(&self, universe: usize, values: &[u8]) {
        if let Some(input) = self.inputs.lock().get_mut(universe) {
            let n = values.len().min(input.len());
            input[..n].copy_from_slice(&values[..n]);
        }
    }
}

impl Transport for ClockTransport {
    fn n_universes(&self) -> usize {
        self.universes.len()
    }

    fn universe_type(&self, universe: usize) -> UniverseType {
        self.universes
            .get(universe)
            .map(|u| u.universe_type)
            .unwrap_or_default()
    }

    fn input_mapping(&self, universe: usize) -> Option<InputMapping> {
        self.universes.get(universe)?.input_mapping
    }

    fn wait_for_next_sync(&self) -> bool {
        let deadline = {
            let mut next_sync = self.next_sync.lock();
            let now = Instant::now();
            let deadline = match *next_sync {
                // Missed syncs are dropped rather than caught up on.
                Some(previous) if previous + self.period > now => previous + self.period,
                Some(_) => now,
                None => now + self.period,
            };
            *next_sync = Some(deadline);
            deadline
        };

        if !self
            .cancel_handle
            .wait_until(deadline.checked_sub(SPIN_MARGIN).unwrap_or(deadline))
        {
            return false;
        }
        spin_sleep::sleep(deadline.saturating_duration_since(Instant::now()));
        !self.cancel_handle.is_cancelled()
    }

    fn abort(&self) {
        self.cancel_handle.cancel();
    }

    fn set_output_values(&self, universe: usize, values: &[u8]) -> Result<(), TransportError> {
        let mut outputs = self.outputs.lock();
        let output = outputs
            .get_mut(universe)
            .ok_or(TransportError::UnknownUniverse(universe))?;
        output.clear();
        output.extend_from_slice(values);
        *self.sent.lock() += 1;
        Ok(())
    }

    fn input_values(&self, universe: usize, values: &mut [u8]) {
        if let Some(input) = self.inputs.lock().get(universe) {
            let n = values.len().min(input.len());
            values[..n].copy_from_slice(&input[..n]);
        }
    }
}
