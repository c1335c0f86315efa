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
//! The mixing engine: owns the show, runs the mix thread at the transport's
//! cadence and publishes snapshots.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{error, info, span, Level};

use crate::beat::BeatFinder;
use crate::error::EngineError;
use crate::snapshot::ValueSnapshot;
use crate::thread_priority::{configure_mix_thread_priority, mix_thread_priority};
use crate::timing::Timing;
use crate::transport::{Transport, UniverseType};

mod show;
#[cfg(test)]
mod tests;

pub use show::{Show, ShowEvent};

/// Engine settings that don't describe the show itself.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// How long a manual beat is trusted without a new tap.
    pub beat_decay: Duration,
    /// Priority for the mixing thread, 0 to 99.
    pub thread_priority: Option<u8>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            beat_decay: Duration::from_secs(8),
            thread_priority: None,
        }
    }
}

/// State only the mixing side touches.
struct Mixer {
    timestep: u64,
    rng: StdRng,
    beat_finder: Option<Box<dyn BeatFinder>>,
    /// Buffers of earlier snapshots, reused once no reader holds them.
    spare: Vec<ValueSnapshot>,
}

struct Inner {
    show: Mutex<Show>,
    transport: Arc<dyn Transport>,
    mixer: Mutex<Mixer>,
    clock: Instant,
    quit: AtomicBool,
}

/// Runs a show. Editors lock the show through [`Management::show`]; the mix
/// thread takes the same lock once per tick.
pub struct Management {
    inner: Arc<Inner>,
    thread_priority: Option<u8>,
    has_run: AtomicBool,
    mix_thread: Mutex<Option<JoinHandle<()>>>,
}

impl Management {
    pub fn new(transport: Arc<dyn Transport>, settings: &EngineSettings) -> Management {
        let universe_types = (0..transport.n_universes())
            .map(|u| transport.universe_type(u))
            .collect();
        Management {
            inner: Arc::new(Inner {
                show: Mutex::new(Show::new(universe_types, settings.beat_decay)),
                transport,
                mixer: Mutex::new(Mixer {
                    timestep: 0,
                    rng: StdRng::from_entropy(),
                    beat_finder: None,
                    spare: Vec::new(),
                }),
                clock: Instant::now(),
                quit: AtomicBool::new(false),
            }),
            thread_priority: settings.thread_priority,
            has_run: AtomicBool::new(false),
            mix_thread: Mutex::new(None),
        }
    }

    /// Locks the show for reading or editing.
    pub fn show(&self) -> MutexGuard<'_, Show> {
        self.inner.show.lock()
    }

    pub fn set_beat_finder(&self, beat_finder: Option<Box<dyn BeatFinder>>) {
        self.inner.mixer.lock().beat_finder = beat_finder;
    }

    /// Milliseconds since the engine was created.
    pub fn elapsed_ms(&self) -> f64 {
        self.inner.elapsed_ms()
    }

    /// Taps a beat now.
    pub fn manual_beat(&self) {
        let now = self.elapsed_ms();
        self.show().manual_beat(now);
    }

    pub fn primary_snapshot(&self) -> Arc<ValueSnapshot> {
        self.show().primary_snapshot()
    }

    pub fn secondary_snapshot(&self) -> Arc<ValueSnapshot> {
        self.show().secondary_snapshot()
    }

    /// Runs one tick against the engine clock.
    pub fn tick(&self) {
        self.inner.tick();
    }

    /// Runs one tick with the given timing.
    pub fn process(&self, timing: &Timing) {
        self.inner.process(timing);
    }

    /// Starts the mixing thread. An engine runs at most once.
    pub fn run(&self) -> Result<(), EngineError> {
        self.run_on(thread::Builder::new().name("glint-mix".into()))
    }

    /// Spawns the mixing thread with `builder`. A failed spawn doesn't count
    /// as a run.
    fn run_on(&self, builder: thread::Builder) -> Result<(), EngineError> {
        if self.has_run.swap(true, Ordering::SeqCst) {
            error!("Run called on an engine that already ran.");
            return Err(EngineError::AlreadyRunning);
        }

        let inner = self.inner.clone();
        let priority = mix_thread_priority(self.thread_priority);
        let spawned = builder.spawn(move || {
            let span = span!(Level::INFO, "mix thread");
            let _enter = span.enter();
            configure_mix_thread_priority(priority);
            info!("Mixing started.");
            while !inner.quit.load(Ordering::SeqCst) && inner.transport.wait_for_next_sync() {
                inner.tick();
            }
            info!("Mixing stopped.");
        });
        match spawned {
            Ok(handle) => {
                *self.mix_thread.lock() = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.has_run.store(false, Ordering::SeqCst);
                error!(err = %e, "Unable to spawn the mix thread.");
                Err(e.into())
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.mix_thread.lock().is_some()
    }

    /// Stops the mixing thread and waits for it. The tick in flight is
    /// allowed to finish.
    pub fn stop(&self) {
        self.inner.quit.store(true, Ordering::SeqCst);
        self.inner.transport.abort();
        if let Some(handle) = self.mix_thread.lock().take() {
            if handle.join().is_err() {
                error!("Error joining mix thread");
            }
        }
    }
}

impl Drop for Management {
    fn drop(&mut self) {
        self.stop();
        self.inner.transport.close();
    }
}

impl Inner {
    fn elapsed_ms(&self) -> f64 {
        self.clock.elapsed().as_secs_f64() * 1000.0
    }

    fn tick(&self) {
        let time_in_ms = self.elapsed_ms();
        let manual_beat = self.show.lock().manual_beat_value(time_in_ms);
        let timing = {
            let mut mixer = self.mixer.lock();
            let (device_beat, audio_level) = match mixer.beat_finder.as_mut() {
                Some(finder) => (
                    finder.beat_value().map_or(0.0, |(beat, _confidence)| beat),
                    finder.audio_level(),
                ),
                None => (0.0, 0),
            };
            let random = mixer.rng.gen::<u32>();
            let timing = Timing::new(
                time_in_ms,
                mixer.timestep,
                manual_beat.unwrap_or(device_beat),
                audio_level,
                random,
            );
            mixer.timestep += 1;
            timing
        };
        self.process(&timing);
    }

    fn process(&self, timing: &Timing) {
        let n_universes = self.transport.n_universes();
        let (mut primary, mut secondary) = {
            let mut mixer = self.mixer.lock();
            let mut spare = || {
                mixer
                    .spare
                    .pop()
                    .unwrap_or_else(|| ValueSnapshot::new(n_universes))
            };
            (spare(), spare())
        };

        let published = {
            let mut show = self.show.lock();
            show.advance(timing.time_in_ms());
            let order = show.mix_order();
            show.mix(&order, timing, false, &mut secondary);
            show.mix(&order, timing, true, &mut primary);
            self.merge_inputs(&mut primary);
            let (old_primary, old_secondary) = show.publish(primary, secondary);
            let published = show.primary_snapshot();
            drop(show);

            let mut mixer = self.mixer.lock();
            for old in [old_primary, old_secondary] {
                if let Ok(snapshot) = Arc::try_unwrap(old) {
                    mixer.spare.push(snapshot);
                }
            }
            published
        };

        for universe in 0..n_universes {
            if self.transport.universe_type(universe) != UniverseType::Output {
                continue;
            }
            if let Err(e) = self
                .transport
                .set_output_values(universe, published.universe(universe))
            {
                error!(universe, err = %e, "Error sending universe.");
            }
        }
    }

    /// Copies input universes into the snapshot, merging the ones that have a
    /// mapping into their output universe.
    fn merge_inputs(&self, snapshot: &mut ValueSnapshot) {
        let mut values = Vec::new();
        for universe in 0..self.transport.n_universes() {
            if self.transport.universe_type(universe) != UniverseType::Input {
                continue;
            }
            let Some(input) = snapshot.universe_mut(universe) else {
                continue;
            };
            self.transport.input_values(universe, input);
            values.clear();
            values.extend_from_slice(input);

            if let Some(mapping) = self.transport.input_mapping(universe) {
                if let Some(output) = snapshot.universe_mut(mapping.merge_universe) {
                    mapping.merge(&values, output);
                }
            }
        }
    }
}
