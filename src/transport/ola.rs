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
use std::error::Error;
use std::net::TcpStream;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use ola::{client::StreamingClientConfig, DmxBuffer, StreamingClient};
use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::error::TransportError;

use super::{ClockTransport, InputMapping, Transport, UniverseSpec, UniverseType};

/// How many times to try reaching the OLA daemon before giving up.
const CONNECT_ATTEMPTS: usize = 3;

/// The pause between connection attempts.
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Trait for OLA client functionality
pub trait OlaClient: Send {
    /// Send DMX data to a universe
    fn send_dmx(&mut self, universe: u32, buffer: &DmxBuffer) -> Result<(), Box<dyn Error>>;
}

/// Real OLA client implementation
pub struct RealOlaClient {
    client: StreamingClient<TcpStream>,
}

impl OlaClient for RealOlaClient {
    fn send_dmx(&mut self, universe: u32, buffer: &DmxBuffer) -> Result<(), Box<dyn Error>> {
        self.client.send_dmx(universe, buffer)?;
        Ok(())
    }
}

/// Connects to the OLA daemon on the given port, retrying a few times.
pub fn connect(port: u16) -> Result<Box<dyn OlaClient>, TransportError> {
    let config = StreamingClientConfig {
        server_port: port,
        ..Default::default()
    };
    for attempt in 0..CONNECT_ATTEMPTS {
        // Don't sleep on the first iteration.
        if attempt > 0 {
            thread::sleep(CONNECT_RETRY_DELAY);
        }
        match ola::connect_with_config(config.clone()) {
            Ok(client) => return Ok(Box::new(RealOlaClient { client })),
            Err(e) => debug!(err = %e, attempt, "Error connecting to OLA, trying again."),
        }
    }
    Err(TransportError::Connect(format!(
        "no OLA daemon answered on port {} after {} attempts",
        port, CONNECT_ATTEMPTS
    )))
}

/// DmxMessage is a message that can be passed around between senders and receivers.
struct DmxMessage {
    universe: u32,
    buffer: DmxBuffer,
}

/// Sends output universes to OLA. The sends happen on a dedicated thread so
/// a slow daemon never holds up the mixing loop; pacing comes from a clock.
pub struct OlaTransport {
    clock: ClockTransport,
    universes: Vec<UniverseSpec>,
    sender: Mutex<Option<Sender<DmxMessage>>>,
    client_handle: Mutex<Option<JoinHandle<()>>>,
}

impl OlaTransport {
    pub fn new(
        universes: Vec<UniverseSpec>,
        period: Duration,
        client: Box<dyn OlaClient>,
    ) -> Result<OlaTransport, TransportError> {
        let (sender, receiver) = crossbeam_channel::unbounded::<DmxMessage>();
        let client_handle = thread::Builder::new()
            .name("glint-ola".into())
            .spawn(move || Self::ola_thread(client, receiver))
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        info!(universes = universes.len(), "Started OLA transport.");
        Ok(OlaTransport {
            clock: ClockTransport::new(universes.clone(), period),
            universes,
            sender: Mutex::new(Some(sender)),
            client_handle: Mutex::new(Some(client_handle)),
        })
    }

    /// Sends messages to OLA.
    fn ola_thread(mut client: Box<dyn OlaClient>, receiver: Receiver<DmxMessage>) {
        while let Ok(message) = receiver.recv() {
            if let Err(err) = client.send_dmx(message.universe, &message.buffer) {
                error!(universe = message.universe, err = %err, "Error sending DMX to OLA.");
            }
        }
    }
}

impl Transport for OlaTransport {
    fn n_universes(&self) -> usize {
        self.universes.len()
    }

    fn universe_type(&self, universe: usize) -> UniverseType {
        self.clock.universe_type(universe)
    }

    fn input_mapping(&self, universe: usize) -> Option<InputMapping> {
        self.clock.input_mapping(universe)
    }

    fn wait_for_next_sync(&self) -> bool {
        self.clock.wait_for_next_sync()
    }

    fn abort(&self) {
        self.clock.abort();
    }

    fn set_output_values(&self, universe: usize, values: &[u8]) -> Result<(), TransportError> {
        let spec = self
            .universes
            .get(universe)
            .ok_or(TransportError::UnknownUniverse(universe))?;
        let mut buffer = DmxBuffer::new();
        for (channel, value) in values.iter().enumerate() {
            buffer.set_channel(channel, *value);
        }
        let sender = self.sender.lock();
        let sender = sender.as_ref().ok_or_else(|| TransportError::Send {
            universe: spec.ola_universe,
            message: "transport is closed".into(),
        })?;
        sender
            .send(DmxMessage {
                universe: spec.ola_universe,
                buffer,
            })
            .map_err(|e| TransportError::Send {
                universe: spec.ola_universe,
                message: e.to_string(),
            })
    }

    /// OLA's streaming client can't receive, so inputs only ever hold what
    /// the clock was fed.
    fn input_values(&self, universe: usize, values: &mut [u8]) {
        self.clock.input_values(universe, values);
    }

    fn close(&self) {
        // Dropping the sender ends the OLA thread.
        self.sender.lock().take();
        if let Some(handle) = self.client_handle.lock().take() {
            if handle.join().is_err() {
                error!("Error joining OLA thread");
            }
        }
    }
}

impl Drop for OlaTransport {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    #[derive(Debug, Clone)]
    pub struct DmxMessage {
        pub universe: u32,
        pub buffer: DmxBuffer,
    }

    /// Mock OLA client for testing
    #[derive(Clone, Default)]
    pub struct MockOlaClient {
        pub sent_messages: Arc<Mutex<Vec<DmxMessage>>>,
        pub should_fail: bool,
    }

    impl MockOlaClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// Get the number of messages sent
        pub fn message_count(&self) -> usize {
            self.sent_messages.lock().len()
        }

        /// Get the DMX buffer for a specific universe from the last message
        pub fn get_buffer_for_universe(&self, universe: u32) -> Option<DmxBuffer> {
            self.sent_messages
                .lock()
                .iter()
                .rev()
                .find(|msg| msg.universe == universe)
                .map(|msg| msg.buffer.clone())
        }
    }

    impl OlaClient for MockOlaClient {
        fn send_dmx(&mut self, universe: u32, buffer: &DmxBuffer) -> Result<(), Box<dyn Error>> {
            if self.should_fail {
                return Err("Mock OLA client failure".into());
            }
            self.sent_messages.lock().push(DmxMessage {
                universe,
                buffer: buffer.clone(),
            });
            Ok(())
        }
    }
}
