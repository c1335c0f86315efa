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
use thread_priority::{set_current_thread_priority, ThreadPriority, ThreadPriorityValue};
use tracing::{info, warn};

/// The environment variable that overrides the mixing thread's priority.
pub const PRIORITY_ENV: &str = "GLINT_THREAD_PRIORITY";

/// Parses a priority in 0..=99.
fn parse_priority(value: &str) -> Option<ThreadPriorityValue> {
    let n = value.trim().parse::<u8>().ok()?;
    (n < 100).then(|| ThreadPriorityValue::try_from(n).ok())?
}

/// Picks the mixing thread's priority: GLINT_THREAD_PRIORITY (0-99) wins over
/// the configured value. `None` leaves the OS default alone.
pub fn mix_thread_priority(configured: Option<u8>) -> Option<ThreadPriorityValue> {
    std::env::var(PRIORITY_ENV)
        .ok()
        .and_then(|v| parse_priority(&v))
        .or_else(|| configured.and_then(|n| ThreadPriorityValue::try_from(n).ok()))
}

/// Raises the current thread's priority. Failure is logged and otherwise
/// ignored; the engine runs at normal priority.
pub fn configure_mix_thread_priority(priority: Option<ThreadPriorityValue>) {
    let Some(priority) = priority else {
        return;
    };
    match set_current_thread_priority(ThreadPriority::Crossplatform(priority)) {
        Ok(()) => info!(priority = u8::from(priority), "Raised mixing thread priority"),
        Err(e) => warn!(err = ?e, "Failed to raise mixing thread priority"),
    }
}
