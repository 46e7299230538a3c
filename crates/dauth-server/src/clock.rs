// drawbridge-rs - HTTP Digest Access Authentication
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::time::Instant;

/// Monotonic millisecond clock.
///
/// Nonce timestamps only embed the low 48 bits, so the origin is
/// irrelevant as long as the counter never jumps backwards.
pub trait Clock: Send + Sync {
    fn monotonic_ms(&self) -> u64;
}

/// Default clock: milliseconds since the authority was created.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn monotonic_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.monotonic_ms();
        let second = clock.monotonic_ms();
        assert!(second >= first);
    }
}
