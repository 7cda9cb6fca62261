//! Startup duration: monotonic time from session creation to "app ready".

use std::sync::OnceLock;

use crate::clock::Clock;

pub const STARTUP_TIME: &str = "startupTimeMs";

pub struct StartupTracker {
    origin_ms: u64,
    ready_ms: OnceLock<u64>,
}

impl StartupTracker {
    /// Start measuring from the clock's current reading.
    pub fn start(clock: &dyn Clock) -> Self {
        Self {
            origin_ms: clock.monotonic_ms(),
            ready_ms: OnceLock::new(),
        }
    }

    /// Returns the startup duration on the first call only.
    pub fn mark_ready(&self, clock: &dyn Clock) -> Option<u64> {
        let elapsed = clock.monotonic_ms().saturating_sub(self.origin_ms);
        let mut first = false;
        self.ready_ms.get_or_init(|| {
            first = true;
            elapsed
        });
        first.then_some(elapsed)
    }

    pub fn startup_ms(&self) -> Option<u64> {
        self.ready_ms.get().copied()
    }
}
