//! Clock collaborators.
//!
//! Durations are always taken from the monotonic side; the wall clock is only
//! used to stamp snapshots and name files.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

pub trait Clock: Send + Sync {
    /// Milliseconds since an arbitrary fixed origin. Never decreases.
    fn monotonic_ms(&self) -> u64;
    /// Wall-clock epoch milliseconds.
    fn epoch_millis(&self) -> i64;
}

/// `Instant` + `SystemTime` backed clock.
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
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn epoch_millis(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => i64::try_from(d.as_millis()).unwrap_or(i64::MAX),
            // clock set before 1970
            Err(_) => 0,
        }
    }
}

/// Hand-driven clock for tests and replay tooling.
#[derive(Default)]
pub struct ManualClock {
    mono: AtomicU64,
    wall: AtomicI64,
}

impl ManualClock {
    pub fn new(epoch_millis: i64) -> Self {
        Self {
            mono: AtomicU64::new(0),
            wall: AtomicI64::new(epoch_millis),
        }
    }

    /// Advance both the monotonic and the wall clock.
    pub fn advance(&self, ms: u64) {
        self.mono.fetch_add(ms, Ordering::SeqCst);
        self.wall
            .fetch_add(i64::try_from(ms).unwrap_or(i64::MAX), Ordering::SeqCst);
    }

    /// Move only the wall clock, as an NTP correction would.
    pub fn set_epoch_millis(&self, epoch_millis: i64) {
        self.wall.store(epoch_millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn monotonic_ms(&self) -> u64 {
        self.mono.load(Ordering::SeqCst)
    }

    fn epoch_millis(&self) -> i64 {
        self.wall.load(Ordering::SeqCst)
    }
}
