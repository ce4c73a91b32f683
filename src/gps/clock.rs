// src/gps/clock.rs
//! Monotonic time sources for age and deadline tracking

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Instant;

/// Monotonic millisecond clock shared by the driver and its decoder.
///
/// All ages and deadlines in the driver are measured against this clock,
/// so swapping in [`ManualClock`] makes staleness behavior fully
/// deterministic in tests.
pub trait Clock: Clone + Send {
    /// Milliseconds since the clock's epoch (process start for the
    /// production clock).
    fn now_ms(&self) -> u64;

    /// Elapsed milliseconds since a reference point, saturating at zero.
    fn elapsed_since(&self, earlier_ms: u64) -> u64 {
        self.now_ms().saturating_sub(earlier_ms)
    }
}

/// Production clock backed by `std::time::Instant`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

/// Controllable clock for tests. Clones share the same underlying time,
/// so a decoder and the driver that owns it always agree on "now".
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current time to an absolute value.
    pub fn set(&self, ms: u64) {
        self.now_ms.store(ms, Ordering::Release);
    }

    /// Advance the current time.
    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::Acquire)
    }
}
