// src/gps/pps.rs
//! Pulse-per-second mailbox

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Single-slot mailbox carrying the timestamp of the most recent
/// pulse-per-second edge.
///
/// The producer side (an interrupt handler, a DCD line watcher, or a test)
/// calls [`PpsSignal::mark`] with the monotonic millisecond timestamp of the
/// edge. The driver consumes the pulse in its date/time query; consuming
/// clears the slot, so one pulse can be used at most once. A stored value of
/// zero means "no pending pulse", which is also why timestamps are expected
/// to come from a clock that has already ticked past zero.
///
/// Clones share the same slot. This is the only piece of driver state touched
/// from outside the polling thread, so it is the only place that needs
/// atomics.
#[derive(Debug, Clone, Default)]
pub struct PpsSignal {
    stamp_ms: Arc<AtomicU64>,
}

impl PpsSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pulse edge observed at `now_ms`. An unconsumed previous pulse
    /// is overwritten; the mailbox never queues.
    pub fn mark(&self, now_ms: u64) {
        self.stamp_ms.store(now_ms, Ordering::Release);
    }

    /// Consume the pending pulse, if any. Reading clears the slot.
    pub fn take(&self) -> Option<u64> {
        match self.stamp_ms.swap(0, Ordering::AcqRel) {
            0 => None,
            stamp => Some(stamp),
        }
    }

    /// True when a pulse is waiting to be consumed.
    pub fn is_pending(&self) -> bool {
        self.stamp_ms.load(Ordering::Acquire) != 0
    }
}
