//! Cancellation notification contract.
//!
//! The backend has no opinion on what a cancellation means for the program:
//! it hands a [`CancellationEvent`] to the host-supplied handler and moves on.
//! Two stock handlers are provided for hosts and tests that just want to
//! observe events.

use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::precision::PrecisionKind;

/// A single detected cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationEvent {
    /// Precision of the operation that triggered the event.
    pub precision: PrecisionKind,
    /// Estimated number of significant bits lost.
    pub cancelled_bits: i32,
}

/// Receiver of cancellation events.
///
/// Called synchronously on the thread performing the arithmetic, possibly
/// from several threads at once. An implementation may abort the process.
pub trait CancellationHandler: Send + Sync {
    /// Invoked once per operation whose cancellation meets the threshold.
    fn on_cancellation(&self, event: CancellationEvent);
}

impl<F> CancellationHandler for F
where
    F: Fn(CancellationEvent) + Send + Sync,
{
    fn on_cancellation(&self, event: CancellationEvent) {
        self(event);
    }
}

/// Handler that keeps every event it receives.
#[derive(Debug, Default)]
pub struct CancellationRecorder {
    events: Mutex<Vec<CancellationEvent>>,
}

impl CancellationRecorder {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far, in arrival order.
    #[must_use]
    pub fn events(&self) -> Vec<CancellationEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drop all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl CancellationHandler for CancellationRecorder {
    fn on_cancellation(&self, event: CancellationEvent) {
        self.events.lock().push(event);
    }
}

/// Lock-free per-precision counters.
#[derive(Debug)]
pub struct CancellationStats {
    count_b32: AtomicU64,
    count_b64: AtomicU64,
    max_bits_b32: AtomicI32,
    max_bits_b64: AtomicI32,
}

/// Point-in-time view of [`CancellationStats`] for one precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecisionSummary {
    /// Which precision this summary covers.
    pub precision: PrecisionKind,
    /// Number of events observed.
    pub events: u64,
    /// Largest cancelled-bit count observed, `None` when no events.
    pub max_cancelled_bits: Option<i32>,
}

impl Default for CancellationStats {
    fn default() -> Self {
        Self {
            count_b32: AtomicU64::new(0),
            count_b64: AtomicU64::new(0),
            max_bits_b32: AtomicI32::new(i32::MIN),
            max_bits_b64: AtomicI32::new(i32::MIN),
        }
    }
}

impl CancellationStats {
    /// Create zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self, precision: PrecisionKind) -> (&AtomicU64, &AtomicI32) {
        match precision {
            PrecisionKind::Binary32 => (&self.count_b32, &self.max_bits_b32),
            PrecisionKind::Binary64 => (&self.count_b64, &self.max_bits_b64),
        }
    }

    /// Summary for one precision.
    #[must_use]
    pub fn summary(&self, precision: PrecisionKind) -> PrecisionSummary {
        let (count, max_bits) = self.slots(precision);
        let events = count.load(Ordering::Relaxed);
        let max = max_bits.load(Ordering::Relaxed);
        PrecisionSummary {
            precision,
            events,
            max_cancelled_bits: (events > 0).then_some(max),
        }
    }

    /// Total events across both precisions.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.count_b32.load(Ordering::Relaxed) + self.count_b64.load(Ordering::Relaxed)
    }
}

impl CancellationHandler for CancellationStats {
    fn on_cancellation(&self, event: CancellationEvent) {
        let (count, max_bits) = self.slots(event.precision);
        count.fetch_add(1, Ordering::Relaxed);
        max_bits.fetch_max(event.cancelled_bits, Ordering::Relaxed);
    }
}
