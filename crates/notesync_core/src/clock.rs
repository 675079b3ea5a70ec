//! Time sources for the sync engine.
//!
//! # Responsibility
//! - Provide a monotonic instant for debounce deadlines.
//! - Provide wall-clock epoch milliseconds for temp ids and cache timestamps.
//!
//! # Invariants
//! - `ManualClock` only moves when advanced explicitly.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Abstract time source.
pub trait Clock {
    /// Monotonic reading used for quiet-window deadlines.
    fn now(&self) -> Instant;
    /// Wall-clock reading in epoch milliseconds.
    fn epoch_ms(&self) -> i64;
}

/// Clock handle shared between the session and file-backed services.
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// Process clock backed by `Instant` and `SystemTime`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

/// Clock that only advances when told to.
///
/// Both readings move together, so a test can step past a debounce window
/// and a cache expiry with the same call.
#[derive(Debug)]
pub struct ManualClock {
    base_instant: Instant,
    base_epoch_ms: i64,
    offset_ms: AtomicI64,
}

impl ManualClock {
    /// Creates a clock reading `epoch_ms` on the wall-clock side.
    pub fn new(epoch_ms: i64) -> Self {
        Self {
            base_instant: Instant::now(),
            base_epoch_ms: epoch_ms,
            offset_ms: AtomicI64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        let millis = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.offset_ms.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    fn offset(&self) -> i64 {
        self.offset_ms.load(Ordering::SeqCst)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = u64::try_from(self.offset()).unwrap_or(0);
        self.base_instant + Duration::from_millis(offset)
    }

    fn epoch_ms(&self) -> i64 {
        self.base_epoch_ms.saturating_add(self.offset())
    }
}
