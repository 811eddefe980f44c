//! Time sources for the predicate waiter.
//!
//! The waiter never reads wall time directly; it goes through a
//! [`TimeSource`] so tests can drive a simulated clock deterministically.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Clock abstraction: current time in milliseconds plus a sleep primitive.
pub trait TimeSource: Send + Sync {
    fn now_millis(&self) -> u64;

    fn sleep(&self, duration: Duration);
}

/// Real-time clock backed by the OS.
#[derive(Debug, Default, Clone, Copy)]
pub struct WallClock;

impl TimeSource for WallClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Simulated clock.
///
/// `sleep` advances the clock by the requested duration without blocking and
/// yields the OS thread, so background work (e.g. scheduled elections) can
/// interleave with a polling loop. Clones share the same underlying counter.
#[derive(Debug, Clone, Default)]
pub struct SimTimeSource {
    now_ms: Arc<AtomicU64>,
}

impl SimTimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_millis(ms: u64) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(ms)),
        }
    }

    /// Advance the clock without sleeping.
    pub fn advance_ms(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl TimeSource for SimTimeSource {
    fn now_millis(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn sleep(&self, duration: Duration) {
        self.now_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
        std::thread::yield_now();
    }
}
