//! Production implementation of LogClock using the system clock.

use crate::LogClock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock timestamps, forced strictly increasing.
///
/// Two appends within the same millisecond get consecutive values, the same
/// way monotonic timestamp sources behave.
pub struct SystemClock {
    /// Last value handed out
    last: AtomicU64,
}

impl SystemClock {
    /// Creates a new SystemClock.
    pub fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Creates an Arc-wrapped clock for sharing with a store.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn wall_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl LogClock for SystemClock {
    fn timestamp(&self) -> u64 {
        let now = Self::wall_ms();
        let mut prev = self.last.load(Ordering::SeqCst);
        loop {
            let next = now.max(prev + 1);
            match self
                .last
                .compare_exchange(prev, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }

    fn is_deterministic(&self) -> bool {
        false
    }
}
