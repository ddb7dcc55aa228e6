//! Virtual clock implementing LogClock for reproducible timestamps.

use scuttle_env::LogClock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 2024-01-01 00:00:00 UTC in milliseconds.
pub const DEFAULT_EPOCH_MS: u64 = 1_704_067_200_000;

/// Deterministic clock: the epoch, then one fixed step per timestamp.
///
/// Clones share the same counter, so a clock handed to a store and kept by
/// the runner stay in step.
#[derive(Debug, Clone)]
pub struct VirtualClock {
    /// First timestamp handed out
    epoch_ms: u64,

    /// Distance between consecutive timestamps
    step_ms: u64,

    /// Timestamps handed out so far
    ticks: Arc<AtomicU64>,
}

impl VirtualClock {
    /// Creates a clock starting at [`DEFAULT_EPOCH_MS`] with 1 ms steps.
    pub fn new() -> Self {
        Self::with_epoch(DEFAULT_EPOCH_MS, 1)
    }

    pub fn with_epoch(epoch_ms: u64, step_ms: u64) -> Self {
        Self {
            epoch_ms,
            step_ms: step_ms.max(1),
            ticks: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates an Arc-wrapped clock for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Timestamps handed out so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// The timestamp the next call returns, without consuming it.
    pub fn peek(&self) -> u64 {
        self.epoch_ms + self.ticks() * self.step_ms
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl LogClock for VirtualClock {
    fn timestamp(&self) -> u64 {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.epoch_ms + tick * self.step_ms
    }

    fn is_deterministic(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_clock_steps() {
        let clock = VirtualClock::with_epoch(1_000, 10);
        assert_eq!(clock.peek(), 1_000);
        assert_eq!(clock.timestamp(), 1_000);
        assert_eq!(clock.timestamp(), 1_010);
        assert_eq!(clock.ticks(), 2);
        assert!(clock.is_deterministic());
    }

    #[test]
    fn test_virtual_clock_clone_shares_time() {
        let clock1 = VirtualClock::new();
        let clock2 = clock1.clone();

        clock1.timestamp();
        clock1.timestamp();

        // Both should see the same time
        assert_eq!(clock1.peek(), clock2.peek());
        assert_eq!(clock2.timestamp(), DEFAULT_EPOCH_MS + 2);
    }

    #[test]
    fn test_zero_step_still_increases() {
        let clock = VirtualClock::with_epoch(0, 0);
        let a = clock.timestamp();
        let b = clock.timestamp();
        assert!(b > a);
    }
}
