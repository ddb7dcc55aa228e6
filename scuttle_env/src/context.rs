//! Clock abstraction used by feed stores to timestamp records.

/// Source of record timestamps.
///
/// # Implementations
///
/// - **Production**: `SystemClock` - wall-clock milliseconds
/// - **Simulation**: `VirtualClock` (in `scuttle_sim`) - fixed epoch plus a
///   deterministic step per call
///
/// # Monotonicity
///
/// Every call must return a value strictly greater than every value
/// previously returned by the same clock. Feeds rely on this to keep
/// timestamps ordered with sequence numbers.
pub trait LogClock: Send + Sync + 'static {
    /// Returns the next timestamp in milliseconds since the Unix epoch.
    fn timestamp(&self) -> u64;

    /// Returns true if timestamps are reproducible across runs.
    ///
    /// Wall clocks return false; virtual clocks return true.
    fn is_deterministic(&self) -> bool;
}
