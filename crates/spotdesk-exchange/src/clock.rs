//! Local clock and server time offset.
//!
//! Signed requests carry a timestamp that the exchange checks against its own
//! clock. [`TimeOffset`] keeps the last measured difference and applies it to
//! every timestamp the client produces.

use std::sync::atomic::{AtomicI64, Ordering};

/// Trait for obtaining current time, enabling testability.
pub trait Clock: Send + Sync {
    /// Returns current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> i64;
}

/// System clock implementation using real time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

/// Server time offset shared by every signed request of one client.
///
/// # Offset Convention
/// `offset_ms = server_time - local_time`
/// - Positive: server clock is ahead of local
/// - Negative: server clock is behind local
///
/// Concurrent syncs overwrite each other; the last measurement wins.
pub struct TimeOffset<C: Clock> {
    /// Offset: server_time - local_time (positive = server ahead).
    offset_ms: AtomicI64,
    /// Last sync timestamp in local time (0 = never synced).
    last_sync_ms: AtomicI64,
    /// Clock source for current time.
    clock: C,
}

impl<C: Clock> TimeOffset<C> {
    /// Offsets above this are logged as suspicious drift.
    pub const DRIFT_WARN_THRESHOLD_MS: i64 = 1000;

    /// Creates an unsynced offset (zero) over the given clock.
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self {
            offset_ms: AtomicI64::new(0),
            last_sync_ms: AtomicI64::new(0),
            clock,
        }
    }

    /// Current local time from the underlying clock.
    #[must_use]
    pub fn local_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Timestamp to put on a signed request: `local_time + offset`.
    #[must_use]
    pub fn timestamp_ms(&self) -> i64 {
        self.clock
            .now_ms()
            .saturating_add(self.offset_ms.load(Ordering::Acquire))
    }

    /// Records a server time reading and returns the new offset.
    pub fn record_server_time(&self, server_time_ms: i64) -> i64 {
        let local_time = self.clock.now_ms();
        let offset = server_time_ms.saturating_sub(local_time);

        if offset.abs() > Self::DRIFT_WARN_THRESHOLD_MS {
            tracing::warn!(
                offset_ms = offset,
                "significant time drift detected with exchange server"
            );
        }

        self.offset_ms.store(offset, Ordering::Release);
        self.last_sync_ms.store(local_time, Ordering::Release);
        offset
    }

    /// Returns the current server offset in milliseconds.
    #[must_use]
    pub fn offset_ms(&self) -> i64 {
        self.offset_ms.load(Ordering::Acquire)
    }

    /// Returns the last sync timestamp in local time, or `None` before the first sync.
    #[must_use]
    pub fn last_sync_ms(&self) -> Option<i64> {
        match self.last_sync_ms.load(Ordering::Acquire) {
            0 => None,
            ts => Some(ts),
        }
    }
}

impl<C: Clock> std::fmt::Debug for TimeOffset<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeOffset")
            .field("offset_ms", &self.offset_ms())
            .field("last_sync_ms", &self.last_sync_ms())
            .finish()
    }
}

impl TimeOffset<SystemClock> {
    /// Creates a `TimeOffset` over the system clock.
    #[must_use]
    pub fn with_system_clock() -> Self {
        Self::new(SystemClock)
    }
}

/// Clock with a manually controlled time, for tests and offline tooling.
#[derive(Debug, Default)]
pub struct ManualClock {
    time_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(initial_ms: i64) -> Self {
        Self {
            time_ms: AtomicI64::new(initial_ms),
        }
    }

    pub fn set(&self, time_ms: i64) {
        self.time_ms.store(time_ms, Ordering::Release);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.time_ms.fetch_add(delta_ms, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.time_ms.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    const BASE_TIME: i64 = 1_700_000_000_000; // ~2023-11-14

    #[test]
    fn test_unsynced_timestamp_is_local_time() {
        let offset = TimeOffset::new(ManualClock::new(BASE_TIME));
        assert_eq!(offset.timestamp_ms(), BASE_TIME);
        assert_eq!(offset.offset_ms(), 0);
        assert_eq!(offset.last_sync_ms(), None);
    }

    #[test]
    fn test_server_ahead_positive_offset() {
        let offset = TimeOffset::new(ManualClock::new(BASE_TIME));

        assert_eq!(offset.record_server_time(BASE_TIME + 500), 500);
        assert_eq!(offset.timestamp_ms(), BASE_TIME + 500);
        assert_eq!(offset.last_sync_ms(), Some(BASE_TIME));
    }

    #[test]
    fn test_server_behind_negative_offset() {
        let offset = TimeOffset::new(ManualClock::new(BASE_TIME));

        assert_eq!(offset.record_server_time(BASE_TIME - 2500), -2500);
        assert_eq!(offset.timestamp_ms(), BASE_TIME - 2500);
    }

    #[test]
    fn test_offset_tracks_clock_movement() {
        let clock = Arc::new(ManualClock::new(BASE_TIME));
        let offset = TimeOffset::new(Arc::clone(&clock));
        offset.record_server_time(BASE_TIME + 100);

        clock.advance(5_000);
        assert_eq!(offset.timestamp_ms(), BASE_TIME + 5_100);
    }

    #[test]
    fn test_resync_replaces_previous_offset() {
        let clock = Arc::new(ManualClock::new(BASE_TIME));
        let offset = TimeOffset::new(Arc::clone(&clock));

        offset.record_server_time(BASE_TIME + 3_000);
        clock.set(BASE_TIME + 10_000);
        offset.record_server_time(BASE_TIME + 9_000);

        assert_eq!(offset.offset_ms(), -1_000);
        assert_eq!(offset.last_sync_ms(), Some(BASE_TIME + 10_000));
    }

    #[test]
    fn test_large_drift_is_accepted() {
        // Drift is only logged; the offset is always applied.
        let offset = TimeOffset::new(ManualClock::new(BASE_TIME));
        assert_eq!(offset.record_server_time(BASE_TIME + 60_000), 60_000);
    }
}
