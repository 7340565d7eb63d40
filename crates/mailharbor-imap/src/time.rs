//! Time abstraction for testability.
//!
//! A `Clock` trait abstracts over time so that IDLE refresh intervals and
//! timeout logic can be tested deterministically with a manually advanced
//! clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Abstraction over time.
///
/// Production code uses [`SystemClock`]; tests use [`MockClock`].
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;

    /// Returns the elapsed time since the given instant.
    fn elapsed(&self, since: Instant) -> Duration {
        self.now().duration_since(since)
    }

    /// Checks whether a duration has elapsed since the given instant.
    fn has_elapsed(&self, since: Instant, duration: Duration) -> bool {
        self.elapsed(since) >= duration
    }
}

/// System clock that uses real time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A mock clock for testing time-dependent code.
///
/// The clock starts at a base instant and only moves when advanced.
#[derive(Debug)]
pub struct MockClock {
    base: Instant,
    offset_nanos: AtomicU64,
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClock {
    /// Creates a new mock clock anchored at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_nanos: AtomicU64::new(0),
        }
    }

    /// Advances the clock by the given duration.
    pub fn advance(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_advances() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn mock_clock_is_frozen_until_advanced() {
        let clock = MockClock::new();
        let start = clock.now();
        assert_eq!(clock.elapsed(start), Duration::ZERO);

        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.elapsed(start), Duration::from_secs(5));
        assert!(clock.has_elapsed(start, Duration::from_secs(5)));
        assert!(!clock.has_elapsed(start, Duration::from_secs(6)));
    }
}
