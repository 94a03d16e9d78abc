//! A clock that only moves when told to.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::clock::Clock;

/// A manually driven [`Clock`] for deterministic tests.
///
/// ## Example
///
/// ```rust
/// use provider_config::clock::Clock;
/// use provider_config::testing::ManualClock;
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_secs(90));
/// assert_eq!(clock.now() - start, Duration::from_secs(90));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    start_utc: DateTime<Utc>,
    offset: Mutex<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        Self { start: Instant::now(), start_utc: Utc::now(), offset: Mutex::new(Duration::ZERO) }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }

    /// Returns how far the clock has been advanced.
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        let offset =
            chrono::Duration::from_std(*self.offset.lock()).unwrap_or(chrono::Duration::MAX);
        self.start_utc.checked_add_signed(offset).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
