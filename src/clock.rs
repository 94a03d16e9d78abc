//! Time source abstraction.
//!
//! Every stateful component takes an `Arc<dyn Clock>` so tests can drive
//! time explicitly with [`ManualClock`](crate::testing::ManualClock).

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};

/// A source of monotonic and wall-clock time.
pub trait Clock: Debug + Send + Sync {
    /// Returns the current monotonic instant.
    fn now(&self) -> Instant;

    /// Returns the current wall-clock time, used for diagnostics only.
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// The default clock.
///
/// Reads tokio's clock, so paused-time tests (`start_paused = true`) see the
/// same instants as the backoff timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

/// Returns a shared handle to the [`SystemClock`].
pub fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}
