//! Retry configuration for transient failures.

use std::time::Duration;

/// Configuration for retrying a load operation.
///
/// Delays grow exponentially with symmetric jitter:
///
/// ```text
/// delay(n) = min(base_delay * multiplier^(n-1) + U(-jitter/2, +jitter/2), max_delay)
/// ```
///
/// ## Default Values
///
/// - `max_attempts`: 3 (including the first call)
/// - `base_delay`: 1s
/// - `max_delay`: 10s
/// - `multiplier`: 2.0
/// - `jitter`: 100ms
///
/// ## Example
///
/// ```rust
/// use provider_config::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::new()
///     .with_max_attempts(5)
///     .with_base_delay(Duration::from_millis(200))
///     .with_max_delay(Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of calls, including the first one.
    pub max_attempts: u32,

    /// Delay before the first retry.
    pub base_delay: Duration,

    /// Upper bound on any single delay.
    pub max_delay: Duration,

    /// Multiplier for exponential backoff.
    pub multiplier: f64,

    /// Width of the uniform jitter window centred on the computed delay.
    pub jitter: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            multiplier: 2.0,
            jitter: Duration::from_millis(100),
        }
    }
}

impl RetryConfig {
    /// Creates a new retry configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that makes exactly one call.
    pub fn disabled() -> Self {
        Self { max_attempts: 1, ..Default::default() }
    }

    /// Sets the maximum number of calls. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the delay before the first retry.
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Sets the maximum delay between retries.
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the exponential backoff multiplier.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Sets the jitter window.
    #[must_use]
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Calculates the delay after the given failed attempt (1-based).
    ///
    /// Attempt 0 has no delay. The result never exceeds `max_delay` and is
    /// never negative.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let base = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);

        let jitter_window = self.jitter.as_secs_f64();
        let jittered = if jitter_window > 0.0 {
            base + (fastrand::f64() - 0.5) * jitter_window
        } else {
            base
        };

        let capped = jittered.min(self.max_delay.as_secs_f64()).max(0.0);
        if capped.is_finite() { Duration::from_secs_f64(capped) } else { self.max_delay }
    }

    /// Returns `true` if more than one attempt is allowed.
    pub fn is_enabled(&self) -> bool {
        self.max_attempts > 1
    }
}
