//! Circuit breaker configuration for stopping repeated faults.
//!
//! Retry handles a failure that clears up within a few hundred
//! milliseconds. The circuit breaker handles the case where it does not:
//! after enough failures it stops calling the load operation at all and
//! periodically lets a single probe through.
//!
//! ## States
//!
//! - **Closed**: Normal operation, calls flow through
//! - **Open**: Calls fail immediately (circuit tripped)
//! - **HalfOpen**: A probe is testing whether the source recovered
//!
//! ## Example
//!
//! ```rust
//! use provider_config::CircuitBreakerConfig;
//! use std::time::Duration;
//!
//! let config = CircuitBreakerConfig::builder()
//!     .failure_threshold(3)                       // Open after 3 failures
//!     .success_threshold(1)                       // Close after 1 probe success
//!     .recovery_timeout(Duration::from_secs(10))  // Probe after 10s
//!     .build();
//! ```

use std::time::{Duration, Instant};

/// Circuit breaker configuration.
#[derive(Debug, Clone, bon::Builder)]
pub struct CircuitBreakerConfig {
    /// Number of failures within the monitoring window that opens the circuit.
    #[builder(default = 5)]
    failure_threshold: u32,

    /// Number of successes in half-open state to close the circuit.
    #[builder(default = 2)]
    success_threshold: u32,

    /// Duration to wait before transitioning from open to half-open.
    #[builder(default = Duration::from_millis(60_000))]
    recovery_timeout: Duration,

    /// A failure further than this from the previous one restarts the count.
    #[builder(default = Duration::from_millis(60_000))]
    monitoring_window: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CircuitBreakerConfig {
    /// Returns the failure threshold.
    pub fn get_failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    /// Returns the success threshold.
    pub fn get_success_threshold(&self) -> u32 {
        self.success_threshold
    }

    /// Returns the recovery timeout.
    pub fn get_recovery_timeout(&self) -> Duration {
        self.recovery_timeout
    }

    /// Returns the monitoring window.
    pub fn get_monitoring_window(&self) -> Duration {
        self.monitoring_window
    }
}

/// Current state of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CircuitState {
    /// Normal operation, calls flow through.
    #[default]
    Closed,
    /// Calls fail immediately (circuit tripped).
    Open,
    /// Testing if the source has recovered.
    HalfOpen,
}

impl CircuitState {
    /// Returns `true` if the circuit is closed (normal operation).
    pub fn is_closed(&self) -> bool {
        matches!(self, CircuitState::Closed)
    }

    /// Returns `true` if the circuit is open (blocking calls).
    pub fn is_open(&self) -> bool {
        matches!(self, CircuitState::Open)
    }

    /// Returns `true` if the circuit is half-open (testing recovery).
    pub fn is_half_open(&self) -> bool {
        matches!(self, CircuitState::HalfOpen)
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Point-in-time view of a circuit breaker.
///
/// Use this for monitoring and alerting on circuit breaker state.
#[derive(Debug, Clone, Default)]
pub struct CircuitStats {
    /// Current state of the circuit.
    pub state: CircuitState,
    /// Failures counted in the current monitoring window.
    pub failure_count: u32,
    /// Consecutive successes (in half-open state).
    pub success_count: u32,
    /// Time of the most recent failure.
    pub last_failure_time: Option<Instant>,
    /// Earliest time an open circuit admits a probe.
    pub next_attempt_time: Option<Instant>,
}

impl CircuitStats {
    /// Returns the current state.
    pub fn current_state(&self) -> CircuitState {
        self.state
    }

    /// Returns the failure count.
    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    /// Returns the success count.
    pub fn success_count(&self) -> u32 {
        self.success_count
    }
}
