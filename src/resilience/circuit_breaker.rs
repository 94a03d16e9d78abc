//! Circuit breaker state machine.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::Error;
use crate::clock::{Clock, system_clock};
use crate::config::{CircuitBreakerConfig, CircuitState, CircuitStats};

#[derive(Debug, Default)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    last_failure_time: Option<Instant>,
    next_attempt_time: Option<Instant>,
    probe_in_flight: bool,
    /// Bumped on every open, close and reset.
    generation: u64,
}

#[derive(Debug)]
struct BreakerInner {
    name: String,
    config: CircuitBreakerConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<BreakerState>,
}

/// Stops invoking a failing operation and periodically probes for recovery.
///
/// ```text
///            failures >= threshold
///  Closed ─────────────────────────▶ Open
///    ▲                                │ recovery_timeout elapsed
///    │ successes >= threshold         ▼
///    └──────────────────────────── HalfOpen ──failure──▶ Open
/// ```
///
/// Only one probe runs at a time while half-open; concurrent calls are
/// rejected until it settles. A probe whose future is dropped before it
/// completes frees the slot for the next caller. The outcome of a call only
/// counts against the circuit state it was admitted under, so a slow call
/// started before the circuit opened cannot close it.
///
/// Cloning yields another handle to the same state.
///
/// ## Example
///
/// ```rust
/// use provider_config::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
///
/// let breaker = CircuitBreaker::new(
///     "providers",
///     CircuitBreakerConfig::builder().failure_threshold(2).build(),
/// );
///
/// breaker.record_failure();
/// breaker.record_failure();
/// assert_eq!(breaker.state(), CircuitState::Open);
/// assert!(!breaker.can_proceed());
/// ```
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    inner: Arc<BreakerInner>,
}

impl CircuitBreaker {
    /// Creates a closed breaker using the system clock.
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self::with_clock(name, config, system_clock())
    }

    /// Creates a closed breaker using the given clock.
    pub fn with_clock(
        name: impl Into<String>,
        config: CircuitBreakerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(BreakerInner {
                name: name.into(),
                config,
                clock,
                state: Mutex::new(BreakerState::default()),
            }),
        }
    }

    /// Returns the breaker name used in logs and rejections.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.inner.config
    }

    /// Runs `operation` if the circuit admits it, recording the outcome.
    ///
    /// A rejected call returns a circuit-open error without running the
    /// operation.
    pub async fn call<T, F, Fut>(&self, operation: F) -> Result<T, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let permit = self.try_acquire()?;
        match operation().await {
            Ok(value) => {
                permit.complete(true);
                Ok(value)
            },
            Err(err) => {
                permit.complete(false);
                Err(err)
            },
        }
    }

    /// Returns `true` if a call made now would be admitted.
    ///
    /// Does not change state.
    pub fn can_proceed(&self) -> bool {
        let now = self.inner.clock.now();
        let state = self.inner.state.lock();
        match state.state {
            CircuitState::Closed => true,
            CircuitState::Open => state.next_attempt_time.is_none_or(|next| now >= next),
            CircuitState::HalfOpen => !state.probe_in_flight,
        }
    }

    /// Admits a call or returns the rejection.
    fn try_acquire(&self) -> Result<Permit<'_>, Error> {
        let now = self.inner.clock.now();
        let mut state = self.inner.state.lock();
        let generation = state.generation;
        match state.state {
            CircuitState::Closed => Ok(Permit::new(self, generation, false)),
            CircuitState::Open => match state.next_attempt_time {
                Some(next) if now < next => {
                    Err(Error::circuit_open(&self.inner.name, next.duration_since(now)))
                },
                _ => {
                    state.state = CircuitState::HalfOpen;
                    state.success_count = 0;
                    state.probe_in_flight = true;
                    tracing::info!(
                        component = "circuit_breaker",
                        name = %self.inner.name,
                        "circuit half-open, admitting probe"
                    );
                    Ok(Permit::new(self, generation, true))
                },
            },
            CircuitState::HalfOpen if state.probe_in_flight => Err(Error::circuit_open(
                &self.inner.name,
                std::time::Duration::ZERO,
            )),
            CircuitState::HalfOpen => {
                state.probe_in_flight = true;
                Ok(Permit::new(self, generation, true))
            },
        }
    }

    /// Applies the outcome of an admitted call.
    fn settle(&self, generation: u64, probe: bool, success: bool) {
        let now = self.inner.clock.now();
        let mut state = self.inner.state.lock();
        if state.generation != generation {
            tracing::debug!(
                component = "circuit_breaker",
                name = %self.inner.name,
                success,
                "ignoring outcome of a call admitted before the circuit changed"
            );
            return;
        }
        if probe {
            state.probe_in_flight = false;
        }
        if success {
            self.apply_success(&mut state);
        } else {
            self.apply_failure(&mut state, now);
        }
    }

    /// Frees the half-open slot held by a probe that never completed.
    fn abandon_probe(&self, generation: u64) {
        let mut state = self.inner.state.lock();
        if state.generation == generation && state.state == CircuitState::HalfOpen {
            state.probe_in_flight = false;
            tracing::debug!(
                component = "circuit_breaker",
                name = %self.inner.name,
                "probe cancelled before completion"
            );
        }
    }

    /// Records a successful call made outside [`call`](Self::call).
    pub fn record_success(&self) {
        let mut state = self.inner.state.lock();
        self.apply_success(&mut state);
    }

    fn apply_success(&self, state: &mut BreakerState) {
        match state.state {
            CircuitState::Closed => state.failure_count = 0,
            CircuitState::HalfOpen => {
                state.success_count += 1;
                if state.success_count >= self.inner.config.get_success_threshold() {
                    *state = BreakerState {
                        generation: state.generation + 1,
                        ..BreakerState::default()
                    };
                    tracing::info!(
                        component = "circuit_breaker",
                        name = %self.inner.name,
                        "circuit closed"
                    );
                }
            },
            CircuitState::Open => {},
        }
    }

    /// Records a failed call made outside [`call`](Self::call).
    pub fn record_failure(&self) {
        let now = self.inner.clock.now();
        let mut state = self.inner.state.lock();
        self.apply_failure(&mut state, now);
    }

    fn apply_failure(&self, state: &mut BreakerState, now: Instant) {
        match state.state {
            CircuitState::Closed => {
                let window = self.inner.config.get_monitoring_window();
                let restart = state
                    .last_failure_time
                    .is_some_and(|last| now.saturating_duration_since(last) > window);
                state.failure_count = if restart { 1 } else { state.failure_count + 1 };
                state.last_failure_time = Some(now);

                if state.failure_count >= self.inner.config.get_failure_threshold() {
                    self.open(state, now);
                }
            },
            CircuitState::HalfOpen => {
                state.last_failure_time = Some(now);
                self.open(state, now);
            },
            CircuitState::Open => state.last_failure_time = Some(now),
        }
    }

    fn open(&self, state: &mut BreakerState, now: Instant) {
        let timeout = self.inner.config.get_recovery_timeout();
        state.state = CircuitState::Open;
        state.success_count = 0;
        state.probe_in_flight = false;
        state.generation += 1;
        state.next_attempt_time = Some(now + timeout);
        tracing::warn!(
            component = "circuit_breaker",
            name = %self.inner.name,
            failures = state.failure_count,
            recovery_timeout_ms = timeout.as_millis() as u64,
            "circuit opened"
        );
    }

    /// Returns the current state.
    pub fn state(&self) -> CircuitState {
        self.inner.state.lock().state
    }

    /// Returns a snapshot of the breaker counters.
    pub fn stats(&self) -> CircuitStats {
        let state = self.inner.state.lock();
        CircuitStats {
            state: state.state,
            failure_count: state.failure_count,
            success_count: state.success_count,
            last_failure_time: state.last_failure_time,
            next_attempt_time: state.next_attempt_time,
        }
    }

    /// Forces the circuit closed and zeroes every counter.
    pub fn reset(&self) {
        let mut state = self.inner.state.lock();
        *state = BreakerState { generation: state.generation + 1, ..BreakerState::default() };
        drop(state);
        tracing::debug!(component = "circuit_breaker", name = %self.inner.name, "circuit reset");
    }
}

/// Admission to run one call through a [`CircuitBreaker`].
///
/// Dropping an unsettled probe permit frees the half-open slot.
struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    probe: bool,
    settled: bool,
}

impl<'a> Permit<'a> {
    fn new(breaker: &'a CircuitBreaker, generation: u64, probe: bool) -> Self {
        Self { breaker, generation, probe, settled: false }
    }

    fn complete(mut self, success: bool) {
        self.settled = true;
        self.breaker.settle(self.generation, self.probe, success);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if self.probe && !self.settled {
            self.breaker.abandon_probe(self.generation);
        }
    }
}
