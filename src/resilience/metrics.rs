//! Counters kept by a resilience layer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Lock-free counters owned by one layer. Handles share it through the
/// layer's `Arc`.
#[derive(Debug, Default)]
pub(crate) struct MetricsRecorder {
    retry_attempts: AtomicU64,
    circuit_breaker_trips: AtomicU64,
    fallback_activations: AtomicU64,
    successful_recoveries: AtomicU64,
    successful_loads: AtomicU64,
    failed_loads: AtomicU64,
    last_duration_ns: AtomicU64,
}

impl MetricsRecorder {
    pub(crate) fn increment_retry_attempts(&self) {
        self.retry_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn increment_circuit_breaker_trips(&self) {
        self.circuit_breaker_trips.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn increment_fallback_activations(&self) {
        self.fallback_activations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn increment_successful_recoveries(&self) {
        self.successful_recoveries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn increment_failed_loads(&self) {
        self.failed_loads.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successful load and its duration.
    pub(crate) fn record_success(&self, duration: Duration) {
        self.successful_loads.fetch_add(1, Ordering::Relaxed);
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.last_duration_ns.store(nanos, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ResilienceMetrics {
        let successful_loads = self.successful_loads.load(Ordering::Relaxed);
        ResilienceMetrics {
            retry_attempts: self.retry_attempts.load(Ordering::Relaxed),
            circuit_breaker_trips: self.circuit_breaker_trips.load(Ordering::Relaxed),
            fallback_activations: self.fallback_activations.load(Ordering::Relaxed),
            successful_recoveries: self.successful_recoveries.load(Ordering::Relaxed),
            successful_loads,
            failed_loads: self.failed_loads.load(Ordering::Relaxed),
            operation_duration: (successful_loads > 0)
                .then(|| Duration::from_nanos(self.last_duration_ns.load(Ordering::Relaxed))),
        }
    }

    pub(crate) fn reset(&self) {
        self.retry_attempts.store(0, Ordering::Relaxed);
        self.circuit_breaker_trips.store(0, Ordering::Relaxed);
        self.fallback_activations.store(0, Ordering::Relaxed);
        self.successful_recoveries.store(0, Ordering::Relaxed);
        self.successful_loads.store(0, Ordering::Relaxed);
        self.failed_loads.store(0, Ordering::Relaxed);
        self.last_duration_ns.store(0, Ordering::Relaxed);
    }
}

/// A snapshot of resilience counters.
///
/// Counters only grow until
/// [`ResilienceLayer::reset_metrics`](crate::ResilienceLayer::reset_metrics).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResilienceMetrics {
    /// Retries scheduled after a retryable failure.
    pub retry_attempts: u64,
    /// Calls rejected because the circuit was open.
    pub circuit_breaker_trips: u64,
    /// Failed loads answered from the fallback store.
    pub fallback_activations: u64,
    /// Loads that succeeded after at least one retry.
    pub successful_recoveries: u64,
    /// Loads that returned fresh data.
    pub successful_loads: u64,
    /// Loads that failed with no fallback available.
    pub failed_loads: u64,
    /// Duration of the most recent successful load.
    pub operation_duration: Option<Duration>,
}

impl ResilienceMetrics {
    /// Returns the share of loads (fresh, fallback or failed) answered from
    /// the fallback store (0.0 - 1.0).
    pub fn degraded_rate(&self) -> f64 {
        let total = self.successful_loads + self.fallback_activations + self.failed_loads;
        if total == 0 {
            return 0.0;
        }
        self.fallback_activations as f64 / total as f64
    }
}
