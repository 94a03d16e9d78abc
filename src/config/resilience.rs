//! Aggregate configuration for the resilience layer.

use super::{CircuitBreakerConfig, FallbackConfig, RetryConfig};
use crate::error::ErrorClassifier;

/// Configuration for a [`ResilienceLayer`](crate::ResilienceLayer).
///
/// Bundles the retry, circuit breaker and fallback settings together with the
/// error classifier that decides which failures are retried.
///
/// ## Example
///
/// ```rust
/// use provider_config::{CircuitBreakerConfig, ResilienceConfig, RetryConfig};
/// use std::time::Duration;
///
/// let config = ResilienceConfig::builder()
///     .retry(RetryConfig::new().with_max_attempts(5))
///     .circuit_breaker(
///         CircuitBreakerConfig::builder()
///             .failure_threshold(3)
///             .recovery_timeout(Duration::from_secs(10))
///             .build(),
///     )
///     .build();
/// ```
#[derive(Debug, Clone, bon::Builder)]
pub struct ResilienceConfig {
    /// Retry behavior.
    #[builder(default)]
    pub retry: RetryConfig,

    /// Circuit breaker behavior.
    #[builder(default)]
    pub circuit_breaker: CircuitBreakerConfig,

    /// Fallback store behavior.
    #[builder(default)]
    pub fallback: FallbackConfig,

    /// Decides which failures are retried.
    #[builder(default)]
    pub classifier: ErrorClassifier,

    /// Whether serving a fallback result is logged at `warn` level.
    ///
    /// When `false` it is logged at `debug`.
    #[builder(default = true)]
    pub log_degraded_loads: bool,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
