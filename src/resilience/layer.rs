//! The "load with resilience" pipeline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::metrics::MetricsRecorder;
use super::{CircuitBreaker, FallbackManager, ResilienceMetrics, RetryHandler};
use crate::Error;
use crate::clock::{Clock, system_clock};
use crate::config::{CircuitState, ResilienceConfig};
use crate::types::ProviderDefinition;

/// Where the providers returned by a load came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// The load operation succeeded.
    Fresh,
    /// The load failed and a stored result was served instead.
    Fallback {
        /// Age of the served result.
        age: Duration,
    },
}

impl LoadSource {
    /// Returns `true` if the result came from the fallback store.
    pub fn is_fallback(&self) -> bool {
        matches!(self, LoadSource::Fallback { .. })
    }
}

/// Result of [`ResilienceLayer::load_detailed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    /// The loaded or fallback providers.
    pub providers: Vec<ProviderDefinition>,
    /// Where they came from.
    pub source: LoadSource,
    /// Calls made to the load operation, rejected calls included.
    pub attempts: u32,
}

#[derive(Debug)]
struct LayerInner {
    config: ResilienceConfig,
    clock: Arc<dyn Clock>,
    breaker: CircuitBreaker,
    retry: RetryHandler,
    fallback: FallbackManager,
    metrics: MetricsRecorder,
}

/// Combines a circuit breaker, a retry handler and a fallback store around
/// a caller-supplied load operation.
///
/// Each attempt goes through the breaker; the retry handler decides whether
/// another attempt is made; when every attempt fails, the last successful
/// result for the key is served if it is still fresh. Otherwise the error of
/// the last attempt is returned unchanged.
///
/// Cloning a layer shares its breaker, fallback store and metrics, so every
/// key it serves trips the same circuit. Build one layer per key to isolate
/// them. Concurrent loads of the same key are not coalesced.
///
/// ## Example
///
/// ```rust,ignore
/// use provider_config::{ResilienceConfig, ResilienceLayer};
///
/// let layer = ResilienceLayer::new(ResilienceConfig::default());
/// let providers = layer
///     .load_with_resilience("providers", || async { read_providers_file().await })
///     .await?;
///
/// println!("retries so far: {}", layer.metrics().retry_attempts);
/// ```
#[derive(Debug, Clone)]
pub struct ResilienceLayer {
    inner: Arc<LayerInner>,
}

impl Default for ResilienceLayer {
    fn default() -> Self {
        Self::new(ResilienceConfig::default())
    }
}

impl ResilienceLayer {
    /// Creates a layer using the system clock.
    pub fn new(config: ResilienceConfig) -> Self {
        Self::with_clock(config, system_clock())
    }

    /// Creates a layer whose breaker, fallback store and timings use `clock`.
    pub fn with_clock(config: ResilienceConfig, clock: Arc<dyn Clock>) -> Self {
        let breaker = CircuitBreaker::with_clock(
            "provider_config",
            config.circuit_breaker.clone(),
            Arc::clone(&clock),
        );
        let retry = RetryHandler::new(config.retry.clone(), config.classifier.clone());
        let fallback = FallbackManager::with_clock(config.fallback.clone(), Arc::clone(&clock));

        Self {
            inner: Arc::new(LayerInner {
                config,
                clock,
                breaker,
                retry,
                fallback,
                metrics: MetricsRecorder::default(),
            }),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ResilienceConfig {
        &self.inner.config
    }

    /// Returns the circuit breaker.
    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.inner.breaker
    }

    /// Returns the current circuit state.
    pub fn circuit_state(&self) -> CircuitState {
        self.inner.breaker.state()
    }

    /// Returns the retry handler.
    pub fn retry_handler(&self) -> &RetryHandler {
        &self.inner.retry
    }

    /// Returns the fallback store.
    pub fn fallback(&self) -> &FallbackManager {
        &self.inner.fallback
    }

    /// Loads providers for `key`, retrying and falling back as configured.
    ///
    /// The load operation may be invoked several times and must be
    /// idempotent.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt when every attempt failed and
    /// no fresh fallback exists for `key`.
    pub async fn load_with_resilience<F, Fut>(
        &self,
        key: &str,
        load_operation: F,
    ) -> Result<Vec<ProviderDefinition>, Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Vec<ProviderDefinition>, Error>>,
    {
        self.load_detailed(key, load_operation).await.map(|outcome| outcome.providers)
    }

    /// Like [`load_with_resilience`](Self::load_with_resilience), also
    /// reporting whether the result is fresh or served from the fallback.
    ///
    /// # Errors
    ///
    /// Same as [`load_with_resilience`](Self::load_with_resilience).
    pub async fn load_detailed<F, Fut>(
        &self,
        key: &str,
        load_operation: F,
    ) -> Result<LoadOutcome, Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Vec<ProviderDefinition>, Error>>,
    {
        let inner = &*self.inner;
        let load_operation = &load_operation;
        let start = inner.clock.now();
        let mut retries = 0u32;

        let result = inner
            .retry
            .execute_with_observer(
                key,
                move || inner.breaker.call(load_operation),
                |_, _, _| {
                    retries += 1;
                    inner.metrics.increment_retry_attempts();
                },
            )
            .await;
        let attempts = retries + 1;

        let err = match result {
            Ok(providers) => {
                let elapsed = inner.clock.now().saturating_duration_since(start);
                inner.fallback.store_fallback(key, &providers);
                inner.metrics.record_success(elapsed);
                if retries > 0 {
                    inner.metrics.increment_successful_recoveries();
                }
                tracing::debug!(
                    component = "resilience_layer",
                    key,
                    attempts,
                    providers = providers.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "load succeeded"
                );
                return Ok(LoadOutcome { providers, source: LoadSource::Fresh, attempts });
            },
            Err(err) => err,
        };

        if err.is_circuit_open() {
            inner.metrics.increment_circuit_breaker_trips();
        }

        if let Some((providers, age)) = inner.fallback.get_fallback_with_age(key) {
            inner.metrics.increment_fallback_activations();
            if inner.config.log_degraded_loads {
                tracing::warn!(
                    component = "resilience_layer",
                    key,
                    attempts,
                    fallback_age_ms = age.as_millis() as u64,
                    error = %err,
                    "load failed, serving fallback"
                );
            } else {
                tracing::debug!(
                    component = "resilience_layer",
                    key,
                    attempts,
                    fallback_age_ms = age.as_millis() as u64,
                    error = %err,
                    "load failed, serving fallback"
                );
            }
            return Ok(LoadOutcome { providers, source: LoadSource::Fallback { age }, attempts });
        }

        inner.metrics.increment_failed_loads();
        tracing::error!(
            component = "resilience_layer",
            key,
            attempts,
            error = %err,
            "load failed with no fallback"
        );
        Err(err)
    }

    /// Returns a snapshot of the counters.
    pub fn metrics(&self) -> ResilienceMetrics {
        self.inner.metrics.snapshot()
    }

    /// Zeroes every counter.
    pub fn reset_metrics(&self) {
        self.inner.metrics.reset();
    }
}
