//! Circuit breaker behavior, standalone and inside the layer.

use std::sync::Arc;
use std::time::Duration;

use provider_config::testing::{ManualClock, ScriptedLoader};
use provider_config::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, Error, ResilienceConfig, RetryConfig,
};

use crate::common::{layer_with_clock, sample_providers};

fn threshold_three(clock: Arc<ManualClock>) -> CircuitBreaker {
    let config = CircuitBreakerConfig::builder()
        .failure_threshold(3)
        .recovery_timeout(Duration::from_secs(30))
        .build();
    CircuitBreaker::with_clock("providers", config, clock)
}

#[tokio::test]
async fn test_three_failures_open_then_single_probe() {
    let clock = Arc::new(ManualClock::new());
    let breaker = threshold_three(clock.clone());
    let loader = ScriptedLoader::always_err("EBUSY");

    for _ in 0..3 {
        assert!(breaker.call(|| loader.load()).await.is_err());
    }
    assert_eq!(breaker.state(), CircuitState::Open);
    assert_eq!(loader.calls(), 3);

    clock.advance(Duration::from_secs(29));
    let err = breaker.call(|| loader.load()).await.unwrap_err();
    assert!(err.is_circuit_open());
    assert_eq!(err.retry_after(), Some(Duration::from_secs(1)));
    assert_eq!(loader.calls(), 3);

    clock.advance(Duration::from_secs(1));
    assert!(breaker.call(|| loader.load()).await.is_err());
    assert_eq!(loader.calls(), 4);
    assert_eq!(breaker.state(), CircuitState::Open);

    assert!(breaker.call(|| loader.load()).await.unwrap_err().is_circuit_open());
    assert_eq!(loader.calls(), 4);
}

#[tokio::test]
async fn test_probe_success_closes_after_success_threshold() {
    let clock = Arc::new(ManualClock::new());
    let breaker = threshold_three(clock.clone());

    for _ in 0..3 {
        let _ = breaker.call(|| async { Err::<(), _>(Error::io("EBUSY", "busy")) }).await;
    }
    clock.advance(Duration::from_secs(30));

    breaker.call(|| async { Ok(()) }).await.unwrap();
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
    breaker.call(|| async { Ok(()) }).await.unwrap();
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(breaker.stats().failure_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_layer_serves_fallback_while_open() {
    let config = ResilienceConfig::builder()
        .retry(RetryConfig::disabled())
        .circuit_breaker(CircuitBreakerConfig::builder().failure_threshold(2).build())
        .build();
    let (_clock, layer) = layer_with_clock(config);
    let providers = sample_providers().unwrap();
    let loader = ScriptedLoader::new().then_ok(providers.clone()).otherwise_err("EBUSY");

    layer.load_with_resilience("k", || loader.load()).await.unwrap();
    for _ in 0..2 {
        assert_eq!(layer.load_with_resilience("k", || loader.load()).await.unwrap(), providers);
    }
    assert_eq!(layer.circuit_state(), CircuitState::Open);
    assert_eq!(loader.calls(), 3);

    let served = layer.load_with_resilience("k", || loader.load()).await.unwrap();
    assert_eq!(served, providers);
    assert_eq!(loader.calls(), 3);

    let metrics = layer.metrics();
    assert_eq!(metrics.circuit_breaker_trips, 1);
    assert_eq!(metrics.fallback_activations, 3);
}

#[tokio::test(start_paused = true)]
async fn test_open_circuit_does_not_consume_retries() {
    let config = ResilienceConfig::builder()
        .retry(RetryConfig::new().with_max_attempts(5))
        .circuit_breaker(CircuitBreakerConfig::builder().failure_threshold(2).build())
        .build();
    let (_clock, layer) = layer_with_clock(config);
    let loader = ScriptedLoader::always_err("EBUSY");

    let outcome = layer.load_detailed("k", || loader.load()).await;
    let err = outcome.unwrap_err();

    assert!(err.is_circuit_open());
    assert_eq!(loader.calls(), 2);
    let metrics = layer.metrics();
    assert_eq!(metrics.retry_attempts, 2);
    assert_eq!(metrics.circuit_breaker_trips, 1);
}
