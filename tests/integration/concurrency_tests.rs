//! Shared versus independent pipeline state under concurrent loads.

use std::sync::Arc;
use std::time::Duration;

use provider_config::testing::{ManualClock, ScriptedLoader};
use provider_config::{
    CircuitBreakerConfig, CircuitState, ConfigurationCache, ProviderDefinition, ResilienceConfig,
    ResilienceLayer, RetryConfig,
};

use crate::common::{init_tracing, layer_with_clock, sample_providers};

fn tripping_config() -> ResilienceConfig {
    ResilienceConfig::builder()
        .retry(RetryConfig::disabled())
        .circuit_breaker(CircuitBreakerConfig::builder().failure_threshold(2).build())
        .build()
}

#[tokio::test(start_paused = true)]
async fn test_shared_layer_shares_circuit_across_keys() {
    let (_clock, layer) = layer_with_clock(tripping_config());
    let handle = layer.clone();
    let failing = ScriptedLoader::always_err("EBUSY");
    let healthy = ScriptedLoader::always_ok(sample_providers().unwrap());

    let (a, b) = tokio::join!(
        layer.load_with_resilience("a", || failing.load()),
        handle.load_with_resilience("a", || failing.load()),
    );
    assert!(a.is_err() && b.is_err());
    assert_eq!(layer.circuit_state(), CircuitState::Open);

    let err = handle.load_with_resilience("b", || healthy.load()).await.unwrap_err();
    assert!(err.is_circuit_open());
    assert_eq!(healthy.calls(), 0);
    assert_eq!(layer.metrics().circuit_breaker_trips, 1);
}

#[tokio::test(start_paused = true)]
async fn test_independent_layers_isolate_keys() {
    init_tracing();
    let clock = Arc::new(ManualClock::new());
    let layer_a = ResilienceLayer::with_clock(tripping_config(), clock.clone());
    let layer_b = ResilienceLayer::with_clock(tripping_config(), clock.clone());
    let failing = ScriptedLoader::always_err("EBUSY");
    let healthy = ScriptedLoader::always_ok(sample_providers().unwrap());

    let _ = tokio::join!(
        layer_a.load_with_resilience("a", || failing.load()),
        layer_a.load_with_resilience("a", || failing.load()),
    );
    assert_eq!(layer_a.circuit_state(), CircuitState::Open);

    let providers = layer_b.load_with_resilience("b", || healthy.load()).await.unwrap();
    assert_eq!(providers.len(), 2);
    assert_eq!(layer_b.circuit_state(), CircuitState::Closed);
    assert_eq!(layer_b.metrics().circuit_breaker_trips, 0);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_loads_for_same_key_are_not_coalesced() {
    let (_clock, layer) = layer_with_clock(ResilienceConfig::default());
    let loader = ScriptedLoader::always_ok(sample_providers().unwrap())
        .with_latency(Duration::from_millis(200));

    let (a, b) = tokio::join!(
        layer.load_with_resilience("k", || loader.load()),
        layer.load_with_resilience("k", || loader.load()),
    );

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(loader.calls(), 2);
    assert_eq!(layer.metrics().successful_loads, 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_load_mid_backoff_sees_fallback() {
    let config = ResilienceConfig::builder()
        .circuit_breaker(CircuitBreakerConfig::builder().failure_threshold(10).build())
        .build();
    let (_clock, layer) = layer_with_clock(config);
    let providers = sample_providers().unwrap();
    let seed = ScriptedLoader::always_ok(providers.clone());
    layer.load_with_resilience("k", || seed.load()).await.unwrap();

    let failing = ScriptedLoader::always_err("EBUSY");
    let (a, b) = tokio::join!(
        layer.load_with_resilience("k", || failing.load()),
        layer.load_with_resilience("k", || failing.load()),
    );

    assert_eq!(a.unwrap(), providers);
    assert_eq!(b.unwrap(), providers);
    assert_eq!(failing.calls(), 6);
    assert_eq!(layer.metrics().fallback_activations, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cache_readers_never_see_partial_updates() {
    let cache = ConfigurationCache::new();
    let small: Vec<ProviderDefinition> =
        (0..3).map(|i| ProviderDefinition::new(format!("s{i}"), "Small")).collect();
    let large: Vec<ProviderDefinition> =
        (0..50).map(|i| ProviderDefinition::new(format!("l{i}"), "Large")).collect();
    cache.set(small.clone());

    let writer = {
        let cache = cache.clone();
        let (small, large) = (small.clone(), large.clone());
        tokio::spawn(async move {
            for i in 0..500 {
                cache.set(if i % 2 == 0 { large.clone() } else { small.clone() });
                tokio::task::yield_now().await;
            }
        })
    };

    let mut readers = Vec::new();
    for _ in 0..4 {
        let cache = cache.clone();
        let (small, large) = (small.clone(), large.clone());
        readers.push(tokio::spawn(async move {
            for _ in 0..500 {
                if let Some(seen) = cache.get() {
                    assert!(seen == small || seen == large, "observed a mixed provider set");
                }
                tokio::task::yield_now().await;
            }
        }));
    }

    writer.await.unwrap();
    for reader in futures::future::join_all(readers).await {
        reader.unwrap();
    }
}
