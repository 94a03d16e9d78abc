//! End-to-end behavior of the load pipeline.

use std::time::Duration;

use provider_config::testing::ScriptedLoader;
use provider_config::{ErrorKind, FallbackConfig, LoadSource, ResilienceConfig, RetryConfig};

use crate::common::{layer_with_clock, sample_providers};

#[tokio::test(start_paused = true)]
async fn test_busy_source_is_answered_from_fallback() {
    let (_clock, layer) = layer_with_clock(ResilienceConfig::default());
    let providers = sample_providers().unwrap();
    let loader = ScriptedLoader::new()
        .then_ok(providers.clone())
        .then_err("EBUSY")
        .then_err("EBUSY")
        .then_err("EBUSY");

    let first = layer.load_with_resilience("providers.json", || loader.load()).await.unwrap();
    assert_eq!(first.len(), 2);

    let second = layer.load_with_resilience("providers.json", || loader.load()).await.unwrap();
    assert_eq!(second, providers);
    assert_eq!(loader.calls(), 4);

    let metrics = layer.metrics();
    assert_eq!(metrics.fallback_activations, 1);
    assert_eq!(metrics.retry_attempts, 2);
    assert_eq!(metrics.successful_loads, 1);
}

#[tokio::test(start_paused = true)]
async fn test_retryable_code_exhausts_exactly_max_attempts() {
    for max_attempts in [1, 2, 3, 5] {
        let config = ResilienceConfig::builder()
            .retry(RetryConfig::new().with_max_attempts(max_attempts))
            .build();
        let (_clock, layer) = layer_with_clock(config);
        let loader = ScriptedLoader::always_err("ENOENT");

        let err = layer.load_with_resilience("k", || loader.load()).await.unwrap_err();
        assert_eq!(err.code(), Some("ENOENT"));
        assert_eq!(loader.calls(), max_attempts as usize);
    }
}

#[tokio::test(start_paused = true)]
async fn test_non_retryable_code_runs_once() {
    let (_clock, layer) = layer_with_clock(ResilienceConfig::default());
    let loader = ScriptedLoader::always_err("EACCES");

    let err = layer.load_with_resilience("k", || loader.load()).await.unwrap_err();
    assert_eq!(err.code(), Some("EACCES"));
    assert_eq!(loader.calls(), 1);
    assert_eq!(layer.metrics().retry_attempts, 0);
}

#[tokio::test(start_paused = true)]
async fn test_parse_failure_is_not_retried_but_falls_back() {
    let (_clock, layer) = layer_with_clock(ResilienceConfig::default());
    let providers = sample_providers().unwrap();
    let loader =
        ScriptedLoader::new().then_ok(providers.clone()).then_err_kind(ErrorKind::Parse);

    layer.load_with_resilience("k", || loader.load()).await.unwrap();
    let outcome = layer.load_detailed("k", || loader.load()).await.unwrap();

    assert_eq!(outcome.providers, providers);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(loader.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fallback_copy_is_independent() {
    let (_clock, layer) = layer_with_clock(ResilienceConfig::default());
    let providers = sample_providers().unwrap();
    let loader = ScriptedLoader::new().then_ok(providers.clone()).otherwise_err("EBUSY");

    let mut fresh = layer.load_with_resilience("k", || loader.load()).await.unwrap();
    fresh.clear();

    let served = layer.load_with_resilience("k", || loader.load()).await.unwrap();
    assert_eq!(served, providers);
}

#[tokio::test(start_paused = true)]
async fn test_expired_fallback_surfaces_original_error() {
    let config = ResilienceConfig::builder()
        .fallback(FallbackConfig::builder().max_age(Duration::from_secs(300)).build())
        .build();
    let (clock, layer) = layer_with_clock(config);
    let loader =
        ScriptedLoader::new().then_ok(sample_providers().unwrap()).otherwise_err("ETIMEDOUT");

    layer.load_with_resilience("k", || loader.load()).await.unwrap();
    clock.advance(Duration::from_secs(301));

    assert!(!layer.fallback().has_fallback("k"));
    assert!(layer.fallback().is_stale("k"));

    let err = layer.load_with_resilience("k", || loader.load()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(err.code(), Some("ETIMEDOUT"));
    assert_eq!(layer.metrics().fallback_activations, 0);
    assert_eq!(layer.metrics().failed_loads, 1);
}

#[tokio::test(start_paused = true)]
async fn test_fallback_reports_age() {
    let (clock, layer) = layer_with_clock(ResilienceConfig::default());
    let loader = ScriptedLoader::new().then_ok(sample_providers().unwrap()).otherwise_err("EBUSY");

    layer.load_with_resilience("k", || loader.load()).await.unwrap();
    clock.advance(Duration::from_secs(42));

    let outcome = layer.load_detailed("k", || loader.load()).await.unwrap();
    assert_eq!(outcome.source, LoadSource::Fallback { age: Duration::from_secs(42) });
}

#[tokio::test(start_paused = true)]
async fn test_keys_have_separate_fallbacks() {
    let (_clock, layer) = layer_with_clock(ResilienceConfig::default());
    let providers = sample_providers().unwrap();
    let good = ScriptedLoader::always_ok(providers.clone());
    let bad = ScriptedLoader::always_err("EACCES");

    layer.load_with_resilience("a", || good.load()).await.unwrap();
    assert_eq!(layer.load_with_resilience("a", || bad.load()).await.unwrap(), providers);
    assert!(layer.load_with_resilience("b", || bad.load()).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_metrics_accumulate_until_reset() {
    let (_clock, layer) = layer_with_clock(ResilienceConfig::default());
    let loader = ScriptedLoader::always_err("EBUSY");

    for _ in 0..2 {
        let _ = layer.load_with_resilience("k", || loader.load()).await;
    }
    assert_eq!(layer.metrics().retry_attempts, 4);
    assert_eq!(layer.metrics().failed_loads, 2);

    layer.reset_metrics();
    assert_eq!(layer.metrics().retry_attempts, 0);
    assert_eq!(layer.metrics().failed_loads, 0);
}
