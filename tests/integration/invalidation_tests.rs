//! Cache invalidation through options, strategies and the service.

use std::sync::Arc;
use std::time::Duration;

use provider_config::testing::{ManualClock, ScriptedLoader};
use provider_config::{
    ConfigurationCache, InvalidationOptions, InvalidationStrategy, InvalidationTrigger,
    ProviderService, ResilienceConfig, create_invalidation_strategy, perform_invalidation,
    should_invalidate,
};

use crate::common::{layer_with_clock, sample_providers};

fn composite_options() -> InvalidationOptions {
    InvalidationOptions::builder()
        .max_age(Duration::from_millis(5000))
        .trigger_events(vec![InvalidationTrigger::Manual])
        .build()
}

#[test]
fn test_composite_invalidates_on_manual_and_age() {
    let clock = Arc::new(ManualClock::new());
    let cache = ConfigurationCache::with_clock(clock.clone());
    cache.set(sample_providers().unwrap());
    let options = composite_options();

    assert!(should_invalidate(&cache, InvalidationTrigger::Manual, &options));
    assert!(!should_invalidate(&cache, InvalidationTrigger::TimeBased, &options));
    assert!(!should_invalidate(&cache, InvalidationTrigger::FileChange, &options));

    clock.advance(Duration::from_millis(4999));
    assert!(!should_invalidate(&cache, InvalidationTrigger::TimeBased, &options));
    clock.advance(Duration::from_millis(2));
    assert!(should_invalidate(&cache, InvalidationTrigger::TimeBased, &options));
}

#[test]
fn test_error_trigger_is_special_cased_above_strategies() {
    let cache = ConfigurationCache::new();
    cache.set(sample_providers().unwrap());
    let options = composite_options();

    let strategy = create_invalidation_strategy(&options);
    assert!(!strategy.should_invalidate(&cache, InvalidationTrigger::Error));
    assert!(should_invalidate(&cache, InvalidationTrigger::Error, &options));

    assert!(perform_invalidation(&cache, InvalidationTrigger::Error, &options));
    assert!(cache.is_empty());
    assert!(cache.get().is_none());
}

#[test]
fn test_nested_composites() {
    let cache = ConfigurationCache::new();
    cache.set(sample_providers().unwrap());

    let strategy = InvalidationStrategy::composite([
        InvalidationStrategy::trigger_based([InvalidationTrigger::FileChange]),
        InvalidationStrategy::composite([InvalidationStrategy::trigger_based([
            InvalidationTrigger::Manual,
        ])]),
    ]);

    assert!(strategy.should_invalidate(&cache, InvalidationTrigger::FileChange));
    assert!(strategy.should_invalidate(&cache, InvalidationTrigger::Manual));
    assert!(!strategy.should_invalidate(&cache, InvalidationTrigger::TimeBased));
}

#[test]
fn test_triggers_parse_from_config_strings() {
    let triggers: Vec<InvalidationTrigger> =
        serde_json::from_str(r#"["file_change", "manual", "time_based", "error"]"#).unwrap();
    assert_eq!(triggers.len(), 4);
    assert_eq!("file_change".parse::<InvalidationTrigger>().unwrap(), triggers[0]);
}

#[tokio::test(start_paused = true)]
async fn test_service_reloads_on_file_change() {
    let (clock, layer) = layer_with_clock(ResilienceConfig::default());
    let cache = ConfigurationCache::with_clock(clock.clone());
    let options = InvalidationOptions::builder()
        .trigger_events(vec![InvalidationTrigger::FileChange])
        .build();
    let service = ProviderService::with_cache("providers.json", cache, layer, options);
    let loader = ScriptedLoader::always_ok(sample_providers().unwrap());

    service.providers(|| loader.load()).await.unwrap();
    assert!(!service.handle_trigger(InvalidationTrigger::Manual));
    service.providers(|| loader.load()).await.unwrap();
    assert_eq!(loader.calls(), 1);

    assert!(service.handle_trigger(InvalidationTrigger::FileChange));
    service.providers(|| loader.load()).await.unwrap();
    assert_eq!(loader.calls(), 2);
    assert_eq!(service.models_for_provider("openai").len(), 2);
}
