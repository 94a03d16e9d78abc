//! Cache-first access to provider definitions.

use std::collections::BTreeMap;
use std::future::Future;

use crate::Error;
use crate::cache::{
    ConfigurationCache, InvalidationTrigger, perform_invalidation, should_invalidate,
};
use crate::config::InvalidationOptions;
use crate::resilience::ResilienceLayer;
use crate::types::{ProviderDefinition, validate_providers};

/// Serves provider definitions from a [`ConfigurationCache`], reloading
/// through a [`ResilienceLayer`] when the cache is empty or expired.
///
/// Loaded lists are validated before they reach the fallback store or the
/// cache, so invalid data is treated as a permanent failure. A result served
/// from the fallback store is returned but not cached, and the next call
/// tries the source again.
///
/// ## Example
///
/// ```rust,ignore
/// use std::time::Duration;
/// use provider_config::{InvalidationOptions, ProviderService, ResilienceLayer};
///
/// let service = ProviderService::new(
///     "providers.json",
///     ResilienceLayer::default(),
///     InvalidationOptions::builder().max_age(Duration::from_secs(300)).build(),
/// );
///
/// let providers = service.providers(|| read_providers("providers.json")).await?;
/// let models = service.models_for_provider("openai");
/// ```
#[derive(Debug, Clone)]
pub struct ProviderService {
    key: String,
    cache: ConfigurationCache,
    layer: ResilienceLayer,
    options: InvalidationOptions,
}

impl ProviderService {
    /// Creates a service with an empty cache.
    pub fn new(
        key: impl Into<String>,
        layer: ResilienceLayer,
        options: InvalidationOptions,
    ) -> Self {
        Self::with_cache(key, ConfigurationCache::new(), layer, options)
    }

    /// Creates a service around an existing cache.
    pub fn with_cache(
        key: impl Into<String>,
        cache: ConfigurationCache,
        layer: ResilienceLayer,
        options: InvalidationOptions,
    ) -> Self {
        Self { key: key.into(), cache, layer, options }
    }

    /// Returns the resource key used for the fallback store and logs.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the cache.
    pub fn cache(&self) -> &ConfigurationCache {
        &self.cache
    }

    /// Returns the resilience layer.
    pub fn layer(&self) -> &ResilienceLayer {
        &self.layer
    }

    /// Returns the invalidation options.
    pub fn options(&self) -> &InvalidationOptions {
        &self.options
    }

    /// Returns the provider list, loading it if the cache cannot answer.
    ///
    /// # Errors
    ///
    /// Returns the load error when the source fails and no fresh fallback
    /// exists. The cache is invalidated first.
    pub async fn providers<F, Fut>(
        &self,
        load_operation: F,
    ) -> Result<Vec<ProviderDefinition>, Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Vec<ProviderDefinition>, Error>>,
    {
        if let Some(providers) = self.cache.get() {
            if !should_invalidate(&self.cache, InvalidationTrigger::TimeBased, &self.options) {
                return Ok(providers);
            }
            perform_invalidation(&self.cache, InvalidationTrigger::TimeBased, &self.options);
        }

        let validated = || {
            let load = load_operation();
            async move {
                let providers = load.await?;
                validate_providers(&providers)?;
                Ok::<_, Error>(providers)
            }
        };

        match self.layer.load_detailed(&self.key, validated).await {
            Ok(outcome) if outcome.source.is_fallback() => {
                tracing::warn!(
                    component = "provider_service",
                    key = %self.key,
                    providers = outcome.providers.len(),
                    "running in degraded mode on fallback providers"
                );
                Ok(outcome.providers)
            },
            Ok(outcome) => {
                self.cache.set(outcome.providers.clone());
                Ok(outcome.providers)
            },
            Err(err) => {
                perform_invalidation(&self.cache, InvalidationTrigger::Error, &self.options);
                Err(err)
            },
        }
    }

    /// Applies an invalidation trigger to the cache.
    ///
    /// Returns `true` if the cache was invalidated.
    pub fn handle_trigger(&self, trigger: InvalidationTrigger) -> bool {
        perform_invalidation(&self.cache, trigger, &self.options)
    }

    /// Returns a cached provider by id.
    pub fn provider(&self, id: &str) -> Option<ProviderDefinition> {
        self.cache.get_provider(id)
    }

    /// Returns the models of a cached provider.
    pub fn models_for_provider(&self, id: &str) -> BTreeMap<String, String> {
        self.cache.models_for_provider(id)
    }
}
