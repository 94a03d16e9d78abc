//! In-memory cache of the last validated provider set.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::clock::{Clock, system_clock};
use crate::types::ProviderDefinition;

/// Immutable view of the cache contents.
///
/// Writers build a new snapshot and swap it in; readers clone the `Arc`,
/// so a reader never sees a half-applied update.
#[derive(Debug)]
struct Snapshot {
    providers: Vec<ProviderDefinition>,
    index: HashMap<String, usize>,
    last_updated: Option<Instant>,
    updated_at: Option<DateTime<Utc>>,
    stale: bool,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            providers: Vec::new(),
            index: HashMap::new(),
            last_updated: None,
            updated_at: None,
            stale: true,
        }
    }

    fn is_valid(&self) -> bool {
        !self.stale && !self.providers.is_empty()
    }
}

/// Summary of the cache for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached providers.
    pub provider_count: usize,
    /// Whether the cache is stale.
    pub stale: bool,
    /// Wall-clock time of the last `set`.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Holds the last known-good, validated set of provider definitions.
///
/// The cache distinguishes "never loaded" and "intentionally cleared" from
/// "valid" through an explicit staleness flag: it starts stale, becomes valid
/// on a non-empty [`set`](Self::set), and becomes stale again on
/// [`invalidate`](Self::invalidate).
///
/// Cloning the cache yields another handle to the same contents.
///
/// ## Example
///
/// ```rust
/// use provider_config::{ConfigurationCache, ProviderDefinition};
///
/// let cache = ConfigurationCache::new();
/// assert!(cache.get().is_none());
///
/// cache.set(vec![ProviderDefinition::new("openai", "OpenAI")]);
/// assert!(cache.is_valid());
/// assert!(cache.has_provider("openai"));
///
/// cache.invalidate();
/// assert!(cache.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigurationCache {
    state: Arc<RwLock<Arc<Snapshot>>>,
    clock: Arc<dyn Clock>,
}

impl Default for ConfigurationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationCache {
    /// Creates an empty, stale cache using the system clock.
    pub fn new() -> Self {
        Self::with_clock(system_clock())
    }

    /// Creates an empty, stale cache using the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { state: Arc::new(RwLock::new(Arc::new(Snapshot::empty()))), clock }
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.state.read())
    }

    /// Replaces the whole provider set.
    ///
    /// When two definitions share an id, the later one wins and keeps the
    /// position of the first. An empty list leaves the cache stale.
    pub fn set(&self, providers: Vec<ProviderDefinition>) {
        let mut ordered: Vec<ProviderDefinition> = Vec::with_capacity(providers.len());
        let mut index = HashMap::with_capacity(providers.len());
        for provider in providers {
            match index.get(provider.id()) {
                Some(&position) => ordered[position] = provider,
                None => {
                    index.insert(provider.id().to_string(), ordered.len());
                    ordered.push(provider);
                },
            }
        }

        let stale = ordered.is_empty();
        let count = ordered.len();
        let next = Arc::new(Snapshot {
            providers: ordered,
            index,
            last_updated: Some(self.clock.now()),
            updated_at: Some(self.clock.now_utc()),
            stale,
        });

        *self.state.write() = next;
        tracing::debug!(component = "configuration_cache", providers = count, "cache updated");
    }

    /// Returns the full provider list, or `None` unless the cache is valid.
    pub fn get(&self) -> Option<Vec<ProviderDefinition>> {
        let snapshot = self.snapshot();
        snapshot.is_valid().then(|| snapshot.providers.clone())
    }

    /// Returns the provider with the given id.
    pub fn get_provider(&self, id: &str) -> Option<ProviderDefinition> {
        let snapshot = self.snapshot();
        snapshot.index.get(id).map(|&position| snapshot.providers[position].clone())
    }

    /// Returns `true` if a provider with the given id is cached.
    pub fn has_provider(&self, id: &str) -> bool {
        self.snapshot().index.contains_key(id)
    }

    /// Returns the ids of all cached providers, in insertion order.
    pub fn provider_ids(&self) -> Vec<String> {
        self.snapshot().providers.iter().map(|p| p.id().to_string()).collect()
    }

    /// Returns the models of a provider; unknown ids yield an empty map.
    pub fn models_for_provider(&self, id: &str) -> BTreeMap<String, String> {
        self.get_provider(id).map(|p| p.models().clone()).unwrap_or_default()
    }

    /// Clears the cache and marks it stale.
    pub fn invalidate(&self) {
        *self.state.write() = Arc::new(Snapshot::empty());
        tracing::debug!(component = "configuration_cache", "cache invalidated");
    }

    /// Returns `true` if the cache holds a non-stale, non-empty set.
    pub fn is_valid(&self) -> bool {
        self.snapshot().is_valid()
    }

    /// Returns `true` if the cache holds no providers.
    pub fn is_empty(&self) -> bool {
        self.snapshot().providers.is_empty()
    }

    /// Returns `true` if the cache is stale.
    pub fn is_stale(&self) -> bool {
        self.snapshot().stale
    }

    /// Returns the number of cached providers.
    pub fn len(&self) -> usize {
        self.snapshot().providers.len()
    }

    /// Returns when the cache was last set.
    pub fn last_updated(&self) -> Option<Instant> {
        self.snapshot().last_updated
    }

    /// Returns the time elapsed since the last `set`.
    pub fn age(&self) -> Option<Duration> {
        let last_updated = self.snapshot().last_updated?;
        Some(self.clock.now().saturating_duration_since(last_updated))
    }

    /// Returns a summary of the cache.
    pub fn stats(&self) -> CacheStats {
        let snapshot = self.snapshot();
        CacheStats {
            provider_count: snapshot.providers.len(),
            stale: snapshot.stale,
            updated_at: snapshot.updated_at,
        }
    }
}
