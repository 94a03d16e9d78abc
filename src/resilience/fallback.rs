//! Time-bounded store of the last successful load per resource key.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::clock::{Clock, system_clock};
use crate::config::FallbackConfig;
use crate::types::ProviderDefinition;

#[derive(Debug, Clone)]
struct FallbackEntry {
    data: Vec<ProviderDefinition>,
    stored_at: Instant,
}

/// Summary of the fallback store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackStats {
    /// Entries currently held, stale or not.
    pub entries: usize,
    /// Entries past `max_age` that have not been purged yet.
    pub stale_entries: usize,
    /// Age of the oldest entry.
    pub oldest_age: Option<Duration>,
}

#[derive(Debug)]
struct FallbackInner {
    config: FallbackConfig,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, FallbackEntry>>,
}

/// Keeps the last successful result per resource key so a failing load can
/// be answered with recent data.
///
/// Values are cloned on the way in and on the way out; a caller holding a
/// returned list never observes a later store.
///
/// ## Example
///
/// ```rust
/// use provider_config::{FallbackConfig, FallbackManager, ProviderDefinition};
///
/// let fallback = FallbackManager::new(FallbackConfig::default());
/// fallback.store_fallback("providers", &[ProviderDefinition::new("openai", "OpenAI")]);
///
/// let cached = fallback.get_fallback("providers").unwrap();
/// assert_eq!(cached[0].id(), "openai");
/// assert!(fallback.get_fallback("other").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct FallbackManager {
    inner: Arc<FallbackInner>,
}

impl Default for FallbackManager {
    fn default() -> Self {
        Self::new(FallbackConfig::default())
    }
}

impl FallbackManager {
    /// Creates an empty store using the system clock.
    pub fn new(config: FallbackConfig) -> Self {
        Self::with_clock(config, system_clock())
    }

    /// Creates an empty store using the given clock.
    pub fn with_clock(config: FallbackConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(FallbackInner { config, clock, entries: Mutex::new(HashMap::new()) }),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FallbackConfig {
        &self.inner.config
    }

    fn age_of(&self, entry: &FallbackEntry, now: Instant) -> Duration {
        now.saturating_duration_since(entry.stored_at)
    }

    /// Stores a copy of `data` under `key`.
    ///
    /// Stale entries are purged first. When the store is full and `key` is
    /// new, the oldest entry is evicted.
    pub fn store_fallback(&self, key: &str, data: &[ProviderDefinition]) {
        let now = self.inner.clock.now();
        let config = &self.inner.config;
        let mut entries = self.inner.entries.lock();

        let before = entries.len();
        entries.retain(|_, entry| !config.is_expired(self.age_of(entry, now)));
        let purged = before - entries.len();

        if !entries.contains_key(key) && entries.len() >= config.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(oldest, _)| oldest.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                tracing::debug!(
                    component = "fallback_manager",
                    key = %oldest,
                    "evicted oldest fallback"
                );
            }
        }

        if config.max_entries > 0 {
            entries.insert(key.to_string(), FallbackEntry { data: data.to_vec(), stored_at: now });
        }
        tracing::debug!(
            component = "fallback_manager",
            key,
            providers = data.len(),
            purged,
            "stored fallback"
        );
    }

    /// Returns a copy of the entry under `key` if it is still fresh.
    ///
    /// A stale entry is removed.
    pub fn get_fallback(&self, key: &str) -> Option<Vec<ProviderDefinition>> {
        self.get_fallback_with_age(key).map(|(data, _)| data)
    }

    /// Returns a copy of the fresh entry under `key` together with its age.
    ///
    /// Both are read under one lock, so the age always belongs to the
    /// returned data. A stale entry is removed.
    pub fn get_fallback_with_age(
        &self,
        key: &str,
    ) -> Option<(Vec<ProviderDefinition>, Duration)> {
        let now = self.inner.clock.now();
        let mut entries = self.inner.entries.lock();
        let entry = entries.get(key)?;
        let age = self.age_of(entry, now);
        if self.inner.config.is_expired(age) {
            entries.remove(key);
            tracing::debug!(component = "fallback_manager", key, "dropped stale fallback");
            return None;
        }
        Some((entry.data.clone(), age))
    }

    /// Returns `true` if a fresh entry exists under `key`.
    pub fn has_fallback(&self, key: &str) -> bool {
        !self.is_stale(key)
    }

    /// Returns `true` if `key` has no entry or its entry is past `max_age`.
    pub fn is_stale(&self, key: &str) -> bool {
        match self.fallback_age(key) {
            Some(age) => self.inner.config.is_expired(age),
            None => true,
        }
    }

    /// Returns the age of the entry under `key`, stale or not.
    pub fn fallback_age(&self, key: &str) -> Option<Duration> {
        let now = self.inner.clock.now();
        self.inner.entries.lock().get(key).map(|entry| self.age_of(entry, now))
    }

    /// Removes the entry under `key`. Returns `true` if one existed.
    pub fn clear_fallback(&self, key: &str) -> bool {
        self.inner.entries.lock().remove(key).is_some()
    }

    /// Removes every entry.
    pub fn clear_all(&self) {
        self.inner.entries.lock().clear();
    }

    /// Returns the number of entries held, including stale ones.
    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    /// Returns `true` if no entries are held.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.lock().is_empty()
    }

    /// Returns a summary of the store.
    pub fn stats(&self) -> FallbackStats {
        let now = self.inner.clock.now();
        let entries = self.inner.entries.lock();
        let ages: Vec<Duration> = entries.values().map(|entry| self.age_of(entry, now)).collect();
        FallbackStats {
            entries: ages.len(),
            stale_entries: ages.iter().filter(|age| self.inner.config.is_expired(**age)).count(),
            oldest_age: ages.into_iter().max(),
        }
    }
}
