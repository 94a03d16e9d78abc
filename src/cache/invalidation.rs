//! Cache invalidation strategies.
//!
//! A strategy is a pure predicate over `(cache, trigger)`. Strategies are a
//! tagged enum rather than trait objects; composition is a logical OR.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigurationCache;
use crate::Error;
use crate::config::InvalidationOptions;

/// The cause that prompts an invalidation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationTrigger {
    /// The configuration source changed on disk.
    FileChange,
    /// The user asked for a reload.
    Manual,
    /// A periodic freshness check.
    TimeBased,
    /// A load failed.
    Error,
}

impl fmt::Display for InvalidationTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidationTrigger::FileChange => write!(f, "file_change"),
            InvalidationTrigger::Manual => write!(f, "manual"),
            InvalidationTrigger::TimeBased => write!(f, "time_based"),
            InvalidationTrigger::Error => write!(f, "error"),
        }
    }
}

impl FromStr for InvalidationTrigger {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file_change" => Ok(InvalidationTrigger::FileChange),
            "manual" => Ok(InvalidationTrigger::Manual),
            "time_based" => Ok(InvalidationTrigger::TimeBased),
            "error" => Ok(InvalidationTrigger::Error),
            other => Err(Error::configuration(format!("unknown invalidation trigger '{}'", other))),
        }
    }
}

/// Decides whether a trigger should discard the cache.
///
/// ## Example
///
/// ```rust
/// use provider_config::{ConfigurationCache, InvalidationStrategy, InvalidationTrigger};
///
/// let cache = ConfigurationCache::new();
/// let strategy = InvalidationStrategy::default();
///
/// assert!(strategy.should_invalidate(&cache, InvalidationTrigger::Manual));
/// assert!(!strategy.should_invalidate(&cache, InvalidationTrigger::FileChange));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationStrategy {
    /// Fires on `time_based` triggers once the cache is older than `max_age`.
    TimeBased {
        /// Maximum cache age. Zero means the cache is never trusted.
        max_age: Duration,
    },
    /// Fires on any of the listed triggers.
    TriggerBased {
        /// Triggers that discard the cache.
        triggers: Vec<InvalidationTrigger>,
    },
    /// Fires when any member fires.
    Composite(Vec<InvalidationStrategy>),
}

impl Default for InvalidationStrategy {
    /// Only manual reloads discard the cache.
    fn default() -> Self {
        Self::trigger_based([InvalidationTrigger::Manual])
    }
}

impl InvalidationStrategy {
    /// Creates a time-based strategy.
    pub fn time_based(max_age: Duration) -> Self {
        Self::TimeBased { max_age }
    }

    /// Creates a trigger-based strategy.
    pub fn trigger_based(triggers: impl IntoIterator<Item = InvalidationTrigger>) -> Self {
        Self::TriggerBased { triggers: triggers.into_iter().collect() }
    }

    /// Creates a composite strategy.
    pub fn composite(strategies: impl IntoIterator<Item = InvalidationStrategy>) -> Self {
        Self::Composite(strategies.into_iter().collect())
    }

    /// Returns `true` if the trigger should discard the cache.
    pub fn should_invalidate(
        &self,
        cache: &ConfigurationCache,
        trigger: InvalidationTrigger,
    ) -> bool {
        match self {
            Self::TimeBased { max_age } => {
                if trigger != InvalidationTrigger::TimeBased {
                    return false;
                }
                match cache.age() {
                    None => true,
                    Some(_) if max_age.is_zero() => true,
                    Some(age) => age > *max_age,
                }
            },
            Self::TriggerBased { triggers } => triggers.contains(&trigger),
            Self::Composite(strategies) => {
                strategies.iter().any(|s| s.should_invalidate(cache, trigger))
            },
        }
    }

    /// Discards the cache. Identical for every strategy.
    pub fn invalidate(&self, cache: &ConfigurationCache) {
        cache.invalidate();
    }
}

/// Builds a strategy from options.
///
/// Both `max_age` and `trigger_events` give a composite; either alone gives
/// the matching strategy; neither gives the default manual-only strategy.
pub fn create_invalidation_strategy(options: &InvalidationOptions) -> InvalidationStrategy {
    match (options.max_age, &options.trigger_events) {
        (Some(max_age), Some(triggers)) => InvalidationStrategy::composite([
            InvalidationStrategy::time_based(max_age),
            InvalidationStrategy::trigger_based(triggers.iter().copied()),
        ]),
        (Some(max_age), None) => InvalidationStrategy::time_based(max_age),
        (None, Some(triggers)) => InvalidationStrategy::trigger_based(triggers.iter().copied()),
        (None, None) => InvalidationStrategy::default(),
    }
}

/// Decides whether `trigger` should discard `cache`.
///
/// An `error` trigger always invalidates, whatever the strategy. An already
/// invalid cache is never invalidated again.
pub fn should_invalidate(
    cache: &ConfigurationCache,
    trigger: InvalidationTrigger,
    options: &InvalidationOptions,
) -> bool {
    if trigger == InvalidationTrigger::Error {
        return true;
    }
    if !cache.is_valid() {
        return false;
    }
    create_invalidation_strategy(options).should_invalidate(cache, trigger)
}

/// Invalidates `cache` if [`should_invalidate`] says so.
///
/// Returns `true` if the cache was invalidated.
pub fn perform_invalidation(
    cache: &ConfigurationCache,
    trigger: InvalidationTrigger,
    options: &InvalidationOptions,
) -> bool {
    if !should_invalidate(cache, trigger, options) {
        return false;
    }

    create_invalidation_strategy(options).invalidate(cache);
    tracing::info!(component = "cache_invalidation", %trigger, "provider cache invalidated");
    true
}
