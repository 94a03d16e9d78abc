//! Cache invalidation options.

use std::time::Duration;

use crate::cache::InvalidationTrigger;

/// Options from which an [`InvalidationStrategy`] is built.
///
/// | `max_age` | `trigger_events` | Strategy                      |
/// |-----------|------------------|-------------------------------|
/// | set       | set              | `Composite(TimeBased, TriggerBased)` |
/// | set       | unset            | `TimeBased`                   |
/// | unset     | set              | `TriggerBased`                |
/// | unset     | unset            | `TriggerBased([manual])`      |
///
/// ## Example
///
/// ```rust
/// use provider_config::{InvalidationOptions, InvalidationTrigger};
/// use std::time::Duration;
///
/// let options = InvalidationOptions::builder()
///     .max_age(Duration::from_secs(5))
///     .trigger_events(vec![InvalidationTrigger::Manual])
///     .build();
/// ```
///
/// [`InvalidationStrategy`]: crate::cache::InvalidationStrategy
#[derive(Debug, Clone, Default, bon::Builder)]
pub struct InvalidationOptions {
    /// Age after which a `time_based` trigger discards the cache.
    ///
    /// `Duration::ZERO` means the cache is never trusted.
    pub max_age: Option<Duration>,

    /// Triggers that always discard the cache.
    pub trigger_events: Option<Vec<InvalidationTrigger>>,
}
