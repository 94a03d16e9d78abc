//! Fallback store configuration.

use std::time::Duration;

/// Configuration for the last-known-good fallback store.
///
/// A fallback entry is served only while it is younger than `max_age`.
/// Older entries count as absent, even though they are only physically
/// removed on the next write or read of that key.
///
/// ## Example
///
/// ```rust
/// use provider_config::FallbackConfig;
/// use std::time::Duration;
///
/// let config = FallbackConfig::builder()
///     .max_age(Duration::from_secs(600))
///     .max_entries(4)
///     .build();
/// ```
#[derive(Debug, Clone, bon::Builder)]
pub struct FallbackConfig {
    /// How long a stored result stays usable.
    #[builder(default = Duration::from_millis(300_000))]
    pub max_age: Duration,

    /// Maximum number of resource keys kept at once.
    #[builder(default = 10)]
    pub max_entries: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl FallbackConfig {
    /// Returns `true` if an entry stored `age` ago is past its usable life.
    pub fn is_expired(&self, age: Duration) -> bool {
        age > self.max_age
    }
}
