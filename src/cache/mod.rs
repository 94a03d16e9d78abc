//! Provider cache and its invalidation policies.
//!
//! - [`ConfigurationCache`]: last known-good provider set with explicit staleness
//! - [`InvalidationStrategy`]: decides when a trigger discards the cache
//! - [`should_invalidate`] / [`perform_invalidation`]: top-level decision,
//!   with the `error` trigger special-cased above any strategy

mod invalidation;
mod store;

pub use invalidation::{
    InvalidationStrategy, InvalidationTrigger, create_invalidation_strategy, perform_invalidation,
    should_invalidate,
};
pub use store::{CacheStats, ConfigurationCache};
