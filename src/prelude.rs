//! Prelude module for convenient imports.
//!
//! ```rust
//! use provider_config::prelude::*;
//! ```
//!
//! This provides access to:
//! - The resilience pipeline and its configuration
//! - The provider cache and invalidation types
//! - Error types
//! - Provider data types

pub use crate::{
    cache::{ConfigurationCache, InvalidationStrategy, InvalidationTrigger},
    config::{
        CircuitBreakerConfig, CircuitState, FallbackConfig, InvalidationOptions,
        ResilienceConfig, RetryConfig,
    },
    error::{Error, ErrorCategory, ErrorClassifier, ErrorKind, Result},
    resilience::{
        CircuitBreaker, FallbackManager, LoadOutcome, LoadSource, ResilienceLayer,
        ResilienceMetrics, RetryHandler,
    },
    service::ProviderService,
    types::{ConfigField, FieldType, ProviderDefinition},
};
