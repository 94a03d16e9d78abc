//! # provider-config
//!
//! Resilient loading, caching and fallback for provider definitions.
//!
//! Applications that talk to several external model providers keep a list of
//! [`ProviderDefinition`]s: ids, display names, models and the schema of the
//! settings each provider needs. This crate loads that list through a
//! caller-supplied async operation and keeps serving it when the source
//! misbehaves.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use provider_config::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), provider_config::Error> {
//!     let service = ProviderService::new(
//!         "providers.json",
//!         ResilienceLayer::new(ResilienceConfig::default()),
//!         InvalidationOptions::default(),
//!     );
//!
//!     let providers = service.providers(|| async {
//!         let bytes = tokio::fs::read("providers.json").await?;
//!         Ok(serde_json::from_slice(&bytes)?)
//!     })
//!     .await?;
//!
//!     println!("{} providers", providers.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Key Concepts
//!
//! - **Pipeline**: [`RetryHandler`] → [`CircuitBreaker`] → load operation, with
//!   [`FallbackManager`] answering when every attempt fails
//! - **Classification**: [`ErrorClassifier`] retries only recognized transient
//!   codes (`ENOENT`, `EBUSY`, ...); unknown errors are not retried
//! - **Caching**: [`ConfigurationCache`] holds the last validated list and an
//!   [`InvalidationStrategy`] decides when to discard it
//! - **Sharing**: cloning a component shares its state; constructing a new
//!   one isolates it
//! - **Logging**: components emit `tracing` events; install a subscriber to
//!   see them

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

// Core modules
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod resilience;
pub mod types;

mod service;

// Testing utilities
pub mod testing;

// Prelude for convenient imports
pub mod prelude;

// Re-export main types at crate root for convenience
pub use cache::{
    CacheStats, ConfigurationCache, InvalidationStrategy, InvalidationTrigger,
    create_invalidation_strategy, perform_invalidation, should_invalidate,
};
pub use config::{
    CircuitBreakerConfig, CircuitState, CircuitStats, FallbackConfig, InvalidationOptions,
    ResilienceConfig, RetryConfig,
};
pub use error::{Error, ErrorCategory, ErrorClassifier, ErrorKind, Result};
pub use resilience::{
    CircuitBreaker, FallbackManager, FallbackStats, LoadOutcome, LoadSource, ResilienceLayer,
    ResilienceMetrics, RetryHandler,
};
pub use service::ProviderService;
pub use types::{ConfigField, FieldType, ProviderDefinition, validate_providers};
