//! Configuration types for the provider configuration pipeline.
//!
//! This module provides configuration options for:
//! - [`RetryConfig`]: Retry behavior for transient failures
//! - [`CircuitBreakerConfig`]: Circuit breaker for repeated faults
//! - [`FallbackConfig`]: Last-known-good fallback store
//! - [`InvalidationOptions`]: When the provider cache is discarded
//! - [`ResilienceConfig`]: Everything the resilience layer needs

mod circuit_breaker;
mod fallback;
mod invalidation;
mod resilience;
mod retry;

pub use circuit_breaker::{CircuitBreakerConfig, CircuitState, CircuitStats};
pub use fallback::FallbackConfig;
pub use invalidation::InvalidationOptions;
pub use resilience::ResilienceConfig;
pub use retry::RetryConfig;
