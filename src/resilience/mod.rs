//! Fault tolerance around the provider load operation.
//!
//! A load call flows through three stages:
//!
//! ```text
//! RetryHandler ─▶ CircuitBreaker ─▶ load operation
//!      │
//!      └─ all attempts failed ─▶ FallbackManager
//! ```
//!
//! [`ResilienceLayer`] wires them together and keeps [`ResilienceMetrics`].
//! The stages are usable on their own as well.

mod circuit_breaker;
mod fallback;
mod layer;
mod metrics;
mod retry;

pub use circuit_breaker::CircuitBreaker;
pub use fallback::{FallbackManager, FallbackStats};
pub use layer::{LoadOutcome, LoadSource, ResilienceLayer};
pub use metrics::ResilienceMetrics;
pub use retry::RetryHandler;
