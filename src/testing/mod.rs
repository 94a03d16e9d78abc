//! Testing utilities for the provider configuration pipeline.
//!
//! - [`ManualClock`]: a clock that only moves when advanced
//! - [`ScriptedLoader`]: a load operation that replays queued results and
//!   counts how often it was invoked
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use provider_config::testing::{ManualClock, ScriptedLoader};
//! use provider_config::{ProviderDefinition, ResilienceConfig, ResilienceLayer};
//!
//! let clock = Arc::new(ManualClock::new());
//! let layer = ResilienceLayer::with_clock(ResilienceConfig::default(), clock.clone());
//! let loader = ScriptedLoader::new()
//!     .then_ok(vec![ProviderDefinition::new("openai", "OpenAI")])
//!     .otherwise_err("EBUSY");
//!
//! let providers = layer.load_with_resilience("providers", || loader.load()).await?;
//! ```

mod clock;
mod loader;

pub use clock::ManualClock;
pub use loader::ScriptedLoader;
