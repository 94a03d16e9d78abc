//! Integration tests for the provider configuration pipeline.
//!
//! Every test drives time explicitly: backoff sleeps run on tokio's paused
//! clock and component timestamps come from a [`ManualClock`], so the suite
//! never waits in real time.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test integration
//!
//! # With pipeline logs
//! RUST_LOG=provider_config=debug cargo test --test integration -- --nocapture
//! ```
//!
//! [`ManualClock`]: provider_config::testing::ManualClock

mod circuit_tests;
mod common;
mod concurrency_tests;
mod invalidation_tests;
mod logging_tests;
mod pipeline_tests;
