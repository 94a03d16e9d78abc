//! Error types for the provider configuration pipeline.
//!
//! - [`Error`]: the single error type produced by load operations and the pipeline
//! - [`ErrorKind`]: structural category of an error
//! - [`ErrorClassifier`]: decides whether an error is worth retrying
//!
//! ## Key Invariant
//!
//! When every recovery step fails, the pipeline returns the *original* error
//! from the load operation, never a wrapper, so callers can still inspect
//! its [`code()`](Error::code).

mod classifier;
#[allow(clippy::module_inception)]
mod error;
mod kind;

pub use classifier::{ErrorCategory, ErrorClassifier};
pub use error::Error;
pub use kind::ErrorKind;

/// A specialized `Result` type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
