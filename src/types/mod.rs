//! Core data types.
//!
//! - [`ProviderDefinition`]: an external service descriptor
//! - [`ConfigField`]: one entry of a provider's configuration schema
//! - [`FieldType`]: input type of a configuration field

mod provider;

pub use provider::{ConfigField, FieldType, ProviderDefinition, validate_providers};
