//! Shared fixtures for the integration tests.

use std::sync::{Arc, Once};

use anyhow::{Context, Result};
use provider_config::testing::ManualClock;
use provider_config::{ProviderDefinition, ResilienceConfig, ResilienceLayer, validate_providers};

static TRACING: Once = Once::new();

/// Installs a test-writer subscriber once per test binary.
///
/// Honors `RUST_LOG`; silent by default.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// The provider file used throughout the suite, in its on-disk JSON shape.
pub const PROVIDERS_JSON: &str = r#"[
    {
        "id": "openai",
        "name": "OpenAI",
        "models": { "gpt-4o": "GPT-4o", "gpt-4o-mini": "GPT-4o mini" },
        "configFields": [
            { "key": "apiKey", "label": "API Key", "fieldType": "password", "required": true }
        ]
    },
    {
        "id": "ollama",
        "name": "Ollama",
        "models": { "llama3": "Llama 3" },
        "configFields": [
            {
                "key": "baseUrl",
                "label": "Base URL",
                "fieldType": "url",
                "defaultValue": "http://localhost:11434"
            }
        ]
    }
]"#;

/// Parses and validates [`PROVIDERS_JSON`].
pub fn sample_providers() -> Result<Vec<ProviderDefinition>> {
    let providers: Vec<ProviderDefinition> =
        serde_json::from_str(PROVIDERS_JSON).context("fixture JSON should parse")?;
    validate_providers(&providers).context("fixture providers should validate")?;
    Ok(providers)
}

/// A layer on a manual clock.
pub fn layer_with_clock(config: ResilienceConfig) -> (Arc<ManualClock>, ResilienceLayer) {
    init_tracing();
    let clock = Arc::new(ManualClock::new());
    (clock.clone(), ResilienceLayer::with_clock(config, clock))
}
