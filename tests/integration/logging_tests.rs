//! Pipeline events reach an injected `tracing` subscriber.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use provider_config::testing::{ManualClock, ScriptedLoader};
use provider_config::{ResilienceConfig, ResilienceLayer};

use crate::common::sample_providers;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_degraded_load_is_logged() {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let clock = Arc::new(ManualClock::new());
    let layer = ResilienceLayer::with_clock(ResilienceConfig::default(), clock);
    let loader = ScriptedLoader::new().then_ok(sample_providers().unwrap()).otherwise_err("EBUSY");

    layer.load_with_resilience("providers.json", || loader.load()).await.unwrap();
    layer.load_with_resilience("providers.json", || loader.load()).await.unwrap();

    let logs = captured.contents();
    assert!(logs.contains("retrying after failure"), "{logs}");
    assert!(logs.contains("serving fallback"), "{logs}");
    assert!(logs.contains("component=\"resilience_layer\""), "{logs}");
    assert!(logs.contains("providers.json"), "{logs}");
}

#[tokio::test(start_paused = true)]
async fn test_logging_does_not_change_results() {
    let layer = ResilienceLayer::default();
    let loader = ScriptedLoader::new().then_ok(sample_providers().unwrap()).otherwise_err("EBUSY");

    layer.load_with_resilience("k", || loader.load()).await.unwrap();
    let served = layer.load_with_resilience("k", || loader.load()).await.unwrap();
    assert_eq!(served.len(), 2);
}
