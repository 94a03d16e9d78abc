//! A scripted load operation for exercising the pipeline.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::types::ProviderDefinition;
use crate::{Error, ErrorKind};

/// One scripted response. Errors are rebuilt on every call because
/// [`Error`] is not `Clone`.
#[derive(Debug, Clone)]
enum Step {
    Ok(Vec<ProviderDefinition>),
    Err { kind: ErrorKind, code: Option<String>, message: String },
}

impl Step {
    fn err(kind: ErrorKind, code: Option<&str>, message: &str) -> Self {
        Step::Err { kind, code: code.map(str::to_string), message: message.to_string() }
    }

    fn into_result(self) -> Result<Vec<ProviderDefinition>, Error> {
        match self {
            Step::Ok(providers) => Ok(providers),
            Step::Err { kind, code, message } => {
                let err = Error::new(kind, message);
                Err(match code {
                    Some(code) => err.with_code(code),
                    None => err,
                })
            },
        }
    }
}

#[derive(Debug)]
struct LoaderState {
    script: VecDeque<Step>,
    otherwise: Step,
    latency: Duration,
    calls: usize,
}

/// A load operation that replays queued responses and counts its calls.
///
/// Once the queue is drained, every call returns the `otherwise` response
/// (by default an unknown error).
///
/// ## Example
///
/// ```rust,ignore
/// use provider_config::testing::ScriptedLoader;
/// use provider_config::ProviderDefinition;
///
/// let loader = ScriptedLoader::new()
///     .then_ok(vec![ProviderDefinition::new("openai", "OpenAI")])
///     .otherwise_err("EBUSY");
///
/// assert!(loader.load().await.is_ok());
/// assert!(loader.load().await.is_err());
/// assert_eq!(loader.calls(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedLoader {
    state: Arc<Mutex<LoaderState>>,
}

impl Default for ScriptedLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedLoader {
    /// Creates a loader with an empty script.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LoaderState {
                script: VecDeque::new(),
                otherwise: Step::err(ErrorKind::Unknown, None, "script exhausted"),
                latency: Duration::ZERO,
                calls: 0,
            })),
        }
    }

    /// Creates a loader that always succeeds with `providers`.
    pub fn always_ok(providers: Vec<ProviderDefinition>) -> Self {
        Self::new().otherwise_ok(providers)
    }

    /// Creates a loader that always fails with an I/O error carrying `code`.
    pub fn always_err(code: &str) -> Self {
        Self::new().otherwise_err(code)
    }

    fn push(self, step: Step) -> Self {
        self.state.lock().script.push_back(step);
        self
    }

    /// Queues a successful response.
    #[must_use]
    pub fn then_ok(self, providers: Vec<ProviderDefinition>) -> Self {
        self.push(Step::Ok(providers))
    }

    /// Queues an I/O failure carrying `code`.
    #[must_use]
    pub fn then_err(self, code: &str) -> Self {
        self.push(Step::err(ErrorKind::Io, Some(code), "scripted i/o failure"))
    }

    /// Queues a failure of the given kind without a code.
    #[must_use]
    pub fn then_err_kind(self, kind: ErrorKind) -> Self {
        self.push(Step::err(kind, None, "scripted failure"))
    }

    /// Sets the response used once the script is drained.
    #[must_use]
    pub fn otherwise_ok(self, providers: Vec<ProviderDefinition>) -> Self {
        self.state.lock().otherwise = Step::Ok(providers);
        self
    }

    /// Sets an I/O failure as the response used once the script is drained.
    #[must_use]
    pub fn otherwise_err(self, code: &str) -> Self {
        self.state.lock().otherwise = Step::err(ErrorKind::Io, Some(code), "scripted i/o failure");
        self
    }

    /// Makes every call take `latency` before answering.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.state.lock().latency = latency;
        self
    }

    /// Returns how many times the loader has been called.
    pub fn calls(&self) -> usize {
        self.state.lock().calls
    }

    /// Runs one scripted load.
    pub fn load(
        &self,
    ) -> impl Future<Output = Result<Vec<ProviderDefinition>, Error>> + Send + 'static {
        let state = Arc::clone(&self.state);
        async move {
            let (step, latency) = {
                let mut state = state.lock();
                state.calls += 1;
                let step = state.script.pop_front().unwrap_or_else(|| state.otherwise.clone());
                (step, state.latency)
            };
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            step.into_result()
        }
    }
}
