//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use crate::Error;
use crate::config::RetryConfig;
use crate::error::ErrorClassifier;

/// Runs an operation up to `max_attempts` times, backing off between
/// attempts while the classifier deems the failure retryable.
///
/// The operation must be idempotent. The error of the last attempt is
/// returned unchanged.
///
/// ## Example
///
/// ```rust,ignore
/// use provider_config::{ErrorClassifier, RetryConfig, RetryHandler};
///
/// let handler = RetryHandler::new(RetryConfig::default(), ErrorClassifier::default());
/// let providers = handler.execute_with_retry("providers", || loader.load()).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RetryHandler {
    config: RetryConfig,
    classifier: ErrorClassifier,
}

impl RetryHandler {
    /// Creates a handler.
    pub fn new(config: RetryConfig, classifier: ErrorClassifier) -> Self {
        Self { config, classifier }
    }

    /// Returns the retry configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Returns the classifier.
    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    /// Runs `operation` with retries. `context` names it in logs.
    pub async fn execute_with_retry<T, F, Fut>(
        &self,
        context: &str,
        operation: F,
    ) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        self.execute_with_observer(context, operation, |_, _, _| {}).await
    }

    /// Like [`execute_with_retry`](Self::execute_with_retry), calling
    /// `on_retry(attempt, error, delay)` before each backoff sleep.
    ///
    /// `attempt` is the 1-based number of the attempt that just failed.
    pub async fn execute_with_observer<T, F, Fut, O>(
        &self,
        context: &str,
        mut operation: F,
        mut on_retry: O,
    ) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
        O: FnMut(u32, &Error, Duration),
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let category = self.classifier.classify(&err);
            if attempt >= max_attempts || !category.is_retryable() {
                tracing::debug!(
                    component = "retry_handler",
                    context,
                    attempt,
                    %category,
                    error = %err,
                    "giving up"
                );
                return Err(err);
            }

            let delay = self.config.delay_for_attempt(attempt);
            tracing::debug!(
                component = "retry_handler",
                context,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "retrying after failure"
            );
            on_retry(attempt, &err, delay);
            tokio::time::sleep(delay).await;
        }
    }
}
