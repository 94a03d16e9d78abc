//! Classification of load failures into retry categories.

use std::collections::HashSet;

use super::{Error, ErrorKind};

/// System error codes that usually clear up on their own.
const TRANSIENT_CODES: &[&str] =
    &["ENOENT", "EBUSY", "EMFILE", "ENFILE", "ETIMEDOUT", "ECONNRESET", "EAGAIN"];

/// System error codes that will not change without outside intervention.
const PERMANENT_CODES: &[&str] = &["EACCES", "EPERM", "EROFS", "EISDIR", "ENOTDIR"];

/// Retry category of a failure.
///
/// | Category      | Retried | Falls back |
/// |---------------|---------|------------|
/// | `Transient`   | Yes     | Yes        |
/// | `Permanent`   | No      | Yes        |
/// | `CircuitOpen` | No      | Yes        |
/// | `Unknown`     | No      | Yes        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A recognized retryable system code.
    Transient,
    /// A recognized non-retryable code, or malformed data.
    Permanent,
    /// The circuit breaker rejected the call.
    CircuitOpen,
    /// No recognized code and no structural signature.
    Unknown,
}

impl ErrorCategory {
    /// Returns `true` if failures in this category should be retried.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Transient)
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Transient => write!(f, "transient"),
            ErrorCategory::Permanent => write!(f, "permanent"),
            ErrorCategory::CircuitOpen => write!(f, "circuit-open"),
            ErrorCategory::Unknown => write!(f, "unknown"),
        }
    }
}

/// Maps errors to an [`ErrorCategory`] using a code allowlist and denylist.
///
/// Classification is code-driven, with two overrides: structural failures
/// (parse and validation errors) are permanent whatever their code, and
/// circuit breaker rejections form their own category. Errors without a
/// recognized code are `Unknown` and are not retried.
///
/// ## Example
///
/// ```rust
/// use provider_config::{Error, ErrorCategory, ErrorClassifier};
///
/// let classifier = ErrorClassifier::default();
/// assert_eq!(classifier.classify(&Error::io("EBUSY", "locked")), ErrorCategory::Transient);
/// assert_eq!(classifier.classify(&Error::io("EACCES", "denied")), ErrorCategory::Permanent);
/// assert!(!classifier.is_retryable(&Error::unknown("???")));
/// ```
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    transient: HashSet<String>,
    permanent: HashSet<String>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self {
            transient: TRANSIENT_CODES.iter().map(|c| c.to_string()).collect(),
            permanent: PERMANENT_CODES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ErrorClassifier {
    /// Creates a classifier with the default code tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Treats an additional code as transient.
    #[must_use]
    pub fn with_transient_code(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        self.permanent.remove(&code);
        self.transient.insert(code);
        self
    }

    /// Treats an additional code as permanent.
    #[must_use]
    pub fn with_permanent_code(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        self.transient.remove(&code);
        self.permanent.insert(code);
        self
    }

    /// Classifies an error.
    pub fn classify(&self, error: &Error) -> ErrorCategory {
        if error.kind().is_structural() {
            return ErrorCategory::Permanent;
        }
        if error.kind() == ErrorKind::CircuitOpen {
            return ErrorCategory::CircuitOpen;
        }

        match error.code() {
            Some(code) if self.transient.contains(code) => ErrorCategory::Transient,
            Some(code) if self.permanent.contains(code) => ErrorCategory::Permanent,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Returns `true` if the error should be retried.
    ///
    /// Errors without a recognized code are never retried, even when they are
    /// logically transient.
    pub fn is_retryable(&self, error: &Error) -> bool {
        self.classify(error).is_retryable()
    }

    /// Returns a human-readable remediation hint for the error.
    ///
    /// The hint is advisory only and never influences control flow.
    pub fn suggested_action(&self, error: &Error) -> &'static str {
        let category = self.classify(error);
        match (category, error.code()) {
            (ErrorCategory::Permanent, _) if error.kind() == ErrorKind::Parse => {
                "Fix the syntax of the configuration source"
            },
            (ErrorCategory::Permanent, _) if error.kind() == ErrorKind::Validation => {
                "Correct the invalid provider definitions"
            },
            (ErrorCategory::Transient, Some("ENOENT")) => {
                "Ensure the configuration source exists; it may still be being written"
            },
            (ErrorCategory::Transient, Some("EBUSY")) => {
                "Wait for the process holding the configuration source to release it"
            },
            (ErrorCategory::Transient, Some("EMFILE" | "ENFILE")) => {
                "Close unused file handles or raise the open file limit"
            },
            (ErrorCategory::Transient, Some("ETIMEDOUT" | "ECONNRESET")) => {
                "Check connectivity to the configuration source"
            },
            (ErrorCategory::Transient, _) => "Retry the operation after a short delay",
            (ErrorCategory::Permanent, Some("EACCES" | "EPERM")) => {
                "Check permissions on the configuration source"
            },
            (ErrorCategory::Permanent, Some("EROFS")) => {
                "The file system is read-only; move the configuration to a writable location"
            },
            (ErrorCategory::Permanent, Some("EISDIR" | "ENOTDIR")) => {
                "Point the loader at a file rather than a directory"
            },
            (ErrorCategory::Permanent, _) => "Manual intervention is required",
            (ErrorCategory::CircuitOpen, _) => {
                "Wait for the circuit breaker recovery timeout before retrying"
            },
            (ErrorCategory::Unknown, _) => "Inspect the logs for details about this failure",
        }
    }
}
