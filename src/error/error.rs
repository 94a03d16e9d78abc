//! Main error type for the provider configuration pipeline.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use super::ErrorKind;

/// The error type returned by load operations and the resilience pipeline.
///
/// `Error` carries enough context for the [`ErrorClassifier`] to decide
/// whether a failure is worth retrying:
/// - [`kind()`](Error::kind): structural category
/// - [`code()`](Error::code): optional system error code such as `ENOENT`
/// - [`retry_after()`](Error::retry_after): time until an open circuit admits a probe
///
/// ```text
/// Error
/// ├── kind: ErrorKind          (category for matching)
/// ├── message: String          (human-readable description)
/// ├── code: Option             (system error code, e.g. "EBUSY")
/// ├── retry_after: Option      (circuit breaker delay hint)
/// └── source: Option           (underlying cause)
/// ```
///
/// ## Example
///
/// ```rust
/// use provider_config::{Error, ErrorKind};
///
/// let err = Error::io("EBUSY", "providers.json is locked");
/// assert_eq!(err.kind(), ErrorKind::Io);
/// assert_eq!(err.code(), Some("EBUSY"));
/// ```
///
/// [`ErrorClassifier`]: crate::error::ErrorClassifier
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    code: Option<String>,
    retry_after: Option<Duration>,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Error {
    /// Creates a new error with the given kind and message.
    ///
    /// # Example
    ///
    /// ```rust
    /// use provider_config::{Error, ErrorKind};
    ///
    /// let err = Error::new(ErrorKind::Validation, "provider id cannot be empty");
    /// assert_eq!(err.kind(), ErrorKind::Validation);
    /// assert!(err.code().is_none());
    /// ```
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self { kind, message: message.into(), code: None, retry_after: None, source: None }
    }

    /// Creates an error from a kind with a default message.
    pub fn from_kind(kind: ErrorKind) -> Self {
        let message = match kind {
            ErrorKind::Io => "i/o operation failed",
            ErrorKind::Parse => "malformed configuration data",
            ErrorKind::Validation => "invalid provider definitions",
            ErrorKind::CircuitOpen => "circuit breaker open",
            ErrorKind::Configuration => "configuration error",
            ErrorKind::Unknown => "unknown error",
        };
        Self::new(kind, message)
    }

    /// Returns the error kind for categorization.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human-readable message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the system error code, if the failure carried one.
    #[inline]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Returns how long until the circuit breaker admits the next call.
    ///
    /// Only populated for [`ErrorKind::CircuitOpen`] errors.
    #[inline]
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    /// Returns `true` if the circuit breaker rejected the call.
    #[inline]
    pub fn is_circuit_open(&self) -> bool {
        self.kind == ErrorKind::CircuitOpen
    }

    /// Sets the system error code for this error.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the retry-after duration for this error.
    #[must_use]
    pub fn with_retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    /// Sets the source error for this error.
    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors for common error types

    /// Creates an I/O error carrying a system error code.
    pub fn io(code: impl Into<String>, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Io, message).with_code(code)
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Creates a circuit open error for the named resource.
    pub fn circuit_open(resource: &str, retry_after: Duration) -> Self {
        Self::new(
            ErrorKind::CircuitOpen,
            format!("circuit for '{}' is open, next attempt in {:?}", resource, retry_after),
        )
        .with_retry_after(retry_after)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Creates an error of unknown kind.
    pub fn unknown(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;

        if let Some(ref code) = self.code {
            write!(f, " (code: {})", code)?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::from_kind(kind)
    }
}

/// Maps an [`std::io::ErrorKind`] to the POSIX-style code the classifier understands.
fn io_error_code(kind: std::io::ErrorKind) -> Option<&'static str> {
    use std::io::ErrorKind as Io;
    let code = match kind {
        Io::NotFound => "ENOENT",
        Io::PermissionDenied => "EACCES",
        Io::TimedOut => "ETIMEDOUT",
        Io::ConnectionReset => "ECONNRESET",
        Io::ConnectionRefused => "ECONNREFUSED",
        Io::WouldBlock => "EAGAIN",
        Io::ResourceBusy => "EBUSY",
        Io::ReadOnlyFilesystem => "EROFS",
        Io::IsADirectory => "EISDIR",
        Io::NotADirectory => "ENOTDIR",
        Io::AlreadyExists => "EEXIST",
        Io::Interrupted => "EINTR",
        _ => return None,
    };
    Some(code)
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::InvalidData {
            return Error::parse(err.to_string()).with_source(err);
        }

        let mut error = Error::new(ErrorKind::Io, err.to_string());
        if let Some(code) = io_error_code(err.kind()) {
            error = error.with_code(code);
        }
        error.with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::parse(format!("JSON error: {}", err)).with_source(err)
    }
}
