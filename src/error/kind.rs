//! Error kind enumeration for categorizing pipeline errors.

/// Categorization of pipeline errors.
///
/// `ErrorKind` describes the *shape* of a failure. Whether a failure is worth
/// retrying is decided by the [`ErrorClassifier`](crate::error::ErrorClassifier),
/// which combines the kind with the optional system error code carried by
/// [`Error`](crate::Error).
///
/// | ErrorKind       | Structural | Typical source                         |
/// |-----------------|------------|----------------------------------------|
/// | `Io`            | No         | File system, IPC, or socket failure    |
/// | `Parse`         | Yes        | Malformed configuration payload        |
/// | `Validation`    | Yes        | Well-formed but invalid definitions    |
/// | `CircuitOpen`   | No         | Breaker rejected the call              |
/// | `Configuration` | No         | Invalid pipeline settings              |
/// | `Unknown`       | No         | Anything else                          |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An I/O or system level failure, usually carrying a code like `ENOENT`.
    #[error("io error")]
    Io,

    /// The configuration payload could not be parsed.
    ///
    /// Always permanent: re-reading the same bytes yields the same failure.
    #[error("parse error")]
    Parse,

    /// The payload parsed, but the provider definitions are invalid.
    #[error("validation error")]
    Validation,

    /// The circuit breaker rejected the call without running it.
    #[error("circuit breaker open")]
    CircuitOpen,

    /// Invalid pipeline configuration.
    #[error("configuration error")]
    Configuration,

    /// Unknown or unexpected error.
    #[error("unknown error")]
    Unknown,
}

impl ErrorKind {
    /// Returns `true` for malformed or invalid data.
    ///
    /// Structural failures are never retried regardless of any error code.
    ///
    /// # Example
    ///
    /// ```rust
    /// use provider_config::ErrorKind;
    ///
    /// assert!(ErrorKind::Parse.is_structural());
    /// assert!(!ErrorKind::Io.is_structural());
    /// ```
    #[inline]
    pub fn is_structural(&self) -> bool {
        matches!(self, ErrorKind::Parse | ErrorKind::Validation)
    }
}
