use std::{fmt, io};
use thiserror::Error;

/// Unified error type for all cfscan operations.
///
/// Fatal variants abort the current call on a scan node and leave it in a state
/// where only `close` is accepted. Per-value conversion failures are not
/// surfaced through this type during a scan; the scan node records them in its
/// error counter instead.
///
/// # Error Handling Strategy
///
/// Errors propagate upward with the `?` operator. Callers match on the variant
/// to decide whether a new scan node instance is worth constructing (for
/// example after [`Error::ScanUnavailable`]) or whether the plan itself is
/// broken (for example [`Error::SchemaError`]).
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error raised by a storage collaborator.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Arrow error while exporting a row batch to columnar form.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// The plan cannot be bound to the table.
    ///
    /// Raised during prepare when:
    /// - a requested slot does not map to a known column
    /// - two requested slots map to the same `(family, qualifier)` pair
    /// - the tuple layout is inconsistent (slots overrunning the tuple, bad
    ///   null indicators)
    ///
    /// The scan never starts.
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// An operation was invoked out of lifecycle order.
    ///
    /// This always signals caller misuse, e.g. opening a node that was never
    /// prepared, opening twice, or pulling batches after a fatal error.
    #[error("Invalid state: {0}")]
    InvalidStateError(String),

    /// The remote store could not be reached or the table does not exist.
    ///
    /// # Recovery
    ///
    /// The scan node does not retry. Callers that want to retry construct a
    /// fresh node.
    #[error("Scan unavailable: {0}")]
    ScanUnavailable(String),

    /// A textual value could not be converted to its slot type.
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// The configured batch memory cannot hold even a single tuple.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Internal error indicating a bug or unexpected state.
    #[error("An internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Create a schema error from any displayable value.
    ///
    /// # Examples
    ///
    /// ```
    /// use cfscan_result::Error;
    ///
    /// let err = Error::schema("slot 7 has no column");
    /// assert!(matches!(err, Error::SchemaError(msg) if msg.contains("slot 7")));
    /// ```
    #[inline]
    pub fn schema<E: fmt::Display>(err: E) -> Self {
        Error::SchemaError(err.to_string())
    }

    /// Create an invalid-state error from any displayable value.
    #[inline]
    pub fn invalid_state<E: fmt::Display>(err: E) -> Self {
        Error::InvalidStateError(err.to_string())
    }

    /// Create a scan-unavailable error from any displayable value.
    #[inline]
    pub fn scan_unavailable<E: fmt::Display>(err: E) -> Self {
        Error::ScanUnavailable(err.to_string())
    }

    /// Create a conversion error from any displayable value.
    ///
    /// # Examples
    ///
    /// ```
    /// use cfscan_result::Error;
    ///
    /// fn parse_port(input: &str) -> Result<u16, Error> {
    ///     input.parse::<u16>().map_err(Error::conversion)
    /// }
    ///
    /// assert_eq!(parse_port("8080").unwrap(), 8080);
    /// assert!(matches!(parse_port("eighty"), Err(Error::Conversion(_))));
    /// ```
    #[inline]
    pub fn conversion<E: fmt::Display>(err: E) -> Self {
        Error::Conversion(err.to_string())
    }

    /// Create a resource-exhausted error from any displayable value.
    #[inline]
    pub fn resource_exhausted<E: fmt::Display>(err: E) -> Self {
        Error::ResourceExhausted(err.to_string())
    }

    /// Returns `true` for errors after which the scan node only accepts `close`.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Conversion(_))
    }
}
