//! Error types for the state store
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! ## Taxonomy
//!
//! | Kind | Variants | Retryable |
//! |------|----------|-----------|
//! | Configuration | `Configuration`, `AlreadyInitialized` | No |
//! | Validation | `MalformedETag`, `ETagOnInsert`, `InvalidKey`, `Serialization` | No (fix the call) |
//! | Conflict | `Conflict` | Yes, after re-reading |
//! | Execution | `Execution`, `Corruption`, `NotInitialized` | Surface-dependent |

use thiserror::Error;

/// Message of the error returned when the connection string is missing.
///
/// Stable: callers may match against it.
pub const ERR_MISSING_CONNECTION_STRING: &str = "missing connection string";

/// Boxed source error from the execution surface
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for state store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or invalid settings, fatal at init
    Configuration,
    /// Caller bug: malformed etag, etag on insert, bad key or value
    Validation,
    /// ETag mismatch, or conditional delete of a missing row
    Conflict,
    /// Failure reported by the execution surface
    Execution,
}

/// Error types for the state store
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration
    #[error("{0}")]
    Configuration(String),

    /// `init` was called on a store that already holds a surface
    #[error("state store is already initialized")]
    AlreadyInitialized,

    /// The store has not been initialized, or has been closed
    #[error("state store is not initialized")]
    NotInitialized,

    /// The caller-supplied etag does not decode to a version
    #[error("malformed etag '{etag}': {reason}")]
    MalformedETag {
        /// Token as supplied by the caller
        etag: String,
        /// Decoder message
        reason: String,
    },

    /// An etag was supplied for a key that has no stored row
    #[error("etag not allowed on insert: key '{key}' does not exist")]
    ETagOnInsert {
        /// Key of the rejected request
        key: String,
    },

    /// Key is empty or otherwise unusable
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Caller value could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The stored version does not match the expected one
    #[error("optimistic concurrency violation on key '{key}'")]
    Conflict {
        /// Key of the rejected request
        key: String,
    },

    /// A stored row does not decode; the table was written by something else
    #[error("corrupt row for key '{key}': {reason}")]
    Corruption {
        /// Key of the unreadable row
        key: String,
        /// What failed to decode
        reason: String,
    },

    /// Error reported by the execution surface, propagated verbatim
    #[error("execution error: {0}")]
    Execution(#[source] BoxError),
}

impl Error {
    /// Wrap an execution-surface error
    pub fn execution<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Execution(Box::new(err))
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create the stable missing-connection-string error
    pub fn missing_connection_string() -> Self {
        Error::Configuration(ERR_MISSING_CONNECTION_STRING.to_string())
    }

    /// Create a conflict error for `key`
    pub fn conflict(key: impl Into<String>) -> Self {
        Error::Conflict { key: key.into() }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) | Error::AlreadyInitialized => ErrorKind::Configuration,
            Error::MalformedETag { .. }
            | Error::ETagOnInsert { .. }
            | Error::InvalidKey(_)
            | Error::Serialization(_) => ErrorKind::Validation,
            Error::Conflict { .. } => ErrorKind::Conflict,
            Error::Execution(_) | Error::Corruption { .. } | Error::NotInitialized => {
                ErrorKind::Execution
            }
        }
    }

    /// Check if this is an optimistic concurrency conflict
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    /// Check if this is a caller-side validation failure
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Check if this is a configuration failure
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
