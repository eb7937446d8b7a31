//! Core types for the state store
//!
//! This crate defines the foundational types used throughout the system:
//! - Error: Error type hierarchy and its classification
//! - Version: Row version, regenerated on every write
//! - ETag: Opaque token form of a version (the codec)
//! - Record, SetRequest, DeleteRequest, Operation: the data model

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod contract;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use contract::{ETag, Version};
pub use error::{BoxError, Error, ErrorKind, Result, ERR_MISSING_CONNECTION_STRING};
pub use types::{validate_key, DeleteRequest, Operation, Record, SetRequest};
