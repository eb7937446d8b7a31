//! Core types for the state store
//!
//! This module defines the foundational types:
//! - Record: a stored row as seen by callers
//! - SetRequest / DeleteRequest: single-item write requests
//! - Operation: one step of a transactional batch

use crate::contract::ETag;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Check that a key can be stored
///
/// # Errors
///
/// `Error::InvalidKey` if the key is empty.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidKey("key must not be empty".to_string()));
    }
    Ok(())
}

/// A stored record
///
/// ## Invariants
///
/// - `inserted_at` is set once, when the key is created
/// - `updated_at` is `None` until the first update
/// - `etag` changes on every successful write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique key
    pub key: String,
    /// Stored JSON value
    pub value: serde_json::Value,
    /// Version token of this record
    pub etag: ETag,
    /// Creation time
    pub inserted_at: DateTime<Utc>,
    /// Time of the last update, if any
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Deserialize the stored value into `T`
    pub fn value_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.value.clone())?)
    }
}

/// Write request for a single key
///
/// `etag` is the raw token supplied by the caller. `None` and `""` both
/// mean "no precondition": the write becomes an upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRequest {
    /// Target key
    pub key: String,
    /// Value to store
    pub value: serde_json::Value,
    /// Expected current version, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl SetRequest {
    /// Create an unconditional set request
    pub fn new(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            value,
            etag: None,
        }
    }

    /// Create a set request from any serializable value
    pub fn from_serializable<T: Serialize>(key: impl Into<String>, value: &T) -> Result<Self> {
        Ok(Self::new(key, serde_json::to_value(value)?))
    }

    /// Require the stored version to match `etag`
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// The etag, with `""` normalized to `None`
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref().filter(|e| !e.is_empty())
    }
}

/// Delete request for a single key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeleteRequest {
    /// Target key
    pub key: String,
    /// Expected current version, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl DeleteRequest {
    /// Create an unconditional delete request
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            etag: None,
        }
    }

    /// Require the stored version to match `etag`
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// The etag, with `""` normalized to `None`
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref().filter(|e| !e.is_empty())
    }
}

/// One step of a transactional batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum Operation {
    /// Upsert or conditional update
    Set(SetRequest),
    /// Unconditional or conditional delete
    Delete(DeleteRequest),
}

impl Operation {
    /// Key this operation targets
    pub fn key(&self) -> &str {
        match self {
            Operation::Set(req) => &req.key,
            Operation::Delete(req) => &req.key,
        }
    }
}

impl From<SetRequest> for Operation {
    fn from(req: SetRequest) -> Self {
        Operation::Set(req)
    }
}

impl From<DeleteRequest> for Operation {
    fn from(req: DeleteRequest) -> Self {
        Operation::Delete(req)
    }
}
