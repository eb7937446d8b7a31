//! Statestore - ETag-guarded key/value state over a SQLite table
//!
//! Every record carries an etag, an opaque token naming its current version.
//! Writers that pass the etag they last read only succeed if nobody wrote in
//! between; writers that pass none always win.
//!
//! # Quick Start
//!
//! ```ignore
//! use statestore::{Properties, SetRequest, StateStore};
//! use serde_json::json;
//!
//! let store = StateStore::new();
//! let mut props = Properties::new();
//! props.insert("connectionString".into(), "state.db".into());
//! store.init(&props)?;
//!
//! let etag = store.set(&SetRequest::new("user:123", json!({"name": "Alice"})))?;
//! let record = store.get("user:123")?.unwrap();
//! assert_eq!(record.etag, etag);
//! ```
//!
//! # Architecture
//!
//! - `statestore-core`: records, requests, etags and the error type
//! - `statestore-storage`: the SQLite surface and row statements
//! - `statestore-concurrency`: compare-and-swap and atomic batches
//! - `statestore-engine`: configuration and the [`StateStore`] lifecycle

pub use statestore_concurrency::{BulkExecutor, ConcurrencyController};
pub use statestore_core::{
    validate_key, BoxError, DeleteRequest, ETag, Error, ErrorKind, Operation, Record, Result,
    SetRequest, Version, ERR_MISSING_CONNECTION_STRING,
};
pub use statestore_engine::{
    Feature, Properties, StateStore, StoreConfig, CONNECTION_STRING_KEY, MAX_TIMEOUT_SECS,
    TABLE_NAME_KEY, TIMEOUT_KEY,
};
pub use statestore_storage::{SqliteSurface, SurfaceConfig, TableName, DEFAULT_TABLE_NAME};
