//! StateStore: lifecycle and caller-facing API
//!
//! A store moves through three states:
//!
//! ```text
//! Uninitialized --init--> Ready --close--> Closed
//!       ^                   |
//!       +-- failed init ----+ (stays Uninitialized)
//! ```
//!
//! Every data operation needs `Ready` and otherwise fails with
//! `Error::NotInitialized`. `init` runs at most once successfully; a second
//! call fails with `Error::AlreadyInitialized`. `close` can be called in any
//! state, any number of times.
//!
//! ## Thread Safety
//!
//! `StateStore` is `Send + Sync`. Operations clone the ready handle under a
//! short read lock and then run without holding it, so `close` never waits
//! on a long batch; the connection is released once the last in-flight
//! operation finishes.

pub mod config;

pub use config::{
    Properties, StoreConfig, CONNECTION_STRING_KEY, MAX_TIMEOUT_SECS, TABLE_NAME_KEY, TIMEOUT_KEY,
};

use parking_lot::RwLock;
use statestore_concurrency::{BulkExecutor, ConcurrencyController};
use statestore_core::{DeleteRequest, ETag, Error, Operation, Record, Result, SetRequest};
use statestore_storage::{RowAccessor, SqliteSurface};
use std::sync::Arc;
use tracing::{debug, info, warn};

// ============================================================================
// Features
// ============================================================================

/// Capabilities advertised by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Writes and deletes accept an etag and are compare-and-swap guarded
    ETag,
    /// Mixed Set/Delete batches apply atomically
    Transactional,
}

impl Feature {
    /// Wire name of the feature
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::ETag => "ETAG",
            Feature::Transactional => "TRANSACTIONAL",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const FEATURES: &[Feature] = &[Feature::ETag, Feature::Transactional];

// ============================================================================
// StateStore
// ============================================================================

/// Everything an initialized store needs to serve requests
#[derive(Debug)]
struct Ready {
    surface: SqliteSurface,
    bulk: BulkExecutor,
    config: StoreConfig,
}

impl Ready {
    fn controller(&self) -> &ConcurrencyController {
        self.bulk.controller()
    }
}

#[derive(Debug)]
enum Lifecycle {
    Uninitialized,
    Ready(Arc<Ready>),
    Closed,
}

/// ETag-guarded key/value state store over a relational table
///
/// # Example
///
/// ```ignore
/// use statestore_engine::{Properties, StateStore};
/// use statestore_core::SetRequest;
///
/// let store = StateStore::new();
/// let mut props = Properties::new();
/// props.insert("connectionString".into(), ":memory:".into());
/// store.init(&props)?;
///
/// let etag = store.set(&SetRequest::new("k", serde_json::json!("v")))?;
/// store.set(&SetRequest::new("k", serde_json::json!("w")).with_etag(&etag))?;
/// store.close()?;
/// ```
#[derive(Debug)]
pub struct StateStore {
    state: RwLock<Lifecycle>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    /// Create an uninitialized store
    pub fn new() -> Self {
        Self {
            state: RwLock::new(Lifecycle::Uninitialized),
        }
    }

    /// Create a store and initialize it from a validated config
    pub fn open(config: StoreConfig) -> Result<Self> {
        let store = Self::new();
        store.init_with_config(config)?;
        Ok(store)
    }

    /// Validate `properties`, open the surface and create the table if needed
    ///
    /// # Errors
    ///
    /// - `Error::Configuration` (`missing connection string`) when
    ///   `connectionString` is absent or empty
    /// - `Error::AlreadyInitialized` on any call after a successful one
    /// - `Error::Execution` when the database cannot be opened or the table
    ///   cannot be created
    pub fn init(&self, properties: &Properties) -> Result<()> {
        let config = StoreConfig::from_properties(properties)?;
        self.init_with_config(config)
    }

    /// Same as [`init`](Self::init) for an already validated config
    pub fn init_with_config(&self, config: StoreConfig) -> Result<()> {
        let mut state = self.state.write();
        if !matches!(*state, Lifecycle::Uninitialized) {
            return Err(Error::AlreadyInitialized);
        }

        let surface = SqliteSurface::open(&config.surface_config())?;
        let rows = RowAccessor::new(config.table_name.clone());
        surface.with_connection(|conn| rows.ensure_table(conn))?;

        info!(
            target: "statestore::store",
            descriptor = %config.connection_string,
            table = %config.table_name,
            "State store initialized"
        );

        *state = Lifecycle::Ready(Arc::new(Ready {
            surface,
            bulk: BulkExecutor::new(ConcurrencyController::new(rows)),
            config,
        }));
        Ok(())
    }

    /// Whether the store is initialized and not closed
    pub fn is_open(&self) -> bool {
        matches!(*self.state.read(), Lifecycle::Ready(_))
    }

    /// Configuration the store was initialized with
    pub fn config(&self) -> Option<StoreConfig> {
        match &*self.state.read() {
            Lifecycle::Ready(ready) => Some(ready.config.clone()),
            _ => None,
        }
    }

    fn ready(&self) -> Result<Arc<Ready>> {
        match &*self.state.read() {
            Lifecycle::Ready(ready) => Ok(Arc::clone(ready)),
            _ => Err(Error::NotInitialized),
        }
    }

    // ========================================================================
    // Single-item operations
    // ========================================================================

    /// Read `key`; a missing key is `Ok(None)`, never an error
    pub fn get(&self, key: &str) -> Result<Option<Record>> {
        let ready = self.ready()?;
        debug!(target: "statestore::store", key = %key, "Get");
        ready
            .surface
            .with_connection(|conn| ready.controller().get(conn, key))
    }

    /// Write one key and return its new etag
    ///
    /// Without an etag the write is an upsert. With one, the key must exist
    /// and its current etag must match.
    pub fn set(&self, req: &SetRequest) -> Result<ETag> {
        let ready = self.ready()?;
        debug!(
            target: "statestore::store",
            key = %req.key,
            guarded = req.etag().is_some(),
            "Set"
        );
        ready
            .surface
            .with_write_transaction(|conn| ready.controller().set(conn, req))
    }

    /// Delete one key
    ///
    /// Without an etag, deleting a missing key succeeds. With one, the key
    /// must exist and its current etag must match.
    pub fn delete(&self, req: &DeleteRequest) -> Result<()> {
        let ready = self.ready()?;
        debug!(
            target: "statestore::store",
            key = %req.key,
            guarded = req.etag().is_some(),
            "Delete"
        );
        ready
            .surface
            .with_write_transaction(|conn| ready.controller().delete(conn, req))
    }

    // ========================================================================
    // Batches
    // ========================================================================

    /// Apply every set or none; etags come back in input order
    pub fn bulk_set(&self, requests: &[SetRequest]) -> Result<Vec<ETag>> {
        let ready = self.ready()?;
        ready.bulk.bulk_set(&ready.surface, requests)
    }

    /// Apply every delete or none
    pub fn bulk_delete(&self, requests: &[DeleteRequest]) -> Result<()> {
        let ready = self.ready()?;
        ready.bulk.bulk_delete(&ready.surface, requests)
    }

    /// Read several keys from one snapshot
    pub fn bulk_get<K: AsRef<str>>(&self, keys: &[K]) -> Result<Vec<Option<Record>>> {
        let ready = self.ready()?;
        ready.bulk.bulk_get(&ready.surface, keys)
    }

    /// Apply a mixed Set/Delete batch atomically
    pub fn transact(&self, operations: &[Operation]) -> Result<Vec<Option<ETag>>> {
        let ready = self.ready()?;
        ready.bulk.transact(&ready.surface, operations)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Check that the database answers
    pub fn ping(&self) -> Result<()> {
        self.ready()?.surface.ping()
    }

    /// Capabilities this store advertises
    pub fn features(&self) -> &'static [Feature] {
        FEATURES
    }

    /// Release the connection
    ///
    /// Safe in every state and on repeated calls. After `close`, data
    /// operations fail with `Error::NotInitialized`.
    pub fn close(&self) -> Result<()> {
        let previous = std::mem::replace(&mut *self.state.write(), Lifecycle::Closed);
        let ready = match previous {
            Lifecycle::Ready(ready) => ready,
            Lifecycle::Uninitialized | Lifecycle::Closed => return Ok(()),
        };

        match Arc::try_unwrap(ready) {
            Ok(ready) => {
                let descriptor = ready.config.connection_string.clone();
                ready.surface.close().map_err(|e| {
                    warn!(target: "statestore::store", error = %e, "Close failed");
                    e
                })?;
                info!(target: "statestore::store", descriptor = %descriptor, "State store closed");
            }
            Err(_) => {
                debug!(
                    target: "statestore::store",
                    "Operations still in flight, connection closes when they finish"
                );
            }
        }
        Ok(())
    }
}
