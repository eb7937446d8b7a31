//! State Store Comprehensive Test Suite
//!
//! End-to-end coverage of the public `StateStore` API against real SQLite
//! databases, from configuration through etag semantics to concurrent writers.
//!
//! ## Modules
//!
//! - `basic_ops`: get, set, delete without etags
//! - `etag_ops`: compare-and-swap on set and delete
//! - `bulk_ops`: bulk_set, bulk_delete, bulk_get, transact
//! - `lifecycle`: init, ping, features, close
//! - `timestamps`: insert and update dates
//! - `concurrency`: racing writers, in one store and across stores
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test state_store_comprehensive
//!
//! # Run etag tests only
//! cargo test --test state_store_comprehensive etag_ops::
//!
//! # Run with log output
//! RUST_LOG=statestore=debug cargo test --test state_store_comprehensive -- --nocapture
//! ```

use std::path::PathBuf;
use std::sync::Once;

use statestore::{Properties, StateStore, CONNECTION_STRING_KEY};
use tempfile::TempDir;

pub mod basic_ops;
pub mod bulk_ops;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

static TRACING: Once = Once::new();

/// Install a test log subscriber once per process
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Properties with only a connection string
pub fn props_for(connection_string: &str) -> Properties {
    let mut props = Properties::new();
    props.insert(
        CONNECTION_STRING_KEY.to_string(),
        connection_string.to_string(),
    );
    props
}

/// Create an initialized in-memory store (fastest, no persistence)
pub fn quick_setup() -> StateStore {
    init_tracing();
    let store = StateStore::new();
    store
        .init(&props_for(":memory:"))
        .expect("in-memory init should succeed");
    store
}

/// File-backed database that can be opened by several stores
pub struct TestDb {
    pub dir: TempDir,
}

impl TestDb {
    /// Create an empty temp directory for the database file
    pub fn new() -> Self {
        init_tracing();
        TestDb {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Path of the database file
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("state.db")
    }

    /// Properties pointing at the database file
    pub fn props(&self) -> Properties {
        props_for(&self.path().to_string_lossy())
    }

    /// Open a new, independently initialized store on the file
    pub fn open(&self) -> StateStore {
        let store = StateStore::new();
        store.init(&self.props()).expect("file init should succeed");
        store
    }
}

impl Default for TestDb {
    fn default() -> Self {
        Self::new()
    }
}
