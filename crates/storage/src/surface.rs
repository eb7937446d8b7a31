//! SQLite execution surface
//!
//! The surface owns the connection and offers two ways to run statements:
//!
//! 1. **Autocommit**: `surface.with_connection(|conn| { ... })`
//!    - Each statement commits on its own
//!
//! 2. **Transaction**: `surface.with_write_transaction(|conn| { ... })`
//!    - Commit when the closure returns `Ok`
//!    - Rollback when it returns `Err`, and on unwind (the transaction
//!      handle rolls back on drop)
//!
//! Closures always receive `&Connection`; a `Transaction` derefs to one, so
//! the same statement code runs in both modes.
//!
//! ## Thread Safety
//!
//! A SQLite connection cannot be used from two threads at once, so the
//! connection sits behind a mutex. Compare-and-swap correctness does not rely
//! on this mutex: conditional statements are evaluated by SQLite, which also
//! covers other connections writing the same database file.

use parking_lot::Mutex;
use rusqlite::{Connection, TransactionBehavior};
use statestore_core::{Error, Result};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Busy timeout used when the configuration does not set one
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(20);

/// Settings needed to establish the surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceConfig {
    /// SQLite path, `file:` URI, or `:memory:`
    pub connection_string: String,
    /// How long a statement waits on a locked database
    pub busy_timeout: Duration,
}

impl SurfaceConfig {
    /// Create a config with the default busy timeout
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

/// Transactional SQL execution surface backed by one SQLite connection
pub struct SqliteSurface {
    conn: Mutex<Connection>,
    descriptor: String,
}

impl std::fmt::Debug for SqliteSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSurface")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl SqliteSurface {
    /// Open the database named by the config
    ///
    /// Sets the busy timeout and switches file databases to WAL journaling.
    ///
    /// # Errors
    ///
    /// `Error::Configuration` for an empty connection string or a busy
    /// timeout SQLite cannot represent, `Error::Execution` if SQLite cannot
    /// open or configure the database.
    pub fn open(config: &SurfaceConfig) -> Result<Self> {
        if config.connection_string.is_empty() {
            return Err(Error::missing_connection_string());
        }
        if i32::try_from(config.busy_timeout.as_millis()).is_err() {
            return Err(Error::configuration(format!(
                "busy timeout of {}s does not fit in i32 milliseconds",
                config.busy_timeout.as_secs()
            )));
        }

        let conn = Connection::open(&config.connection_string).map_err(Error::execution)?;
        conn.busy_timeout(config.busy_timeout)
            .map_err(Error::execution)?;
        let journal_mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(Error::execution)?;

        info!(
            target: "statestore::surface",
            descriptor = %config.connection_string,
            journal_mode = %journal_mode,
            busy_timeout_ms = config.busy_timeout.as_millis() as u64,
            "Execution surface opened"
        );

        Ok(Self {
            conn: Mutex::new(conn),
            descriptor: config.connection_string.clone(),
        })
    }

    /// Connection string this surface was opened with
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Run `f` with the connection in autocommit mode
    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Run `f` inside a `BEGIN IMMEDIATE` transaction
    ///
    /// The write lock is taken up front, so a read inside `f` cannot be
    /// invalidated by another writer before `f`'s own writes land.
    pub fn with_write_transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        self.run_transaction(TransactionBehavior::Immediate, f)
    }

    /// Run `f` inside a deferred transaction, for consistent multi-row reads
    pub fn with_read_transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        self.run_transaction(TransactionBehavior::Deferred, f)
    }

    fn run_transaction<F, T>(&self, behavior: TransactionBehavior, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock();
        let txn = conn
            .transaction_with_behavior(behavior)
            .map_err(Error::execution)?;

        match f(&txn) {
            Ok(value) => {
                txn.commit().map_err(Error::execution)?;
                debug!(target: "statestore::surface", "Transaction committed");
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback() {
                    warn!(
                        target: "statestore::surface",
                        error = %rollback_err,
                        "Rollback failed"
                    );
                }
                debug!(target: "statestore::surface", error = %e, "Transaction rolled back");
                Err(e)
            }
        }
    }

    /// Check that the database answers a trivial query
    pub fn ping(&self) -> Result<()> {
        self.with_connection(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map_err(Error::execution)?;
            Ok(())
        })
    }

    /// Close the connection, reporting any error SQLite returns
    pub fn close(self) -> Result<()> {
        let conn = self.conn.into_inner();
        conn.close().map_err(|(_, e)| Error::execution(e))?;
        info!(target: "statestore::surface", descriptor = %self.descriptor, "Execution surface closed");
        Ok(())
    }
}
