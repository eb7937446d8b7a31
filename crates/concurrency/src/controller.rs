//! Concurrency controller: ETag compare-and-swap for Set and Delete
//!
//! ## Set
//!
//! | Stored row | ETag | Outcome |
//! |------------|------|---------|
//! | absent | none | insert, `updatedate` NULL |
//! | present | none | overwrite, `updatedate` = now |
//! | absent | some | `ETagOnInsert` |
//! | present | malformed | `MalformedETag` |
//! | present | stale | `Conflict`, nothing written |
//! | present | current | update, new version |
//!
//! ## Delete
//!
//! | Stored row | ETag | Outcome |
//! |------------|------|---------|
//! | any | none | delete if present, never fails |
//! | any | malformed | `MalformedETag` |
//! | absent or stale | some | `Conflict` |
//! | present | current | delete |
//!
//! The compare step is always one conditional statement
//! (`... WHERE key = ? AND version = ?`) whose affected-row count decides the
//! outcome. The controller holds no lock of its own. For the Set path with an
//! etag, the existence probe that tells `ETagOnInsert` apart from `Conflict`
//! must share a transaction with the conditional update; callers run it inside
//! [`SqliteSurface::with_write_transaction`](statestore_storage::SqliteSurface::with_write_transaction).

use chrono::Utc;
use rusqlite::Connection;
use statestore_core::{
    validate_key, DeleteRequest, ETag, Error, Operation, Record, Result, SetRequest, Version,
};
use statestore_storage::RowAccessor;
use tracing::debug;

/// Applies single-item reads and guarded writes through a [`RowAccessor`]
#[derive(Debug, Clone)]
pub struct ConcurrencyController {
    rows: RowAccessor,
}

impl ConcurrencyController {
    /// Create a controller over `rows`
    pub fn new(rows: RowAccessor) -> Self {
        Self { rows }
    }

    /// Row accessor used by this controller
    pub fn rows(&self) -> &RowAccessor {
        &self.rows
    }

    /// Read `key`; a missing key is `Ok(None)`
    pub fn get(&self, conn: &Connection, key: &str) -> Result<Option<Record>> {
        validate_key(key)?;
        self.rows.get(conn, key)
    }

    /// Write one key, honoring the request's etag
    ///
    /// Returns the etag of the new version.
    pub fn set(&self, conn: &Connection, req: &SetRequest) -> Result<ETag> {
        validate_key(&req.key)?;
        let now = Utc::now();
        let version = Version::generate();

        match req.etag() {
            None => {
                self.rows.upsert(conn, &req.key, &req.value, version, now)?;
            }
            Some(token) => {
                if self.rows.version_of(conn, &req.key)?.is_none() {
                    return Err(Error::ETagOnInsert {
                        key: req.key.clone(),
                    });
                }
                let expected = ETag::parse(token)?;
                let affected = self.rows.update_if_version(
                    conn,
                    &req.key,
                    &req.value,
                    expected.version(),
                    version,
                    now,
                )?;
                if affected == 0 {
                    debug!(target: "statestore::cas", key = %req.key, "Set rejected: etag mismatch");
                    return Err(Error::conflict(&req.key));
                }
            }
        }

        Ok(ETag::from(version))
    }

    /// Delete one key, honoring the request's etag
    pub fn delete(&self, conn: &Connection, req: &DeleteRequest) -> Result<()> {
        validate_key(&req.key)?;

        match req.etag() {
            None => {
                self.rows.delete(conn, &req.key)?;
            }
            Some(token) => {
                let expected = ETag::parse(token)?;
                if self
                    .rows
                    .delete_if_version(conn, &req.key, expected.version())?
                    == 0
                {
                    debug!(target: "statestore::cas", key = %req.key, "Delete rejected: etag mismatch or missing row");
                    return Err(Error::conflict(&req.key));
                }
            }
        }

        Ok(())
    }

    /// Apply one batch step; sets yield their new etag, deletes yield `None`
    pub fn apply(&self, conn: &Connection, op: &Operation) -> Result<Option<ETag>> {
        match op {
            Operation::Set(req) => self.set(conn, req).map(Some),
            Operation::Delete(req) => self.delete(conn, req).map(|()| None),
        }
    }
}
