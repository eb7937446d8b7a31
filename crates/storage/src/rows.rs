//! Row accessor: single-row statements against the state table
//!
//! ## Persisted Layout
//!
//! | Column | Type | Notes |
//! |--------|------|-------|
//! | `key` | TEXT PRIMARY KEY | |
//! | `value` | TEXT | JSON text |
//! | `version` | TEXT | hyphenated UUID, regenerated on every write |
//! | `insertdate` | TEXT | set on insert only |
//! | `updatedate` | TEXT NULL | NULL until the first update |
//!
//! Every method takes `&Connection`, so it runs the same way in autocommit
//! mode and inside a transaction. Conditional writes are single statements
//! that report rows affected; the caller decides what zero rows means.

use crate::table::TableName;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use statestore_core::{ETag, Error, Record, Result, Version};
use uuid::Uuid;

/// Row as read back from the table, before conversion to a [`Record`]
struct RawRow {
    key: String,
    value: String,
    version: String,
    inserted_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

/// Issues single-row statements against one table
#[derive(Debug, Clone)]
pub struct RowAccessor {
    create_sql: String,
    select_sql: String,
    version_sql: String,
    exists_sql: String,
    upsert_sql: String,
    update_if_version_sql: String,
    delete_sql: String,
    delete_if_version_sql: String,
}

impl RowAccessor {
    /// Build the statements for `table`
    pub fn new(table: TableName) -> Self {
        let t = table.as_str();
        Self {
            create_sql: format!(
                "CREATE TABLE IF NOT EXISTS {t} (
                    key TEXT NOT NULL PRIMARY KEY,
                    value TEXT NOT NULL,
                    version TEXT NOT NULL,
                    insertdate TEXT NOT NULL,
                    updatedate TEXT NULL
                )"
            ),
            select_sql: format!(
                "SELECT key, value, version, insertdate, updatedate FROM {t} WHERE key = ?1"
            ),
            version_sql: format!("SELECT version FROM {t} WHERE key = ?1"),
            exists_sql: format!("SELECT EXISTS (SELECT 1 FROM {t} WHERE key = ?1)"),
            upsert_sql: format!(
                "INSERT INTO {t} (key, value, version, insertdate, updatedate)
                 VALUES (?1, ?2, ?3, ?4, NULL)
                 ON CONFLICT (key) DO UPDATE
                 SET value = excluded.value, version = excluded.version, updatedate = ?4"
            ),
            update_if_version_sql: format!(
                "UPDATE {t} SET value = ?2, version = ?3, updatedate = ?4
                 WHERE key = ?1 AND version = ?5"
            ),
            delete_sql: format!("DELETE FROM {t} WHERE key = ?1"),
            delete_if_version_sql: format!("DELETE FROM {t} WHERE key = ?1 AND version = ?2"),
        }
    }

    /// Create the table if it does not exist yet
    pub fn ensure_table(&self, conn: &Connection) -> Result<()> {
        conn.execute_batch(&self.create_sql)
            .map_err(Error::execution)
    }

    /// Read the full row for `key`
    pub fn get(&self, conn: &Connection, key: &str) -> Result<Option<Record>> {
        let raw = conn
            .prepare_cached(&self.select_sql)
            .map_err(Error::execution)?
            .query_row(params![key], |row| {
                Ok(RawRow {
                    key: row.get(0)?,
                    value: row.get(1)?,
                    version: row.get(2)?,
                    inserted_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            })
            .optional()
            .map_err(Error::execution)?;

        raw.map(|raw| {
            let version = decode_version(&raw.key, &raw.version)?;
            Ok(Record {
                value: serde_json::from_str(&raw.value)
                    .map_err(|e| corrupt(&raw.key, format!("stored value is not JSON: {}", e)))?,
                etag: ETag::from(version),
                key: raw.key,
                inserted_at: raw.inserted_at,
                updated_at: raw.updated_at,
            })
        })
        .transpose()
    }

    /// Read only the stored version of `key`
    pub fn version_of(&self, conn: &Connection, key: &str) -> Result<Option<Version>> {
        let text: Option<String> = conn
            .prepare_cached(&self.version_sql)
            .map_err(Error::execution)?
            .query_row(params![key], |row| row.get(0))
            .optional()
            .map_err(Error::execution)?;

        text.map(|t| decode_version(key, &t)).transpose()
    }

    /// Check whether a row exists for `key`
    pub fn exists(&self, conn: &Connection, key: &str) -> Result<bool> {
        conn.prepare_cached(&self.exists_sql)
            .map_err(Error::execution)?
            .query_row(params![key], |row| row.get(0))
            .map_err(Error::execution)
    }

    /// Insert `key`, or overwrite it when it already exists
    ///
    /// On insert `updatedate` stays NULL; on overwrite it becomes `now` and
    /// `insertdate` is left untouched.
    pub fn upsert(
        &self,
        conn: &Connection,
        key: &str,
        value: &serde_json::Value,
        version: Version,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let text = serde_json::to_string(value)?;
        conn.prepare_cached(&self.upsert_sql)
            .map_err(Error::execution)?
            .execute(params![key, text, version.to_text(), now])
            .map_err(Error::execution)?;
        Ok(())
    }

    /// Overwrite `key` only if its stored version is `expected`
    ///
    /// Returns the number of rows affected: 1 on a match, 0 otherwise.
    pub fn update_if_version(
        &self,
        conn: &Connection,
        key: &str,
        value: &serde_json::Value,
        expected: Version,
        version: Version,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let text = serde_json::to_string(value)?;
        conn.prepare_cached(&self.update_if_version_sql)
            .map_err(Error::execution)?
            .execute(params![key, text, version.to_text(), now, expected.to_text()])
            .map_err(Error::execution)
    }

    /// Delete `key`; returns the number of rows removed
    pub fn delete(&self, conn: &Connection, key: &str) -> Result<usize> {
        conn.prepare_cached(&self.delete_sql)
            .map_err(Error::execution)?
            .execute(params![key])
            .map_err(Error::execution)
    }

    /// Delete `key` only if its stored version is `expected`
    pub fn delete_if_version(
        &self,
        conn: &Connection,
        key: &str,
        expected: Version,
    ) -> Result<usize> {
        conn.prepare_cached(&self.delete_if_version_sql)
            .map_err(Error::execution)?
            .execute(params![key, expected.to_text()])
            .map_err(Error::execution)
    }
}

fn decode_version(key: &str, text: &str) -> Result<Version> {
    Uuid::try_parse(text)
        .ok()
        .and_then(Version::from_uuid)
        .ok_or_else(|| corrupt(key, format!("stored version '{}' is not a valid version", text)))
}

fn corrupt(key: &str, reason: String) -> Error {
    Error::Corruption {
        key: key.to_string(),
        reason,
    }
}
