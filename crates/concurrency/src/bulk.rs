//! Bulk executor: all-or-nothing batches of Set/Delete
//!
//! Every item of a batch goes through the [`ConcurrencyController`] inside one
//! write transaction on the surface:
//!
//! - items apply in input order, nothing is reordered
//! - the first failing item stops the batch and its error is returned
//! - a failed batch rolls back entirely, so no item is visible afterwards
//! - an empty batch succeeds without opening a transaction

use crate::controller::ConcurrencyController;
use statestore_core::{DeleteRequest, ETag, Operation, Record, Result, SetRequest};
use statestore_storage::SqliteSurface;
use tracing::{debug, warn};

/// Runs batches of controller operations inside single transactions
#[derive(Debug, Clone)]
pub struct BulkExecutor {
    controller: ConcurrencyController,
}

impl BulkExecutor {
    /// Create an executor that delegates each item to `controller`
    pub fn new(controller: ConcurrencyController) -> Self {
        Self { controller }
    }

    /// Controller used for each item
    pub fn controller(&self) -> &ConcurrencyController {
        &self.controller
    }

    /// Apply every set atomically; returns the new etags in input order
    pub fn bulk_set(&self, surface: &SqliteSurface, requests: &[SetRequest]) -> Result<Vec<ETag>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        debug!(target: "statestore::bulk", count = requests.len(), "Bulk set");

        surface.with_write_transaction(|conn| {
            requests
                .iter()
                .enumerate()
                .map(|(index, req)| {
                    self.controller
                        .set(conn, req)
                        .map_err(|e| report_failure("set", index, &req.key, e))
                })
                .collect()
        })
    }

    /// Apply every delete atomically
    pub fn bulk_delete(&self, surface: &SqliteSurface, requests: &[DeleteRequest]) -> Result<()> {
        if requests.is_empty() {
            return Ok(());
        }
        debug!(target: "statestore::bulk", count = requests.len(), "Bulk delete");

        surface.with_write_transaction(|conn| {
            for (index, req) in requests.iter().enumerate() {
                self.controller
                    .delete(conn, req)
                    .map_err(|e| report_failure("delete", index, &req.key, e))?;
            }
            Ok(())
        })
    }

    /// Apply a mixed batch atomically
    ///
    /// Returns one entry per operation: the new etag for sets, `None` for deletes.
    pub fn transact(
        &self,
        surface: &SqliteSurface,
        operations: &[Operation],
    ) -> Result<Vec<Option<ETag>>> {
        if operations.is_empty() {
            return Ok(Vec::new());
        }
        debug!(target: "statestore::bulk", count = operations.len(), "Transactional batch");

        surface.with_write_transaction(|conn| {
            operations
                .iter()
                .enumerate()
                .map(|(index, op)| {
                    self.controller
                        .apply(conn, op)
                        .map_err(|e| report_failure("transact", index, op.key(), e))
                })
                .collect()
        })
    }

    /// Read several keys from one snapshot; results follow the order of `keys`
    pub fn bulk_get<K: AsRef<str>>(
        &self,
        surface: &SqliteSurface,
        keys: &[K],
    ) -> Result<Vec<Option<Record>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        surface.with_read_transaction(|conn| {
            keys.iter()
                .map(|key| self.controller.get(conn, key.as_ref()))
                .collect()
        })
    }
}

fn report_failure(
    op: &'static str,
    index: usize,
    key: &str,
    err: statestore_core::Error,
) -> statestore_core::Error {
    warn!(
        target: "statestore::bulk",
        op,
        index,
        key = %key,
        error = %err,
        "Batch item failed, rolling back"
    );
    err
}
