//! Concurrency layer for the state store
//!
//! This crate implements optimistic concurrency control with:
//! - ConcurrencyController: ETag compare-and-swap for single Set/Delete/Get
//! - BulkExecutor: all-or-nothing batches, one transaction per batch
//!
//! Neither type holds a lock. Conflicts are detected by conditional
//! statements evaluated by the execution surface, and surfaced immediately:
//! nothing here retries.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bulk;
pub mod controller;

pub use bulk::BulkExecutor;
pub use controller::ConcurrencyController;
