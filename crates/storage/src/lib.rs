//! Storage layer for the state store
//!
//! This crate implements the relational side of the store:
//! - SqliteSurface: the transactional execution surface (one SQLite connection)
//! - RowAccessor: single-row read/write/delete statements against the state table
//! - TableName: validated identifier for the state table

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod rows;
pub mod surface;
pub mod table;

pub use rows::RowAccessor;
pub use surface::{SqliteSurface, SurfaceConfig, DEFAULT_BUSY_TIMEOUT};
pub use table::{TableName, DEFAULT_TABLE_NAME, MAX_TABLE_NAME_LENGTH};
