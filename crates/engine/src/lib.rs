//! Engine for the state store
//!
//! This crate ties the lower layers together behind one caller-facing type:
//! - StateStore: lifecycle (init/close) plus get, set, delete and batches
//! - StoreConfig: metadata map and TOML configuration
//!
//! The engine is the only component that knows about:
//! - Configuration keys and their defaults
//! - When the execution surface is opened and released

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod store;

pub use store::{
    Feature, Properties, StateStore, StoreConfig, CONNECTION_STRING_KEY, MAX_TIMEOUT_SECS,
    TABLE_NAME_KEY, TIMEOUT_KEY,
};
