//! Contract types for API stability
//!
//! These types define what a caller can rely on across versions:
//!
//! - `version`: the internal row version, regenerated on every write
//! - `etag`: the opaque token form of a version handed to callers
//!
//! ## Usage
//!
//! ```
//! use statestore_core::contract::{ETag, Version};
//! ```

pub mod etag;
pub mod version;

// Re-exports
pub use etag::ETag;
pub use version::Version;
