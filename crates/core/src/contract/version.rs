//! Row version identifier
//!
//! Every successful write stores a freshly generated version next to the
//! value. Versions are random 128-bit identifiers, so two writes to the same
//! key never share one, even across a delete and re-create of the key.
//!
//! ## Comparison
//!
//! Versions only support equality. There is no ordering between versions:
//! the store never asks "which one is newer", only "is this still current".

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version of a stored row
///
/// ## Invariants
///
/// - A new version is generated for every successful write
/// - Never nil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version(Uuid);

impl Version {
    /// Generate a version for a new write
    pub fn generate() -> Self {
        Version(Uuid::new_v4())
    }

    /// Wrap a UUID read back from storage
    ///
    /// Returns `None` for the nil UUID, which is never issued.
    pub fn from_uuid(id: Uuid) -> Option<Self> {
        if id.is_nil() {
            None
        } else {
            Some(Version(id))
        }
    }

    /// Canonical text form, as persisted in the version column
    pub fn to_text(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}
