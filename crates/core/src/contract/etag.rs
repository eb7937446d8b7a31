//! ETag codec
//!
//! Converts between the opaque token handed to callers and the internal
//! [`Version`]. A token that does not decode is reported as
//! [`Error::MalformedETag`], which callers can tell apart from
//! [`Error::Conflict`]: the first is a bug in the call, the second a race.
//!
//! ```
//! use statestore_core::{ETag, Version};
//!
//! let version = Version::generate();
//! let etag = ETag::from(version);
//! let parsed: ETag = etag.as_str().parse().unwrap();
//! assert_eq!(parsed.version(), version);
//! ```

use super::version::Version;
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use uuid::Uuid;

/// Validated version token
///
/// Construct one from a [`Version`] issued by the store, or by parsing a
/// caller-supplied string with [`ETag::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ETag {
    version: Version,
    text: String,
}

impl ETag {
    /// Decode a caller-supplied token
    ///
    /// # Errors
    ///
    /// `Error::MalformedETag` if the token is empty, not a UUID, the nil
    /// UUID, or not spelled exactly as issued (lowercase hyphenated). Tokens
    /// are opaque: a re-cased or re-formatted one is not the same token.
    pub fn parse(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(malformed(token, "empty token"));
        }
        let id = Uuid::try_parse(token).map_err(|e| malformed(token, e))?;
        let version = Version::from_uuid(id).ok_or_else(|| malformed(token, "nil version"))?;
        let etag = ETag::from(version);
        if etag.text != token {
            return Err(malformed(token, "not in issued form"));
        }
        Ok(etag)
    }

    /// Version this token stands for
    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Token text
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume into the token text
    pub fn into_string(self) -> String {
        self.text
    }
}

fn malformed(token: &str, reason: impl std::fmt::Display) -> Error {
    Error::MalformedETag {
        etag: token.to_string(),
        reason: reason.to_string(),
    }
}

impl From<Version> for ETag {
    fn from(version: Version) -> Self {
        ETag {
            text: version.to_text(),
            version,
        }
    }
}

impl FromStr for ETag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ETag::parse(s)
    }
}

impl AsRef<str> for ETag {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl From<ETag> for String {
    fn from(etag: ETag) -> Self {
        etag.text
    }
}

impl From<&ETag> for String {
    fn from(etag: &ETag) -> Self {
        etag.text.clone()
    }
}

impl std::fmt::Display for ETag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for ETag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for ETag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        ETag::parse(&text).map_err(serde::de::Error::custom)
    }
}
