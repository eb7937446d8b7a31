//! Table name validation
//!
//! The table name is the only piece of SQL text that comes from
//! configuration, so it is restricted to a plain identifier before it is
//! ever formatted into a statement.

use statestore_core::{Error, Result};

/// Table used when the configuration does not name one
pub const DEFAULT_TABLE_NAME: &str = "state";

/// Longest accepted table name
pub const MAX_TABLE_NAME_LENGTH: usize = 63;

/// A validated SQL table identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    /// Validate `name` as a table identifier
    ///
    /// Accepts ASCII letters, digits and underscores, not starting with a digit.
    ///
    /// # Errors
    ///
    /// `Error::Configuration` if the name is empty, too long, or contains
    /// anything else.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::configuration("table name must not be empty"));
        }
        if name.len() > MAX_TABLE_NAME_LENGTH {
            return Err(Error::configuration(format!(
                "table name '{}' exceeds {} characters",
                name, MAX_TABLE_NAME_LENGTH
            )));
        }
        let mut chars = name.chars();
        let first_ok = chars
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false);
        if !first_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::configuration(format!(
                "table name '{}' is not a plain identifier",
                name
            )));
        }
        Ok(TableName(name))
    }

    /// Get the identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TableName {
    fn default() -> Self {
        TableName(DEFAULT_TABLE_NAME.to_string())
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
