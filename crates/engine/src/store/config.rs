//! Store configuration
//!
//! The store is configured by a flat metadata map ([`Properties`]). The same
//! keys can be kept in a TOML file:
//!
//! ```toml
//! connectionString = "/var/lib/app/state.db"
//! tableName = "state"
//! timeoutInSeconds = 20
//! ```
//!
//! Both forms funnel into [`StoreConfig::from_properties`], so validation is
//! identical whichever one a caller uses.

use serde::{Deserialize, Serialize};
use statestore_core::{Error, Result};
use statestore_storage::{SurfaceConfig, TableName, DEFAULT_BUSY_TIMEOUT};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Property Keys
// ============================================================================

/// Metadata map handed to [`StateStore::init`](super::StateStore::init)
pub type Properties = HashMap<String, String>;

/// Required: SQLite path, `file:` URI, or `:memory:`
pub const CONNECTION_STRING_KEY: &str = "connectionString";
/// Optional: name of the state table
pub const TABLE_NAME_KEY: &str = "tableName";
/// Optional: busy timeout in whole seconds
pub const TIMEOUT_KEY: &str = "timeoutInSeconds";

/// Largest accepted `timeoutInSeconds`
pub const MAX_TIMEOUT_SECS: u64 = i32::MAX as u64 / 1000;

// ============================================================================
// StoreConfig
// ============================================================================

/// Validated store configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Where the database lives
    pub connection_string: String,
    /// State table name
    pub table_name: TableName,
    /// How long a statement waits on a locked database
    pub busy_timeout: Duration,
}

impl StoreConfig {
    /// Config with defaults for everything but the connection string
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            table_name: TableName::default(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Override the table name
    pub fn with_table_name(mut self, table_name: TableName) -> Self {
        self.table_name = table_name;
        self
    }

    /// Override the busy timeout
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    /// Build a config from a metadata map
    ///
    /// Empty optional values fall back to their defaults.
    ///
    /// # Errors
    ///
    /// `Error::Configuration` with the message `missing connection string`
    /// when `connectionString` is absent or empty, or when an optional value
    /// does not parse.
    pub fn from_properties(properties: &Properties) -> Result<Self> {
        let connection_string = match properties.get(CONNECTION_STRING_KEY) {
            Some(s) if !s.is_empty() => s.clone(),
            _ => return Err(Error::missing_connection_string()),
        };

        let table_name = match properties.get(TABLE_NAME_KEY) {
            Some(name) if !name.is_empty() => TableName::new(name.as_str())?,
            _ => TableName::default(),
        };

        let busy_timeout = match properties.get(TIMEOUT_KEY) {
            Some(raw) if !raw.is_empty() => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::configuration(format!(
                        "invalid {}: '{}' is not a whole number of seconds",
                        TIMEOUT_KEY, raw
                    ))
                })?;
                // SQLite takes the busy timeout as an i32 of milliseconds.
                if secs
                    .checked_mul(1000)
                    .and_then(|ms| i32::try_from(ms).ok())
                    .is_none()
                {
                    return Err(Error::configuration(format!(
                        "invalid {}: '{}' exceeds {} seconds",
                        TIMEOUT_KEY, raw, MAX_TIMEOUT_SECS
                    )));
                }
                Duration::from_secs(secs)
            }
            _ => DEFAULT_BUSY_TIMEOUT,
        };

        Ok(Self {
            connection_string,
            table_name,
            busy_timeout,
        })
    }

    /// Parse a TOML document carrying the same keys as [`Properties`]
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| Error::configuration(format!("failed to parse config: {}", e)))?;
        Self::from_properties(&file.into_properties())
    }

    /// Read and parse a TOML config file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Returns a commented config file template
    pub fn default_toml() -> &'static str {
        r#"# State store configuration
#
# Required. SQLite database path, "file:" URI, or ":memory:".
connectionString = "state.db"

# Name of the table holding state rows (default: "state").
# Letters, digits and underscores only.
# tableName = "state"

# Seconds a statement waits on a locked database (default: 20).
# timeoutInSeconds = 20
"#
    }

    /// Settings for opening the execution surface
    pub fn surface_config(&self) -> SurfaceConfig {
        SurfaceConfig {
            connection_string: self.connection_string.clone(),
            busy_timeout: self.busy_timeout,
        }
    }

    /// Render back to a metadata map
    pub fn to_properties(&self) -> Properties {
        let mut props = Properties::new();
        props.insert(
            CONNECTION_STRING_KEY.to_string(),
            self.connection_string.clone(),
        );
        props.insert(TABLE_NAME_KEY.to_string(), self.table_name.to_string());
        props.insert(
            TIMEOUT_KEY.to_string(),
            self.busy_timeout.as_secs().to_string(),
        );
        props
    }
}

/// On-disk shape of the TOML config
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    connection_string: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_in_seconds: Option<u64>,
}

impl ConfigFile {
    fn into_properties(self) -> Properties {
        let mut props = Properties::new();
        props.insert(CONNECTION_STRING_KEY.to_string(), self.connection_string);
        if let Some(table) = self.table_name {
            props.insert(TABLE_NAME_KEY.to_string(), table);
        }
        if let Some(secs) = self.timeout_in_seconds {
            props.insert(TIMEOUT_KEY.to_string(), secs.to_string());
        }
        props
    }
}
