// Pinned-version metadata bundled with the distribution
//
// A flat key=value resource ships inside the lintbridge binary and names the
// exact engine release plus the exact dialect version pinned for each
// DialectKey. The table is parsed on every load and is read-only after
// parsing; a missing resource key fails the call before any artifact
// resolution is attempted.

use std::collections::HashMap;

use semver::Version;

use crate::dialect::DialectKey;
use crate::error::{BridgeError, Result};

/// Name of the bundled resource, used in error messages.
pub const BUNDLED_RESOURCE: &str = "lintbridge.properties";

/// Key holding the pinned engine release version.
pub const ENGINE_VERSION_KEY: &str = "engineVersion";

const BUNDLED_TEXT: &str = include_str!("../resources/lintbridge.properties");

/// Read-only mapping from version-table keys to pinned version strings.
#[derive(Debug, Clone)]
pub struct VersionTable {
    resource: String,
    entries: HashMap<String, String>,
}

impl VersionTable {
    /// Load the table bundled with this build of lintbridge.
    pub fn load_bundled() -> Result<Self> {
        Self::parse(BUNDLED_RESOURCE, BUNDLED_TEXT)
    }

    /// Parse a properties-style `key=value` text into a table.
    ///
    /// Blank lines and `#`/`!` comment lines are skipped. A non-comment line
    /// without a `=` separator fails the whole load; partial tables are never
    /// returned.
    pub fn parse(resource: &str, text: &str) -> Result<Self> {
        let mut entries = HashMap::new();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            match line.split_once('=') {
                Some((key, value)) => {
                    entries.insert(key.trim().to_string(), value.trim().to_string());
                }
                None => {
                    return Err(BridgeError::Metadata {
                        resource: resource.to_string(),
                        message: format!("malformed entry on line {}: '{line}'", index + 1),
                    });
                }
            }
        }

        Ok(Self {
            resource: resource.to_string(),
            entries,
        })
    }

    /// The exact pinned engine release version.
    ///
    /// The pin must be a well-formed semantic version; a table shipping a
    /// malformed pin fails closed.
    pub fn engine_version(&self) -> Result<&str> {
        let value = self.lookup(ENGINE_VERSION_KEY)?;
        Version::parse(value).map_err(|e| BridgeError::Metadata {
            resource: self.resource.clone(),
            message: format!("pinned engine version '{value}' is not a valid semantic version: {e}"),
        })?;
        Ok(value)
    }

    /// The exact pinned dialect version for the given key.
    pub fn dialect_version(&self, key: DialectKey) -> Result<&str> {
        self.lookup(key.metadata_key())
    }

    fn lookup(&self, key: &str) -> Result<&str> {
        match self.entries.get(key).map(String::as_str) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(BridgeError::MissingVersion {
                resource: self.resource.clone(),
                key: key.to_string(),
            }),
        }
    }
}
