// Configuration handling for the lintbridge CLI
//
// The library API always takes repositories explicitly; this file only backs
// the CLI, which reads an optional lintbridge.toml for repository overrides
// and the artifact cache location.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::artifact::Repository;
use crate::error::{BridgeError, Result};

/// Default configuration file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "lintbridge.toml";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,
    pub cache_dir: Option<PathBuf>,

    #[serde(skip)]
    source: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryConfig {
    pub name: String,
    pub url: String,
}

impl BridgeConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(BridgeError::Config {
                path: path.to_path_buf(),
                message: "configuration file not found".to_string(),
                suggestion: Some(format!(
                    "create a {DEFAULT_CONFIG_FILE} file or omit --config to use the defaults"
                )),
            });
        }

        let text = std::fs::read_to_string(path)?;
        let mut config: BridgeConfig =
            toml::from_str(&text).map_err(|e| BridgeError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
                suggestion: None,
            })?;
        config.source = path.to_path_buf();
        Ok(config)
    }

    /// The repository list to use: configured overrides, or the documented
    /// defaults when the file names none.
    pub fn repositories(&self) -> Result<Vec<Repository>> {
        if self.repositories.is_empty() {
            return Ok(Repository::defaults());
        }

        self.repositories
            .iter()
            .map(|entry| {
                let url = Url::parse(&entry.url).map_err(|e| BridgeError::Config {
                    path: self.source.clone(),
                    message: format!("invalid repository URL '{}': {e}", entry.url),
                    suggestion: Some("repository URLs must be absolute, e.g. https://artifacts.example.com/releases".to_string()),
                })?;
                Ok(Repository::new(entry.name.clone(), url))
            })
            .collect()
    }
}
