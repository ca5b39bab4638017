// CLI interface for lintbridge using clap
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::path::{Path, PathBuf};
use url::Url;

use crate::artifact::{HttpArtifactFetcher, Repository};
use crate::bridge;
use crate::config::{BridgeConfig, DEFAULT_CONFIG_FILE};
use crate::error::{exit_codes, BridgeError, Result};
use crate::instantiate::LoadedEngine;

#[derive(Parser)]
#[command(
    name = "lintbridge",
    about = "Lintbridge - version-matched loading of the lintbridge analysis engine",
    version = crate::VERSION,
    long_about = "Lintbridge resolves, fetches, and loads the engine build matching a target dialect version, and exposes it behind a stable capability interface."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Control color output (auto, always, never)
    #[arg(long, global = true, value_name = "WHEN")]
    pub color: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the pinned engine and dialect versions for a dialect version
    Pins {
        /// Dialect version of the sources the engine will analyze
        #[arg(long)]
        dialect_version: String,
    },

    /// Resolve the engine artifact set and print the local files
    Resolve {
        /// Dialect version of the sources the engine will analyze
        #[arg(long)]
        dialect_version: String,

        /// Repository URL to resolve against (repeatable; replaces the defaults)
        #[arg(long, value_name = "URL")]
        repository: Vec<String>,
    },

    /// Fetch and load the engine, then print its version report
    Versions {
        /// Dialect version of the sources the engine will analyze
        #[arg(long)]
        dialect_version: String,

        /// Repository URL to resolve against (repeatable; replaces the defaults)
        #[arg(long, value_name = "URL")]
        repository: Vec<String>,
    },

    /// Fetch and load the engine, then print its command-line help
    HelpText {
        /// Dialect version of the sources the engine will analyze
        #[arg(long)]
        dialect_version: String,

        /// Screen width used to wrap the help text
        #[arg(long, default_value = "80")]
        width: usize,

        /// Repository URL to resolve against (repeatable; replaces the defaults)
        #[arg(long, value_name = "URL")]
        repository: Vec<String>,
    },

    /// Generate shell completion scripts
    GenerateCompletion {
        /// Shell to generate completion for
        shell: Shell,
    },
}

impl Cli {
    pub fn run(&self) -> Result<i32> {
        self.init_logging();

        if self.verbose && self.quiet {
            return Err(BridgeError::Cli {
                message: "conflicting arguments: --verbose and --quiet".to_string(),
                suggestion: Some(
                    "Use either --verbose for more output or --quiet for less output, but not both"
                        .to_string(),
                ),
            });
        }

        match &self.command {
            Commands::Pins { dialect_version } => {
                let (engine_version, pinned_dialect) = bridge::resolve_pins(dialect_version)?;
                println!("engine version:  {engine_version}");
                println!("dialect version: {pinned_dialect}");
                Ok(exit_codes::SUCCESS)
            }

            Commands::Resolve {
                dialect_version,
                repository,
            } => {
                let repositories = self.repositories(repository)?;
                let fetcher = self.fetcher()?;
                let context = bridge::resolve_context(dialect_version, &repositories, &fetcher)?;
                for artifact in context.artifacts() {
                    println!("{}", artifact.display());
                }
                Ok(exit_codes::SUCCESS)
            }

            Commands::Versions {
                dialect_version,
                repository,
            } => {
                let loaded = self.load_engine(dialect_version, repository)?;
                println!("engine version:  {}", loaded.engine_version());
                println!("dialect version: {}", loaded.dialect_version());
                println!(
                    "supported:       {}",
                    loaded.supported_dialect_versions().join(", ")
                );
                Ok(exit_codes::SUCCESS)
            }

            Commands::HelpText {
                dialect_version,
                width,
                repository,
            } => {
                let loaded = self.load_engine(dialect_version, repository)?;
                println!("{}", loaded.main_help(*width));
                Ok(exit_codes::SUCCESS)
            }

            Commands::GenerateCompletion { shell } => {
                let mut cmd = Self::command();
                let name = cmd.get_name().to_string();
                generate(*shell, &mut cmd, name, &mut std::io::stdout());
                Ok(exit_codes::SUCCESS)
            }
        }
    }

    fn load_engine(&self, dialect_version: &str, overrides: &[String]) -> Result<LoadedEngine> {
        let repositories = self.repositories(overrides)?;
        let fetcher = self.fetcher()?;
        bridge::fetch_and_load_with(dialect_version, &repositories, &fetcher)
    }

    /// Repository list: CLI overrides win, then the config file, then the
    /// documented defaults.
    fn repositories(&self, overrides: &[String]) -> Result<Vec<Repository>> {
        if !overrides.is_empty() {
            return overrides
                .iter()
                .map(|raw| {
                    let url = Url::parse(raw).map_err(|e| BridgeError::Cli {
                        message: format!("invalid repository URL '{raw}': {e}"),
                        suggestion: Some(
                            "repository URLs must be absolute, e.g. https://artifacts.example.com/releases"
                                .to_string(),
                        ),
                    })?;
                    let name = url.host_str().unwrap_or("repository").to_string();
                    Ok(Repository::new(name, url))
                })
                .collect();
        }

        match self.load_config()? {
            Some(config) => config.repositories(),
            None => Ok(Repository::defaults()),
        }
    }

    fn fetcher(&self) -> Result<HttpArtifactFetcher> {
        match self.load_config()?.and_then(|c| c.cache_dir) {
            Some(cache_dir) => HttpArtifactFetcher::with_cache_dir(cache_dir),
            None => HttpArtifactFetcher::new(),
        }
    }

    fn load_config(&self) -> Result<Option<BridgeConfig>> {
        match &self.config {
            Some(path) => BridgeConfig::from_file(path).map(Some),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    BridgeConfig::from_file(default).map(Some)
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn init_logging(&self) {
        use crate::logging::{init_logging, LogConfig};

        let log_config = LogConfig::from_cli(self.verbose, self.quiet, self.color.clone());

        if let Err(e) = init_logging(log_config) {
            eprintln!("Failed to initialize logging: {e}");
            // Continue execution even if logging fails
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_pins() {
        let cli = Cli::parse_from(["lintbridge", "pins", "--dialect-version", "3.3.4"]);
        match cli.command {
            Commands::Pins { dialect_version } => assert_eq!(dialect_version, "3.3.4"),
            _ => panic!("expected pins subcommand"),
        }
    }

    #[test]
    fn test_cli_conflicting_flags() {
        let cli = Cli::parse_from([
            "lintbridge",
            "--verbose",
            "--quiet",
            "pins",
            "--dialect-version",
            "3.3.4",
        ]);
        let error = cli.run().unwrap_err();
        assert!(matches!(error, BridgeError::Cli { .. }));
    }

    #[test]
    fn test_repository_override_parsing() {
        let cli = Cli::parse_from(["lintbridge", "pins", "--dialect-version", "3.3.4"]);
        let repositories = cli
            .repositories(&["https://mirror.example.com/releases".to_string()])
            .unwrap();
        assert_eq!(repositories.len(), 1);
        assert_eq!(repositories[0].name, "mirror.example.com");
    }

    #[test]
    fn test_invalid_repository_override() {
        let cli = Cli::parse_from(["lintbridge", "pins", "--dialect-version", "3.3.4"]);
        assert!(matches!(
            cli.repositories(&["not a url".to_string()]),
            Err(BridgeError::Cli { .. })
        ));
    }

    #[test]
    fn test_help_text_default_width() {
        let cli = Cli::parse_from(["lintbridge", "help-text", "--dialect-version", "2.13.16"]);
        match cli.command {
            Commands::HelpText { width, .. } => assert_eq!(width, 80),
            _ => panic!("expected help-text subcommand"),
        }
    }
}
