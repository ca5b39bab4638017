// Error handling for lintbridge
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Umbrella error for every failure mode surfaced to a host.
///
/// Every stage of the loading pipeline maps its internal failures into one of
/// these variants, always carrying the offending input (version string,
/// resource key, or loading-context identity) and the underlying cause where
/// one exists. Hosts distinguish failures by variant and message; there is no
/// deeper taxonomy of error subtypes.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("unsupported dialect version: {version}")]
    UnsupportedVersion {
        version: String,
        supported_series: Vec<String>,
    },

    #[error("failed to load version table '{resource}': {message}")]
    Metadata { resource: String, message: String },

    #[error("version entry '{key}' missing from '{resource}'")]
    MissingVersion { resource: String, key: String },

    #[error("artifact resolution failed for {coordinates}: {message}")]
    Resolution {
        coordinates: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("failed to instantiate engine with loading context {context}: {message}")]
    Instantiation { context: String, message: String },

    #[error("configuration error in {path}: {message}")]
    Config {
        path: PathBuf,
        message: String,
        suggestion: Option<String>,
    },

    #[error("CLI argument error: {message}")]
    Cli {
        message: String,
        suggestion: Option<String>,
    },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Exit codes reported by the `lintbridge` binary.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const UNSUPPORTED_VERSION: i32 = 2;
    pub const METADATA_ERROR: i32 = 3;
    pub const RESOLUTION_ERROR: i32 = 4;
    pub const INSTANTIATION_ERROR: i32 = 5;
    pub const CONFIG_ERROR: i32 = 6;
    pub const CLI_ERROR: i32 = 7;
}

impl BridgeError {
    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            BridgeError::UnsupportedVersion { .. } => exit_codes::UNSUPPORTED_VERSION,
            BridgeError::Metadata { .. } | BridgeError::MissingVersion { .. } => {
                exit_codes::METADATA_ERROR
            }
            BridgeError::Resolution { .. } => exit_codes::RESOLUTION_ERROR,
            BridgeError::Instantiation { .. } => exit_codes::INSTANTIATION_ERROR,
            BridgeError::Config { .. } => exit_codes::CONFIG_ERROR,
            BridgeError::Cli { .. } => exit_codes::CLI_ERROR,
            BridgeError::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }

    /// Create a user-friendly error message with context
    pub fn user_message(&self, use_colors: bool) -> String {
        let mut output = String::new();

        if use_colors {
            output.push_str("\x1b[31m");
        }
        output.push_str("Error: ");
        if use_colors {
            output.push_str("\x1b[0m");
        }
        output.push_str(&self.to_string());

        match self {
            BridgeError::UnsupportedVersion {
                supported_series, ..
            } if !supported_series.is_empty() => {
                output.push_str(&format!(
                    "\n  Help: supported dialect series: {}",
                    supported_series.join(", ")
                ));
            }
            BridgeError::Resolution {
                source: Some(cause),
                ..
            } => {
                output.push_str(&format!("\n  Cause: {cause}"));
            }
            BridgeError::Config {
                suggestion: Some(suggestion),
                ..
            }
            | BridgeError::Cli {
                suggestion: Some(suggestion),
                ..
            } => {
                output.push_str(&format!("\n  Help: {suggestion}"));
            }
            _ => {}
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = BridgeError::MissingVersion {
            resource: "lintbridge.properties".to_string(),
            key: "dialect213".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "version entry 'dialect213' missing from 'lintbridge.properties'"
        );
    }

    #[test]
    fn test_unsupported_version_help() {
        let error = BridgeError::UnsupportedVersion {
            version: "2.11".to_string(),
            supported_series: vec!["2.12".to_string(), "2.13".to_string(), "3".to_string()],
        };
        let message = error.user_message(false);
        assert!(message.contains("unsupported dialect version: 2.11"));
        assert!(message.contains("supported dialect series: 2.12, 2.13, 3"));
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            BridgeError::UnsupportedVersion {
                version: "1.0".to_string(),
                supported_series: vec![],
            },
            BridgeError::Metadata {
                resource: "r".to_string(),
                message: "m".to_string(),
            },
            BridgeError::Resolution {
                coordinates: "c".to_string(),
                message: "m".to_string(),
                source: None,
            },
            BridgeError::Instantiation {
                context: "c".to_string(),
                message: "m".to_string(),
            },
        ];
        let codes: Vec<i32> = errors.iter().map(|e| e.exit_code()).collect();
        let mut deduped = codes.clone();
        deduped.dedup();
        assert_eq!(codes, deduped);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let bridge_error = BridgeError::from(io_error);
        assert!(bridge_error.to_string().contains("IO operation failed"));
    }
}
