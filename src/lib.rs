// Lintbridge - library module
//
// Resolves a target dialect version to a pinned engine build, fetches its
// binary artifacts, loads them in an isolated context parented on a narrow
// shared surface, and instantiates the engine behind the stable LintEngine
// capability interface.

pub mod artifact;
pub mod bridge;
pub mod cli;
pub mod config;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod instantiate;
pub mod loader;
pub mod logging;
pub mod metadata;

// Re-export main types for easier access
pub use artifact::{
    engine_coordinates, platform_tag, ArtifactFetcher, Coordinate, HttpArtifactFetcher,
    Repository, DRIVER_MODULE, ENGINE_GROUP,
};
pub use bridge::{
    fetch_and_load, fetch_and_load_from, fetch_and_load_with, load_from_context, resolve_context,
    resolve_pins,
};
pub use config::{BridgeConfig, RepositoryConfig, DEFAULT_CONFIG_FILE};
pub use dialect::DialectKey;
pub use engine::{
    EngineDeclaration, LintArguments, LintEngine, API_FINGERPRINT, ENGINE_DECL_SYMBOL,
};
pub use error::{exit_codes, BridgeError, Result};
pub use instantiate::{instantiate, LoadedEngine};
pub use loader::{dylib_extension, LoadingContext, SharedSurface};
pub use logging::{ColorConfig, LogConfig, LogFormat};
pub use metadata::{VersionTable, BUNDLED_RESOURCE, ENGINE_VERSION_KEY};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_constant() {
        assert_eq!(NAME, "lintbridge");
    }

    #[test]
    fn test_description_exists() {
        assert!(DESCRIPTION.contains("capability interface"));
    }
}
