// Host-facing entry points for fetching and loading an engine
//
// One synchronous pipeline per call: dialect key resolution, pin lookup,
// artifact resolution, context construction, instantiation. Unsupported
// version strings are rejected before any I/O is attempted, and no stage
// retries anything.

use tracing::{debug, info};

use crate::artifact::{engine_coordinates, ArtifactFetcher, HttpArtifactFetcher, Repository};
use crate::dialect::DialectKey;
use crate::error::{BridgeError, Result};
use crate::instantiate::{instantiate, LoadedEngine};
use crate::loader::LoadingContext;
use crate::metadata::VersionTable;

/// Fetch and load the engine build for `dialect_version` using the default
/// repositories and the default HTTP fetcher.
pub fn fetch_and_load(dialect_version: &str) -> Result<LoadedEngine> {
    fetch_and_load_from(dialect_version, &Repository::defaults())
}

/// Fetch and load the engine build for `dialect_version` from an explicit
/// repository list.
pub fn fetch_and_load_from(
    dialect_version: &str,
    repositories: &[Repository],
) -> Result<LoadedEngine> {
    let fetcher = HttpArtifactFetcher::new()?;
    fetch_and_load_with(dialect_version, repositories, &fetcher)
}

/// Fetch and load the engine build for `dialect_version` with an explicit
/// fetcher collaborator.
pub fn fetch_and_load_with(
    dialect_version: &str,
    repositories: &[Repository],
    fetcher: &dyn ArtifactFetcher,
) -> Result<LoadedEngine> {
    let context = resolve_context(dialect_version, repositories, fetcher)?;
    load_from_context(context)
}

/// Run the pipeline through artifact resolution, returning the loading
/// context without instantiating anything.
pub fn resolve_context(
    dialect_version: &str,
    repositories: &[Repository],
    fetcher: &dyn ArtifactFetcher,
) -> Result<LoadingContext> {
    let key = DialectKey::resolve(dialect_version)?;
    debug!(requested = dialect_version, key = %key, "resolved dialect key");

    let table = VersionTable::load_bundled()?;
    let engine_version = table.engine_version()?;
    let pinned_dialect = table.dialect_version(key)?;
    info!(
        engine_version,
        dialect_version = pinned_dialect,
        "resolving engine artifacts"
    );

    let coordinates = engine_coordinates(engine_version, pinned_dialect);
    let artifacts = fetcher.fetch(repositories, &coordinates)?;
    if artifacts.is_empty() {
        return Err(BridgeError::Resolution {
            coordinates: coordinates
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            message: "resolver returned an empty artifact set".to_string(),
            source: None,
        });
    }
    debug!(artifact_count = artifacts.len(), "artifact set resolved");

    Ok(LoadingContext::from_artifacts(artifacts))
}

/// Instantiate an engine from a caller-supplied loading context.
///
/// Bypasses version resolution and artifact fetching entirely. The context's
/// ancestor chain must include the process shared surface; contexts from
/// [`resolve_context`] always do, and callers assembling their own are
/// trusted to uphold the same invariant.
pub fn load_from_context(context: LoadingContext) -> Result<LoadedEngine> {
    instantiate(context)
}

/// Look up the pinned (engine version, dialect version) pair for a requested
/// dialect version. No I/O beyond the bundled table read.
pub fn resolve_pins(dialect_version: &str) -> Result<(String, String)> {
    let key = DialectKey::resolve(dialect_version)?;
    let table = VersionTable::load_bundled()?;
    Ok((
        table.engine_version()?.to_string(),
        table.dialect_version(key)?.to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::PathBuf;

    struct PanickingFetcher;

    impl ArtifactFetcher for PanickingFetcher {
        fn fetch(
            &self,
            _repositories: &[Repository],
            _coordinates: &[crate::artifact::Coordinate],
        ) -> Result<Vec<PathBuf>> {
            panic!("fetcher must not be reached");
        }
    }

    struct CountingFetcher {
        calls: Cell<usize>,
        result: Vec<PathBuf>,
    }

    impl ArtifactFetcher for CountingFetcher {
        fn fetch(
            &self,
            _repositories: &[Repository],
            _coordinates: &[crate::artifact::Coordinate],
        ) -> Result<Vec<PathBuf>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.result.clone())
        }
    }

    #[test]
    fn test_resolve_pins_lts() {
        let (engine_version, dialect_version) = resolve_pins("3.3.4").unwrap();
        assert_eq!(engine_version, "0.12.0");
        assert_eq!(dialect_version, "3.3.4");
    }

    #[test]
    fn test_unsupported_version_never_reaches_the_fetcher() {
        let error =
            resolve_context("2.11", &Repository::defaults(), &PanickingFetcher).unwrap_err();
        assert!(matches!(error, BridgeError::UnsupportedVersion { .. }));
    }

    #[test]
    fn test_empty_resolver_result_is_a_resolution_error() {
        let fetcher = CountingFetcher {
            calls: Cell::new(0),
            result: Vec::new(),
        };
        let error = resolve_context("3.3.4", &Repository::defaults(), &fetcher).unwrap_err();
        assert!(matches!(error, BridgeError::Resolution { .. }));
        assert_eq!(fetcher.calls.get(), 1);
    }
}
