// Artifact coordinates, repositories, and the fetcher collaborator
//
// Engine version and dialect version together determine a convention-based
// coordinate set; resolving those coordinates to local files is delegated to
// an `ArtifactFetcher` collaborator. The default collaborator downloads over
// HTTPS into the user cache directory. Retry policy, if any, belongs to the
// collaborator; nothing here retries.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use url::Url;

use crate::error::{BridgeError, Result};
use crate::loader::dylib_extension;

/// Group under which engine modules are published.
pub const ENGINE_GROUP: &str = "io.lintbridge";

/// The engine's command-line/driver module, the artifact exporting the entry
/// declaration.
pub const DRIVER_MODULE: &str = "lintbridge-driver";

/// Coordinates of one published binary artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    pub group: String,
    pub name: String,
    pub version: String,
}

impl Coordinate {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Convention-based path of this artifact under a repository root.
    pub fn remote_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group.replace('.', "/"),
            self.name,
            self.version,
            self.file_name()
        )
    }

    /// Platform-qualified artifact file name.
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}-{}.{}",
            self.name,
            self.version,
            platform_tag(),
            dylib_extension()
        )
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)
    }
}

/// Tag naming the platform an artifact was built for.
pub fn platform_tag() -> String {
    format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS)
}

/// The driver-module coordinates for a pinned engine/dialect version pair.
///
/// The driver's declared dependencies are the fetcher collaborator's
/// responsibility: `fetch` receives this set and returns the transitive
/// closure of local files.
pub fn engine_coordinates(engine_version: &str, dialect_version: &str) -> Vec<Coordinate> {
    vec![Coordinate::new(
        ENGINE_GROUP,
        format!("{DRIVER_MODULE}_{dialect_version}"),
        engine_version,
    )]
}

/// An artifact repository, tried in list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub name: String,
    pub url: Url,
}

impl Repository {
    pub fn new(name: impl Into<String>, url: Url) -> Self {
        Self {
            name: name.into(),
            url,
        }
    }

    /// The standard repository list used when a caller supplies none.
    pub fn defaults() -> Vec<Repository> {
        vec![Repository::new(
            "releases",
            Url::parse("https://artifacts.lintbridge.io/releases").unwrap(),
        )]
    }
}

/// Collaborator resolving coordinates to local artifact files.
///
/// Implementations own their caching and retry behavior. A successful fetch
/// returns the ordered transitive closure needed to run the requested
/// modules; any failure (network, missing coordinates, checksum mismatch)
/// surfaces as a single resolution error with no partial results.
pub trait ArtifactFetcher {
    fn fetch(
        &self,
        repositories: &[Repository],
        coordinates: &[Coordinate],
    ) -> Result<Vec<PathBuf>>;
}

/// Default fetcher: HTTPS downloads into the user cache directory.
///
/// An artifact already present in the cache is reused without touching the
/// network. Repositories are tried in order; the last failure is reported
/// when none of them serves a coordinate.
pub struct HttpArtifactFetcher {
    cache_dir: PathBuf,
    client: reqwest::blocking::Client,
}

impl HttpArtifactFetcher {
    pub fn new() -> Result<Self> {
        let cache_root = dirs::cache_dir().ok_or_else(|| BridgeError::Resolution {
            coordinates: "-".to_string(),
            message: "no user cache directory available on this platform".to_string(),
            source: None,
        })?;
        Self::with_cache_dir(cache_root.join("lintbridge").join("artifacts"))
    }

    pub fn with_cache_dir(cache_dir: PathBuf) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("lintbridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BridgeError::Resolution {
                coordinates: "-".to_string(),
                message: "failed to construct HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { cache_dir, client })
    }

    /// Where this fetcher stores downloaded artifacts.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn resolve_one(
        &self,
        repositories: &[Repository],
        coordinate: &Coordinate,
    ) -> Result<PathBuf> {
        let local = self.cache_dir.join(coordinate.remote_path());
        if local.is_file() {
            debug!(coordinate = %coordinate, path = %local.display(), "artifact cache hit");
            return Ok(local);
        }

        if repositories.is_empty() {
            return Err(resolution_error(
                coordinate,
                "no repositories supplied".to_string(),
                None,
            ));
        }

        if let Some(parent) = local.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                resolution_error(
                    coordinate,
                    "failed to prepare cache directory".to_string(),
                    Some(Box::new(e)),
                )
            })?;
        }

        let mut last_error: Option<reqwest::Error> = None;
        for repository in repositories {
            let url = format!(
                "{}/{}",
                repository.url.as_str().trim_end_matches('/'),
                coordinate.remote_path()
            );
            debug!(repository = %repository.name, url = %url, "downloading artifact");

            let response = self
                .client
                .get(&url)
                .send()
                .and_then(|r| r.error_for_status());
            match response {
                Ok(mut response) => {
                    // Download to a partial file so an interrupted transfer
                    // never lands in the cache.
                    let partial = local.with_extension("part");
                    let mut file = fs::File::create(&partial).map_err(|e| {
                        resolution_error(
                            coordinate,
                            "failed to create cache file".to_string(),
                            Some(Box::new(e)),
                        )
                    })?;
                    if let Err(e) = response.copy_to(&mut file) {
                        let _ = fs::remove_file(&partial);
                        last_error = Some(e);
                        continue;
                    }
                    fs::rename(&partial, &local).map_err(|e| {
                        resolution_error(
                            coordinate,
                            "failed to move downloaded artifact into the cache".to_string(),
                            Some(Box::new(e)),
                        )
                    })?;
                    return Ok(local);
                }
                Err(e) => {
                    warn!(repository = %repository.name, error = %e, "repository did not serve artifact");
                    last_error = Some(e);
                }
            }
        }

        Err(resolution_error(
            coordinate,
            format!("no repository served '{}'", coordinate.file_name()),
            last_error.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        ))
    }
}

impl ArtifactFetcher for HttpArtifactFetcher {
    fn fetch(
        &self,
        repositories: &[Repository],
        coordinates: &[Coordinate],
    ) -> Result<Vec<PathBuf>> {
        if coordinates.is_empty() {
            return Err(BridgeError::Resolution {
                coordinates: "-".to_string(),
                message: "no coordinates to resolve".to_string(),
                source: None,
            });
        }

        let mut artifacts = Vec::with_capacity(coordinates.len());
        for coordinate in coordinates {
            artifacts.push(self.resolve_one(repositories, coordinate)?);
        }
        Ok(artifacts)
    }
}

fn resolution_error(
    coordinate: &Coordinate,
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
) -> BridgeError {
    BridgeError::Resolution {
        coordinates: coordinate.to_string(),
        message,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_remote_path() {
        let coordinate = Coordinate::new("io.lintbridge", "lintbridge-driver_3.3.4", "0.12.0");
        let path = coordinate.remote_path();
        assert!(path.starts_with("io/lintbridge/lintbridge-driver_3.3.4/0.12.0/"));
        assert!(path.ends_with(&format!(
            "lintbridge-driver_3.3.4-0.12.0-{}.{}",
            platform_tag(),
            dylib_extension()
        )));
    }

    #[test]
    fn test_coordinate_display() {
        let coordinate = Coordinate::new("io.lintbridge", "lintbridge-driver_3.3.4", "0.12.0");
        assert_eq!(
            coordinate.to_string(),
            "io.lintbridge:lintbridge-driver_3.3.4:0.12.0"
        );
    }

    #[test]
    fn test_engine_coordinates_convention() {
        let coordinates = engine_coordinates("0.12.0", "3.3.4");
        assert_eq!(coordinates.len(), 1);
        assert_eq!(coordinates[0].group, ENGINE_GROUP);
        assert_eq!(coordinates[0].name, "lintbridge-driver_3.3.4");
        assert_eq!(coordinates[0].version, "0.12.0");
    }

    #[test]
    fn test_default_repositories() {
        let defaults = Repository::defaults();
        assert!(!defaults.is_empty());
        assert_eq!(defaults[0].url.scheme(), "https");
    }

    #[test]
    fn test_cached_artifact_skips_network() {
        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpArtifactFetcher::with_cache_dir(cache.path().to_path_buf()).unwrap();

        let coordinate = Coordinate::new("io.lintbridge", "lintbridge-driver_3.3.4", "0.12.0");
        let cached = cache.path().join(coordinate.remote_path());
        fs::create_dir_all(cached.parent().unwrap()).unwrap();
        fs::write(&cached, b"cached artifact").unwrap();

        // No repositories: a cache miss would fail, a hit never needs them.
        let artifacts = fetcher.fetch(&[], &[coordinate]).unwrap();
        assert_eq!(artifacts, vec![cached]);
    }

    #[test]
    fn test_cache_miss_without_repositories_fails() {
        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpArtifactFetcher::with_cache_dir(cache.path().to_path_buf()).unwrap();

        let coordinate = Coordinate::new("io.lintbridge", "lintbridge-driver_3.3.4", "0.12.0");
        let error = fetcher.fetch(&[], &[coordinate]).unwrap_err();
        match error {
            BridgeError::Resolution { message, .. } => {
                assert!(message.contains("no repositories"));
            }
            other => panic!("expected Resolution, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_coordinate_set_fails() {
        let cache = tempfile::tempdir().unwrap();
        let fetcher = HttpArtifactFetcher::with_cache_dir(cache.path().to_path_buf()).unwrap();
        assert!(matches!(
            fetcher.fetch(&Repository::defaults(), &[]),
            Err(BridgeError::Resolution { .. })
        ));
    }
}
