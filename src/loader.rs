// Isolated loading contexts for engine artifacts
//
// Two-level ownership chain: a narrow shared-surface context pins the
// capability-interface vocabulary and is shared by the whole process; a
// wider per-call context is parented on it and owns the ordered artifact
// file list for one engine build. Construction here is pure; libraries are
// only opened at instantiation time.

use std::path::PathBuf;

use once_cell::sync::Lazy;

use crate::engine::API_FINGERPRINT;

static SHARED_SURFACE: Lazy<SharedSurface> = Lazy::new(|| SharedSurface {
    api_fingerprint: API_FINGERPRINT,
});

/// The narrow interface-only context every loading context is parented on.
///
/// Constructed at most once per process and shared read-only across calls,
/// so two concurrent loads can never observe distinct surface identities.
/// It exposes nothing beyond the capability-interface vocabulary: the
/// `LintEngine` trait, its argument type, and the API fingerprint.
#[derive(Debug)]
pub struct SharedSurface {
    api_fingerprint: &'static str,
}

impl SharedSurface {
    /// The process-wide shared surface.
    pub fn get() -> &'static SharedSurface {
        &SHARED_SURFACE
    }

    /// Fingerprint an engine's entry declaration must match.
    pub fn api_fingerprint(&self) -> &'static str {
        self.api_fingerprint
    }
}

/// Per-call loading context owning the artifact files of one engine build.
///
/// The context is compatible with the host only if its ancestor chain
/// reaches the process-wide [`SharedSurface`]; every context built through
/// [`LoadingContext::from_artifacts`] satisfies that. Callers assembling a
/// context by hand must uphold the same ancestry, or dispatch across the
/// capability interface is undefined.
#[derive(Debug)]
pub struct LoadingContext {
    surface: &'static SharedSurface,
    artifacts: Vec<PathBuf>,
}

impl LoadingContext {
    /// Build a context over an ordered artifact set, parented on the
    /// process-wide shared surface.
    pub fn from_artifacts(artifacts: Vec<PathBuf>) -> Self {
        Self::new(SharedSurface::get(), artifacts)
    }

    /// Build a context parented on an explicit surface.
    pub fn new(surface: &'static SharedSurface, artifacts: Vec<PathBuf>) -> Self {
        Self { surface, artifacts }
    }

    /// The ordered artifact files this context owns. The first entry is the
    /// driver module.
    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    /// The parent surface in this context's ancestor chain.
    pub fn surface(&self) -> &'static SharedSurface {
        self.surface
    }

    /// Whether this context's ancestor chain includes `surface`.
    pub fn shares_surface_with(&self, surface: &SharedSurface) -> bool {
        std::ptr::eq(self.surface, surface)
    }

    /// Diagnosable description of this context, used in error messages.
    pub fn identity(&self) -> String {
        let names: Vec<&str> = self
            .artifacts
            .iter()
            .map(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("<non-utf8>")
            })
            .collect();
        format!(
            "LoadingContext({} artifacts: [{}], surface: {})",
            self.artifacts.len(),
            names.join(", "),
            self.surface.api_fingerprint
        )
    }
}

/// Platform-specific dynamic library extension for artifact file names.
pub fn dylib_extension() -> &'static str {
    if cfg!(target_os = "windows") {
        "dll"
    } else if cfg!(target_os = "macos") {
        "dylib"
    } else {
        "so"
    }
}
