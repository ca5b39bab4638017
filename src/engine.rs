// Capability interface shared across the isolation boundary
//
// Everything in this module is the common vocabulary between a host and a
// dynamically loaded engine build: the `LintEngine` trait, the arguments
// value it constructs, and the entry declaration an engine library exports.
// Type identity of this surface must match on both sides of the boundary;
// the loader enforces that through the API fingerprint below.

use std::path::PathBuf;

/// Fingerprint pinned into every engine build at compile time.
///
/// The instantiator refuses an entry declaration whose fingerprint differs
/// from the host's, which is how an engine compiled against a different
/// interface release is rejected instead of invoked.
pub const API_FINGERPRINT: &str = concat!("lintbridge-api/", env!("CARGO_PKG_VERSION"));

/// Well-known exported symbol naming an engine library's entry declaration.
pub const ENGINE_DECL_SYMBOL: &[u8] = b"lintbridge_engine_decl\0";

/// Stable contract implemented by every engine build.
///
/// Hosts only ever see an engine through this trait; the implementation
/// lives in the dialect-specific libraries resolved at load time.
pub trait LintEngine: Send {
    /// Construct a fresh arguments value for a run of this engine.
    fn new_arguments(&self) -> LintArguments;

    /// Render the engine's command-line help, wrapped to `screen_width`
    /// columns.
    fn main_help(&self, screen_width: usize) -> String;

    /// The release version of this engine build.
    fn engine_version(&self) -> String;

    /// The exact dialect version this engine build was compiled against.
    fn dialect_version(&self) -> String;

    /// Every exact dialect version this engine release supports.
    fn supported_dialect_versions(&self) -> Vec<String>;

    /// The 2.12 version in [`LintEngine::supported_dialect_versions`].
    fn dialect_212(&self) -> String;

    /// The 2.13 version in [`LintEngine::supported_dialect_versions`].
    fn dialect_213(&self) -> String;

    /// The 3 LTS version in [`LintEngine::supported_dialect_versions`].
    fn dialect_3_lts(&self) -> String;

    /// The 3 Next version in [`LintEngine::supported_dialect_versions`].
    fn dialect_3_next(&self) -> String;

    #[deprecated(note = "2.11 engine builds are no longer published")]
    fn dialect_211(&self) -> String;
}

/// Arguments for one engine run, built up with chained `with_*` calls.
#[derive(Debug, Clone, Default)]
pub struct LintArguments {
    pub paths: Vec<PathBuf>,
    pub rules: Vec<String>,
    pub config_file: Option<PathBuf>,
    pub dialect_version: Option<String>,
    pub tool_artifacts: Vec<PathBuf>,
}

impl LintArguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files and directories the engine should analyze.
    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    /// Rule names to run, overriding the configuration file.
    pub fn with_rules(mut self, rules: Vec<String>) -> Self {
        self.rules = rules;
        self
    }

    /// Explicit configuration file for the run.
    pub fn with_config_file(mut self, config_file: PathBuf) -> Self {
        self.config_file = Some(config_file);
        self
    }

    /// Exact dialect version of the sources under analysis. Semantic rules
    /// require this to match the version the target code was built with.
    pub fn with_dialect_version(mut self, dialect_version: impl Into<String>) -> Self {
        self.dialect_version = Some(dialect_version.into());
        self
    }

    /// Extra rule libraries for the engine to load.
    ///
    /// These are loaded as children of the engine's own loading context, so
    /// they must have been compiled against the same capability-interface
    /// release (and dialect binary series) as the loaded engine. A library
    /// that does not satisfy that ancestry breaks cross-boundary dispatch
    /// rather than failing cleanly.
    pub fn with_tool_artifacts(mut self, tool_artifacts: Vec<PathBuf>) -> Self {
        self.tool_artifacts = tool_artifacts;
        self
    }
}

/// Entry declaration exported by an engine library under
/// [`ENGINE_DECL_SYMBOL`].
///
/// Prefer [`declare_engine!`](crate::declare_engine) over exporting this by
/// hand.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct EngineDeclaration {
    /// Must equal the host's [`API_FINGERPRINT`] for the declaration to be
    /// invoked.
    pub api_fingerprint: &'static str,
    /// Zero-argument constructor producing a boxed engine, transferred raw
    /// across the boundary.
    pub create: unsafe extern "C" fn() -> *mut dyn LintEngine,
}

/// Export a well-formed entry declaration for an engine implementation.
///
/// ```ignore
/// struct MyEngine;
/// impl lintbridge::LintEngine for MyEngine { /* ... */ }
///
/// lintbridge::declare_engine!(MyEngine, MyEngine::default);
/// ```
#[macro_export]
macro_rules! declare_engine {
    ($engine_type:ty, $constructor:path) => {
        #[doc(hidden)]
        #[no_mangle]
        pub unsafe extern "C" fn __lintbridge_engine_create() -> *mut dyn $crate::LintEngine {
            let constructor: fn() -> $engine_type = $constructor;
            // A panicking constructor must not unwind across the boundary;
            // null signals instantiation failure to the host.
            match ::std::panic::catch_unwind(|| {
                let boxed: Box<dyn $crate::LintEngine> = Box::new(constructor());
                boxed
            }) {
                Ok(boxed) => Box::into_raw(boxed),
                Err(_) => ::std::ptr::null_mut::<$engine_type>() as *mut dyn $crate::LintEngine,
            }
        }

        #[doc(hidden)]
        #[no_mangle]
        #[allow(non_upper_case_globals)]
        pub static lintbridge_engine_decl: $crate::EngineDeclaration = $crate::EngineDeclaration {
            api_fingerprint: $crate::API_FINGERPRINT,
            create: __lintbridge_engine_create,
        };
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_builder() {
        let args = LintArguments::new()
            .with_paths(vec![PathBuf::from("src/lib.rs")])
            .with_rules(vec!["NoImplicitReturn".to_string()])
            .with_dialect_version("3.3.4");

        assert_eq!(args.paths, vec![PathBuf::from("src/lib.rs")]);
        assert_eq!(args.rules, vec!["NoImplicitReturn".to_string()]);
        assert_eq!(args.dialect_version.as_deref(), Some("3.3.4"));
        assert!(args.config_file.is_none());
        assert!(args.tool_artifacts.is_empty());
    }

    #[test]
    fn test_fingerprint_tracks_crate_version() {
        assert!(API_FINGERPRINT.starts_with("lintbridge-api/"));
        assert!(API_FINGERPRINT.ends_with(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_decl_symbol_is_nul_terminated() {
        assert_eq!(ENGINE_DECL_SYMBOL.last(), Some(&0));
    }
}
