// Dynamic instantiation of an engine from a loading context
//
// The one place every loading and reflective failure mode is funnelled into
// a single error kind: artifact open failures, a missing entry declaration,
// a fingerprint mismatch, and constructor failures all surface as
// `BridgeError::Instantiation` carrying the loading context's identity.

use std::ops::Deref;
use std::panic::{catch_unwind, AssertUnwindSafe};

use libloading::Library;
use tracing::debug;

use crate::engine::{EngineDeclaration, LintEngine, ENGINE_DECL_SYMBOL};
use crate::error::{BridgeError, Result};
use crate::loader::LoadingContext;

/// An engine instance together with the loading context that produced it.
///
/// The caller owns both; the backing libraries stay loaded for as long as
/// this value lives, and are only released after the engine itself is gone.
pub struct LoadedEngine {
    // Declared before `libraries`: the engine's vtable lives in one of the
    // loaded libraries, so the engine must drop first.
    engine: Box<dyn LintEngine>,
    #[allow(dead_code)]
    libraries: Vec<Library>,
    context: LoadingContext,
}

impl LoadedEngine {
    /// The engine, viewed through the capability interface.
    pub fn engine(&self) -> &dyn LintEngine {
        &*self.engine
    }

    /// The loading context backing this instance.
    pub fn context(&self) -> &LoadingContext {
        &self.context
    }
}

impl Deref for LoadedEngine {
    type Target = dyn LintEngine;

    fn deref(&self) -> &Self::Target {
        &*self.engine
    }
}

impl std::fmt::Debug for LoadedEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedEngine")
            .field("context", &self.context.identity())
            .finish_non_exhaustive()
    }
}

/// Instantiate the engine declared in `context`'s artifacts.
///
/// Opens each artifact library in order, locates the well-known entry
/// declaration, checks it against the context's shared surface, and invokes
/// its zero-argument constructor. The artifact set is consumed exactly once;
/// the returned instance keeps the opened libraries alive.
pub fn instantiate(context: LoadingContext) -> Result<LoadedEngine> {
    let mut libraries = Vec::with_capacity(context.artifacts().len());
    for artifact in context.artifacts() {
        debug!(artifact = %artifact.display(), "opening artifact library");
        let library = unsafe { Library::new(artifact) }.map_err(|e| {
            instantiation_error(
                &context,
                format!("failed to open artifact '{}': {e}", artifact.display()),
            )
        })?;
        libraries.push(library);
    }

    let declaration = find_declaration(&libraries).ok_or_else(|| {
        instantiation_error(
            &context,
            format!(
                "entry point declaration '{}' not found in any artifact",
                symbol_name()
            ),
        )
    })?;

    let expected = context.surface().api_fingerprint();
    if declaration.api_fingerprint != expected {
        return Err(instantiation_error(
            &context,
            format!(
                "incompatible entry declaration: engine built against '{}', host expects '{expected}'",
                declaration.api_fingerprint
            ),
        ));
    }

    let raw = catch_unwind(AssertUnwindSafe(|| unsafe { (declaration.create)() }))
        .map_err(|_| instantiation_error(&context, "engine constructor panicked".to_string()))?;
    if raw.is_null() {
        return Err(instantiation_error(
            &context,
            "engine constructor returned null".to_string(),
        ));
    }

    // Ownership of the allocation transfers to the host here.
    let engine = unsafe { Box::from_raw(raw) };

    Ok(LoadedEngine {
        engine,
        libraries,
        context,
    })
}

fn find_declaration(libraries: &[Library]) -> Option<EngineDeclaration> {
    for library in libraries {
        let symbol = unsafe { library.get::<*mut EngineDeclaration>(ENGINE_DECL_SYMBOL) };
        if let Ok(declaration) = symbol {
            return Some(unsafe { declaration.read() });
        }
    }
    None
}

fn instantiation_error(context: &LoadingContext, message: String) -> BridgeError {
    BridgeError::Instantiation {
        context: context.identity(),
        message,
    }
}

fn symbol_name() -> &'static str {
    // Strip the trailing NUL the lookup needs.
    std::str::from_utf8(&ENGINE_DECL_SYMBOL[..ENGINE_DECL_SYMBOL.len() - 1])
        .unwrap_or("lintbridge_engine_decl")
}
