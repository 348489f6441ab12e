//! Purpose: Define the plugin interface every dispatchable module implements.
//! Exports: `Module`, `Context`, `declared_options`.
//! Role: The seam between the generic dispatch core and the module catalog.
//! Invariants: Implementations are stateless; per-invocation state lives in
//! the runtime's `Invocation`, never on the module value.
//! Invariants: `handle` returns a lazy stream; chunk N+1 is not computed
//! until a consumer pulls it.

use std::fmt;

use crate::core::env::{Environment, Requirement};
use crate::core::error::Error;
use crate::core::input::Chunks;
use crate::core::options::{OptionBag, OptionDecls};

/// A self-contained unit of functionality, resolvable by path.
///
/// The declared `name()` must equal the final segment of every path the
/// module is registered under, compared case-insensitively; the registry
/// rejects mismatches as invalid modules.
pub trait Module: Send + Sync {
    fn name(&self) -> &'static str;

    /// One-line description shown in help text.
    fn summary(&self) -> &'static str;

    /// Declare extra options on the parser. Default: none.
    fn declare_options(&self, decls: &mut OptionDecls) {
        let _ = decls;
    }

    /// External capabilities this module needs before it can run.
    fn requirements(&self) -> Vec<Requirement> {
        Vec::new()
    }

    /// Whether the module refuses to run without input data.
    fn input_required(&self) -> bool {
        false
    }

    /// Perform the module's transform over the normalized input, lazily
    /// yielding output chunks.
    fn handle(
        &self,
        ctx: &mut Context<'_>,
        input: Option<Chunks>,
        opts: &OptionBag,
    ) -> Result<Chunks, Error>;
}

impl fmt::Debug for dyn Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module").field("name", &self.name()).finish()
    }
}

/// Per-invocation handle to framework-provided collaborators. Modules reach
/// external capabilities through here instead of inheriting them.
pub struct Context<'a> {
    env: &'a dyn Environment,
}

impl<'a> Context<'a> {
    pub fn new(env: &'a dyn Environment) -> Self {
        Self { env }
    }

    pub fn env(&self) -> &dyn Environment {
        self.env
    }
}

/// Collect a module's full option declarations.
pub fn declared_options(module: &dyn Module) -> OptionDecls {
    let mut decls = OptionDecls::new();
    module.declare_options(&mut decls);
    decls
}
