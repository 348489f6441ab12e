//! Purpose: Drive one module invocation through its lifecycle.
//! Exports: `Invocation`.
//! Role: Owns the CREATED -> VALIDATING -> RUNNING contract between the
//! dispatch front ends and a module's transform.
//! Invariants: Preconditions fail before any transform side effect; the
//! input-required check runs before any capability is consulted.
//! Invariants: Every failure crossing this boundary names the module.

use std::sync::Arc;

use tracing::debug;

use crate::core::env::Environment;
use crate::core::error::{Error, ErrorKind};
use crate::core::input::Chunks;
use crate::core::module::{Context, Module};
use crate::core::options::OptionBag;

/// A live, per-call binding of module, options, and input. Constructed per
/// invocation and consumed by `run`; nothing is shared across calls.
pub struct Invocation {
    path: String,
    module: Arc<dyn Module>,
}

impl Invocation {
    pub fn new(path: impl Into<String>, module: Arc<dyn Module>) -> Self {
        Self {
            path: path.into(),
            module,
        }
    }

    /// Validate preconditions, then start the transform. The returned stream
    /// stays lazy; it completes or fails only as the consumer pulls it.
    pub fn run(
        self,
        env: &dyn Environment,
        input: Option<Chunks>,
        opts: &OptionBag,
    ) -> Result<Chunks, Error> {
        let path = self.path;

        debug!(module = %path, "validating");
        if self.module.input_required() && input.is_none() {
            return Err(Error::new(ErrorKind::InputRequired)
                .with_message("must provide data as input")
                .with_module(&path));
        }
        for requirement in self.module.requirements() {
            env.ensure(&requirement)
                .map_err(|err| err.with_module(&path))?;
        }

        debug!(module = %path, "running");
        let mut ctx = Context::new(env);
        let stream = self
            .module
            .handle(&mut ctx, input, opts)
            .map_err(|err| err.with_module(&path))?;

        let origin = path;
        Ok(Chunks::new(stream.map(move |item| {
            item.map_err(|err| err.with_module(&origin))
        })))
    }
}
