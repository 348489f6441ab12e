//! Purpose: Library front end for invoking modules in-process.
//! Exports: `Dispatcher`, `CallOptions`, `Output`, `invoke`, `shared`.
//! Role: Mirrors the CLI's resolve/validate/run sequence without any terminal
//! or process concerns; embedders call this directly.
//! Invariants: Without `generate` the result is fully materialized bytes;
//! with it, the caller receives the lazy stream and owns chunk boundaries.
//! Invariants: The library never mutates process-global state; subscriber
//! and signal configuration belong to the embedder.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::core::env::{Environment, SystemEnv};
use crate::core::error::Error;
use crate::core::input::{normalize, Chunks, Input};
use crate::core::module::{declared_options, Module};
use crate::core::options::{parse_kwargs, Kwargs, OptionValue};
use crate::core::registry::{Registry, SearchRoot};
use crate::core::runtime::Invocation;
use crate::modules;

/// Per-call knobs mirroring the CLI's cross-cutting flags.
#[derive(Debug, Default)]
pub struct CallOptions {
    pub iterate: bool,
    pub generate: bool,
    pub kwargs: Kwargs,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iterate(mut self) -> Self {
        self.iterate = true;
        self
    }

    pub fn generate(mut self) -> Self {
        self.generate = true;
        self
    }

    pub fn kwarg(mut self, name: &str, value: impl Into<OptionValue>) -> Self {
        self.kwargs.insert(name.to_string(), value.into());
        self
    }
}

/// The result of an invocation.
pub enum Output {
    Bytes(Vec<u8>),
    Stream(Chunks),
}

impl Output {
    /// Materialize either variant, draining a stream if necessary.
    pub fn into_bytes(self) -> Result<Vec<u8>, Error> {
        match self {
            Output::Bytes(data) => Ok(data),
            Output::Stream(stream) => stream.concat(),
        }
    }
}

/// Opaque for the stream variant: inspecting it would consume it.
impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Bytes(data) => write!(f, "Bytes({} bytes)", data.len()),
            Output::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Registry plus environment, bound together for repeated invocations.
pub struct Dispatcher {
    registry: Registry,
    env: Box<dyn Environment>,
}

impl Dispatcher {
    /// The default configuration: builtin catalog, system environment.
    pub fn new() -> Self {
        Self::with_roots(Vec::new(), Box::new(SystemEnv::new()))
    }

    /// Overlay roots take priority over the builtin catalog, which is always
    /// appended last.
    pub fn with_roots(overlays: Vec<SearchRoot>, env: Box<dyn Environment>) -> Self {
        let mut roots = overlays;
        roots.push(modules::builtin());
        Self {
            registry: Registry::new(roots),
            env,
        }
    }

    pub fn resolve(&self, path: &str) -> Result<Arc<dyn Module>, Error> {
        self.registry.resolve(path)
    }

    /// Every resolvable module, sorted by path.
    pub fn modules(&self) -> Vec<(String, Arc<dyn Module>)> {
        self.registry.resolve_all()
    }

    pub fn env(&self) -> &dyn Environment {
        self.env.as_ref()
    }

    /// Resolve, validate options and input, and run the module's transform.
    pub fn invoke(
        &self,
        path: &str,
        input: impl Into<Input>,
        opts: CallOptions,
    ) -> Result<Output, Error> {
        let module = self.resolve(path)?;
        let decls = declared_options(module.as_ref());
        let bag = parse_kwargs(&decls, &opts.kwargs)?;
        let chunks = normalize(input.into(), opts.iterate);
        let stream = Invocation::new(path, module).run(self.env(), chunks, &bag)?;
        if opts.generate {
            Ok(Output::Stream(stream))
        } else {
            Ok(Output::Bytes(stream.concat()?))
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

static SHARED: OnceLock<Dispatcher> = OnceLock::new();

/// The process-wide default dispatcher, created on first use.
pub fn shared() -> &'static Dispatcher {
    SHARED.get_or_init(Dispatcher::new)
}

/// One-shot convenience over the shared dispatcher.
pub fn invoke(path: &str, input: impl Into<Input>, opts: CallOptions) -> Result<Output, Error> {
    shared().invoke(path, input, opts)
}
