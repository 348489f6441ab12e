//! Purpose: Resolve slash-delimited module paths to loaded implementations.
//! Exports: `SearchRoot`, `Registry`.
//! Role: Owns root priority, the name-match rule, and the per-process
//! load cache.
//! Invariants: Roots are consulted in priority order; the first root holding
//! a path wins and later roots are not consulted for it.
//! Invariants: Each path is loaded at most once per process; loads are
//! serialized and idempotent.
//! Invariants: A loader failure never aborts discovery; it is logged and the
//! path is treated as absent from that root.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::core::error::{Error, ErrorKind};
use crate::core::module::Module;

type Loader = Arc<dyn Fn() -> Result<Arc<dyn Module>, Error> + Send + Sync>;

/// A named, ordered collection of module entries. Registration happens at
/// startup: embedders build overlay roots in code and prepend them to the
/// builtin catalog.
pub struct SearchRoot {
    name: String,
    entries: Vec<(String, Loader)>,
}

impl SearchRoot {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a module path with its loader.
    pub fn module<F>(mut self, path: &str, loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Module>, Error> + Send + Sync + 'static,
    {
        self.entries.push((path.to_string(), Arc::new(loader)));
        self
    }

    fn find(&self, path: &str) -> Option<&Loader> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == path)
            .map(|(_, loader)| loader)
    }

    fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(path, _)| path.as_str())
    }
}

pub struct Registry {
    roots: Vec<SearchRoot>,
    cache: Mutex<HashMap<String, Arc<dyn Module>>>,
}

impl Registry {
    pub fn new(roots: Vec<SearchRoot>) -> Self {
        Self {
            roots,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a path to its implementation, loading and caching on first use.
    pub fn resolve(&self, path: &str) -> Result<Arc<dyn Module>, Error> {
        let path = normalize_path(path)?;

        // One lock covers lookup and load: concurrent resolvers of the same
        // path serialize here, so each path loads exactly once.
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(module) = cache.get(&path) {
            return Ok(Arc::clone(module));
        }

        for root in &self.roots {
            let Some(loader) = root.find(&path) else {
                continue;
            };
            debug!(root = root.name(), %path, "loading module");
            match loader() {
                Ok(module) => {
                    let segment = final_segment(&path);
                    if !module.name().eq_ignore_ascii_case(segment) {
                        return Err(Error::new(ErrorKind::BadModule).with_message(format!(
                            "artifact at '{path}' declares name '{}', expected '{segment}'",
                            module.name()
                        )));
                    }
                    cache.insert(path.clone(), Arc::clone(&module));
                    return Ok(module);
                }
                Err(err) => {
                    // Treated as not found at this root; later roots may
                    // still supply the module.
                    warn!(root = root.name(), %path, error = %err, "module failed to load");
                }
            }
        }

        Err(Error::new(ErrorKind::NotFound)
            .with_message(format!("no module named '{path}'"))
            .with_hint("Run with --list to see available modules."))
    }

    /// Load every resolvable module. Total: broken entries are skipped, each
    /// path appears exactly once (first root wins), sorted for stable output.
    pub fn resolve_all(&self) -> Vec<(String, Arc<dyn Module>)> {
        let mut paths = BTreeSet::new();
        for root in &self.roots {
            paths.extend(root.paths().map(str::to_string));
        }

        let mut loaded = Vec::new();
        for path in paths {
            match self.resolve(&path) {
                Ok(module) => loaded.push((path, module)),
                Err(err) => {
                    debug!(%path, error = %err, "skipping unresolvable module");
                }
            }
        }
        loaded
    }
}

fn normalize_path(path: &str) -> Result<String, Error> {
    if path.is_empty() {
        return Err(Error::new(ErrorKind::InvalidPath)
            .with_message("module path must not be empty"));
    }
    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(Error::new(ErrorKind::InvalidPath)
                .with_message(format!("malformed module path: '{path}'"))
                .with_hint("Use slash-delimited segments like encode/base64."));
        }
        if segment == "." || segment == ".." {
            return Err(Error::new(ErrorKind::InvalidPath)
                .with_message(format!("module path may not traverse: '{path}'")));
        }
    }
    Ok(path.to_string())
}

fn final_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
