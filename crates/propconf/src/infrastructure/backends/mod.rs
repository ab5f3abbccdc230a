//! Built-in storage backends and the registry that names them.
//!
//! - **`keyfile`** – TOML files found by glob search, one table per page.
//! - **`memory`**  – an in-process registry-style store of text values.
//!
//! Sets look up their backend by name through [`BackendRegistry`], which is
//! how `propconf.toml` refers to them. Applications can register their own
//! [`ConfigBackend`] implementations next to the built-ins.

pub mod keyfile;
pub mod memory;

use std::collections::HashMap;
use std::sync::Arc;

use propconf_core::{ConfigBackend, ConfigError};
use tracing::debug;

pub use keyfile::KeyfileBackend;
pub use memory::MemoryBackend;

/// Name → backend table.
#[derive(Default)]
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn ConfigBackend>>,
}

impl BackendRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the `keyfile` and `memory` backends.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(KeyfileBackend::new()));
        registry.register(Arc::new(MemoryBackend::new()));
        registry
    }

    /// Registers `backend` under its own name, returning any backend it replaced.
    pub fn register(&mut self, backend: Arc<dyn ConfigBackend>) -> Option<Arc<dyn ConfigBackend>> {
        let name = backend.name().to_string();
        debug!(backend = %name, "registering configuration backend");
        self.backends.insert(name, backend)
    }

    /// Looks up a backend by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownBackend`] when nothing is registered
    /// under `name`.
    pub fn get(&self, name: &str) -> Result<Arc<dyn ConfigBackend>, ConfigError> {
        self.backends
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownBackend(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.names())
            .finish()
    }
}
