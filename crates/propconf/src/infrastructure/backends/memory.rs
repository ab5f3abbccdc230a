//! In-process registry-style backend.
//!
//! Values are kept as rendered text per set, page and key, the way a system
//! registry stores them. Each set gets one synthetic file named after the
//! set, which is also its write target unless the set is read-only. The
//! store outlives configurations, so a second [`Configuration`] using the
//! same backend instance sees what the first one saved.
//!
//! [`Configuration`]: crate::application::Configuration

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use propconf_core::{
    decide, AccessMask, ConfigBackend, ConfigBuffer, ConfigError, ConfigFile, ConfigSet,
    ErrorSink, FileFlags, ParseOptions, RenderFormat, SetView, Value, ValueKind,
};
use tracing::debug;

type Pages = BTreeMap<String, BTreeMap<String, String>>;

/// Name of the registry node an open synthetic file refers to.
#[derive(Debug)]
struct MemoryHandle {
    node: String,
}

/// Registry-style backend holding text values in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    store: Mutex<HashMap<String, Pages>>,
}

impl MemoryBackend {
    pub const NAME: &'static str = "memory";

    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Pages>> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Stores raw text for `node`/`page`/`key`.
    pub fn insert(&self, node: &str, page: &str, key: &str, text: impl Into<String>) {
        self.lock()
            .entry(node.to_string())
            .or_default()
            .entry(page.to_string())
            .or_default()
            .insert(key.to_string(), text.into());
    }

    /// Raw text stored for `node`/`page`/`key`.
    pub fn get_text(&self, node: &str, page: &str, key: &str) -> Option<String> {
        self.lock().get(node)?.get(page)?.get(key).cloned()
    }

    fn node(file: &ConfigFile) -> Result<String, ConfigError> {
        file.handle::<MemoryHandle>()
            .map(|h| h.node.clone())
            .ok_or_else(|| ConfigError::BackendNotReady(file.path().display().to_string()))
    }
}

impl ConfigBackend for MemoryBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init_set(&self, set: &mut ConfigSet) -> Result<(), ConfigError> {
        set.clear_files();
        let index = set.push_file(ConfigFile::new(set.name()));
        if !set.is_read_only() {
            set.set_write_target(index)?;
        }
        Ok(())
    }

    fn can_access(&self, _file: &ConfigFile, _mask: AccessMask) -> bool {
        true
    }

    fn create(&self, file: &mut ConfigFile) -> Result<(), ConfigError> {
        self.lock()
            .entry(file.path().display().to_string())
            .or_default();
        Ok(())
    }

    fn open(&self, file: &mut ConfigFile) -> Result<(), ConfigError> {
        let node = file.path().display().to_string();
        let has_content = self.lock().get(&node).map_or(false, |pages| !pages.is_empty());
        file.attach(MemoryHandle { node });
        file.set_flag(FileFlags::HAS_CONTENT, has_content);
        Ok(())
    }

    fn close(&self, file: &mut ConfigFile) -> Result<(), ConfigError> {
        file.detach();
        Ok(())
    }

    fn preload(
        &self,
        set: &SetView<'_>,
        file: &mut ConfigFile,
        buffer: &mut ConfigBuffer,
        sink: &mut ErrorSink,
    ) -> Result<(), ConfigError> {
        let node = Self::node(file)?;
        let policy = set.error_policy();
        let pages = self.lock().get(&node).cloned().unwrap_or_default();

        for (page, keys) in &pages {
            if set.scope.is_some_and(|scope| scope != page.as_str()) {
                continue;
            }
            for (key, text) in keys {
                let ctx = match set.property(key) {
                    Some(ctx) if ctx.spec().page_or_unnamed() == page.as_str() => ctx,
                    _ => {
                        sink.report(ConfigError::InvalidKey(format!("{page}/{key}")), policy)?;
                        continue;
                    }
                };
                match ctx.spec().parse(text) {
                    Ok(value) => {
                        buffer.insert(key, page, value);
                    }
                    Err(e) => sink.report(e, policy)?,
                }
            }
        }
        Ok(())
    }

    fn save(
        &self,
        set: &SetView<'_>,
        file: &mut ConfigFile,
        buffer: &ConfigBuffer,
        sink: &mut ErrorSink,
    ) -> Result<Vec<String>, ConfigError> {
        let node = Self::node(file)?;
        let policy = set.error_policy();
        // Staged on a copy and committed in one step after the loop.
        let mut pages = self.lock().get(&node).cloned().unwrap_or_default();

        let mut written = Vec::new();
        for ctx in set.scoped_properties() {
            let page = ctx.spec().page_or_unnamed();
            if !decide(set.flags, ctx, buffer).is_write() {
                if let Some(keys) = pages.get_mut(page) {
                    keys.remove(ctx.key());
                }
                continue;
            }
            match ctx.value().render(&RenderFormat::default()) {
                Ok(text) => {
                    pages
                        .entry(page.to_string())
                        .or_default()
                        .insert(ctx.key().to_string(), text);
                    written.push(ctx.key().to_string());
                }
                Err(e) => sink.report(ConfigError::invalid_value(ctx.key(), &e), policy)?,
            }
        }
        pages.retain(|_, keys| !keys.is_empty());
        let has_content = !pages.is_empty();
        self.lock().insert(node.clone(), pages);

        file.set_flag(FileFlags::HAS_CONTENT, has_content);
        debug!(node = %node, written = written.len(), "saved registry node");
        Ok(written)
    }

    fn list_pages(&self, file: &ConfigFile) -> Result<Vec<String>, ConfigError> {
        let node = Self::node(file)?;
        Ok(self
            .lock()
            .get(&node)
            .map(|pages| pages.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn list_keys(&self, file: &ConfigFile, page: &str) -> Result<Vec<String>, ConfigError> {
        let node = Self::node(file)?;
        self.lock()
            .get(&node)
            .and_then(|pages| pages.get(page))
            .map(|keys| keys.keys().cloned().collect())
            .ok_or_else(|| ConfigError::InvalidPage(page.to_string()))
    }

    fn get_value(
        &self,
        file: &ConfigFile,
        page: &str,
        key: &str,
        kind: ValueKind,
        options: &ParseOptions,
    ) -> Result<Value, ConfigError> {
        let node = Self::node(file)?;
        let text = self
            .get_text(&node, page, key)
            .ok_or_else(|| ConfigError::InvalidKey(key.to_string()))?;
        Value::parse(kind, &text, options).map_err(|e| ConfigError::invalid_value(key, &e))
    }
}
