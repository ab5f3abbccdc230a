//! Loading and saving property values through the set backends.
//!
//! # Load
//!
//! ```text
//! fresh buffer ─► preload(file 0) ─► preload(file 1) ─► … ─► set_value ─► apply
//! ```
//!
//! Files are preloaded in array order into one buffer, so a key present in
//! several files takes the value of the last one. Buffered values are then
//! moved into their contexts and applied unless the set has `NO_APPLY`.
//!
//! # Save
//!
//! Only the files *before* the write target are preloaded; that buffer is
//! what the duplicate check compares against. The backend then writes the
//! set to the write target and reports which keys it wrote, whose
//! `UNSAVED` flag is cleared.

use propconf_core::{
    ConfigBuffer, ConfigError, ConfigSet, ErrorPolicy, ErrorSink, SetFlags,
};
use tracing::{debug, info, warn};

use crate::application::configuration::Configuration;

impl Configuration {
    /// Loads every set from all of its files.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoConfigSetRegistered`], or the newest reported error.
    pub fn load_all(&mut self) -> Result<(), ConfigError> {
        self.ensure_sets()?;
        let mut sink = ErrorSink::new();
        for set in &mut self.sets {
            load_set(set, None, &mut sink)?;
        }
        sink.finish()
    }

    /// Loads only the properties of `page` from the set that owns it.
    ///
    /// # Errors
    ///
    /// Page resolution errors, or the newest reported error.
    pub fn load_page(&mut self, page: &str) -> Result<(), ConfigError> {
        let i = self.resolve_page(page)?;
        let mut sink = ErrorSink::new();
        load_set(&mut self.sets[i], Some(page), &mut sink)?;
        sink.finish()
    }

    /// Saves every writable set to its write target.
    ///
    /// Read-only sets are skipped.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoConfigSetRegistered`], or the newest reported error.
    pub fn save_all(&mut self) -> Result<(), ConfigError> {
        self.ensure_sets()?;
        let mut sink = ErrorSink::new();
        for set in &mut self.sets {
            if set.is_read_only() {
                debug!(set = %set.name(), "skipping read-only set on save");
                continue;
            }
            save_set(set, None, &mut sink)?;
        }
        sink.finish()
    }

    /// Saves only the properties of `page` to the owning set's write target.
    ///
    /// # Errors
    ///
    /// Page resolution errors, [`ConfigError::CannotWrite`] when the owning
    /// set has no write target, or the newest reported error.
    pub fn save_page(&mut self, page: &str) -> Result<(), ConfigError> {
        let i = self.resolve_page(page)?;
        let mut sink = ErrorSink::new();
        save_set(&mut self.sets[i], Some(page), &mut sink)?;
        sink.finish()
    }
}

// ── Per-set passes ────────────────────────────────────────────────────────────

/// Handles an error returned by a backend call.
///
/// Under [`ErrorPolicy::Stop`] the backend has usually reported it to the
/// sink already before bailing out, so it is passed through unchanged.
/// Otherwise it is reported like any other per-item failure.
fn absorb(err: ConfigError, policy: ErrorPolicy, sink: &mut ErrorSink) -> Result<(), ConfigError> {
    match policy {
        ErrorPolicy::Stop => Err(err),
        ErrorPolicy::Continue => sink.report(err, policy),
    }
}

/// Preloads the first `upto` files of `set` into a fresh buffer.
fn preload_files(
    set: &mut ConfigSet,
    scope: Option<&str>,
    upto: usize,
    sink: &mut ErrorSink,
) -> Result<ConfigBuffer, ConfigError> {
    let backend = set.backend();
    let mut buffer = ConfigBuffer::new();
    let (view, files) = set.split_io(scope);
    let policy = view.error_policy();
    for file in files.iter_mut().take(upto) {
        if let Err(e) = backend.preload(&view, file, &mut buffer, sink) {
            absorb(e, policy, sink)?;
        }
    }
    Ok(buffer)
}

fn load_set(set: &mut ConfigSet, scope: Option<&str>, sink: &mut ErrorSink) -> Result<(), ConfigError> {
    let policy = set.flags().error_policy();
    let apply = !set.flags().contains(SetFlags::NO_APPLY);
    let upto = set.files().len();
    let buffer = preload_files(set, scope, upto, sink)?;

    let mut loaded = 0usize;
    for entry in buffer.iter() {
        let Some(ctx) = set.properties_mut().get_mut(&entry.key) else {
            sink.report(ConfigError::InvalidKey(entry.key.clone()), policy)?;
            continue;
        };
        if let Err(e) = ctx.set_value(&entry.value) {
            sink.report(e, policy)?;
            continue;
        }
        if apply {
            ctx.apply();
        }
        loaded += 1;
    }

    info!(set = %set.name(), scope = ?scope, loaded, "configuration loaded");
    Ok(())
}

fn save_set(set: &mut ConfigSet, scope: Option<&str>, sink: &mut ErrorSink) -> Result<(), ConfigError> {
    let policy = set.flags().error_policy();
    let Some(target) = set.write_index() else {
        warn!(set = %set.name(), "no writable configuration file");
        return sink.report(ConfigError::CannotWrite(set.name().to_string()), policy);
    };

    let buffer = preload_files(set, scope, target, sink)?;

    let backend = set.backend();
    let written = {
        let (view, files) = set.split_io(scope);
        match backend.save(&view, &mut files[target], &buffer, sink) {
            Ok(keys) => keys,
            Err(e) => {
                absorb(e, policy, sink)?;
                Vec::new()
            }
        }
    };

    for key in &written {
        if let Some(ctx) = set.properties_mut().get_mut(key) {
            ctx.mark_saved();
        }
    }
    info!(set = %set.name(), scope = ?scope, written = written.len(), "configuration saved");
    Ok(())
}
