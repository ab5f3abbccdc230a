//! Backend lifecycle across all sets: init/finalize and open/close.
//!
//! Every step reports failures through one [`ErrorSink`] per call, using
//! the failing set's error policy. The newest error is returned once all
//! sets were visited; a stop policy returns immediately.

use propconf_core::{ConfigError, ErrorSink};
use tracing::{debug, info};

use crate::application::configuration::Configuration;

impl Configuration {
    /// Lets each set's backend discover or create its files.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoConfigSetRegistered`], or the newest reported error.
    pub fn init_all(&mut self) -> Result<(), ConfigError> {
        self.ensure_sets()?;
        let mut sink = ErrorSink::new();
        for set in &mut self.sets {
            let backend = set.backend();
            let policy = set.flags().error_policy();
            if let Err(e) = backend.init_set(set) {
                sink.report(e, policy)?;
                continue;
            }
            info!(
                set = %set.name(),
                files = set.files().len(),
                write_target = ?set.write_target().map(|f| f.path().to_path_buf()),
                "configuration set initialised"
            );
        }
        sink.finish()
    }

    /// Releases per-set backend state.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoConfigSetRegistered`], or the newest reported error.
    pub fn finalize_all(&mut self) -> Result<(), ConfigError> {
        self.ensure_sets()?;
        let mut sink = ErrorSink::new();
        for set in &mut self.sets {
            let backend = set.backend();
            let policy = set.flags().error_policy();
            if let Err(e) = backend.finalize_set(set) {
                sink.report(e, policy)?;
            }
        }
        sink.finish()
    }

    /// Opens every file of every set.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoConfigSetRegistered`], or the newest reported error.
    pub fn open_all(&mut self) -> Result<(), ConfigError> {
        self.ensure_sets()?;
        let mut sink = ErrorSink::new();
        for set in &mut self.sets {
            let backend = set.backend();
            let policy = set.flags().error_policy();
            for file in set.files_mut() {
                match backend.open(file) {
                    Ok(()) => debug!(path = %file.path().display(), "opened configuration file"),
                    Err(e) => sink.report(e, policy)?,
                }
            }
        }
        sink.finish()
    }

    /// Closes every open file of every set.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoConfigSetRegistered`], or the newest reported error.
    pub fn close_all(&mut self) -> Result<(), ConfigError> {
        self.ensure_sets()?;
        let mut sink = ErrorSink::new();
        for set in &mut self.sets {
            let backend = set.backend();
            let policy = set.flags().error_policy();
            for file in set.files_mut().iter_mut().filter(|f| f.is_open()) {
                if let Err(e) = backend.close(file) {
                    sink.report(e, policy)?;
                }
            }
        }
        sink.finish()
    }
}
