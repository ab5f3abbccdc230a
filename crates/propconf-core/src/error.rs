//! Configuration error kinds and the shared error-reporting path.
//!
//! Every fallible engine operation returns `Result<_, ConfigError>`.
//! Multi-file and multi-set operations funnel per-item failures through an
//! [`ErrorSink`], which implements the engine-wide policy:
//!
//! - the sink keeps only the newest error, but logs the previous one before
//!   replacing it, so no error is dropped without being logged once;
//! - under [`ErrorPolicy::Stop`] a report aborts the operation (`?` on the
//!   returned `Err`); under [`ErrorPolicy::Continue`] iteration goes on and
//!   the newest error is returned by [`ErrorSink::finish`].

use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, warn};

use crate::value::{ValueError, ValueKind};

/// Errors raised by the configuration engine and its backends.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A set or property with the same name is already registered.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// No readable file could be found for a set.
    #[error("cannot read configuration set {0}")]
    CannotRead(String),

    /// A set that requires writes has no writable target.
    #[error("cannot write configuration set {0}")]
    CannotWrite(String),

    /// A backing file is syntactically broken.
    #[error("invalid format in {path}: {message}")]
    InvalidFormat { path: PathBuf, message: String },

    /// A key does not name any registered property.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A page is not known to any set or file.
    #[error("invalid page: {0}")]
    InvalidPage(String),

    /// A value was rejected by parsing, constraints or a validator.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// An operation needed at least one configuration set.
    #[error("no configuration set registered")]
    NoConfigSetRegistered,

    /// A backing file does not exist.
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    /// The backend was asked to work on a file it has not opened.
    #[error("backend not ready: {0}")]
    BackendNotReady(String),

    /// The OS refused access to a backing file.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A backend cannot represent a value kind.
    #[error("unsupported value type: {0}")]
    UnsupportedType(ValueKind),

    /// Any other backend-specific failure.
    #[error("backend error: {0}")]
    Backend(String),

    /// A file system I/O error not covered by a more specific kind.
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No backend is registered under the requested name.
    #[error("no backend registered as {0:?}")]
    UnknownBackend(String),
}

impl ConfigError {
    /// Wraps a [`ValueError`] with the property key it concerns.
    pub fn invalid_value(key: &str, source: &ValueError) -> Self {
        match source {
            ValueError::UnsupportedType(kind) => ConfigError::UnsupportedType(*kind),
            other => ConfigError::InvalidValue {
                key: key.to_string(),
                message: other.to_string(),
            },
        }
    }

    /// Maps an I/O error on `path` to the most specific kind.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound(path),
            std::io::ErrorKind::PermissionDenied => ConfigError::PermissionDenied(path),
            _ => ConfigError::Io { path, source },
        }
    }
}

/// Whether a reported failure aborts the surrounding iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Record the error and keep going (the default).
    #[default]
    Continue,
    /// Abort the whole operation with this error.
    Stop,
}

/// Collects the newest error of a multi-step operation.
#[derive(Debug, Default)]
pub struct ErrorSink {
    last: Option<ConfigError>,
    reported: usize,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports a failure.
    ///
    /// The previously held error (if any) is logged and replaced.
    ///
    /// # Errors
    ///
    /// Returns `Err(err)` under [`ErrorPolicy::Stop`] so callers can abort
    /// with `?`; returns `Ok(())` otherwise.
    pub fn report(&mut self, err: ConfigError, policy: ErrorPolicy) -> Result<(), ConfigError> {
        self.reported += 1;
        if let Some(previous) = self.last.take() {
            warn!("superseded configuration error: {previous}");
        }
        match policy {
            ErrorPolicy::Stop => {
                error!("aborting on configuration error: {err}");
                Err(err)
            }
            ErrorPolicy::Continue => {
                warn!("configuration error (continuing): {err}");
                self.last = Some(err);
                Ok(())
            }
        }
    }

    /// Number of errors reported so far, including superseded ones.
    pub fn reported(&self) -> usize {
        self.reported
    }

    pub fn is_clean(&self) -> bool {
        self.reported == 0
    }

    /// Returns the newest recorded error, if any.
    ///
    /// # Errors
    ///
    /// Returns the most recent error reported under [`ErrorPolicy::Continue`].
    pub fn finish(self) -> Result<(), ConfigError> {
        match self.last {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Logs and discards the error of `result`.
///
/// This is the path for callers that have nowhere to collect an error.
/// Returns `true` when `result` was `Ok`.
pub fn log_error<T>(result: Result<T, ConfigError>) -> bool {
    match result {
        Ok(_) => true,
        Err(err) => {
            error!("configuration error: {err}");
            false
        }
    }
}
