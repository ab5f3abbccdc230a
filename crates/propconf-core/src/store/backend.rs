//! The storage backend contract.
//!
//! A backend turns files of one format (or one registry) into staged values
//! and back. The engine drives it per set and per file:
//!
//! ```text
//! init_set ─► open ─► preload* ─► save ─► close ─► finalize_set
//! ```
//!
//! Backends never mutate property contexts. `preload` stages values into a
//! [`ConfigBuffer`]; the engine moves them into contexts afterwards. Per-key
//! failures go through the [`ErrorSink`] with the set's error policy, so a
//! backend returns `Err` only for failures that make the whole file unusable
//! or when the sink asks it to stop.

use crate::error::{ConfigError, ErrorSink};
use crate::store::buffer::ConfigBuffer;
use crate::store::file::ConfigFile;
use crate::store::set::{ConfigSet, SetView};
use crate::value::{ParseOptions, Value, ValueKind};

/// Access bits tested by [`ConfigBackend::can_access`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessMask(pub u8);

impl AccessMask {
    pub const READ: AccessMask = AccessMask(1 << 0);
    pub const WRITE: AccessMask = AccessMask(1 << 1);
    pub const READ_WRITE: AccessMask = AccessMask(Self::READ.0 | Self::WRITE.0);

    pub fn contains(self, other: AccessMask) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Storage backend for configuration sets.
///
/// Implementations must be `Send + Sync`; the engine shares one instance
/// between all sets that name it.
pub trait ConfigBackend: Send + Sync {
    /// Registry name, e.g. `"keyfile"`.
    fn name(&self) -> &str;

    /// Populates the set's file array and write target.
    ///
    /// # Errors
    ///
    /// `CannotRead`/`CannotWrite` when no usable file can be found or made.
    fn init_set(&self, set: &mut ConfigSet) -> Result<(), ConfigError>;

    /// Releases per-set backend state. The default drops the file array.
    ///
    /// # Errors
    ///
    /// Backend-specific.
    fn finalize_set(&self, set: &mut ConfigSet) -> Result<(), ConfigError> {
        set.clear_files();
        Ok(())
    }

    /// Tests whether `file` can be accessed with every bit of `mask`.
    fn can_access(&self, file: &ConfigFile, mask: AccessMask) -> bool;

    /// Creates an empty backing file.
    ///
    /// # Errors
    ///
    /// I/O failures mapped through [`ConfigError::from_io`].
    fn create(&self, file: &mut ConfigFile) -> Result<(), ConfigError>;

    /// Opens `file` and attaches the backend's handle to it.
    ///
    /// # Errors
    ///
    /// I/O or format failures.
    fn open(&self, file: &mut ConfigFile) -> Result<(), ConfigError>;

    /// Detaches the backend's handle.
    ///
    /// # Errors
    ///
    /// Backend-specific.
    fn close(&self, file: &mut ConfigFile) -> Result<(), ConfigError>;

    /// Stages every in-scope property found in `file` into `buffer`.
    ///
    /// # Errors
    ///
    /// `BackendNotReady` if `file` is not open, or the error the sink
    /// returned under a stop policy.
    fn preload(
        &self,
        set: &SetView<'_>,
        file: &mut ConfigFile,
        buffer: &mut ConfigBuffer,
        sink: &mut ErrorSink,
    ) -> Result<(), ConfigError>;

    /// Writes the set's in-scope properties to `file`.
    ///
    /// `buffer` holds the values staged from the files that precede the
    /// write target; it feeds the duplicate check. Returns the keys written.
    ///
    /// # Errors
    ///
    /// `BackendNotReady`, I/O failures, or the sink's stop error.
    fn save(
        &self,
        set: &SetView<'_>,
        file: &mut ConfigFile,
        buffer: &ConfigBuffer,
        sink: &mut ErrorSink,
    ) -> Result<Vec<String>, ConfigError>;

    /// Page names present in an open file.
    ///
    /// # Errors
    ///
    /// `BackendNotReady` if `file` is not open.
    fn list_pages(&self, file: &ConfigFile) -> Result<Vec<String>, ConfigError>;

    /// Keys present on `page` of an open file.
    ///
    /// # Errors
    ///
    /// `BackendNotReady`, or `InvalidPage` when the page is absent.
    fn list_keys(&self, file: &ConfigFile, page: &str) -> Result<Vec<String>, ConfigError>;

    /// Reads one raw entry as a value of `kind`.
    ///
    /// # Errors
    ///
    /// `InvalidPage`/`InvalidKey` when absent, `InvalidValue` when the entry
    /// does not parse as `kind`, `UnsupportedType` for kinds the format
    /// cannot hold.
    fn get_value(
        &self,
        file: &ConfigFile,
        page: &str,
        key: &str,
        kind: ValueKind,
        options: &ParseOptions,
    ) -> Result<Value, ConfigError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! A backend that stores nothing, for tests that only need the trait object.

    use super::*;

    pub(crate) struct NullBackend;

    impl ConfigBackend for NullBackend {
        fn name(&self) -> &str {
            "null"
        }

        fn init_set(&self, set: &mut ConfigSet) -> Result<(), ConfigError> {
            let idx = set.push_file(ConfigFile::new("null"));
            set.set_write_target(idx)
        }

        fn can_access(&self, _file: &ConfigFile, _mask: AccessMask) -> bool {
            true
        }

        fn create(&self, _file: &mut ConfigFile) -> Result<(), ConfigError> {
            Ok(())
        }

        fn open(&self, file: &mut ConfigFile) -> Result<(), ConfigError> {
            file.attach(());
            Ok(())
        }

        fn close(&self, file: &mut ConfigFile) -> Result<(), ConfigError> {
            file.detach();
            Ok(())
        }

        fn preload(
            &self,
            _set: &SetView<'_>,
            _file: &mut ConfigFile,
            _buffer: &mut ConfigBuffer,
            _sink: &mut ErrorSink,
        ) -> Result<(), ConfigError> {
            Ok(())
        }

        fn save(
            &self,
            _set: &SetView<'_>,
            _file: &mut ConfigFile,
            _buffer: &ConfigBuffer,
            _sink: &mut ErrorSink,
        ) -> Result<Vec<String>, ConfigError> {
            Ok(Vec::new())
        }

        fn list_pages(&self, _file: &ConfigFile) -> Result<Vec<String>, ConfigError> {
            Ok(Vec::new())
        }

        fn list_keys(&self, _file: &ConfigFile, page: &str) -> Result<Vec<String>, ConfigError> {
            Err(ConfigError::InvalidPage(page.to_string()))
        }

        fn get_value(
            &self,
            _file: &ConfigFile,
            _page: &str,
            key: &str,
            _kind: ValueKind,
            _options: &ParseOptions,
        ) -> Result<Value, ConfigError> {
            Err(ConfigError::InvalidKey(key.to_string()))
        }
    }
}
