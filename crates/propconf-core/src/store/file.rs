//! One backing file of a configuration set.

use std::any::Any;
use std::path::{Path, PathBuf};

/// State flags of a [`ConfigFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileFlags(pub u8);

impl FileFlags {
    /// The backend loaded content for this file.
    pub const HAS_CONTENT: u8 = 1 << 0;
    /// The file was found read-only during discovery.
    pub const CANNOT_WRITE: u8 = 1 << 1;

    pub fn contains(self, bit: u8) -> bool {
        self.0 & bit != 0
    }
}

/// A file (or registry location) read and written by a backend.
///
/// The `handle` is private to the backend that opened the file; other code
/// only tests whether it is present.
pub struct ConfigFile {
    path: PathBuf,
    open: bool,
    handle: Option<Box<dyn Any + Send + Sync>>,
    flags: FileFlags,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            open: false,
            handle: None,
            flags: FileFlags::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn flags(&self) -> FileFlags {
        self.flags
    }

    pub fn set_flag(&mut self, bit: u8, on: bool) {
        if on {
            self.flags.0 |= bit;
        } else {
            self.flags.0 &= !bit;
        }
    }

    /// Marks the file open and stores the backend's handle.
    pub fn attach<T: Any + Send + Sync>(&mut self, handle: T) {
        self.handle = Some(Box::new(handle));
        self.open = true;
    }

    /// Marks the file closed and drops the backend's handle.
    pub fn detach(&mut self) {
        self.handle = None;
        self.open = false;
        self.set_flag(FileFlags::HAS_CONTENT, false);
    }

    pub fn handle<T: Any>(&self) -> Option<&T> {
        self.handle.as_deref().and_then(|h| h.downcast_ref::<T>())
    }

    pub fn handle_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.handle.as_deref_mut().and_then(|h| h.downcast_mut::<T>())
    }
}

impl std::fmt::Debug for ConfigFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigFile")
            .field("path", &self.path)
            .field("open", &self.open)
            .field("has_handle", &self.handle.is_some())
            .field("flags", &self.flags)
            .finish()
    }
}
