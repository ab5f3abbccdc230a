//! A named group of properties persisted through one backend.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{ConfigError, ErrorPolicy};
use crate::property::context::PropertyContext;
use crate::property::spec::UNNAMED_PAGE;
use crate::property::table::PropertyTable;
use crate::store::backend::ConfigBackend;
use crate::store::file::ConfigFile;

/// Where and how a set looks for its backing files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPolicy {
    /// Glob matched against file names (not full paths).
    pub pattern: String,
    /// Directories searched in order; empty means the current directory.
    pub directories: Vec<PathBuf>,
    /// Name of the file created when no writable match exists.
    pub default_filename: Option<String>,
    /// Upper bound on admitted files.
    pub max_files: Option<usize>,
}

impl SearchPolicy {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            directories: Vec::new(),
            default_filename: None,
            max_files: None,
        }
    }

    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directories.push(dir.into());
        self
    }

    pub fn default_filename(mut self, name: impl Into<String>) -> Self {
        self.default_filename = Some(name.into());
        self
    }

    pub fn max_files(mut self, max: usize) -> Self {
        self.max_files = Some(max);
        self
    }

    /// Search directories, falling back to `.`.
    pub fn effective_directories(&self) -> Vec<PathBuf> {
        if self.directories.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.directories.clone()
        }
    }
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self::new("*")
    }
}

/// Behaviour flags of a [`ConfigSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetFlags(pub u16);

impl SetFlags {
    /// Never write; discovery does not pick or create a write target.
    pub const READ_ONLY: u16 = 1 << 0;
    /// Keep the first writable match as write target instead of the last.
    pub const NO_OVERRIDE: u16 = 1 << 1;
    /// Abort multi-file operations on the first reported error.
    pub const STOP_ON_ERROR: u16 = 1 << 2;
    /// Load values without invoking apply callbacks.
    pub const NO_APPLY: u16 = 1 << 3;
    /// Skip saving values equal to those staged from earlier files.
    pub const HIDE_DUPLICATE: u16 = 1 << 4;
    /// Skip saving values equal to their default.
    pub const HIDE_DEFAULT: u16 = 1 << 5;

    pub fn contains(self, bit: u16) -> bool {
        self.0 & bit != 0
    }

    pub fn error_policy(self) -> ErrorPolicy {
        if self.contains(Self::STOP_ON_ERROR) {
            ErrorPolicy::Stop
        } else {
            ErrorPolicy::Continue
        }
    }
}

/// Read-only view of a set handed to backends during I/O.
///
/// `scope` restricts the operation to the properties of one page; `None`
/// covers the whole set.
#[derive(Clone, Copy)]
pub struct SetView<'a> {
    pub name: &'a str,
    pub flags: SetFlags,
    pub properties: &'a PropertyTable,
    pub scope: Option<&'a str>,
}

impl<'a> SetView<'a> {
    /// Looks up a property, ignoring the page scope.
    pub fn property(&self, key: &str) -> Option<&'a PropertyContext> {
        self.properties.get(key)
    }

    pub fn in_scope(&self, ctx: &PropertyContext) -> bool {
        self.scope
            .map_or(true, |page| ctx.spec().page().unwrap_or(UNNAMED_PAGE) == page)
    }

    /// Properties covered by this view, in declaration order.
    pub fn scoped_properties(&self) -> impl Iterator<Item = &'a PropertyContext> + 'a {
        let view = *self;
        self.properties.iter().filter(move |ctx| view.in_scope(ctx))
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.flags.error_policy()
    }
}

/// A configuration set: properties, backend, and discovered files.
pub struct ConfigSet {
    name: String,
    backend: Arc<dyn ConfigBackend>,
    search: SearchPolicy,
    flags: SetFlags,
    pages: Vec<String>,
    properties: PropertyTable,
    files: Vec<ConfigFile>,
    write_index: Option<usize>,
}

impl ConfigSet {
    pub fn new(name: impl Into<String>, backend: Arc<dyn ConfigBackend>) -> Self {
        Self {
            name: name.into(),
            backend,
            search: SearchPolicy::default(),
            flags: SetFlags::default(),
            pages: Vec::new(),
            properties: PropertyTable::new(),
            files: Vec::new(),
            write_index: None,
        }
    }

    pub fn with_search(mut self, search: SearchPolicy) -> Self {
        self.search = search;
        self
    }

    pub fn with_flags(mut self, flags: u16) -> Self {
        self.flags.0 |= flags;
        self
    }

    /// Declares the pages this set owns for page-scoped load/save.
    pub fn with_pages<I, S>(mut self, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pages = pages.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> Arc<dyn ConfigBackend> {
        Arc::clone(&self.backend)
    }

    pub fn search(&self) -> &SearchPolicy {
        &self.search
    }

    pub fn flags(&self) -> SetFlags {
        self.flags
    }

    pub fn is_read_only(&self) -> bool {
        self.flags.contains(SetFlags::READ_ONLY)
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn declares_page(&self, page: &str) -> bool {
        self.pages.iter().any(|p| p == page)
    }

    pub fn properties(&self) -> &PropertyTable {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertyTable {
        &mut self.properties
    }

    /// Adds a property context to this set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AlreadyExists`] for a duplicate key.
    pub fn add_property(&mut self, ctx: PropertyContext) -> Result<(), ConfigError> {
        self.properties.insert(ctx)
    }

    /// Keys of the properties that belong to `page`.
    pub fn keys_on_page<'a>(&'a self, page: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.properties
            .iter()
            .filter(move |ctx| ctx.spec().page().unwrap_or(UNNAMED_PAGE) == page)
            .map(PropertyContext::key)
    }

    pub fn files(&self) -> &[ConfigFile] {
        &self.files
    }

    pub fn files_mut(&mut self) -> &mut [ConfigFile] {
        &mut self.files
    }

    /// Appends a file and returns its index.
    pub fn push_file(&mut self, file: ConfigFile) -> usize {
        self.files.push(file);
        self.files.len() - 1
    }

    /// Drops all files and the write target.
    pub fn clear_files(&mut self) {
        self.files.clear();
        self.write_index = None;
    }

    pub fn write_index(&self) -> Option<usize> {
        self.write_index
    }

    pub fn write_target(&self) -> Option<&ConfigFile> {
        self.write_index.and_then(|i| self.files.get(i))
    }

    /// Points the write target at `files[index]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Backend`] when `index` is out of bounds.
    pub fn set_write_target(&mut self, index: usize) -> Result<(), ConfigError> {
        if index >= self.files.len() {
            return Err(ConfigError::Backend(format!(
                "write index {index} out of bounds for set {} ({} files)",
                self.name,
                self.files.len()
            )));
        }
        self.write_index = Some(index);
        Ok(())
    }

    pub fn view<'a>(&'a self, scope: Option<&'a str>) -> SetView<'a> {
        SetView {
            name: &self.name,
            flags: self.flags,
            properties: &self.properties,
            scope,
        }
    }

    /// Borrows the property side read-only and the file array mutably.
    pub fn split_io<'a>(&'a mut self, scope: Option<&'a str>) -> (SetView<'a>, &'a mut [ConfigFile]) {
        (
            SetView {
                name: &self.name,
                flags: self.flags,
                properties: &self.properties,
                scope,
            },
            &mut self.files,
        )
    }
}

impl std::fmt::Debug for ConfigSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSet")
            .field("name", &self.name)
            .field("backend", &self.backend.name())
            .field("search", &self.search)
            .field("flags", &self.flags)
            .field("pages", &self.pages)
            .field("properties", &self.properties.len())
            .field("files", &self.files)
            .field("write_index", &self.write_index)
            .finish()
    }
}
