//! Glob-based discovery of a set's backing files.
//!
//! Search directories are scanned in order; within a directory, matching
//! entries are visited sorted by file name. Every readable match is
//! admitted. The write target is the last writable match, or the first
//! under `NO_OVERRIDE`. When nothing writable matched, a file named after
//! the search policy's default filename is created in the first directory
//! where that succeeds.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use propconf_core::{AccessMask, ConfigBackend, ConfigError, ConfigFile, ConfigSet, FileFlags, SetFlags};
use tracing::{debug, info, warn};

/// Populates `set`'s file array and write target from its search policy.
///
/// Files admitted before a failure stay in the set; the write target is only
/// set on success.
///
/// # Errors
///
/// - [`ConfigError::Backend`] when the glob pattern is malformed.
/// - [`ConfigError::CannotWrite`] when the set needs a write target and none
///   could be found or created.
/// - [`ConfigError::CannotRead`] when no file at all was admitted.
pub fn prepare_files(set: &mut ConfigSet, backend: &dyn ConfigBackend) -> Result<(), ConfigError> {
    let search = set.search().clone();
    let pattern = Pattern::new(&search.pattern).map_err(|e| {
        ConfigError::Backend(format!("invalid file pattern {:?}: {e}", search.pattern))
    })?;
    let read_only = set.is_read_only();
    let no_override = set.flags().contains(SetFlags::NO_OVERRIDE);
    let directories = search.effective_directories();
    let room_left = |set: &ConfigSet| search.max_files.map_or(true, |max| set.files().len() < max);

    let mut candidate: Option<usize> = None;
    'dirs: for dir in &directories {
        for path in matching_files(dir, &pattern) {
            if !room_left(&*set) {
                break 'dirs;
            }
            let mut file = ConfigFile::new(path);
            if !backend.can_access(&file, AccessMask::READ) {
                debug!(path = %file.path().display(), "skipping unreadable match");
                continue;
            }
            let writable = backend.can_access(&file, AccessMask::WRITE);
            file.set_flag(FileFlags::CANNOT_WRITE, !writable);
            let index = set.push_file(file);
            if !read_only && writable && (candidate.is_none() || !no_override) {
                candidate = Some(index);
            }
        }
    }

    if candidate.is_none() && !read_only && room_left(&*set) {
        if let Some(name) = &search.default_filename {
            candidate = create_default(set, backend, &directories, name);
        }
    }

    if let Some(index) = candidate {
        set.set_write_target(index)?;
    }
    info!(
        set = %set.name(),
        files = set.files().len(),
        write_target = ?set.write_target().map(|f| f.path().to_path_buf()),
        "configuration files discovered"
    );

    if !read_only && candidate.is_none() {
        return Err(ConfigError::CannotWrite(set.name().to_string()));
    }
    if set.files().is_empty() {
        return Err(ConfigError::CannotRead(set.name().to_string()));
    }
    Ok(())
}

/// Regular files in `dir` whose names match `pattern`, sorted by name.
fn matching_files(dir: &Path, pattern: &Pattern) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), "skipping search directory: {e}");
            return Vec::new();
        }
    };
    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|entry| entry.file_name().to_str().map_or(false, |name| pattern.matches(name)))
        .map(|entry| entry.path())
        .collect();
    paths.sort();
    paths
}

/// Creates the default file in the first directory that accepts it.
fn create_default(
    set: &mut ConfigSet,
    backend: &dyn ConfigBackend,
    directories: &[PathBuf],
    name: &str,
) -> Option<usize> {
    for dir in directories {
        if let Err(e) = fs::create_dir_all(dir) {
            debug!(dir = %dir.display(), "cannot create search directory: {e}");
            continue;
        }
        let mut file = ConfigFile::new(dir.join(name));
        match backend.create(&mut file) {
            Ok(()) => {
                info!(path = %file.path().display(), "created default configuration file");
                return Some(set.push_file(file));
            }
            Err(e) => warn!(path = %file.path().display(), "cannot create default file: {e}"),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::backends::keyfile::KeyfileBackend;
    use propconf_core::SearchPolicy;
    use std::sync::Arc;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("propconf_discovery_{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn set(search: SearchPolicy, flags: u16) -> ConfigSet {
        ConfigSet::new("app", Arc::new(KeyfileBackend::new()))
            .with_search(search)
            .with_flags(flags)
    }

    #[test]
    fn test_invalid_pattern_is_a_backend_error() {
        let mut set = set(SearchPolicy::new("[unclosed"), 0);
        let result = prepare_files(&mut set, &KeyfileBackend::new());
        assert!(matches!(result, Err(ConfigError::Backend(_))));
    }

    #[test]
    fn test_max_files_limits_admitted_matches() {
        // Arrange
        let dir = temp_dir();
        for name in ["a.toml", "b.toml", "c.toml"] {
            fs::write(dir.join(name), "").unwrap();
        }
        let mut set = set(
            SearchPolicy::new("*.toml").directory(&dir).max_files(2),
            0,
        );

        // Act
        prepare_files(&mut set, &KeyfileBackend::new()).unwrap();

        // Assert
        let names: Vec<_> = set
            .files()
            .iter()
            .map(|f| f.path().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.toml", "b.toml"]);
        assert_eq!(set.write_index(), Some(1));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_only_set_without_matches_cannot_read() {
        let dir = temp_dir();
        let mut set = set(
            SearchPolicy::new("*.toml").directory(&dir).default_filename("app.toml"),
            SetFlags::READ_ONLY,
        );

        let result = prepare_files(&mut set, &KeyfileBackend::new());

        assert!(matches!(result, Err(ConfigError::CannotRead(_))));
        assert!(!dir.join("app.toml").exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_search_directory_is_skipped() {
        let dir = temp_dir();
        fs::write(dir.join("x.toml"), "").unwrap();
        let mut set = set(
            SearchPolicy::new("*.toml")
                .directory(dir.join("does-not-exist"))
                .directory(&dir),
            SetFlags::READ_ONLY,
        );

        prepare_files(&mut set, &KeyfileBackend::new()).unwrap();

        assert_eq!(set.files().len(), 1);
        assert_eq!(set.write_index(), None);
        fs::remove_dir_all(&dir).ok();
    }
}
