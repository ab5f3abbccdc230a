//! The engine's own bootstrap file, `propconf.toml`.
//!
//! It describes which configuration sets exist, where their files are
//! searched and which backend serves them, plus the logging section:
//!
//! ```toml
//! [logging]
//! level = "propconf=debug"
//!
//! [[sets]]
//! name = "system"
//! pattern = "*.toml"
//! directories = ["/etc/myapp"]
//! read_only = true
//!
//! [[sets]]
//! name = "user"
//! directories = ["/home/me/.config/myapp"]
//! default_filename = "myapp.toml"
//! hide_duplicate = true
//! ```
//!
//! Every field except a set's `name` may be omitted; missing fields take
//! the values of [`SetSettings::default`]. Properties are not described
//! here: the application adds them after [`Configuration::from_settings`].

use std::path::{Path, PathBuf};

use propconf_core::{ConfigError, ConfigSet, SearchPolicy, SetFlags};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::application::Configuration;
use crate::infrastructure::backends::BackendRegistry;
use crate::infrastructure::logging::LoggingSettings;

/// Conventional file name of the bootstrap file.
pub const SETTINGS_FILE_NAME: &str = "propconf.toml";

/// Error type for bootstrap file operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The settings could not be serialized to TOML.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Settings structs ──────────────────────────────────────────────────────────

/// Top-level contents of `propconf.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Sets in registration order.
    #[serde(default)]
    pub sets: Vec<SetSettings>,
}

/// One `[[sets]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSettings {
    pub name: String,

    /// Registered backend name.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Glob matched against file names in each directory.
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Search directories in order; empty means the working directory.
    #[serde(default)]
    pub directories: Vec<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_files: Option<usize>,

    /// Pages this set owns. Empty makes it a fallback set.
    #[serde(default)]
    pub pages: Vec<String>,

    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub no_override: bool,
    #[serde(default)]
    pub stop_on_error: bool,
    #[serde(default)]
    pub no_apply: bool,
    #[serde(default)]
    pub hide_duplicate: bool,
    #[serde(default)]
    pub hide_default: bool,
}

fn default_backend() -> String {
    "keyfile".to_string()
}

fn default_pattern() -> String {
    "*.toml".to_string()
}

impl SetSettings {
    /// Settings for a set called `name` with every other field defaulted.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backend: default_backend(),
            pattern: default_pattern(),
            directories: Vec::new(),
            default_filename: None,
            max_files: None,
            pages: Vec::new(),
            read_only: false,
            no_override: false,
            stop_on_error: false,
            no_apply: false,
            hide_duplicate: false,
            hide_default: false,
        }
    }

    /// The boolean switches as a [`SetFlags`] bit set.
    pub fn flags(&self) -> u16 {
        [
            (self.read_only, SetFlags::READ_ONLY),
            (self.no_override, SetFlags::NO_OVERRIDE),
            (self.stop_on_error, SetFlags::STOP_ON_ERROR),
            (self.no_apply, SetFlags::NO_APPLY),
            (self.hide_duplicate, SetFlags::HIDE_DUPLICATE),
            (self.hide_default, SetFlags::HIDE_DEFAULT),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        .fold(0, |acc, (_, bit)| acc | bit)
    }

    pub fn search_policy(&self) -> SearchPolicy {
        let mut search = SearchPolicy::new(self.pattern.clone());
        search.directories = self.directories.clone();
        search.default_filename = self.default_filename.clone();
        search.max_files = self.max_files;
        search
    }
}

impl Default for SetSettings {
    fn default() -> Self {
        Self::named("default")
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Loads settings from `path`, returning `EngineSettings::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`SettingsError::Io`] for file-system errors other than "not
/// found", and [`SettingsError::Parse`] if the TOML is malformed.
pub fn load_settings(path: &Path) -> Result<EngineSettings, SettingsError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let settings: EngineSettings = toml::from_str(&content)?;
            Ok(settings)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(EngineSettings::default()),
        Err(e) => Err(SettingsError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Writes `settings` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`SettingsError::Io`] for file-system failures or
/// [`SettingsError::Serialize`] if serialization fails.
pub fn save_settings(path: &Path, settings: &EngineSettings) -> Result<(), SettingsError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| SettingsError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(settings)?;
    std::fs::write(path, content).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

impl Configuration {
    /// Builds a configuration with one empty set per `[[sets]]` entry.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnknownBackend`] when a set names an unregistered
    ///   backend.
    /// - [`ConfigError::AlreadyExists`] when two sets share a name.
    pub fn from_settings(
        settings: &EngineSettings,
        registry: &BackendRegistry,
    ) -> Result<Configuration, ConfigError> {
        let mut config = Configuration::new();
        for entry in &settings.sets {
            let backend = registry.get(&entry.backend)?;
            let set = ConfigSet::new(entry.name.clone(), backend)
                .with_search(entry.search_policy())
                .with_flags(entry.flags())
                .with_pages(entry.pages.iter().cloned());
            config.add_set(set)?;
        }
        info!(sets = config.len(), "configuration built from settings");
        Ok(config)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_engine_settings_default_has_no_sets() {
        let settings = EngineSettings::default();
        assert!(settings.sets.is_empty());
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_set_settings_default_uses_keyfile_backend() {
        let set = SetSettings::named("user");
        assert_eq!(set.backend, "keyfile");
        assert_eq!(set.pattern, "*.toml");
        assert_eq!(set.flags(), 0);
    }

    #[test]
    fn test_flags_combine_enabled_switches() {
        let set = SetSettings {
            read_only: true,
            hide_default: true,
            ..SetSettings::named("system")
        };
        assert_eq!(set.flags(), SetFlags::READ_ONLY | SetFlags::HIDE_DEFAULT);
    }

    #[test]
    fn test_search_policy_carries_every_field() {
        let set = SetSettings {
            directories: vec![PathBuf::from("/etc/app")],
            default_filename: Some("app.toml".to_string()),
            max_files: Some(3),
            ..SetSettings::named("system")
        };

        let search = set.search_policy();

        assert_eq!(search.pattern, "*.toml");
        assert_eq!(search.directories, vec![PathBuf::from("/etc/app")]);
        assert_eq!(search.default_filename.as_deref(), Some("app.toml"));
        assert_eq!(search.max_files, Some(3));
    }

    // ── Serde ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_engine_settings_serializes_and_deserializes_round_trip() {
        // Arrange
        let original = EngineSettings {
            logging: LoggingSettings {
                level: "debug".to_string(),
                ansi: false,
            },
            sets: vec![SetSettings {
                pages: vec!["network".to_string()],
                no_override: true,
                ..SetSettings::named("user")
            }],
        };

        // Act
        let text = toml::to_string_pretty(&original).unwrap();
        let restored: EngineSettings = toml::from_str(&text).unwrap();

        // Assert
        assert_eq!(restored, original);
    }

    #[test]
    fn test_deserialize_minimal_toml_uses_defaults() {
        let minimal = "[[sets]]\nname = \"user\"\n";

        let settings: EngineSettings = toml::from_str(minimal).unwrap();

        assert_eq!(settings.logging, LoggingSettings::default());
        assert_eq!(settings.sets, vec![SetSettings::named("user")]);
    }

    #[test]
    fn test_deserialize_invalid_toml_returns_parse_error() {
        let bad = "[[sets]\nname = ";
        let result: Result<EngineSettings, toml::de::Error> = toml::from_str(bad);
        assert!(result.is_err());
    }

    #[test]
    fn test_set_without_name_is_rejected() {
        let result: Result<EngineSettings, _> = toml::from_str("[[sets]]\nbackend = \"memory\"\n");
        assert!(result.is_err());
    }

    // ── load/save ─────────────────────────────────────────────────────────────

    #[test]
    fn test_load_settings_returns_default_when_file_absent() {
        let path = std::env::temp_dir()
            .join(format!("propconf_absent_{}", Uuid::new_v4()))
            .join(SETTINGS_FILE_NAME);

        let settings = load_settings(&path).unwrap();

        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    fn test_save_and_load_settings_round_trip_via_temp_dir() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("propconf_settings_{}", Uuid::new_v4()));
        let path = dir.join("nested").join(SETTINGS_FILE_NAME);
        let mut settings = EngineSettings::default();
        settings.sets.push(SetSettings {
            backend: "memory".to_string(),
            ..SetSettings::named("registry")
        });

        // Act
        save_settings(&path, &settings).unwrap();
        let loaded = load_settings(&path).unwrap();

        // Assert
        assert_eq!(loaded, settings);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_settings_reports_malformed_file() {
        let dir = std::env::temp_dir().join(format!("propconf_settings_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "sets = 3").unwrap();

        let result = load_settings(&path);

        assert!(matches!(result, Err(SettingsError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    // ── from_settings ─────────────────────────────────────────────────────────

    #[test]
    fn test_from_settings_builds_sets_in_order() {
        // Arrange
        let settings = EngineSettings {
            sets: vec![
                SetSettings {
                    read_only: true,
                    ..SetSettings::named("system")
                },
                SetSettings {
                    backend: "memory".to_string(),
                    pages: vec!["ui".to_string()],
                    ..SetSettings::named("user")
                },
            ],
            ..EngineSettings::default()
        };

        // Act
        let config = Configuration::from_settings(&settings, &BackendRegistry::with_builtin()).unwrap();

        // Assert
        let names: Vec<&str> = config.sets().iter().map(ConfigSet::name).collect();
        assert_eq!(names, vec!["system", "user"]);
        assert!(config.set("system").unwrap().is_read_only());
        assert_eq!(config.set("user").unwrap().backend().name(), "memory");
        assert_eq!(config.set_for_page("ui").unwrap().name(), "user");
    }

    #[test]
    fn test_from_settings_rejects_unknown_backend() {
        let settings = EngineSettings {
            sets: vec![SetSettings {
                backend: "ldap".to_string(),
                ..SetSettings::named("user")
            }],
            ..EngineSettings::default()
        };

        let result = Configuration::from_settings(&settings, &BackendRegistry::with_builtin());

        assert!(matches!(result, Err(ConfigError::UnknownBackend(_))));
    }

    #[test]
    fn test_from_settings_rejects_duplicate_set_names() {
        let settings = EngineSettings {
            sets: vec![SetSettings::named("user"), SetSettings::named("user")],
            ..EngineSettings::default()
        };

        let result = Configuration::from_settings(&settings, &BackendRegistry::with_builtin());

        assert!(matches!(result, Err(ConfigError::AlreadyExists(_))));
    }
}
