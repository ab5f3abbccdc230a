//! Structured logging setup.
//!
//! The engine itself only emits `tracing` events. Applications that want
//! them on stderr call [`init_logging`] once at startup; `RUST_LOG` takes
//! precedence over the configured level.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// `[logging]` section of `propconf.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `"info"` or
    /// `"propconf=debug"`.
    #[serde(default = "default_level")]
    pub level: String,

    /// Colourise output.
    #[serde(default = "default_true")]
    pub ansi: bool,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            ansi: default_true(),
        }
    }
}

/// Installs a global `fmt` subscriber.
///
/// Returns `false` when a global subscriber was already installed; the
/// existing one is left in place.
pub fn init_logging(settings: &LoggingSettings) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(settings.ansi)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_settings_default_level_is_info() {
        let settings = LoggingSettings::default();
        assert_eq!(settings.level, "info");
        assert!(settings.ansi);
    }

    #[test]
    fn test_empty_section_uses_defaults() {
        let settings: LoggingSettings = toml::from_str("").unwrap();
        assert_eq!(settings, LoggingSettings::default());
    }

    #[test]
    fn test_second_install_reports_false() {
        // Arrange
        let settings = LoggingSettings::default();
        init_logging(&settings);

        // Act
        let again = init_logging(&settings);

        // Assert
        assert!(!again);
    }
}
