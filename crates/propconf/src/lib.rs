//! propconf library entry point.
//!
//! Re-exports the application and infrastructure modules so that
//! integration tests (in `tests/`) and embedding applications can reach
//! them without knowing the internal layout.
//!
//! A typical embedding reads `propconf.toml`, builds the sets, adds its
//! properties and then drives the lifecycle:
//!
//! ```no_run
//! use std::path::Path;
//! use propconf::{init_logging, load_settings, BackendRegistry, Configuration};
//! use propconf_core::{PropertyContext, PropertySpec, ValueKind};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = load_settings(Path::new("propconf.toml"))?;
//! init_logging(&settings.logging);
//!
//! let mut config = Configuration::from_settings(&settings, &BackendRegistry::with_builtin())?;
//! config.add_property(
//!     "user",
//!     PropertyContext::from_spec(
//!         PropertySpec::builder("port", ValueKind::UInt16).page("network").default_text("8080").build(),
//!     ),
//! )?;
//! config.init_all()?;
//! config.open_all()?;
//! config.load_all()?;
//! config.save_all()?;
//! config.close_all()?;
//! config.finalize_all()?;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod infrastructure;

pub use application::Configuration;
pub use infrastructure::backends::{BackendRegistry, KeyfileBackend, MemoryBackend};
pub use infrastructure::discovery::prepare_files;
pub use infrastructure::logging::{init_logging, LoggingSettings};
pub use infrastructure::storage::settings::{
    load_settings, save_settings, EngineSettings, SetSettings, SettingsError, SETTINGS_FILE_NAME,
};
