//! Storage infrastructure: the engine's bootstrap file.
//!
//! The `settings` sub-module reads and writes `propconf.toml`, which lists
//! the configuration sets to build and the logging section. Application
//! values never go through here; they are stored by the backends.

pub mod settings;
