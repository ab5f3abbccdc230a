//! Infrastructure layer for the engine.
//!
//! Contains the file-system and process-facing adapters: the built-in
//! backends, glob-based file discovery, the bootstrap settings file and the
//! logging subscriber.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `propconf_core`, but MUST NOT be imported by the `application` layer.

pub mod backends;
pub mod discovery;
pub mod logging;
pub mod storage;
