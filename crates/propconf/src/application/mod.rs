//! Application layer: the [`Configuration`] orchestrator.
//!
//! The orchestrator talks to storage only through the
//! [`ConfigBackend`](propconf_core::ConfigBackend) trait, so nothing here
//! touches the file system.
//!
//! # Sub-modules
//!
//! - **`configuration`** – set registration, page index, property access,
//!   page layout.
//! - **`lifecycle`**     – `init_all`/`finalize_all`, `open_all`/`close_all`.
//! - **`load_save`**     – `load_all`/`load_page`, `save_all`/`save_page`.
//! - **`rules`**         – evaluating control rules across sets.

pub mod configuration;
pub mod lifecycle;
pub mod load_save;
pub mod rules;

pub use configuration::Configuration;
