//! # propconf-core
//!
//! Domain library for property-driven configuration: typed values, property
//! descriptions, per-property runtime state and the persistence model that
//! storage backends plug into.
//!
//! This crate has no file system or format dependencies. The orchestration
//! engine and the concrete backends live in the `propconf` crate.
//!
//! # Architecture overview
//!
//! An application describes each configuration key once, as a
//! [`PropertySpec`]: its value kind, default, page/group placement, allowed
//! values and any rules that show or hide other keys. At runtime every spec
//! is paired with a [`PropertyContext`] holding the current [`Value`].
//!
//! Contexts are grouped into a [`ConfigSet`], which also knows where its
//! files live and which [`ConfigBackend`] reads and writes them. Loading and
//! saving stage values in a [`ConfigBuffer`] before they reach the contexts
//! or the files.
//!
//! - **`value`**    – the tagged value type, parsing, rendering, comparison.
//! - **`property`** – specs, contexts, control rules and the property table.
//! - **`store`**    – files, sets, the backend trait and the save decision.
//! - **`layout`**   – the page → group → key tree for presentation layers.
//! - **`error`**    – [`ConfigError`] and the [`ErrorSink`] reporting policy.

pub mod error;
pub mod layout;
pub mod property;
pub mod store;
pub mod value;

// Re-export the most-used types at the crate root so callers can write
// `propconf_core::Value` instead of `propconf_core::value::Value`.
pub use error::{log_error, ConfigError, ErrorPolicy, ErrorSink};
pub use layout::{GroupLayout, PageEntry, PageLayout};
pub use property::{
    ContextFlags, ControlRule, NumericRange, PropertyContext, PropertyFlags, PropertySpec,
    PropertyTable, Relation, RuleOutcome, WidgetControl, UNNAMED_PAGE,
};
pub use store::{
    decide, AccessMask, ConfigBackend, ConfigBuffer, ConfigFile, ConfigSet, FileFlags,
    SaveDecision, SearchPolicy, SetFlags, SetView,
};
pub use value::{
    Color, CompareOptions, Comparison, ParseOptions, RenderFormat, Value, ValueError, ValueKind,
};
