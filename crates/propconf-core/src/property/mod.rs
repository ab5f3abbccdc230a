//! Property descriptions and their runtime state.
//!
//! - [`spec`]    – immutable [`PropertySpec`] built once per key.
//! - [`context`] – [`PropertyContext`], the mutable value holder.
//! - [`rules`]   – show/hide/enable/disable rules between properties.
//! - [`table`]   – ordered per-set collection of contexts.

pub mod context;
pub mod rules;
pub mod spec;
pub mod table;

pub use context::{ApplyCallback, ContextFlags, PropertyContext, Validator};
pub use rules::{ControlRule, Relation, RuleOutcome, WidgetControl};
pub use spec::{NumericRange, PropertyFlags, PropertySpec, PropertySpecBuilder, UNNAMED_PAGE};
pub use table::PropertyTable;
