//! Runtime state of one property: its spec, current value and callbacks.
//!
//! # Lifecycle
//!
//! ```text
//! unset ──► has-value ──► unapplied ──► applied
//!             (default)    (set_value)   (apply)
//! ```
//!
//! Orthogonally, `UNSAVED` is raised by the UI edit path
//! ([`PropertyContext::edit_value`]) when the value actually changes and is
//! cleared by [`PropertyContext::mark_saved`] once a save writes it.
//!
//! Setting a value is all-or-nothing: conversion, spec constraints and the
//! attached validator all run against a candidate first, and the context is
//! only mutated when every step succeeds.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::ConfigError;
use crate::property::rules::{RuleOutcome, WidgetControl};
use crate::property::spec::{PropertyFlags, PropertySpec};
use crate::value::{CompareOptions, Comparison, Value};

/// Application validator: returns `false` to reject a candidate value.
pub type Validator = Arc<dyn Fn(&PropertySpec, &Value) -> bool + Send + Sync>;

/// Application apply callback, invoked with the context and its value.
pub type ApplyCallback = Arc<dyn Fn(&PropertyContext, &Value) + Send + Sync>;

/// Bookkeeping flags of a [`PropertyContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContextFlags(pub u8);

impl ContextFlags {
    pub const HAS_VALUE: u8 = 1 << 0;
    pub const UNAPPLIED: u8 = 1 << 1;
    pub const UNSAVED: u8 = 1 << 2;
    pub const HIDDEN: u8 = 1 << 3;
    pub const INSENSITIVE: u8 = 1 << 4;

    pub fn contains(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    fn insert(&mut self, bits: u8) {
        self.0 |= bits;
    }

    fn remove(&mut self, bits: u8) {
        self.0 &= !bits;
    }
}

/// The mutable runtime pairing of a spec with its current value.
pub struct PropertyContext {
    spec: Arc<PropertySpec>,
    value: Value,
    flags: ContextFlags,
    selected_index: Option<usize>,
    validator: Option<Validator>,
    on_apply: Option<ApplyCallback>,
}

impl PropertyContext {
    /// Creates a context holding the spec's default value.
    pub fn new(spec: Arc<PropertySpec>) -> Self {
        let value = spec.default_value();
        let mut flags = ContextFlags(ContextFlags::HAS_VALUE);
        if spec.flags().contains(PropertyFlags::INITIALLY_HIDDEN) {
            flags.insert(ContextFlags::HIDDEN);
        }
        if spec.flags().contains(PropertyFlags::INITIALLY_INSENSITIVE) {
            flags.insert(ContextFlags::INSENSITIVE);
        }
        let selected_index = spec.fixed_index_of(&value);
        Self {
            spec,
            value,
            flags,
            selected_index,
            validator: None,
            on_apply: None,
        }
    }

    /// Convenience for `PropertyContext::new(Arc::new(spec))`.
    pub fn from_spec(spec: PropertySpec) -> Self {
        Self::new(Arc::new(spec))
    }

    pub fn with_validator(
        mut self,
        validator: impl Fn(&PropertySpec, &Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_apply(
        mut self,
        on_apply: impl Fn(&PropertyContext, &Value) + Send + Sync + 'static,
    ) -> Self {
        self.on_apply = Some(Arc::new(on_apply));
        self
    }

    pub fn spec(&self) -> &PropertySpec {
        &self.spec
    }

    pub fn shared_spec(&self) -> Arc<PropertySpec> {
        Arc::clone(&self.spec)
    }

    pub fn key(&self) -> &str {
        self.spec.key()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn flags(&self) -> ContextFlags {
        self.flags
    }

    pub fn has_value(&self) -> bool {
        self.flags.contains(ContextFlags::HAS_VALUE)
    }

    pub fn is_unapplied(&self) -> bool {
        self.flags.contains(ContextFlags::UNAPPLIED)
    }

    pub fn is_unsaved(&self) -> bool {
        self.flags.contains(ContextFlags::UNSAVED)
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.contains(ContextFlags::HIDDEN)
    }

    pub fn is_sensitive(&self) -> bool {
        !self.flags.contains(ContextFlags::INSENSITIVE)
    }

    /// Position of the current value within the spec's fixed value set.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    /// Whether the current value equals the spec default.
    pub fn is_default(&self) -> bool {
        self.value.compare(&self.spec.default_value(), &CompareOptions::default()) == Comparison::Equal
    }

    /// Sets the value through the generic path (used by loads).
    ///
    /// The candidate is converted to the spec kind, checked against the
    /// spec's constraints and the validator, then stored. Marks the context
    /// `HAS_VALUE | UNAPPLIED` and re-derives the selected index.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when any step rejects the
    /// candidate; the context is unchanged in that case.
    pub fn set_value(&mut self, candidate: &Value) -> Result<(), ConfigError> {
        let converted = candidate
            .convert_to(self.spec.kind())
            .map_err(|e| ConfigError::invalid_value(self.spec.key(), &e))?;
        self.spec.check(&converted)?;
        if let Some(validator) = &self.validator {
            if !validator(&self.spec, &converted) {
                return Err(ConfigError::InvalidValue {
                    key: self.spec.key().to_string(),
                    message: format!("{converted} rejected by validator"),
                });
            }
        }

        debug!(key = %self.spec.key(), value = %converted, "property value set");
        self.selected_index = self.spec.fixed_index_of(&converted);
        self.value = converted;
        self.flags.insert(ContextFlags::HAS_VALUE | ContextFlags::UNAPPLIED);
        Ok(())
    }

    /// Sets the value through the UI path: like [`set_value`](Self::set_value)
    /// but also raises `UNSAVED` when the value changed.
    ///
    /// # Errors
    ///
    /// See [`set_value`](Self::set_value).
    pub fn edit_value(&mut self, candidate: &Value) -> Result<(), ConfigError> {
        let before = self.value.clone();
        self.set_value(candidate)?;
        if self.value.compare(&before, &CompareOptions::default()) != Comparison::Equal {
            self.flags.insert(ContextFlags::UNSAVED);
        }
        Ok(())
    }

    /// Parses `text` with the spec's options and sets it (generic path).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] on parse or validation failure.
    pub fn set_from_text(&mut self, text: &str) -> Result<(), ConfigError> {
        let parsed = self.spec.parse(text)?;
        self.set_value(&parsed)
    }

    /// Selects the `index`-th fixed value (UI path).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when `index` is out of bounds.
    pub fn select_fixed(&mut self, index: usize) -> Result<(), ConfigError> {
        let text = self
            .spec
            .fixed_values()
            .get(index)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: self.spec.key().to_string(),
                message: format!("fixed value index {index} out of bounds"),
            })?
            .clone();
        let parsed = self.spec.parse(&text)?;
        self.edit_value(&parsed)
    }

    /// Restores the spec default (UI path).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the validator rejects the default.
    pub fn reset_to_default(&mut self) -> Result<(), ConfigError> {
        let default = self.spec.default_value();
        self.edit_value(&default)
    }

    /// Invokes the apply callback (if any) and clears `UNAPPLIED`.
    pub fn apply(&mut self) {
        if let Some(on_apply) = self.on_apply.clone() {
            on_apply(&*self, &self.value);
        }
        self.flags.remove(ContextFlags::UNAPPLIED);
    }

    /// Clears `UNSAVED` after a save wrote this property.
    pub fn mark_saved(&mut self) {
        self.flags.remove(ContextFlags::UNSAVED);
    }

    /// Evaluates the spec's control rules against the current value.
    ///
    /// A rule literal that does not parse as this property's kind compares as
    /// incomparable, so its `on_no_match` control is emitted.
    pub fn evaluate_rules(&self) -> Vec<RuleOutcome> {
        self.spec
            .rules()
            .iter()
            .map(|rule| {
                let comparison = match self.spec.parse(&rule.test_value) {
                    Ok(literal) => self.value.compare(&literal, &CompareOptions::default()),
                    Err(_) => Comparison::Incomparable,
                };
                RuleOutcome {
                    source: self.key().to_string(),
                    target: rule.target.clone(),
                    control: rule.outcome(comparison),
                }
            })
            .collect()
    }

    /// Applies a rule outcome to this context's presentation flags.
    pub fn apply_control(&mut self, control: WidgetControl) {
        if control.contains(WidgetControl::SHOW) {
            self.flags.remove(ContextFlags::HIDDEN);
        }
        if control.contains(WidgetControl::HIDE) {
            self.flags.insert(ContextFlags::HIDDEN);
        }
        if control.contains(WidgetControl::SENSITIVE) {
            self.flags.remove(ContextFlags::INSENSITIVE);
        }
        if control.contains(WidgetControl::INSENSITIVE) {
            self.flags.insert(ContextFlags::INSENSITIVE);
        }
    }
}

impl fmt::Debug for PropertyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyContext")
            .field("key", &self.spec.key())
            .field("value", &self.value)
            .field("flags", &self.flags)
            .field("selected_index", &self.selected_index)
            .field("has_validator", &self.validator.is_some())
            .field("has_apply", &self.on_apply.is_some())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
