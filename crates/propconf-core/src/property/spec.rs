//! Static description of a configuration key.
//!
//! A [`PropertySpec`] is immutable once built and is shared between contexts
//! through an `Arc`. It never points back at the contexts using it.

use tracing::warn;

use crate::error::ConfigError;
use crate::property::rules::ControlRule;
use crate::value::{CompareOptions, Comparison, ParseOptions, Value, ValueKind};

/// Page name used for properties that declare none.
pub const UNNAMED_PAGE: &str = "<unnamed>";

/// Per-property behaviour flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropertyFlags(pub u8);

impl PropertyFlags {
    /// The value must be one of [`PropertySpec::fixed_values`].
    pub const FIXED_SET: u8 = 1 << 0;
    /// Never persist the property while it equals its default.
    pub const HIDE_IF_DEFAULT: u8 = 1 << 1;
    /// Contexts start out hidden.
    pub const INITIALLY_HIDDEN: u8 = 1 << 2;
    /// Contexts start out insensitive (disabled).
    pub const INITIALLY_INSENSITIVE: u8 = 1 << 3;

    pub fn contains(self, bit: u8) -> bool {
        self.0 & bit != 0
    }
}

/// Numeric bounds for a property. `step` is advisory for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    pub step: Option<f64>,
}

impl NumericRange {
    pub fn contains(&self, n: f64) -> bool {
        n >= self.min && n <= self.max
    }
}

/// Immutable description of a property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    key: String,
    kind: ValueKind,
    default_text: Option<String>,
    page: Option<String>,
    group: Option<String>,
    label: Option<String>,
    description: Option<String>,
    fixed_values: Vec<String>,
    range: Option<NumericRange>,
    flags: PropertyFlags,
    rules: Vec<ControlRule>,
    parse_options: ParseOptions,
}

impl PropertySpec {
    /// Starts building a spec for `key` holding values of `kind`.
    pub fn builder(key: impl Into<String>, kind: ValueKind) -> PropertySpecBuilder {
        PropertySpecBuilder {
            spec: PropertySpec {
                key: key.into(),
                kind,
                default_text: None,
                page: None,
                group: None,
                label: None,
                description: None,
                fixed_values: Vec::new(),
                range: None,
                flags: PropertyFlags::default(),
                rules: Vec::new(),
                parse_options: ParseOptions::default(),
            },
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn default_text(&self) -> Option<&str> {
        self.default_text.as_deref()
    }

    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }

    /// The declared page, or [`UNNAMED_PAGE`].
    pub fn page_or_unnamed(&self) -> &str {
        self.page.as_deref().unwrap_or(UNNAMED_PAGE)
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Label for presentation; falls back to the key.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn fixed_values(&self) -> &[String] {
        &self.fixed_values
    }

    pub fn range(&self) -> Option<NumericRange> {
        self.range
    }

    pub fn flags(&self) -> PropertyFlags {
        self.flags
    }

    pub fn rules(&self) -> &[ControlRule] {
        &self.rules
    }

    pub fn parse_options(&self) -> &ParseOptions {
        &self.parse_options
    }

    /// Parses the default text into a value of this spec's kind.
    ///
    /// A malformed default is logged and replaced by the kind's zero value.
    pub fn default_value(&self) -> Value {
        match Value::parse(self.kind, self.default_text.as_deref().unwrap_or(""), &self.parse_options) {
            Ok(v) => v,
            Err(e) => {
                warn!(key = %self.key, "unparsable default, using zero value: {e}");
                Value::new(self.kind)
            }
        }
    }

    /// Parses `text` with this spec's kind and parse options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] (or `UnsupportedType`) when the
    /// text does not parse.
    pub fn parse(&self, text: &str) -> Result<Value, ConfigError> {
        Value::parse(self.kind, text, &self.parse_options)
            .map_err(|e| ConfigError::invalid_value(&self.key, &e))
    }

    /// Index of `value` within the fixed value set, if present.
    pub fn fixed_index_of(&self, value: &Value) -> Option<usize> {
        self.fixed_values.iter().position(|text| {
            Value::parse(self.kind, text, &self.parse_options)
                .map(|candidate| candidate.compare(value, &CompareOptions::default()) == Comparison::Equal)
                .unwrap_or(false)
        })
    }

    /// Checks the spec's own constraints: kind, fixed set and numeric range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] describing the violated constraint.
    pub fn check(&self, value: &Value) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: self.key.clone(),
            message,
        };

        if value.kind() != self.kind {
            return Err(invalid(format!("expected {}, got {}", self.kind, value.kind())));
        }
        if self.flags.contains(PropertyFlags::FIXED_SET)
            && !self.fixed_values.is_empty()
            && self.fixed_index_of(value).is_none()
        {
            return Err(invalid(format!("{value} is not one of {:?}", self.fixed_values)));
        }
        if let (Some(range), Some(n)) = (self.range, value.as_f64()) {
            if !range.contains(n) {
                return Err(invalid(format!(
                    "{value} is outside [{}, {}]",
                    range.min, range.max
                )));
            }
        }
        Ok(())
    }
}

/// Builder for [`PropertySpec`].
#[derive(Debug, Clone)]
pub struct PropertySpecBuilder {
    spec: PropertySpec,
}

impl PropertySpecBuilder {
    pub fn default_text(mut self, text: impl Into<String>) -> Self {
        self.spec.default_text = Some(text.into());
        self
    }

    pub fn page(mut self, page: impl Into<String>) -> Self {
        self.spec.page = Some(page.into());
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.spec.group = Some(group.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.spec.label = Some(label.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.spec.description = Some(description.into());
        self
    }

    /// Declares the fixed value set and sets [`PropertyFlags::FIXED_SET`].
    pub fn fixed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.fixed_values = values.into_iter().map(Into::into).collect();
        self.spec.flags.0 |= PropertyFlags::FIXED_SET;
        self
    }

    pub fn range(mut self, min: f64, max: f64, step: Option<f64>) -> Self {
        self.spec.range = Some(NumericRange { min, max, step });
        self
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.spec.flags.0 |= flags;
        self
    }

    pub fn rule(mut self, rule: ControlRule) -> Self {
        self.spec.rules.push(rule);
        self
    }

    pub fn parse_options(mut self, options: ParseOptions) -> Self {
        self.spec.parse_options = options;
        self
    }

    pub fn build(self) -> PropertySpec {
        self.spec
    }
}
