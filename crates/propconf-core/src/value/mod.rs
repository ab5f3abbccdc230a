//! The typed value container.
//!
//! [`Value`] is a closed sum type: the variant alone decides how the payload
//! is interpreted. Every kind supports the same small set of operations
//! (set, parse from text, render to text, compare); the per-kind behaviour
//! lives in the `match` arms below and in the helper modules:
//!
//! - `numeric` – integer radix detection, range-checked narrowing and the
//!   `f64` bridge used to convert and compare the numeric family.
//! - `text`    – string-list splitting/joining with backslash escapes.
//! - `color`   – `#RRGGBB` literals and the named-colour table.
//!
//! Conversions between unrelated kinds always go through text
//! (render, then parse). Releasing a value is just `Drop`.

pub mod color;
mod numeric;
pub mod text;

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

pub use color::{Color, NAMED_COLORS};
pub use text::DEFAULT_DELIMITERS;

/// The kinds a [`Value`] can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    String,
    StringList,
    Color,
    /// Application-owned handle; cannot be parsed, rendered or compared.
    Opaque,
}

impl ValueKind {
    /// Every kind, in declaration order.
    pub const ALL: [ValueKind; 13] = [
        ValueKind::Boolean,
        ValueKind::Int16,
        ValueKind::UInt16,
        ValueKind::Int32,
        ValueKind::UInt32,
        ValueKind::Int64,
        ValueKind::UInt64,
        ValueKind::Float,
        ValueKind::Double,
        ValueKind::String,
        ValueKind::StringList,
        ValueKind::Color,
        ValueKind::Opaque,
    ];

    /// Stable lower-case name, as used in settings files and log output.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Boolean => "boolean",
            ValueKind::Int16 => "int16",
            ValueKind::UInt16 => "uint16",
            ValueKind::Int32 => "int32",
            ValueKind::UInt32 => "uint32",
            ValueKind::Int64 => "int64",
            ValueKind::UInt64 => "uint64",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
            ValueKind::String => "string",
            ValueKind::StringList => "string-list",
            ValueKind::Color => "color",
            ValueKind::Opaque => "opaque",
        }
    }

    /// Looks a kind up by its [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            ValueKind::Int16
                | ValueKind::UInt16
                | ValueKind::Int32
                | ValueKind::UInt32
                | ValueKind::Int64
                | ValueKind::UInt64
        )
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || matches!(self, ValueKind::Float | ValueKind::Double)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors produced by value parsing, rendering and conversion.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValueError {
    /// The text is not a valid literal for the kind.
    #[error("invalid {kind} literal {text:?}: {reason}")]
    InvalidText {
        kind: ValueKind,
        text: String,
        reason: String,
    },

    /// The literal is well-formed but does not fit the kind's range.
    #[error("{text:?} is out of range for {kind}")]
    OutOfRange { kind: ValueKind, text: String },

    /// The parse options name a radix outside `2..=36`.
    #[error("invalid numeric base {0}")]
    InvalidBase(u32),

    /// The kind does not support the requested operation.
    #[error("operation not supported for {0} values")]
    UnsupportedType(ValueKind),
}

impl ValueError {
    pub(crate) fn invalid(kind: ValueKind, text: &str, reason: &str) -> Self {
        ValueError::InvalidText {
            kind,
            text: text.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result of [`Value::compare`].
///
/// [`code`](Self::code) gives the classic integer encoding:
/// -3 incomparable, -2 unsupported, -1 less, 0 equal, 1 greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// The two values are of different kinds (or unordered, e.g. NaN).
    Incomparable,
    /// The kind has no ordering.
    Unsupported,
    Less,
    Equal,
    Greater,
}

impl Comparison {
    pub fn code(self) -> i32 {
        match self {
            Comparison::Incomparable => -3,
            Comparison::Unsupported => -2,
            Comparison::Less => -1,
            Comparison::Equal => 0,
            Comparison::Greater => 1,
        }
    }

    /// Returns the ordering for comparable results.
    pub fn ordering(self) -> Option<Ordering> {
        match self {
            Comparison::Less => Some(Ordering::Less),
            Comparison::Equal => Some(Ordering::Equal),
            Comparison::Greater => Some(Ordering::Greater),
            Comparison::Incomparable | Comparison::Unsupported => None,
        }
    }

    fn from_ordering(ordering: Option<Ordering>) -> Self {
        match ordering {
            Some(Ordering::Less) => Comparison::Less,
            Some(Ordering::Equal) => Comparison::Equal,
            Some(Ordering::Greater) => Comparison::Greater,
            None => Comparison::Incomparable,
        }
    }
}

/// Options for [`Value::parse`] and [`Value::parse_from_text`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Integer radix; `None` auto-detects from a `0x`/`0` prefix.
    pub base: Option<u32>,
    /// String-list delimiter set; `None` means [`DEFAULT_DELIMITERS`].
    pub delimiters: Option<String>,
}

impl ParseOptions {
    pub fn with_base(base: u32) -> Self {
        Self {
            base: Some(base),
            ..Self::default()
        }
    }

    pub fn with_delimiters(delimiters: impl Into<String>) -> Self {
        Self {
            delimiters: Some(delimiters.into()),
            ..Self::default()
        }
    }

    fn delimiters(&self) -> &str {
        self.delimiters.as_deref().unwrap_or(DEFAULT_DELIMITERS)
    }
}

/// Options for [`Value::render`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderFormat {
    /// Integer radix: 8, 10 (default) or 16.
    pub base: Option<u32>,
    /// Fixed number of fractional digits for `Float`/`Double`.
    pub precision: Option<usize>,
    /// String-list delimiter set; the first character separates elements.
    pub delimiters: Option<String>,
}

/// Options for [`Value::compare`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareOptions {
    /// Compare `String`/`StringList` contents ignoring ASCII case.
    pub case_insensitive: bool,
}

/// Application-owned handle stored in [`Value::Opaque`].
#[derive(Clone, Default)]
pub struct OpaqueHandle(pub Option<Arc<dyn Any + Send + Sync>>);

impl OpaqueHandle {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Some(Arc::new(value)))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_deref().and_then(|v| v.downcast_ref::<T>())
    }

    fn same(&self, other: &OpaqueHandle) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for OpaqueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("OpaqueHandle(..)"),
            None => f.write_str("OpaqueHandle(null)"),
        }
    }
}

/// A typed configuration value.
#[derive(Debug, Clone)]
pub enum Value {
    Boolean(bool),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(String),
    StringList(Vec<String>),
    Color(Color),
    Opaque(OpaqueHandle),
}

impl Value {
    /// Creates the zero value of `kind`: false, 0, empty, black or a null handle.
    pub fn new(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Boolean => Value::Boolean(false),
            ValueKind::Int16 => Value::Int16(0),
            ValueKind::UInt16 => Value::UInt16(0),
            ValueKind::Int32 => Value::Int32(0),
            ValueKind::UInt32 => Value::UInt32(0),
            ValueKind::Int64 => Value::Int64(0),
            ValueKind::UInt64 => Value::UInt64(0),
            ValueKind::Float => Value::Float(0.0),
            ValueKind::Double => Value::Double(0.0),
            ValueKind::String => Value::String(String::new()),
            ValueKind::StringList => Value::StringList(Vec::new()),
            ValueKind::Color => Value::Color(Color::default()),
            ValueKind::Opaque => Value::Opaque(OpaqueHandle::default()),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Int16(_) => ValueKind::Int16,
            Value::UInt16(_) => ValueKind::UInt16,
            Value::Int32(_) => ValueKind::Int32,
            Value::UInt32(_) => ValueKind::UInt32,
            Value::Int64(_) => ValueKind::Int64,
            Value::UInt64(_) => ValueKind::UInt64,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::String(_) => ValueKind::String,
            Value::StringList(_) => ValueKind::StringList,
            Value::Color(_) => ValueKind::Color,
            Value::Opaque(_) => ValueKind::Opaque,
        }
    }

    /// Parses `text` as a value of `kind`.
    ///
    /// Empty text yields the zero value of the kind.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] when the text is malformed or out of range, or
    /// when `kind` is [`ValueKind::Opaque`].
    pub fn parse(kind: ValueKind, text: &str, options: &ParseOptions) -> Result<Self, ValueError> {
        if kind == ValueKind::Opaque {
            return Err(ValueError::UnsupportedType(kind));
        }
        // Strings keep surrounding whitespace; every other kind ignores it.
        if text.is_empty() || (kind != ValueKind::String && text.trim().is_empty()) {
            return Ok(Value::new(kind));
        }

        match kind {
            ValueKind::Boolean => parse_bool(text).map(Value::Boolean),
            k if k.is_integer() => {
                let n = numeric::parse_integer(k, text, options.base)?;
                numeric::integer_value(k, n, text)
            }
            ValueKind::Float | ValueKind::Double => numeric::parse_float(kind, text),
            ValueKind::String => Ok(Value::String(text.to_string())),
            ValueKind::StringList => Ok(Value::StringList(text::split_list(
                text,
                options.delimiters(),
            ))),
            ValueKind::Color => Color::parse(text)
                .map(Value::Color)
                .ok_or_else(|| ValueError::invalid(kind, text, "expected #RRGGBB or a colour name")),
            _ => Err(ValueError::UnsupportedType(kind)),
        }
    }

    /// Parses `text` into this value, keeping its kind.
    ///
    /// `None` or empty text resets the value to the kind's zero. On error the
    /// value is left untouched.
    ///
    /// # Errors
    ///
    /// See [`Value::parse`].
    pub fn parse_from_text(&mut self, text: Option<&str>, options: &ParseOptions) -> Result<(), ValueError> {
        let parsed = Self::parse(self.kind(), text.unwrap_or(""), options)?;
        *self = parsed;
        Ok(())
    }

    /// Copies `other` into this value, keeping this value's kind.
    ///
    /// Same-kind values are cloned; numeric kinds convert through `f64`;
    /// anything else converts through text.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] if the conversion fails; the value is left
    /// untouched in that case.
    pub fn set(&mut self, other: &Value) -> Result<(), ValueError> {
        let converted = other.convert_to(self.kind())?;
        *self = converted;
        Ok(())
    }

    /// Returns a copy of this value converted to `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] if no conversion exists or the text/number does
    /// not fit the target kind.
    pub fn convert_to(&self, kind: ValueKind) -> Result<Value, ValueError> {
        if self.kind() == kind {
            return Ok(self.clone());
        }
        if let (Some(n), true) = (numeric::project(self), kind.is_numeric()) {
            return numeric::from_bridge(kind, n);
        }
        let text = self.render(&RenderFormat::default())?;
        Self::parse(kind, &text, &ParseOptions::default())
    }

    /// Renders this value as text.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::UnsupportedType`] for [`Value::Opaque`].
    pub fn render(&self, format: &RenderFormat) -> Result<String, ValueError> {
        let text = match self {
            Value::Boolean(b) => b.to_string(),
            Value::Int16(n) => numeric::render_integer(i128::from(*n), format.base),
            Value::UInt16(n) => numeric::render_integer(i128::from(*n), format.base),
            Value::Int32(n) => numeric::render_integer(i128::from(*n), format.base),
            Value::UInt32(n) => numeric::render_integer(i128::from(*n), format.base),
            Value::Int64(n) => numeric::render_integer(i128::from(*n), format.base),
            Value::UInt64(n) => numeric::render_integer(i128::from(*n), format.base),
            Value::Float(n) => match format.precision {
                Some(_) => numeric::render_float(f64::from(*n), format.precision),
                None => n.to_string(),
            },
            Value::Double(n) => numeric::render_float(*n, format.precision),
            Value::String(s) => s.clone(),
            Value::StringList(items) => text::join_list(
                items,
                format.delimiters.as_deref().unwrap_or(DEFAULT_DELIMITERS),
            ),
            Value::Color(c) => c.to_string(),
            Value::Opaque(_) => return Err(ValueError::UnsupportedType(ValueKind::Opaque)),
        };
        Ok(text)
    }

    /// Three-way comparison between two values of the same kind.
    ///
    /// Mismatched kinds are [`Comparison::Incomparable`]; opaque handles are
    /// [`Comparison::Unsupported`].
    pub fn compare(&self, other: &Value, options: &CompareOptions) -> Comparison {
        if self.kind() != other.kind() {
            return Comparison::Incomparable;
        }

        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Comparison::from_ordering(Some(a.cmp(b))),
            (Value::String(a), Value::String(b)) => {
                Comparison::from_ordering(Some(compare_str(a, b, options)))
            }
            (Value::StringList(a), Value::StringList(b)) => {
                let ordering = a
                    .iter()
                    .zip(b.iter())
                    .map(|(x, y)| compare_str(x, y, options))
                    .find(|o| *o != Ordering::Equal)
                    .unwrap_or_else(|| a.len().cmp(&b.len()));
                Comparison::from_ordering(Some(ordering))
            }
            (Value::Color(a), Value::Color(b)) => {
                Comparison::from_ordering(Some(a.packed().cmp(&b.packed())))
            }
            (Value::Opaque(_), Value::Opaque(_)) => Comparison::Unsupported,
            _ => match (numeric::project(self), numeric::project(other)) {
                (Some(a), Some(b)) => Comparison::from_ordering(a.partial_cmp(&b)),
                _ => Comparison::Unsupported,
            },
        }
    }

    /// Numeric projection onto `f64`; `None` for non-numeric kinds.
    pub fn as_f64(&self) -> Option<f64> {
        numeric::project(self)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::StringList(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Builds the integer variant for `kind` from a wide integer.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::OutOfRange`] when `n` does not fit, or
    /// [`ValueError::UnsupportedType`] when `kind` is not an integer kind.
    pub fn from_integer(kind: ValueKind, n: i128) -> Result<Self, ValueError> {
        numeric::integer_value(kind, n, &n.to_string())
    }
}

/// Equality is `compare == Equal`; opaque handles are equal when they share
/// the same allocation.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Opaque(a), Value::Opaque(b)) => a.same(b),
            _ => self.compare(other, &CompareOptions::default()) == Comparison::Equal,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render(&RenderFormat::default()) {
            Ok(text) => f.write_str(&text),
            Err(_) => f.write_str("<opaque>"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int32(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int64(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Color> for Value {
    fn from(c: Color) -> Self {
        Value::Color(c)
    }
}

fn parse_bool(text: &str) -> Result<bool, ValueError> {
    let t = text.trim();
    const TRUE: [&str; 4] = ["true", "yes", "on", "1"];
    const FALSE: [&str; 4] = ["false", "no", "off", "0"];
    if TRUE.iter().any(|w| w.eq_ignore_ascii_case(t)) {
        Ok(true)
    } else if FALSE.iter().any(|w| w.eq_ignore_ascii_case(t)) {
        Ok(false)
    } else {
        Err(ValueError::invalid(ValueKind::Boolean, text, "expected true/false"))
    }
}

fn compare_str(a: &str, b: &str, options: &CompareOptions) -> Ordering {
    if options.case_insensitive {
        a.chars()
            .map(|c| c.to_ascii_lowercase())
            .cmp(b.chars().map(|c| c.to_ascii_lowercase()))
    } else {
        a.cmp(b)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(kind: ValueKind, text: &str) -> Value {
        Value::parse(kind, text, &ParseOptions::default()).expect("parse")
    }

    fn cmp(a: &Value, b: &Value) -> Comparison {
        a.compare(b, &CompareOptions::default())
    }

    // ── Zero values ───────────────────────────────────────────────────────────

    #[test]
    fn test_empty_text_parses_to_zero_value_for_every_kind() {
        for kind in ValueKind::ALL {
            if kind == ValueKind::Opaque {
                continue;
            }
            let parsed = Value::parse(kind, "", &ParseOptions::default()).expect("empty parses");
            assert_eq!(parsed, Value::new(kind), "zero value for {kind}");
        }
    }

    #[test]
    fn test_parse_from_text_none_resets_to_zero() {
        let mut v = Value::Int32(42);
        v.parse_from_text(None, &ParseOptions::default()).unwrap();
        assert_eq!(v, Value::Int32(0));
    }

    #[test]
    fn test_parse_from_text_failure_leaves_value_untouched() {
        let mut v = Value::Int32(42);
        assert!(v.parse_from_text(Some("nope"), &ParseOptions::default()).is_err());
        assert_eq!(v, Value::Int32(42));
    }

    // ── Booleans ──────────────────────────────────────────────────────────────

    #[test]
    fn test_boolean_accepts_common_spellings() {
        assert_eq!(parse(ValueKind::Boolean, "YES"), Value::Boolean(true));
        assert_eq!(parse(ValueKind::Boolean, "off"), Value::Boolean(false));
        assert_eq!(parse(ValueKind::Boolean, "1"), Value::Boolean(true));
        assert!(Value::parse(ValueKind::Boolean, "maybe", &ParseOptions::default()).is_err());
    }

    // ── Numbers ───────────────────────────────────────────────────────────────

    #[test]
    fn test_integer_prefixes_and_base_override() {
        assert_eq!(parse(ValueKind::Int32, "0x10"), Value::Int32(16));
        assert_eq!(parse(ValueKind::Int32, "010"), Value::Int32(8));
        assert_eq!(
            Value::parse(ValueKind::Int32, "010", &ParseOptions::with_base(10)).unwrap(),
            Value::Int32(10)
        );
    }

    #[test]
    fn test_integer_out_of_range_is_error() {
        let result = Value::parse(ValueKind::UInt16, "70000", &ParseOptions::default());
        assert!(matches!(result, Err(ValueError::OutOfRange { .. })));
    }

    #[test]
    fn test_double_with_leading_zero_is_decimal() {
        assert_eq!(parse(ValueKind::Double, "0.5"), Value::Double(0.5));
    }

    #[test]
    fn test_numeric_set_converts_through_bridge() {
        let mut target = Value::Int16(0);
        target.set(&Value::Double(12.75)).unwrap();
        assert_eq!(target, Value::Int16(12));
    }

    #[test]
    fn test_numeric_set_rejects_overflow_and_keeps_old_value() {
        let mut target = Value::Int16(7);
        assert!(target.set(&Value::Int64(1 << 40)).is_err());
        assert_eq!(target, Value::Int16(7));
    }

    #[test]
    fn test_render_integer_in_hex() {
        let fmt = RenderFormat {
            base: Some(16),
            ..RenderFormat::default()
        };
        assert_eq!(Value::UInt32(255).render(&fmt).unwrap(), "0xFF");
    }

    #[test]
    fn test_render_double_with_precision() {
        let fmt = RenderFormat {
            precision: Some(2),
            ..RenderFormat::default()
        };
        assert_eq!(Value::Double(1.0 / 3.0).render(&fmt).unwrap(), "0.33");
    }

    // ── Text conversion between kinds ─────────────────────────────────────────

    #[test]
    fn test_set_converts_string_to_integer_through_text() {
        let mut target = Value::Int32(0);
        target.set(&Value::from("0x20")).unwrap();
        assert_eq!(target, Value::Int32(32));
    }

    #[test]
    fn test_set_converts_integer_to_string() {
        let mut target = Value::String(String::new());
        target.set(&Value::Int64(-5)).unwrap();
        assert_eq!(target.as_str(), Some("-5"));
    }

    // ── Lists and colours ─────────────────────────────────────────────────────

    #[test]
    fn test_string_list_escape_round_trip() {
        let v = parse(ValueKind::StringList, "a;b\\;c");
        assert_eq!(v.as_list().unwrap().to_vec(), vec!["a", "b;c"]);

        let rendered = v.render(&RenderFormat::default()).unwrap();
        assert_eq!(parse(ValueKind::StringList, &rendered), v);
    }

    #[test]
    fn test_string_list_custom_delimiters() {
        let v = Value::parse(
            ValueKind::StringList,
            "a,b",
            &ParseOptions::with_delimiters(","),
        )
        .unwrap();
        assert_eq!(v.as_list().unwrap().len(), 2);
    }

    #[test]
    fn test_color_name_and_hex_compare_equal() {
        let named = parse(ValueKind::Color, "white");
        let hex = parse(ValueKind::Color, "#FFFFFF");
        assert_eq!(cmp(&named, &hex), Comparison::Equal);
        assert_ne!(
            cmp(&parse(ValueKind::Color, "red"), &parse(ValueKind::Color, "blue")),
            Comparison::Equal
        );
    }

    #[test]
    fn test_color_renders_name_when_exact() {
        let v = parse(ValueKind::Color, "#ff0000");
        assert_eq!(v.to_string(), "red");
    }

    // ── Comparison ────────────────────────────────────────────────────────────

    #[test]
    fn test_mismatched_kinds_are_incomparable() {
        let c = cmp(&Value::Int32(1), &Value::Int64(1));
        assert_eq!(c, Comparison::Incomparable);
        assert_eq!(c.code(), -3);
    }

    #[test]
    fn test_opaque_compare_is_unsupported() {
        let a = Value::Opaque(OpaqueHandle::new(5_u8));
        let b = Value::Opaque(OpaqueHandle::new(5_u8));
        assert_eq!(cmp(&a, &b).code(), -2);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_opaque_cannot_be_parsed_or_rendered() {
        assert!(matches!(
            Value::parse(ValueKind::Opaque, "x", &ParseOptions::default()),
            Err(ValueError::UnsupportedType(ValueKind::Opaque))
        ));
        assert!(Value::new(ValueKind::Opaque).render(&RenderFormat::default()).is_err());
    }

    #[test]
    fn test_case_insensitive_string_compare() {
        let opts = CompareOptions {
            case_insensitive: true,
        };
        assert_eq!(
            Value::from("Hello").compare(&Value::from("hELLO"), &opts),
            Comparison::Equal
        );
        assert_eq!(
            cmp(&Value::from("Hello"), &Value::from("hello")),
            Comparison::Less
        );
    }

    #[test]
    fn test_string_list_compares_lexicographically() {
        let a = Value::StringList(vec!["a".into(), "b".into()]);
        let b = Value::StringList(vec!["a".into(), "c".into()]);
        let prefix = Value::StringList(vec!["a".into()]);
        assert_eq!(cmp(&a, &b), Comparison::Less);
        assert_eq!(cmp(&prefix, &a), Comparison::Less);
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in ValueKind::ALL {
            assert_eq!(ValueKind::from_name(kind.name()), Some(kind));
        }
    }
}
