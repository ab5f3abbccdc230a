//! Numeric parsing, rendering and the `f64` bridge shared by the numeric kinds.
//!
//! Integers are parsed into an `i128` first so that every supported width
//! (up to `u64`) can be range-checked in one place before narrowing.

use super::{Value, ValueError, ValueKind};

/// Detects the radix of an unsigned integer literal and strips its prefix.
///
/// With an explicit `base`, a `0x` prefix is still tolerated for base 16.
/// Without one: `0x`/`0X` selects 16, a leading `0` followed by more digits
/// (and not by `.`) selects 8, anything else is decimal.
fn split_radix(body: &str, base: Option<u32>) -> (u32, &str) {
    match base {
        Some(16) => (16, strip_hex_prefix(body).unwrap_or(body)),
        Some(radix) => (radix, body),
        None => {
            if let Some(digits) = strip_hex_prefix(body) {
                (16, digits)
            } else if body.len() > 1 && body.starts_with('0') && !body[1..].starts_with('.') {
                (8, &body[1..])
            } else {
                (10, body)
            }
        }
    }
}

fn strip_hex_prefix(body: &str) -> Option<&str> {
    body.strip_prefix("0x").or_else(|| body.strip_prefix("0X"))
}

/// Parses an integer literal with optional sign and radix prefix.
pub(crate) fn parse_integer(kind: ValueKind, text: &str, base: Option<u32>) -> Result<i128, ValueError> {
    if let Some(radix) = base {
        if !(2..=36).contains(&radix) {
            return Err(ValueError::InvalidBase(radix));
        }
    }

    let trimmed = text.trim();
    let (negative, body) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, digits) = split_radix(body, base);
    // `from_str_radix` accepts its own sign; a second sign is malformed.
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(ValueError::invalid(kind, text, "expected digits"));
    }

    let magnitude = i128::from_str_radix(digits, radix)
        .map_err(|e| ValueError::invalid(kind, text, &e.to_string()))?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Narrows an `i128` to the integer variant for `kind`.
pub(crate) fn integer_value(kind: ValueKind, n: i128, text: &str) -> Result<Value, ValueError> {
    let out_of_range = || ValueError::OutOfRange {
        kind,
        text: text.to_string(),
    };
    let value = match kind {
        ValueKind::Int16 => Value::Int16(i16::try_from(n).map_err(|_| out_of_range())?),
        ValueKind::UInt16 => Value::UInt16(u16::try_from(n).map_err(|_| out_of_range())?),
        ValueKind::Int32 => Value::Int32(i32::try_from(n).map_err(|_| out_of_range())?),
        ValueKind::UInt32 => Value::UInt32(u32::try_from(n).map_err(|_| out_of_range())?),
        ValueKind::Int64 => Value::Int64(i64::try_from(n).map_err(|_| out_of_range())?),
        ValueKind::UInt64 => Value::UInt64(u64::try_from(n).map_err(|_| out_of_range())?),
        other => return Err(ValueError::UnsupportedType(other)),
    };
    Ok(value)
}

/// Parses a floating-point literal for `Float`/`Double`.
pub(crate) fn parse_float(kind: ValueKind, text: &str) -> Result<Value, ValueError> {
    let invalid = |e: std::num::ParseFloatError| ValueError::invalid(kind, text, &e.to_string());
    match kind {
        // Parse f32 directly so the shortest rendering round-trips exactly.
        ValueKind::Float => text.trim().parse::<f32>().map(Value::Float).map_err(invalid),
        _ => text.trim().parse::<f64>().map(Value::Double).map_err(invalid),
    }
}

/// Projects a numeric value onto `f64`; `None` for non-numeric kinds.
pub(crate) fn project(value: &Value) -> Option<f64> {
    match *value {
        Value::Int16(n) => Some(f64::from(n)),
        Value::UInt16(n) => Some(f64::from(n)),
        Value::Int32(n) => Some(f64::from(n)),
        Value::UInt32(n) => Some(f64::from(n)),
        Value::Int64(n) => Some(n as f64),
        Value::UInt64(n) => Some(n as f64),
        Value::Float(n) => Some(f64::from(n)),
        Value::Double(n) => Some(n),
        _ => None,
    }
}

/// Converts a projected `f64` into the numeric variant for `kind`.
///
/// Integer targets truncate toward zero and reject values outside their width.
pub(crate) fn from_bridge(kind: ValueKind, n: f64) -> Result<Value, ValueError> {
    match kind {
        ValueKind::Float => Ok(Value::Float(n as f32)),
        ValueKind::Double => Ok(Value::Double(n)),
        _ => {
            if !n.is_finite() {
                return Err(ValueError::OutOfRange {
                    kind,
                    text: n.to_string(),
                });
            }
            integer_value(kind, n.trunc() as i128, &n.to_string())
        }
    }
}

/// Renders a signed magnitude in the requested base (8, 10 or 16).
pub(crate) fn render_integer(n: i128, base: Option<u32>) -> String {
    let sign = if n < 0 { "-" } else { "" };
    let magnitude = n.unsigned_abs();
    match base {
        Some(16) => format!("{sign}0x{magnitude:X}"),
        Some(8) if magnitude != 0 => format!("{sign}0{magnitude:o}"),
        _ => format!("{sign}{magnitude}"),
    }
}

/// Renders a floating-point number, optionally with fixed precision.
pub(crate) fn render_float(n: f64, precision: Option<usize>) -> String {
    match precision {
        Some(p) => format!("{n:.p$}"),
        None => n.to_string(),
    }
}
