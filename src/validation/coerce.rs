//! Value coercion per semantic type

use serde_json::{Number, Value};

use super::temporal::{format_date, format_date_time, parse_date, parse_date_time};
use super::{ValidationError, ValidationErrorKind, ValidationResult};
use crate::schema::{FieldSpec, FieldType};

const TRUE_TOKENS: &[&str] = &["true", "True", "TRUE", "yes", "y", "1"];
const FALSE_TOKENS: &[&str] = &["false", "False", "FALSE", "no", "n", "0"];

/// Validate and coerce `raw` against `spec`.
///
/// `null` always passes and means the field is unset. The returned value is
/// in canonical form, so validating it again yields the same value.
///
/// # Examples
///
/// ```
/// use mt_metadata::schema::{FieldSpec, FieldType};
/// use mt_metadata::validation::validate;
/// use serde_json::json;
///
/// let spec = FieldSpec::new("channel_number", FieldType::Integer);
/// assert_eq!(validate(&spec, &json!(10.9)).unwrap(), json!(10));
/// assert!(validate(&spec, &json!("ten")).is_err());
/// ```
pub fn validate(spec: &FieldSpec, raw: &Value) -> ValidationResult<Value> {
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let coerced = match spec.field_type {
        FieldType::String => Ok(Value::String(stringify(raw))),
        FieldType::Float => to_float(raw),
        FieldType::Integer => to_integer(raw),
        FieldType::Boolean => to_boolean(raw),
        FieldType::DateTime => to_date_time(raw),
        FieldType::Date => to_date(raw),
        FieldType::ControlledVocabulary => to_vocabulary(raw, &spec.allowed_values),
        FieldType::NameList => to_name_list(raw),
        FieldType::ObjectList => to_object_list(raw),
        FieldType::Object => Err(ValidationErrorKind::TypeMismatch {
            expected: FieldType::Object,
            found: value_kind(raw),
        }),
    };

    coerced.map_err(|kind| ValidationError::new(spec.name.clone(), kind))
}

/// JSON type name of a value, for error messages
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(expected: FieldType, raw: &Value) -> ValidationErrorKind {
    ValidationErrorKind::TypeMismatch {
        expected,
        found: value_kind(raw),
    }
}

/// Text form of a non-string value, as Python's `str()` renders it:
/// `True`, `1.5`, `['ex', 'ey']`, `{'a': None}`
fn stringify(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => {
            let mut text = String::new();
            write_repr(other, &mut text);
            text
        }
    }
}

fn write_repr(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => out.push_str(&float_repr(f)),
            _ => out.push_str(&n.to_string()),
        },
        Value::String(s) => write_str_repr(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_repr(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_str_repr(key, out);
                out.push_str(": ");
                write_repr(item, out);
            }
            out.push('}');
        }
    }
}

/// Shortest round-trip digits, always with a fraction or an exponent.
/// Exponent form is used outside `[1e-4, 1e16)`, with a signed exponent of
/// at least two digits (`1e+20`, `1.5e-07`).
fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-4..1e16).contains(&magnitude) {
        let text = value.to_string();
        return if text.contains('.') { text } else { format!("{}.0", text) };
    }
    let text = format!("{:e}", value);
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{}e{}{:0>2}", mantissa, sign, digits)
}

/// Quoted string, single quotes unless the text holds only single quotes
fn write_str_repr(s: &str, out: &mut String) {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

fn finite_number(value: f64, text: &str) -> Result<Value, ValidationErrorKind> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| ValidationErrorKind::NotFinite(text.to_string()))
}

fn to_float(raw: &Value) -> Result<Value, ValidationErrorKind> {
    match raw {
        Value::Number(n) => {
            let value = n
                .as_f64()
                .ok_or_else(|| ValidationErrorKind::InvalidNumber(n.to_string()))?;
            finite_number(value, &n.to_string())
        }
        Value::String(s) => {
            let text = s.trim();
            let value: f64 = text
                .parse()
                .map_err(|_| ValidationErrorKind::InvalidNumber(s.clone()))?;
            finite_number(value, text)
        }
        other => Err(mismatch(FieldType::Float, other)),
    }
}

fn to_integer(raw: &Value) -> Result<Value, ValidationErrorKind> {
    match raw {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Value::from(i));
            }
            if n.is_u64() {
                return Err(ValidationErrorKind::OutOfRange(n.to_string()));
            }
            let value = n
                .as_f64()
                .ok_or_else(|| ValidationErrorKind::InvalidNumber(n.to_string()))?;
            truncate(value, &n.to_string())
        }
        Value::String(s) => {
            let text = s.trim();
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Value::from(i));
            }
            let value: f64 = text
                .parse()
                .map_err(|_| ValidationErrorKind::InvalidNumber(s.clone()))?;
            truncate(value, text)
        }
        other => Err(mismatch(FieldType::Integer, other)),
    }
}

/// Truncate toward zero: 10.9 becomes 10, -10.9 becomes -10.
fn truncate(value: f64, text: &str) -> Result<Value, ValidationErrorKind> {
    if !value.is_finite() {
        return Err(ValidationErrorKind::NotFinite(text.to_string()));
    }
    let truncated = value.trunc();
    // i64::MAX as f64 rounds up to 2^63, which itself does not fit
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(ValidationErrorKind::OutOfRange(text.to_string()));
    }
    Ok(Value::from(truncated as i64))
}

fn to_boolean(raw: &Value) -> Result<Value, ValidationErrorKind> {
    match raw {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Ok(Value::Bool(true)),
            Some(0) => Ok(Value::Bool(false)),
            _ => Err(ValidationErrorKind::InvalidBoolean(n.to_string())),
        },
        Value::String(s) => {
            let token = s.trim();
            if TRUE_TOKENS.contains(&token) {
                Ok(Value::Bool(true))
            } else if FALSE_TOKENS.contains(&token) {
                Ok(Value::Bool(false))
            } else {
                Err(ValidationErrorKind::InvalidBoolean(s.clone()))
            }
        }
        other => Err(mismatch(FieldType::Boolean, other)),
    }
}

fn to_vocabulary(raw: &Value, allowed: &[String]) -> Result<Value, ValidationErrorKind> {
    let value = match raw {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => stringify(raw),
        other => return Err(mismatch(FieldType::ControlledVocabulary, other)),
    };
    if allowed.iter().any(|a| *a == value) {
        Ok(Value::String(value))
    } else {
        Err(ValidationErrorKind::NotAllowed {
            value,
            allowed: allowed.to_vec(),
        })
    }
}

fn to_date_time(raw: &Value) -> Result<Value, ValidationErrorKind> {
    let Value::String(s) = raw else {
        return Err(mismatch(FieldType::DateTime, raw));
    };
    parse_date_time(s)
        .map(|dt| Value::String(format_date_time(&dt)))
        .map_err(|reason| ValidationErrorKind::InvalidDateTime {
            value: s.clone(),
            expected: FieldType::DateTime,
            reason,
        })
}

fn to_date(raw: &Value) -> Result<Value, ValidationErrorKind> {
    let Value::String(s) = raw else {
        return Err(mismatch(FieldType::Date, raw));
    };
    parse_date(s)
        .map(|date| Value::String(format_date(&date)))
        .map_err(|reason| ValidationErrorKind::InvalidDateTime {
            value: s.clone(),
            expected: FieldType::Date,
            reason,
        })
}

fn to_name_list(raw: &Value) -> Result<Value, ValidationErrorKind> {
    let names: Vec<String> = match raw {
        Value::String(s) => split_names(s),
        Value::Number(n) => vec![n.to_string()],
        Value::Array(items) => {
            let mut names = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Null => {}
                    Value::String(s) => names.push(s.trim().to_string()),
                    Value::Number(n) => names.push(n.to_string()),
                    other => return Err(mismatch(FieldType::NameList, other)),
                }
            }
            names.retain(|name| !name.is_empty());
            names
        }
        other => return Err(mismatch(FieldType::NameList, other)),
    };
    Ok(Value::Array(names.into_iter().map(Value::String).collect()))
}

/// Split `"ex, ey"` or a bracketed `"['ex', 'ey']"` into names
fn split_names(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(trimmed);
    inner
        .split(',')
        .map(|part| part.trim().trim_matches(|c: char| c == '\'' || c == '"').trim())
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn to_object_list(raw: &Value) -> Result<Value, ValidationErrorKind> {
    match raw {
        Value::Object(_) => Ok(Value::Array(vec![raw.clone()])),
        Value::Array(items) => {
            if let Some(bad) = items.iter().find(|item| !item.is_object()) {
                return Err(mismatch(FieldType::ObjectList, bad));
            }
            Ok(raw.clone())
        }
        // Attribute stores often keep nested lists as JSON text
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(parsed @ (Value::Array(_) | Value::Object(_))) => to_object_list(&parsed),
            _ => Err(mismatch(FieldType::ObjectList, raw)),
        },
        other => Err(mismatch(FieldType::ObjectList, other)),
    }
}
