//! Dynamic field value type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A dynamic field value.
///
/// This type represents any value that can be read from an entity field or
/// bound into a row payload. Equality via `PartialEq` is *strict*: the type
/// and content must match exactly, so `Integer(88)` is not equal to
/// `Text("88")`. Use [`loosely_equal`] for the diffing rule, which treats
/// numeric values of different representations as comparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null / absent value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer (full i64 range).
    Integer(i64),
    /// Floating-point value.
    Float(f64),
    /// Text string (UTF-8).
    Text(String),
    /// Byte string.
    Bytes(Vec<u8>),
}

impl Value {
    /// Returns true if this value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the integer content, if this value is an integer.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text content, if this value is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this value is numeric.
    ///
    /// Integers and floats are numeric; text is numeric when the whole
    /// string parses as a number. Null, booleans, and bytes are never
    /// numeric.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        numeric_of(self).is_some()
    }
}

/// Returns the numeric content of a value, if it has one.
///
/// Text is parsed after trimming ASCII whitespace; the whole remainder must
/// parse, so `"88"` and `"  6.9 "` are numeric while `"88x"` is not.
#[must_use]
pub fn numeric_of(value: &Value) -> Option<f64> {
    match value {
        #[allow(clippy::cast_precision_loss)]
        Value::Integer(n) => Some(*n as f64),
        Value::Float(f) => Some(*f),
        Value::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Null | Value::Bool(_) | Value::Bytes(_) => None,
    }
}

/// Compares two values using the update-diff rule.
///
/// If both values are numeric, they compare by numeric equality; otherwise
/// they compare strictly. So `Integer(88)` equals `Text("88")`, while
/// `Text("Foo")` does not equal `Text("foo")`.
#[must_use]
pub fn loosely_equal(new: &Value, old: &Value) -> bool {
    match (numeric_of(new), numeric_of(old)) {
        (Some(a), Some(b)) => a == b,
        _ => new == old,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
