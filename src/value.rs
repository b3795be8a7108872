//! Dynamically typed scalar values for the expression evaluator.
//!
//! Operators read their arguments as [`Value`]s, the scalar projection of an
//! element. Collections have no scalar projection and read as `Null`.
//!
//! ## Usage Patterns
//!
//! ```rust
//! use xferlang::{Element, Value};
//!
//! let value = Value::from_element(&Element::integer(42));
//! assert!(value.is_number());
//! assert_eq!(value.as_i64(), Some(42));
//!
//! assert!(!Value::from("false").is_truthy());
//! assert!(Value::from("no").is_truthy());
//! ```

use crate::datetime::DateTimeValue;
use crate::element::{Element, ElementKind};
use crate::number::Decimal;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// A scalar value seen by operators.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    DateTime(DateTimeValue),
}

/// A numeric value in one of the three representations elements carry.
///
/// # Examples
///
/// ```rust
/// use xferlang::Number;
///
/// let integer = Number::Integer(42);
/// assert!(integer.is_integer());
/// assert_eq!(integer.as_f64(), 42.0);
/// assert!(Number::Double(f64::NAN).is_zero_or_nan());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    Decimal(Decimal),
    Double(f64),
}

impl Number {
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(i) => Some(*i),
            Number::Decimal(d) => d.to_i64(),
            Number::Double(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Decimal(d) => d.to_f64(),
            Number::Double(f) => *f,
        }
    }

    pub fn is_zero_or_nan(&self) -> bool {
        match self {
            Number::Integer(i) => *i == 0,
            Number::Decimal(d) => d.is_zero(),
            Number::Double(f) => *f == 0.0 || f.is_nan(),
        }
    }

    /// Numeric ordering; exact for integers and decimals, `None` when NaN is involved.
    pub fn compare(&self, other: &Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => Some(a.cmp(b)),
            (Number::Decimal(a), Number::Decimal(b)) => Some(a.cmp(b)),
            (Number::Integer(a), Number::Decimal(b)) => Some(Decimal::from(*a).cmp(b)),
            (Number::Decimal(a), Number::Integer(b)) => Some(a.cmp(&Decimal::from(*b))),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Decimal(d) => write!(f, "{}", d),
            Number::Double(fl) => write!(f, "{}", fl),
        }
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Integer(i64::from(value))
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Double(value)
    }
}

impl From<Decimal> for Number {
    fn from(value: Decimal) -> Self {
        Number::Decimal(value)
    }
}

impl Value {
    /// Scalar projection of an element.
    ///
    /// Dynamic elements read as their resolved text, or `Null` when nothing
    /// resolved. Characters read as one-character strings.
    pub fn from_element(element: &Element) -> Value {
        match element.kind() {
            ElementKind::String(text)
            | ElementKind::Identifier(text)
            | ElementKind::Keyword(text)
            | ElementKind::Interpolated(text) => Value::String(text.clone()),
            ElementKind::Dynamic { value, .. } => match value {
                Some(text) if !text.is_empty() => Value::String(text.clone()),
                _ => Value::Null,
            },
            ElementKind::Character(cp) => char::from_u32(*cp)
                .map(|c| Value::String(c.to_string()))
                .unwrap_or(Value::Null),
            ElementKind::Integer(i) => Value::Number(Number::from(i.value)),
            ElementKind::Long(l) => Value::Number(Number::Integer(l.value)),
            ElementKind::Decimal(d) => Value::Number(Number::Decimal(d.clone())),
            ElementKind::Double(f) => Value::Number(Number::Double(*f)),
            ElementKind::Boolean(b) => Value::Bool(*b),
            ElementKind::DateTime(dt) => Value::DateTime(dt.clone()),
            ElementKind::KeyValuePair(pair) => Value::from_element(pair.value()),
            ElementKind::Null
            | ElementKind::Object(_)
            | ElementKind::Array(_)
            | ElementKind::Tuple(_) => Value::Null,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Numeric reading: numbers as is, booleans as 0/1, numeric strings parsed.
    pub fn to_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(n.clone()),
            Value::Bool(b) => Some(Number::Integer(i64::from(*b))),
            Value::String(s) => {
                let text = s.trim();
                if let Ok(i) = text.parse::<i64>() {
                    Some(Number::Integer(i))
                } else if let Ok(d) = text.parse::<Decimal>() {
                    Some(Number::Decimal(d))
                } else {
                    text.parse::<f64>().ok().map(Number::Double)
                }
            }
            Value::Null | Value::DateTime(_) => None,
        }
    }

    /// Truthiness used by conditions.
    ///
    /// `null`, `""`, `"false"` (any case), numeric zero and NaN are false;
    /// everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => !n.is_zero_or_nan(),
            Value::String(s) => !(s.is_empty() || s.eq_ignore_ascii_case("false")),
            Value::DateTime(_) => true,
        }
    }

    /// Equality with type coercion: numbers compare numerically with numeric
    /// strings and booleans, booleans compare with `"true"`/`"false"`, and
    /// anything else falls back to comparing text.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Bool(b), Value::String(s)) | (Value::String(s), Value::Bool(b)) => {
                s.trim().eq_ignore_ascii_case(if *b { "true" } else { "false" })
            }
            (Value::DateTime(a), Value::DateTime(b)) => a.compare(b) == Some(Ordering::Equal),
            (Value::Number(_), _) | (_, Value::Number(_)) => {
                match (self.to_number(), other.to_number()) {
                    (Some(a), Some(b)) => a.compare(&b) == Some(Ordering::Equal),
                    _ => false,
                }
            }
            _ => self.to_string() == other.to_string(),
        }
    }

    /// Ordering for relational operators: numeric first, then date/time,
    /// then ordinal string comparison. `None` when either side is null or
    /// the values cannot be ordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        if self.is_null() || other.is_null() {
            return None;
        }
        if let (Some(a), Some(b)) = (self.to_number(), other.to_number()) {
            return a.compare(&b);
        }
        match (self, other) {
            (Value::DateTime(a), Value::DateTime(b)) => a.compare(b),
            (Value::DateTime(a), Value::String(s)) => {
                s.parse::<DateTimeValue>().ok().and_then(|b| a.compare(&b))
            }
            (Value::String(s), Value::DateTime(b)) => {
                s.parse::<DateTimeValue>().ok().and_then(|a| a.compare(b))
            }
            _ => Some(self.to_string().cmp(&other.to_string())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::DateTime(dt) => write!(f, "{}", dt),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Integer(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::Decimal(d)) => serializer.serialize_str(&d.to_string()),
            Value::Number(Number::Double(f)) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::DateTime(dt) => serializer.serialize_str(&dt.to_string()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(Number::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::Integer(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        i64::try_from(value)
            .map(Value::from)
            .unwrap_or(Value::Number(Number::Double(value as f64)))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::Double(value))
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Number(Number::Decimal(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
