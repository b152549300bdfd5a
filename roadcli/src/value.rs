//! Typed values carried by options and arguments.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Literals (compared case-insensitively) that coerce to `true`.
///
/// Every other string coerces to `false`; there is no invalid boolean.
pub const TRUTHY: [&str; 4] = ["true", "1", "yes", "on"];

/// Declared type of an option or argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    Integer,
    Float,
    Boolean,
}

impl ValueType {
    /// Coerce a raw token into this type.
    ///
    /// `name` is the option or argument the token was supplied for and only
    /// appears in the error.
    pub fn coerce(self, token: &str, name: &str) -> Result<Value, ParseError> {
        match self {
            ValueType::String => Ok(Value::String(token.to_string())),
            ValueType::Boolean => Ok(Value::Boolean(is_truthy(token))),
            ValueType::Integer => token
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| ParseError::conversion(token, self, name)),
            ValueType::Float => token
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| ParseError::conversion(token, self, name)),
        }
    }

    /// Whether a declared default is acceptable for this type.
    ///
    /// `Null` (no default) always is; lists are checked element-wise.
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (_, Value::List(items)) => items.iter().all(|item| self.accepts(item)),
            (ValueType::String, Value::String(_))
            | (ValueType::Integer, Value::Integer(_))
            | (ValueType::Float, Value::Float(_) | Value::Integer(_))
            | (ValueType::Boolean, Value::Boolean(_)) => true,
            _ => false,
        }
    }

    /// Bring an accepted default into the shape a parsed token would have.
    ///
    /// Integer defaults of a float descriptor become floats, list elements
    /// included.
    pub fn normalize(self, value: Value) -> Value {
        match (self, value) {
            (ValueType::Float, Value::Integer(n)) => Value::Float(n as f64),
            (_, Value::List(items)) => {
                Value::List(items.into_iter().map(|item| self.normalize(item)).collect())
            }
            (_, other) => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean coercion rule shared by options, arguments and env configuration.
pub fn is_truthy(token: &str) -> bool {
    TRUTHY.iter().any(|t| token.eq_ignore_ascii_case(t))
}

/// A resolved option or argument value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value: an undeclared default, or an option with nothing left to consume.
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Variadic arguments and `multiple` options.
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Render a scalar as a token that coerces back to the same value.
    ///
    /// Returns `None` for `Null` and lists, which have no single-token form.
    pub fn to_token(&self) -> Option<String> {
        match self {
            Value::Null | Value::List(_) => None,
            Value::Boolean(b) => Some(b.to_string()),
            Value::Integer(n) => Some(n.to_string()),
            Value::Float(n) => Some(format!("{:?}", n)),
            Value::String(s) => Some(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("none"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
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

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Typed extraction out of a [`Value`].
pub trait FromValue: Sized {
    /// Human readable name of the target type, used in extraction errors.
    const EXPECTED: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    const EXPECTED: &'static str = "value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "float";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

macro_rules! impl_from_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                const EXPECTED: &'static str = "integer";

                fn from_value(value: &Value) -> Option<Self> {
                    value.as_i64().and_then(|n| <$ty>::try_from(n).ok())
                }
            }
        )*
    };
}

impl_from_value_int!(i64, i32, u32, u64, usize);

impl<T: FromValue> FromValue for Vec<T> {
    const EXPECTED: &'static str = "list";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            Value::Null => Some(Vec::new()),
            other => T::from_value(other).map(|item| vec![item]),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}
