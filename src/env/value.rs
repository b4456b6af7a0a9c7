use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A symbol value as seen by guard expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Symbol is not defined anywhere
    #[default]
    #[serde(skip)]
    Undefined,
    /// Explicit null (`~` in YAML)
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Value {
    /// Parse a loosely-typed value the way command-line and environment input is written
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        if let Ok(b) = raw.parse::<bool>() {
            return Value::Bool(b);
        }

        if let Ok(n) = raw.parse::<f64>() {
            if n.is_finite() {
                return Value::Number(n);
            }
        }

        match raw {
            "null" => Value::Null,
            "undefined" => Value::Undefined,
            _ => Value::String(raw.to_string()),
        }
    }

    pub fn is_defined(&self) -> bool {
        !matches!(self, Value::Undefined)
    }

    /// Truthiness: undefined, null, false, 0, NaN and "" are falsy
    pub fn truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
        }
    }

    /// Numeric view used for mixed-kind equality
    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Equality used by `==` and `!=` in guards.
    ///
    /// Same kinds compare directly, undefined equals null, and numbers compare
    /// numerically against bools and numeric strings. Anything else is unequal.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Number(_), Value::Bool(_) | Value::String(_))
            | (Value::Bool(_) | Value::String(_), Value::Number(_)) => {
                match (self.as_number(), other.as_number()) {
                    (Some(x), Some(y)) => x == y,
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Ordering used by `<`, `<=`, `>`, `>=`; only numbers and strings order, and never against each other
    pub fn loose_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}
