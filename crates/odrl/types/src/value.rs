//! Operand values
//!
//! Right operands and observed values are scalars or collections. Comparison
//! follows the natural ordering of the value's type; pairs without a shared
//! ordering are unordered, and every ordering test on them is `false`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A scalar or collection operand
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
}

/// Nominal kind of a [`Value`], used by the `isA` operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Boolean,
    Integer,
    Float,
    String,
    List,
}

impl ValueKind {
    /// Whether `type_name` names this kind (case-insensitive).
    ///
    /// `number` covers both integers and floats; `set` is accepted for lists.
    pub fn is_named(&self, type_name: &str) -> bool {
        let name = type_name.trim().to_ascii_lowercase();
        match self {
            ValueKind::Boolean => matches!(name.as_str(), "boolean" | "bool"),
            ValueKind::Integer => matches!(name.as_str(), "integer" | "int" | "number"),
            ValueKind::Float => matches!(name.as_str(), "float" | "decimal" | "double" | "number"),
            ValueKind::String => matches!(name.as_str(), "string" | "str"),
            ValueKind::List => matches!(name.as_str(), "list" | "set" | "collection"),
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::List(_) => ValueKind::List,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Elements of a collection, or the value itself as a one-element slice.
    pub fn elements(&self) -> &[Value] {
        match self {
            Value::List(items) => items,
            scalar => std::slice::from_ref(scalar),
        }
    }

    /// Whether `item` equals some element of this value.
    pub fn contains(&self, item: &Value) -> bool {
        self.elements().iter().any(|element| element == item)
    }

    /// Natural ordering between two values, `None` when they share none.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Parse a command-line style literal: booleans, integers, floats,
    /// comma-separated lists in brackets, and anything else as a string.
    pub fn parse_literal(raw: &str) -> Value {
        let trimmed = raw.trim();
        if let Some(inner) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            if inner.trim().is_empty() {
                return Value::List(Vec::new());
            }
            return Value::List(inner.split(',').map(Value::parse_literal).collect());
        }
        match trimmed {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }
        if let Ok(int) = trimmed.parse::<i64>() {
            return Value::Integer(int);
        }
        if let Ok(float) = trimmed.parse::<f64>() {
            return Value::Float(float);
        }
        Value::String(trimmed.to_string())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("{")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("}")
            }
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
        Value::Integer(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
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

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}
