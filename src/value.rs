use crate::catalog::HandleKind;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime value types flowing along data edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Array(Vec<f64>),
}

impl Value {
    /// The value an unconnected, literal-less input of `kind` resolves to.
    pub fn zero_for(kind: HandleKind) -> Self {
        match kind {
            HandleKind::Array => Value::Array(Vec::new()),
            HandleKind::Boolean => Value::Bool(false),
            HandleKind::Number | HandleKind::Any | HandleKind::Execution => Value::Number(0.0),
        }
    }

    /// Numeric view used by comparisons and index resolution.
    /// Booleans coerce to 0/1, arrays to their length.
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Array(items) => items.len() as f64,
        }
    }

    /// Interprets the value as an array index. Negative and fractional numbers
    /// have no valid index.
    pub fn as_index(&self) -> Option<usize> {
        let n = self.as_number();
        if n.is_finite() && n >= 0.0 && n.fract() == 0.0 {
            Some(n as usize)
        } else {
            None
        }
    }

    /// Converts a literal from a node's data bag. Strings are parsed as numbers
    /// when possible; anything else has no direct value.
    pub fn from_literal(literal: &serde_json::Value) -> Option<Self> {
        match literal {
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Array(items) => Some(Value::Array(
                items.iter().filter_map(|v| v.as_f64()).collect(),
            )),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok().map(Value::Number),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Number(n) => serde_json::json!(n),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Array(items) => serde_json::json!(items),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<f64>> for Value {
    fn from(items: Vec<f64>) -> Self {
        Value::Array(items)
    }
}

/// Formats a number for descriptions; integral values print without `.0`.
pub fn format_number(n: f64) -> String {
    n.to_string()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Array(items) => {
                write!(f, "[{}]", items.iter().map(|n| format_number(*n)).join(", "))
            }
        }
    }
}
