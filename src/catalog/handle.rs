use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of value a handle carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleKind {
    /// Control-flow ordering, never a value.
    Execution,
    Number,
    Array,
    Boolean,
    /// Wildcard data kind, compatible with every other data kind.
    Any,
}

impl HandleKind {
    pub fn is_execution(self) -> bool {
        matches!(self, HandleKind::Execution)
    }

    /// Whether an edge from a handle of kind `self` into one of kind `target`
    /// is allowed.
    pub fn is_compatible_with(self, target: HandleKind) -> bool {
        use HandleKind::*;
        match (self, target) {
            (Execution, Execution) => true,
            (Execution, _) | (_, Execution) => false,
            (Any, _) | (_, Any) => true,
            (Number, Number) | (Array, Array) | (Boolean, Boolean) => true,
            _ => false,
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandleKind::Execution => "execution",
            HandleKind::Number => "number",
            HandleKind::Array => "array",
            HandleKind::Boolean => "boolean",
            HandleKind::Any => "any",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

/// A statically declared port on a node template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleSpec {
    pub id: &'static str,
    pub kind: HandleKind,
    pub direction: Direction,
}

impl HandleSpec {
    pub const fn input(id: &'static str, kind: HandleKind) -> Self {
        Self {
            id,
            kind,
            direction: Direction::Input,
        }
    }

    pub const fn output(id: &'static str, kind: HandleKind) -> Self {
        Self {
            id,
            kind,
            direction: Direction::Output,
        }
    }
}
