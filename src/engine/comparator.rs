use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// Binary comparison used by if-condition and array-compare nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Equal,
    NotEqual,
    GreaterThan,
    SmallerThan,
    GreaterThanOrEqual,
    SmallerThanOrEqual,
}

impl Comparator {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Equal => "==",
            Comparator::NotEqual => "!=",
            Comparator::GreaterThan => ">",
            Comparator::SmallerThan => "<",
            Comparator::GreaterThanOrEqual => ">=",
            Comparator::SmallerThanOrEqual => "<=",
        }
    }

    pub fn apply(self, left: &Value, right: &Value) -> bool {
        match (self, left, right) {
            (Comparator::Equal, Value::Array(l), Value::Array(r)) => l == r,
            (Comparator::NotEqual, Value::Array(l), Value::Array(r)) => l != r,
            _ => {
                let (l, r) = (left.as_number(), right.as_number());
                match self {
                    Comparator::Equal => l == r,
                    Comparator::NotEqual => l != r,
                    Comparator::GreaterThan => l > r,
                    Comparator::SmallerThan => l < r,
                    Comparator::GreaterThanOrEqual => l >= r,
                    Comparator::SmallerThanOrEqual => l <= r,
                }
            }
        }
    }
}

impl FromStr for Comparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "==" | "===" => Ok(Comparator::Equal),
            "!=" | "!==" => Ok(Comparator::NotEqual),
            ">" => Ok(Comparator::GreaterThan),
            "<" => Ok(Comparator::SmallerThan),
            ">=" => Ok(Comparator::GreaterThanOrEqual),
            "<=" => Ok(Comparator::SmallerThanOrEqual),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
