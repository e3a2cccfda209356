//! Comparison operators emitted for condition-map entries

use std::fmt::{self, Display};

use crate::Value;

/// The comparison a WHERE predicate uses between a column and its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    In,
    Like,
}

impl Operator {
    /// `IN` for array values, `=` for everything else
    pub fn for_value(value: &Value) -> Self {
        match value {
            Value::Array(_) => Operator::In,
            _ => Operator::Eq,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::In => "IN",
            Operator::Like => "LIKE",
        }
    }

    /// Render `column <op> ?`; `IN` wraps its placeholder in parentheses so
    /// an array parameter can be expanded in place
    pub fn predicate(&self, column: &str) -> String {
        match self {
            Operator::In => format!("{} IN (?)", column),
            _ => format!("{} {} ?", column, self.as_str()),
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
