//! Common types and traits shared across all query builders

use super::render;
use crate::{Operator, Result, Value};

/// Core trait for all query builders
pub trait QueryBuilder {
    /// Generate the parameterized SQL text, with `?` placeholders
    fn to_sql(&self) -> Result<String>;

    /// The bound parameters, in placeholder order
    fn parameters(&self) -> Vec<Value>;

    /// The `(text, values)` pair handed to a connection for execution
    fn to_param(&self) -> Result<(String, Vec<Value>)> {
        Ok((self.to_sql()?, self.parameters()))
    }

    /// The SQL with every parameter inlined as a literal, for logging and
    /// snapshot comparisons. Never executed.
    fn to_literal(&self) -> Result<String> {
        let (sql, params) = self.to_param()?;
        render::inline_params(&sql, &params)
    }
}

/// Builders that accept WHERE predicates
pub trait Filterable {
    fn push_where(&mut self, clause: WhereClause);
}

/// One WHERE predicate: a SQL fragment plus the values for its placeholders
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub sql: String,
    pub params: Vec<Value>,
}

impl WhereClause {
    /// A raw predicate, passed through verbatim
    pub fn raw(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Trait for conditions that can be used in WHERE clauses
pub trait IntoCondition {
    fn into_condition(self) -> WhereClause;
}

impl IntoCondition for WhereClause {
    fn into_condition(self) -> WhereClause {
        self
    }
}

// Shorthand: where_(("age", 18)), or an IN list for array values
impl<T> IntoCondition for (&str, T)
where
    T: Into<Value>,
{
    fn into_condition(self) -> WhereClause {
        let value = self.1.into();
        (self.0, Operator::for_value(&value), value).into_condition()
    }
}

// Explicit operator: where_(("name", Operator::Like, "%jo%"))
impl<T> IntoCondition for (&str, Operator, T)
where
    T: Into<Value>,
{
    fn into_condition(self) -> WhereClause {
        WhereClause {
            sql: self.1.predicate(self.0),
            params: vec![self.2.into()],
        }
    }
}

/// Render the WHERE section: each predicate parenthesized, joined with AND
pub(crate) fn where_sql(conditions: &[WhereClause]) -> String {
    if conditions.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = conditions
        .iter()
        .map(|condition| format!("({})", condition.sql))
        .collect();
    format!(" WHERE {}", parts.join(" AND "))
}

pub(crate) fn where_params(conditions: &[WhereClause]) -> impl Iterator<Item = &Value> {
    conditions.iter().flat_map(|condition| condition.params.iter())
}

/// Trait to convert various types into columns
pub trait IntoColumns {
    fn into_columns(self) -> Vec<String>;
}

/// No explicit columns; callers fall back to their defaults
impl IntoColumns for () {
    fn into_columns(self) -> Vec<String> {
        Vec::new()
    }
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoColumns for String {
    fn into_columns(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoColumns for Vec<String> {
    fn into_columns(self) -> Vec<String> {
        self
    }
}

impl IntoColumns for Vec<&str> {
    fn into_columns(self) -> Vec<String> {
        self.into_iter().map(|s| s.to_string()).collect()
    }
}

impl IntoColumns for &[&str] {
    fn into_columns(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl IntoColumns for &[String] {
    fn into_columns(self) -> Vec<String> {
        self.to_vec()
    }
}

impl<const N: usize> IntoColumns for [&str; N] {
    fn into_columns(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

// For tuples
impl IntoColumns for (&str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string()]
    }
}

impl IntoColumns for (&str, &str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string(), self.2.to_string()]
    }
}

impl IntoColumns for (&str, &str, &str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![
            self.0.to_string(),
            self.1.to_string(),
            self.2.to_string(),
            self.3.to_string(),
        ]
    }
}

/// Sort direction for ORDER BY clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_asc(asc: bool) -> Self {
        if asc {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// An ORDER BY clause
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByClause {
    pub column: String,
    pub direction: SortDirection,
}
