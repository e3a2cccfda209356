//! DELETE query builder module

use super::common::{where_params, where_sql, Filterable, IntoCondition, QueryBuilder, WhereClause};
use crate::{Error, Result, Value};

/// DELETE query builder.
///
/// Rendering fails until at least one WHERE condition has been added.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteBuilder {
    table_name: String,
    where_conditions: Vec<WhereClause>,
    limit_value: Option<u64>,
}

impl DeleteBuilder {
    /// Create a new DELETE query builder
    pub fn new(table: &str) -> Self {
        Self {
            table_name: table.to_string(),
            where_conditions: Vec::new(),
            limit_value: None,
        }
    }

    /// Add a WHERE condition
    pub fn where_<C>(mut self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.push_where(condition.into_condition());
        self
    }

    /// Add a LIMIT clause
    pub fn limit(mut self, count: u64) -> Self {
        self.limit_value = Some(count);
        self
    }
}

impl Filterable for DeleteBuilder {
    fn push_where(&mut self, clause: WhereClause) {
        self.where_conditions.push(clause);
    }
}

impl QueryBuilder for DeleteBuilder {
    fn to_sql(&self) -> Result<String> {
        if self.where_conditions.is_empty() {
            return Err(Error::sql_generation(
                "DELETE requires WHERE condition for safety",
            ));
        }

        let mut sql = String::new();

        // DELETE FROM clause
        sql.push_str("DELETE FROM ");
        sql.push_str(&self.table_name);

        // WHERE clause
        sql.push_str(&where_sql(&self.where_conditions));

        if let Some(limit) = self.limit_value {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        Ok(sql)
    }

    fn parameters(&self) -> Vec<Value> {
        where_params(&self.where_conditions).cloned().collect()
    }
}
