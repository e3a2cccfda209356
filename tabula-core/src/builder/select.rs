//! SELECT query builder implementation

use super::common::{
    where_params, where_sql, Filterable, IntoColumns, IntoCondition, OrderByClause, QueryBuilder,
    SortDirection, WhereClause,
};
use crate::{Result, Value};

/// Column selector that can be a regular column or a row count
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSelector {
    Column(String),
    CountAll { alias: Option<String> },
}

impl ColumnSelector {
    /// Create a COUNT(*) selector
    pub fn count() -> Self {
        Self::CountAll { alias: None }
    }

    /// Create a COUNT(*) selector with alias
    pub fn count_as(alias: &str) -> Self {
        Self::CountAll {
            alias: Some(alias.to_string()),
        }
    }

    fn to_sql(&self) -> String {
        match self {
            Self::Column(name) => name.clone(),
            Self::CountAll { alias: Some(alias) } => format!("COUNT(*) AS {}", alias),
            Self::CountAll { alias: None } => "COUNT(*)".to_string(),
        }
    }
}

/// SELECT query builder
#[derive(Debug, Clone, PartialEq)]
pub struct SelectBuilder {
    table_name: String,
    selected_columns: Vec<ColumnSelector>,
    where_conditions: Vec<WhereClause>,
    order_by_clauses: Vec<OrderByClause>,
    limit_value: Option<u64>,
    offset_value: Option<u64>,
}

impl SelectBuilder {
    /// Create a new SELECT query builder; with no columns it selects `*`
    pub fn new(table: &str) -> Self {
        Self {
            table_name: table.to_string(),
            selected_columns: Vec::new(),
            where_conditions: Vec::new(),
            order_by_clauses: Vec::new(),
            limit_value: None,
            offset_value: None,
        }
    }

    /// Replace the projection with the given columns
    ///
    /// # Examples
    /// ```
    /// use tabula_core::{select, QueryBuilder};
    ///
    /// let query = select("users").select(("id", "name"));
    /// assert_eq!(query.to_sql().unwrap(), "SELECT id, name FROM users");
    /// ```
    pub fn select<T>(mut self, columns: T) -> Self
    where
        T: IntoColumns,
    {
        self.selected_columns = columns
            .into_columns()
            .into_iter()
            .map(ColumnSelector::Column)
            .collect();
        self
    }

    /// Append one column to the projection
    pub fn field(mut self, column: &str) -> Self {
        self.selected_columns
            .push(ColumnSelector::Column(column.to_string()));
        self
    }

    /// Append `COUNT(*) AS alias` to the projection
    pub fn count_as(mut self, alias: &str) -> Self {
        self.selected_columns.push(ColumnSelector::count_as(alias));
        self
    }

    /// Add a WHERE condition
    pub fn where_<C>(mut self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.push_where(condition.into_condition());
        self
    }

    /// Add an ORDER BY clause
    pub fn order_by(mut self, column: &str, direction: SortDirection) -> Self {
        self.order_by_clauses.push(OrderByClause {
            column: column.to_string(),
            direction,
        });
        self
    }

    /// Add an ORDER BY ASC clause (convenience method)
    pub fn order_by_asc(self, column: &str) -> Self {
        self.order_by(column, SortDirection::Asc)
    }

    /// Add an ORDER BY DESC clause (convenience method)
    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by(column, SortDirection::Desc)
    }

    /// Add a LIMIT clause
    pub fn limit(mut self, count: u64) -> Self {
        self.limit_value = Some(count);
        self
    }

    /// Add an OFFSET clause
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset_value = Some(offset);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

impl Filterable for SelectBuilder {
    fn push_where(&mut self, clause: WhereClause) {
        self.where_conditions.push(clause);
    }
}

impl QueryBuilder for SelectBuilder {
    fn to_sql(&self) -> Result<String> {
        let mut sql = String::new();

        // SELECT clause
        sql.push_str("SELECT ");
        if self.selected_columns.is_empty() {
            sql.push('*');
        } else {
            let column_parts: Vec<String> = self
                .selected_columns
                .iter()
                .map(ColumnSelector::to_sql)
                .collect();
            sql.push_str(&column_parts.join(", "));
        }

        // FROM clause
        sql.push_str(" FROM ");
        sql.push_str(&self.table_name);

        // WHERE clause
        sql.push_str(&where_sql(&self.where_conditions));

        // ORDER BY clause
        if !self.order_by_clauses.is_empty() {
            sql.push_str(" ORDER BY ");
            let order_parts: Vec<String> = self
                .order_by_clauses
                .iter()
                .map(|clause| format!("{} {}", clause.column, clause.direction))
                .collect();
            sql.push_str(&order_parts.join(", "));
        }

        // LIMIT clause
        if let Some(limit) = self.limit_value {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        // OFFSET clause
        if let Some(offset) = self.offset_value {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        Ok(sql)
    }

    fn parameters(&self) -> Vec<Value> {
        where_params(&self.where_conditions).cloned().collect()
    }
}
