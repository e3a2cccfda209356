//! UPDATE query builder module

use super::common::{where_params, where_sql, Filterable, IntoCondition, QueryBuilder, WhereClause};
use crate::{Error, Result, Value};

/// One assignment in the SET list
#[derive(Debug, Clone, PartialEq)]
pub enum SetClause {
    /// `column = ?` with the value bound
    Bind(String, Value),
    /// A raw assignment expression such as `hits = hits + 1`, nothing bound
    Raw(String),
}

/// UPDATE query builder
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateBuilder {
    table_name: String,
    set_clauses: Vec<SetClause>,
    where_conditions: Vec<WhereClause>,
    limit_value: Option<u64>,
}

impl UpdateBuilder {
    /// Create a new UPDATE query builder
    pub fn new(table: &str) -> Self {
        Self {
            table_name: table.to_string(),
            set_clauses: Vec::new(),
            where_conditions: Vec::new(),
            limit_value: None,
        }
    }

    /// Set one column to a bound value
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.set_clauses
            .push(SetClause::Bind(column.to_string(), value.into()));
        self
    }

    /// Add a raw assignment expression, used verbatim and unbound
    pub fn set_raw(mut self, expression: &str) -> Self {
        self.set_clauses.push(SetClause::Raw(expression.to_string()));
        self
    }

    /// Set several columns from a field map
    ///
    /// # Examples
    /// ```
    /// use tabula_core::{update, QueryBuilder, Record};
    ///
    /// let query = update("users")
    ///     .set_fields(Record::new().with("name", "Jane").with("age", 25))
    ///     .where_(("id", 1));
    /// assert_eq!(query.to_sql().unwrap(), "UPDATE users SET name = ?, age = ? WHERE (id = ?)");
    /// ```
    pub fn set_fields<T>(mut self, data: T) -> Self
    where
        T: IntoUpdateData,
    {
        self.set_clauses.extend(
            data.into_update_data()
                .into_iter()
                .map(|(column, value)| SetClause::Bind(column, value)),
        );
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

    /// Add a LIMIT clause
    pub fn limit(mut self, count: u64) -> Self {
        self.limit_value = Some(count);
        self
    }
}

impl Filterable for UpdateBuilder {
    fn push_where(&mut self, clause: WhereClause) {
        self.where_conditions.push(clause);
    }
}

impl QueryBuilder for UpdateBuilder {
    fn to_sql(&self) -> Result<String> {
        if self.set_clauses.is_empty() {
            return Err(Error::sql_generation("UPDATE requires SET clauses"));
        }

        let mut sql = String::new();

        // UPDATE clause
        sql.push_str("UPDATE ");
        sql.push_str(&self.table_name);

        // SET clause
        sql.push_str(" SET ");
        let set_parts: Vec<String> = self
            .set_clauses
            .iter()
            .map(|clause| match clause {
                SetClause::Bind(column, _) => format!("{} = ?", column),
                SetClause::Raw(expression) => expression.clone(),
            })
            .collect();
        sql.push_str(&set_parts.join(", "));

        // WHERE clause
        sql.push_str(&where_sql(&self.where_conditions));

        if let Some(limit) = self.limit_value {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        Ok(sql)
    }

    fn parameters(&self) -> Vec<Value> {
        self.set_clauses
            .iter()
            .filter_map(|clause| match clause {
                SetClause::Bind(_, value) => Some(value.clone()),
                SetClause::Raw(_) => None,
            })
            .chain(where_params(&self.where_conditions).cloned())
            .collect()
    }
}

/// Trait for types that can be converted to UPDATE data
pub trait IntoUpdateData {
    fn into_update_data(self) -> Vec<(String, Value)>;
}

impl IntoUpdateData for Vec<(String, Value)> {
    fn into_update_data(self) -> Vec<(String, Value)> {
        self
    }
}

/// Absent entries are not assigned
impl IntoUpdateData for crate::Record {
    fn into_update_data(self) -> Vec<(String, Value)> {
        self.stripped()
    }
}

impl IntoUpdateData for std::collections::BTreeMap<String, Value> {
    fn into_update_data(self) -> Vec<(String, Value)> {
        self.into_iter().collect()
    }
}
