//! INSERT query builder implementation

use super::common::QueryBuilder;
use crate::{Error, Result, Value};

/// INSERT query builder
///
/// Rows may carry different column sets. The rendered column list is the
/// union in first-seen order and a row missing a column renders `DEFAULT`
/// in that position.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertBuilder {
    table_name: String,
    columns: Vec<String>,
    rows: Vec<Vec<(String, Value)>>,
    on_duplicate: Vec<(String, Value)>,
}

impl InsertBuilder {
    /// Create a new INSERT query builder
    pub fn new(table: &str) -> Self {
        Self {
            table_name: table.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
            on_duplicate: Vec::new(),
        }
    }

    /// Add values for a single record
    ///
    /// # Examples
    /// ```
    /// use tabula_core::{insert, QueryBuilder, Value};
    ///
    /// let query = insert("users").values(vec![
    ///     ("name".to_string(), Value::from("John")),
    ///     ("age".to_string(), Value::from(30)),
    /// ]);
    /// assert_eq!(query.to_sql().unwrap(), "INSERT INTO users (name, age) VALUES (?, ?)");
    /// ```
    pub fn values<T>(mut self, data: T) -> Self
    where
        T: IntoInsertData,
    {
        self.push_row(data.into_insert_data());
        self
    }

    /// Add values for multiple records
    pub fn values_many<T>(mut self, data: Vec<T>) -> Self
    where
        T: IntoInsertData,
    {
        for row in data {
            self.push_row(row.into_insert_data());
        }
        self
    }

    /// Add an `ON DUPLICATE KEY UPDATE column = ?` assignment
    pub fn on_duplicate_update(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.on_duplicate.push((column.to_string(), value.into()));
        self
    }

    fn push_row(&mut self, row: Vec<(String, Value)>) {
        for (column, _) in &row {
            if !self.columns.contains(column) {
                self.columns.push(column.clone());
            }
        }
        self.rows.push(row);
    }

    /// Row cells in column order; `None` marks a column the row leaves out
    fn cells<'a>(&'a self, row: &'a [(String, Value)]) -> impl Iterator<Item = Option<&'a Value>> {
        self.columns.iter().map(move |column| {
            row.iter()
                .find(|(c, _)| c == column)
                .map(|(_, value)| value)
        })
    }
}

impl QueryBuilder for InsertBuilder {
    fn to_sql(&self) -> Result<String> {
        if self.columns.is_empty() || self.rows.is_empty() {
            return Err(Error::sql_generation("INSERT requires columns and values"));
        }

        let mut sql = String::new();

        // INSERT INTO clause
        sql.push_str("INSERT INTO ");
        sql.push_str(&self.table_name);

        // Columns
        sql.push_str(" (");
        sql.push_str(&self.columns.join(", "));
        sql.push(')');

        // VALUES clause
        sql.push_str(" VALUES ");
        let value_groups: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                let placeholders: Vec<&str> = self
                    .cells(row)
                    .map(|cell| if cell.is_some() { "?" } else { "DEFAULT" })
                    .collect();
                format!("({})", placeholders.join(", "))
            })
            .collect();
        sql.push_str(&value_groups.join(", "));

        // ON DUPLICATE KEY UPDATE clause
        if !self.on_duplicate.is_empty() {
            sql.push_str(" ON DUPLICATE KEY UPDATE ");
            let assignments: Vec<String> = self
                .on_duplicate
                .iter()
                .map(|(column, _)| format!("{} = ?", column))
                .collect();
            sql.push_str(&assignments.join(", "));
        }

        Ok(sql)
    }

    fn parameters(&self) -> Vec<Value> {
        let mut params: Vec<Value> = self
            .rows
            .iter()
            .flat_map(|row| self.cells(row).flatten().cloned().collect::<Vec<_>>())
            .collect();
        params.extend(self.on_duplicate.iter().map(|(_, value)| value.clone()));
        params
    }
}

/// Trait for types that can be converted to INSERT data
pub trait IntoInsertData {
    fn into_insert_data(self) -> Vec<(String, Value)>;
}

impl IntoInsertData for Vec<(String, Value)> {
    fn into_insert_data(self) -> Vec<(String, Value)> {
        self
    }
}

/// Absent entries are left out of the row
impl IntoInsertData for crate::Record {
    fn into_insert_data(self) -> Vec<(String, Value)> {
        self.stripped()
    }
}

impl IntoInsertData for std::collections::BTreeMap<String, Value> {
    fn into_insert_data(self) -> Vec<(String, Value)> {
        self.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{insert, Record};

    #[test]
    fn test_insert_builder() {
        let query = insert("users").values(Record::new().with("name", "John").with("age", 30));
        assert_eq!(
            query.to_sql().unwrap(),
            "INSERT INTO users (name, age) VALUES (?, ?)"
        );
        assert_eq!(query.parameters(), vec![Value::from("John"), Value::I32(30)]);
    }

    #[test]
    fn test_insert_many() {
        let query = insert("users").values_many(vec![
            Record::new().with("name", "John").with("age", 30),
            Record::new().with("name", "Jane").with("age", 25),
        ]);
        assert_eq!(
            query.to_sql().unwrap(),
            "INSERT INTO users (name, age) VALUES (?, ?), (?, ?)"
        );
        assert_eq!(query.parameters().len(), 4);
    }

    #[test]
    fn test_insert_ragged_rows_use_default() {
        let query = insert("users").values_many(vec![
            Record::new().with("name", "John"),
            Record::new().with("age", 25).with("name", "Jane"),
        ]);
        assert_eq!(
            query.to_literal().unwrap(),
            "INSERT INTO users (name, age) VALUES ('John', DEFAULT), ('Jane', 25)"
        );
    }

    #[test]
    fn test_on_duplicate_update() {
        let query = insert("test")
            .values(Record::new().with("c", "1"))
            .on_duplicate_update("c", "1");
        assert_eq!(
            query.to_sql().unwrap(),
            "INSERT INTO test (c) VALUES (?) ON DUPLICATE KEY UPDATE c = ?"
        );
        assert_eq!(query.parameters(), vec![Value::from("1"), Value::from("1")]);
    }

    #[test]
    fn test_insert_empty_data_fails() {
        let result = insert("users").to_sql();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("INSERT requires columns and values"));
    }
}
