//! Executing table statements and shaping their results

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::builder::IntoColumns;
use crate::executor::{Executor, Query, QueryResult, Row};
use crate::statements::{IntoUpdateKeys, COUNT_ALIAS};
use crate::table::Paging;
use crate::{Error, Hooks, Record, Result, Table, Value};

/// One page of rows plus the total number of matching rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T = Row> {
    pub count: u64,
    pub list: Vec<T>,
}

/// A table bound to an executor.
///
/// Statements are built by [`Table`] and executed here; rows are decoded into
/// any `T: DeserializeOwned`, with [`Row`] as the untyped choice.
///
/// # Examples
/// ```no_run
/// # async fn demo<E: tabula_core::Executor>(pool: E) -> tabula_core::Result<()> {
/// use tabula_core::{Model, Record, Row, Table};
///
/// let users = Model::new(Table::new("users")?, pool);
/// let active: Vec<Row> = users
///     .list(&Record::new().with("status", "active"), ("id", "name"), (20, 0))
///     .await?;
/// # let _ = active;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Model<E> {
    pub(crate) table: Arc<Table>,
    pub(crate) exec: E,
    pub(crate) hooks: Hooks,
}

impl<E> Model<E> {
    pub fn new(table: Table, exec: E) -> Self {
        Self {
            table: Arc::new(table),
            exec,
            hooks: Hooks::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn executor(&self) -> &E {
        &self.exec
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// The same table and hooks, executing on `conn` instead
    pub fn on<'c, C: Executor>(&self, conn: &'c C) -> Model<&'c C> {
        Model {
            table: self.table.clone(),
            exec: conn,
            hooks: self.hooks.clone(),
        }
    }
}

impl<E: Executor> Model<E> {
    /// Execute literal SQL, a `(text, values)` pair or a built statement.
    ///
    /// The literal SQL is logged before execution. Execution errors pass
    /// through the error hook and are always returned.
    pub async fn query(&self, query: impl Into<Query>) -> Result<QueryResult> {
        let query = query.into();
        let (sql, params) = query.to_param()?;

        let literal = query.to_literal().unwrap_or_else(|_| sql.clone());
        if !self.exec.debug(&literal) {
            self.hooks.debug(&literal);
        }

        self.exec
            .execute(&sql, &params)
            .await
            .map_err(|err| self.hooks.error(err))
    }

    /// Number of rows matching `conditions`
    pub async fn count(&self, conditions: &Record) -> Result<u64> {
        let statement = self.table.build_count(conditions)?;
        let result = self.query(statement).await?;
        let value = result
            .rows
            .first()
            .and_then(|row| row.get(COUNT_ALIAS))
            .ok_or_else(|| {
                Error::driver(None, format!("count result has no '{COUNT_ALIAS}' column"))
            })?;
        count_value(value).ok_or_else(|| {
            Error::driver(None, format!("count result '{value}' is not a row count"))
        })
    }

    pub async fn get_by_primary<T: DeserializeOwned>(
        &self,
        primary: impl Into<Value>,
        fields: impl IntoColumns,
    ) -> Result<Option<T>> {
        let statement = self.table.build_get_by_primary(primary, fields)?;
        self.query(statement).await?.first()
    }

    pub async fn list<T: DeserializeOwned>(
        &self,
        conditions: &Record,
        fields: impl IntoColumns,
        paging: impl Into<Paging>,
    ) -> Result<Vec<T>> {
        let statement = self.table.build_list(conditions, fields, paging)?;
        self.query(statement).await?.decode()
    }

    /// Rows where any of `columns` contains `keyword`
    pub async fn search<T: DeserializeOwned>(
        &self,
        keyword: &str,
        columns: impl IntoColumns,
        fields: impl IntoColumns,
        paging: impl Into<Paging>,
    ) -> Result<Vec<T>> {
        let statement = self.table.build_search(keyword, columns, fields, paging)?;
        self.query(statement).await?.decode()
    }

    /// `list` and `count` over the same conditions, fetched concurrently
    pub async fn page<T: DeserializeOwned>(
        &self,
        conditions: &Record,
        fields: impl IntoColumns,
        paging: impl Into<Paging>,
    ) -> Result<Page<T>> {
        let (list, count) =
            futures::try_join!(self.list(conditions, fields, paging), self.count(conditions))?;
        Ok(Page { count, list })
    }

    pub async fn insert(&self, object: &Record) -> Result<QueryResult> {
        let statement = self.table.build_insert(object)?;
        self.query(statement).await
    }

    pub async fn batch_insert(&self, rows: &[Record]) -> Result<QueryResult> {
        let statement = self.table.build_batch_insert(rows)?;
        self.query(statement).await
    }

    /// Update matching rows, returning the affected row count
    pub async fn update_by_field(&self, conditions: &Record, fields: &Record) -> Result<u64> {
        let statement = self.table.build_update_by_field(conditions, fields, false)?;
        Ok(self.query(statement).await?.affected_rows)
    }

    /// Like [`update_by_field`](Self::update_by_field), with `$`-keyed fields
    /// taken as raw assignments
    pub async fn update_by_field_raw(&self, conditions: &Record, fields: &Record) -> Result<u64> {
        let statement = self.table.build_update_by_field(conditions, fields, true)?;
        Ok(self.query(statement).await?.affected_rows)
    }

    pub async fn update_by_primary(&self, primary: impl Into<Value>, fields: &Record) -> Result<u64> {
        let statement = self.table.build_update_by_primary(primary, fields, false)?;
        Ok(self.query(statement).await?.affected_rows)
    }

    pub async fn update_by_primary_raw(&self, primary: impl Into<Value>, fields: &Record) -> Result<u64> {
        let statement = self.table.build_update_by_primary(primary, fields, true)?;
        Ok(self.query(statement).await?.affected_rows)
    }

    /// Delete matching rows, one row unless `limit` says otherwise
    pub async fn delete_by_field(&self, conditions: &Record, limit: Option<u64>) -> Result<u64> {
        let statement = self.table.build_delete_by_field(conditions, limit)?;
        Ok(self.query(statement).await?.affected_rows)
    }

    pub async fn delete_by_primary(&self, primary: impl Into<Value>, limit: Option<u64>) -> Result<u64> {
        let statement = self.table.build_delete_by_primary(primary, limit)?;
        Ok(self.query(statement).await?.affected_rows)
    }

    pub async fn create_or_update(&self, object: &Record, update_keys: impl IntoUpdateKeys) -> Result<QueryResult> {
        let statement = self.table.build_create_or_update(object, update_keys)?;
        self.query(statement).await
    }

    /// Add `num` to each of `fields` on one row
    pub async fn incr_fields(&self, primary: impl Into<Value>, fields: impl IntoColumns, num: i64) -> Result<u64> {
        let statement = self.table.build_incr_fields(primary, fields, num)?;
        Ok(self.query(statement).await?.affected_rows)
    }
}

// Drivers report COUNT(*) as a number, some as a numeric string.
fn count_value(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
