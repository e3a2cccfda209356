//! Statement construction for a bound table.
//!
//! Every method here is pure: it validates its arguments, builds one
//! statement and performs no I/O. Validation failures are returned before a
//! statement exists.

use crate::builder::{
    DeleteBuilder, Filterable, IntoColumns, InsertBuilder, SelectBuilder, SortDirection,
    UpdateBuilder, WhereClause,
};
use crate::condition::compile_conditions;
use crate::table::{Paging, DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT};
use crate::{Error, Record, Result, Table, Value};

/// Rows removed by `delete_by_*` unless a larger limit is given
pub const DEFAULT_DELETE_LIMIT: u64 = 1;

/// Alias of the `COUNT(*)` column read back by `count`
pub const COUNT_ALIAS: &str = "c";

impl Table {
    /// `SELECT COUNT(*) AS c` over the rows matching `conditions`
    pub fn build_count(&self, conditions: &Record) -> Result<SelectBuilder> {
        let mut query = SelectBuilder::new(self.name()).count_as(COUNT_ALIAS);
        compile_conditions(&mut query, conditions)?;
        Ok(query)
    }

    /// Fetch one row by primary key
    pub fn build_get_by_primary<F>(&self, primary: impl Into<Value>, fields: F) -> Result<SelectBuilder>
    where
        F: IntoColumns,
    {
        let primary = self.require_primary(primary.into(), "get_by_primary")?;
        Ok(self
            .projection(fields)
            .where_((self.primary_key(), primary))
            .limit(1))
    }

    /// Filtered, projected and paged SELECT
    pub fn build_list<F, P>(&self, conditions: &Record, fields: F, paging: P) -> Result<SelectBuilder>
    where
        F: IntoColumns,
        P: Into<Paging>,
    {
        let mut query = self.projection(fields);
        compile_conditions(&mut query, conditions)?;
        Ok(self.paged(query, paging.into(), DEFAULT_LIST_LIMIT))
    }

    /// SELECT where any of `columns` contains `keyword`
    pub fn build_search<C, F, P>(
        &self,
        keyword: &str,
        columns: C,
        fields: F,
        paging: P,
    ) -> Result<SelectBuilder>
    where
        C: IntoColumns,
        F: IntoColumns,
        P: Into<Paging>,
    {
        if keyword.is_empty() {
            return Err(Error::invalid_argument("search keyword must not be empty"));
        }
        let columns = columns.into_columns();
        if columns.is_empty() {
            return Err(Error::invalid_argument("search needs at least one column"));
        }

        let pattern = Value::String(format!("%{keyword}%"));
        let predicate: Vec<String> = columns.iter().map(|c| format!("{c} LIKE ?")).collect();

        let mut query = self.projection(fields);
        query.push_where(WhereClause::raw(
            predicate.join(" OR "),
            vec![pattern; columns.len()],
        ));
        Ok(self.paged(query, paging.into(), DEFAULT_SEARCH_LIMIT))
    }

    /// INSERT one row; absent fields are left to their column defaults
    pub fn build_insert(&self, object: &Record) -> Result<InsertBuilder> {
        let row = non_empty(object, "insert")?;
        Ok(InsertBuilder::new(self.name()).values(row))
    }

    /// INSERT several rows in one statement
    pub fn build_batch_insert(&self, rows: &[Record]) -> Result<InsertBuilder> {
        if rows.is_empty() {
            return Err(Error::invalid_argument("batch_insert needs at least one row"));
        }
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, row)| non_empty(row, &format!("batch_insert row {i}")))
            .collect::<Result<Vec<_>>>()?;
        Ok(InsertBuilder::new(self.name()).values_many(rows))
    }

    /// UPDATE the rows matching `conditions`.
    ///
    /// With `raw` set, a field whose key starts with `$` is taken as a raw
    /// assignment (`"$hits": "hits = hits + 1"`) and is not bound.
    pub fn build_update_by_field(&self, conditions: &Record, fields: &Record, raw: bool) -> Result<UpdateBuilder> {
        if conditions.is_blank() {
            return Err(Error::invalid_argument(
                "update_by_field requires at least one condition",
            ));
        }
        let fields = non_empty(fields, "update")?;

        let mut query = UpdateBuilder::new(self.name());
        for (key, value) in fields {
            query = match key.strip_prefix('$') {
                Some(_) if raw => {
                    let expression = value.as_str().ok_or_else(|| {
                        Error::invalid_argument(format!(
                            "raw assignment '{key}' must be a SQL string, got {}",
                            value.type_name()
                        ))
                    })?;
                    query.set_raw(expression)
                }
                _ => query.set(&key, value),
            };
        }
        compile_conditions(&mut query, conditions)?;
        Ok(query)
    }

    pub fn build_update_by_primary(&self, primary: impl Into<Value>, fields: &Record, raw: bool) -> Result<UpdateBuilder> {
        let primary = self.require_primary(primary.into(), "update_by_primary")?;
        self.build_update_by_field(&self.primary_condition(primary), fields, raw)
    }

    /// DELETE the rows matching `conditions`, one row unless `limit` says otherwise
    pub fn build_delete_by_field(&self, conditions: &Record, limit: Option<u64>) -> Result<DeleteBuilder> {
        if conditions.is_blank() {
            return Err(Error::invalid_argument(
                "delete_by_field requires at least one condition",
            ));
        }
        let mut query = DeleteBuilder::new(self.name()).limit(limit.unwrap_or(DEFAULT_DELETE_LIMIT));
        compile_conditions(&mut query, conditions)?;
        Ok(query)
    }

    pub fn build_delete_by_primary(&self, primary: impl Into<Value>, limit: Option<u64>) -> Result<DeleteBuilder> {
        let primary = self.require_primary(primary.into(), "delete_by_primary")?;
        self.build_delete_by_field(&self.primary_condition(primary), limit)
    }

    /// `INSERT ... ON DUPLICATE KEY UPDATE` for the keys in `update_keys`.
    ///
    /// Every present entry of `object` is inserted. A [`UpdateKey::Column`]
    /// reuses the inserted value and is skipped when `object` has none; a
    /// [`UpdateKey::Pair`] always assigns its own value.
    ///
    /// # Examples
    /// ```
    /// use tabula_core::{QueryBuilder, Record, Table, UpdateKey};
    ///
    /// let counters = Table::new("counters").unwrap();
    /// let query = counters
    ///     .build_create_or_update(
    ///         &Record::new().with("id", 1).with("hits", 1),
    ///         ("hits", UpdateKey::pair("seen", true)),
    ///     )
    ///     .unwrap();
    /// assert_eq!(
    ///     query.to_literal().unwrap(),
    ///     "INSERT INTO counters (id, hits) VALUES (1, 1) ON DUPLICATE KEY UPDATE hits = 1, seen = TRUE"
    /// );
    /// ```
    pub fn build_create_or_update<K>(&self, object: &Record, update_keys: K) -> Result<InsertBuilder>
    where
        K: IntoUpdateKeys,
    {
        let row = non_empty(object, "create_or_update")?;

        let mut query = InsertBuilder::new(self.name()).values(row);
        for key in update_keys.into_update_keys() {
            query = match key {
                UpdateKey::Column(column) => match object.get(&column) {
                    Some(value) => query.on_duplicate_update(&column, value.clone()),
                    None => query,
                },
                UpdateKey::Pair(column, value) => query.on_duplicate_update(&column, value),
            };
        }
        Ok(query)
    }

    /// `UPDATE ... SET f = f + num` for each field, on the row with this primary key.
    /// `num` is inlined, so only trusted column names belong in `fields`.
    pub fn build_incr_fields<F>(&self, primary: impl Into<Value>, fields: F, num: i64) -> Result<UpdateBuilder>
    where
        F: IntoColumns,
    {
        let primary = self.require_primary(primary.into(), "incr_fields")?;
        let fields = fields.into_columns();
        if fields.is_empty() {
            return Err(Error::invalid_argument("incr_fields needs at least one field"));
        }

        let query = fields.iter().fold(UpdateBuilder::new(self.name()), |query, field| {
            query.set_raw(&format!("{field} = {field} + {num}"))
        });
        Ok(query.where_((self.primary_key(), primary)))
    }

    fn require_primary(&self, primary: Value, operation: &str) -> Result<Value> {
        if primary.is_null() {
            return Err(Error::invalid_argument(format!(
                "{operation} requires a value for primary key '{}'",
                self.primary_key()
            )));
        }
        Ok(primary)
    }

    fn primary_condition(&self, primary: Value) -> Record {
        Record::new().with(self.primary_key(), primary)
    }

    fn projection<F: IntoColumns>(&self, fields: F) -> SelectBuilder {
        let fields = fields.into_columns();
        let fields = if fields.is_empty() {
            self.fields().to_vec()
        } else {
            fields
        };
        SelectBuilder::new(self.name()).select(fields)
    }

    fn paged(&self, query: SelectBuilder, paging: Paging, default_limit: u64) -> SelectBuilder {
        let paging = paging.resolve(self, default_limit);
        let query = query.offset(paging.offset).limit(paging.limit);
        match paging.order {
            Some(column) => query.order_by(&column, SortDirection::from_asc(paging.asc)),
            None => query,
        }
    }
}

/// One assignment of an `ON DUPLICATE KEY UPDATE` clause
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateKey {
    /// Reassign the column from the inserted payload
    Column(String),
    /// Assign an explicit value, whether or not the payload has the column
    Pair(String, Value),
}

impl UpdateKey {
    pub fn pair(column: impl Into<String>, value: impl Into<Value>) -> Self {
        UpdateKey::Pair(column.into(), value.into())
    }
}

impl From<&str> for UpdateKey {
    fn from(column: &str) -> Self {
        UpdateKey::Column(column.to_string())
    }
}

impl From<String> for UpdateKey {
    fn from(column: String) -> Self {
        UpdateKey::Column(column)
    }
}

/// Anything usable as the update-key list of `create_or_update`
pub trait IntoUpdateKeys {
    fn into_update_keys(self) -> Vec<UpdateKey>;
}

impl IntoUpdateKeys for () {
    fn into_update_keys(self) -> Vec<UpdateKey> {
        Vec::new()
    }
}

impl IntoUpdateKeys for &str {
    fn into_update_keys(self) -> Vec<UpdateKey> {
        vec![self.into()]
    }
}

impl IntoUpdateKeys for String {
    fn into_update_keys(self) -> Vec<UpdateKey> {
        vec![self.into()]
    }
}

impl IntoUpdateKeys for UpdateKey {
    fn into_update_keys(self) -> Vec<UpdateKey> {
        vec![self]
    }
}

impl<T: Into<UpdateKey>> IntoUpdateKeys for Vec<T> {
    fn into_update_keys(self) -> Vec<UpdateKey> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<UpdateKey>, const N: usize> IntoUpdateKeys for [T; N] {
    fn into_update_keys(self) -> Vec<UpdateKey> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<A, B> IntoUpdateKeys for (A, B)
where
    A: Into<UpdateKey>,
    B: Into<UpdateKey>,
{
    fn into_update_keys(self) -> Vec<UpdateKey> {
        vec![self.0.into(), self.1.into()]
    }
}

impl<A, B, C> IntoUpdateKeys for (A, B, C)
where
    A: Into<UpdateKey>,
    B: Into<UpdateKey>,
    C: Into<UpdateKey>,
{
    fn into_update_keys(self) -> Vec<UpdateKey> {
        vec![self.0.into(), self.1.into(), self.2.into()]
    }
}

impl<A, B, C, D> IntoUpdateKeys for (A, B, C, D)
where
    A: Into<UpdateKey>,
    B: Into<UpdateKey>,
    C: Into<UpdateKey>,
    D: Into<UpdateKey>,
{
    fn into_update_keys(self) -> Vec<UpdateKey> {
        vec![self.0.into(), self.1.into(), self.2.into(), self.3.into()]
    }
}

fn non_empty(record: &Record, context: &str) -> Result<Vec<(String, Value)>> {
    let fields = record.stripped();
    if fields.is_empty() {
        return Err(Error::empty_payload(context));
    }
    Ok(fields)
}
