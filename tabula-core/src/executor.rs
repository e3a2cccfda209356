//! Statement execution and connection pool interface

use crate::builder::{
    render, DeleteBuilder, InsertBuilder, QueryBuilder, SelectBuilder, Statement, UpdateBuilder,
};
use crate::{Result, Value};
use serde::de::DeserializeOwned;
use std::future::Future;

/// One result row, keyed by column name
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Normalized result of executing one statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Rows returned by a read; empty for writes
    pub rows: Vec<Row>,
    /// Rows changed by a write
    pub affected_rows: u64,
    /// Auto-increment id generated by an INSERT, when the driver reports one
    pub insert_id: Option<u64>,
}

impl QueryResult {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn affected(affected_rows: u64) -> Self {
        Self {
            affected_rows,
            ..Self::default()
        }
    }

    pub fn with_insert_id(mut self, id: u64) -> Self {
        self.insert_id = Some(id);
        self
    }

    /// Decode every row into `T`
    pub fn decode<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        self.rows
            .into_iter()
            .map(|row| Ok(serde_json::from_value(serde_json::Value::Object(row))?))
            .collect()
    }

    /// Decode the first row into `T`, if there is one
    pub fn first<T: DeserializeOwned>(self) -> Result<Option<T>> {
        match self.rows.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(serde_json::Value::Object(row))?)),
            None => Ok(None),
        }
    }
}

/// Something that can execute one parameterized statement
pub trait Executor: Send + Sync {
    /// Execute `sql` with `?` placeholders bound to `params`
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<QueryResult>> + Send;

    /// Statement log sink. Return `true` when the message was consumed here,
    /// `false` to fall back to the model's debug hook.
    fn debug(&self, _sql: &str) -> bool {
        false
    }
}

impl<T: Executor> Executor for &T {
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<QueryResult>> + Send {
        (**self).execute(sql, params)
    }

    fn debug(&self, sql: &str) -> bool {
        (**self).debug(sql)
    }
}

/// A shared pool that can also hand out dedicated connections
pub trait ConnectionPool: Executor {
    /// The dedicated connection type for this pool
    type Connection: Connection;

    /// Check a connection out of the pool for exclusive use
    fn acquire(&self) -> impl Future<Output = Result<Self::Connection>> + Send;
}

/// A dedicated connection with transaction control.
///
/// `release` consumes the connection, so it can be released at most once.
pub trait Connection: Executor + Sized {
    fn begin(&self) -> impl Future<Output = Result<()>> + Send;

    fn commit(&self) -> impl Future<Output = Result<()>> + Send;

    fn rollback(&self) -> impl Future<Output = Result<()>> + Send;

    /// Return the connection to its pool
    fn release(self) -> impl Future<Output = ()> + Send;
}

/// Anything `Model::query` can run: literal SQL text, a `(text, values)`
/// pair, or a built statement
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Text(String),
    Bound(String, Vec<Value>),
    Statement(Statement),
}

impl Query {
    /// The `(text, values)` pair to execute
    pub fn to_param(&self) -> Result<(String, Vec<Value>)> {
        match self {
            Query::Text(sql) => Ok((sql.clone(), Vec::new())),
            Query::Bound(sql, params) => Ok((sql.clone(), params.clone())),
            Query::Statement(statement) => statement.to_param(),
        }
    }

    /// Human-readable SQL for logging
    pub fn to_literal(&self) -> Result<String> {
        match self {
            Query::Text(sql) => Ok(sql.clone()),
            Query::Bound(sql, params) => render::inline_params(sql, params),
            Query::Statement(statement) => statement.to_literal(),
        }
    }
}

impl From<&str> for Query {
    fn from(sql: &str) -> Self {
        Query::Text(sql.to_string())
    }
}

impl From<String> for Query {
    fn from(sql: String) -> Self {
        Query::Text(sql)
    }
}

impl From<(&str, Vec<Value>)> for Query {
    fn from((sql, params): (&str, Vec<Value>)) -> Self {
        Query::Bound(sql.to_string(), params)
    }
}

impl From<(String, Vec<Value>)> for Query {
    fn from((sql, params): (String, Vec<Value>)) -> Self {
        Query::Bound(sql, params)
    }
}

impl From<Statement> for Query {
    fn from(statement: Statement) -> Self {
        Query::Statement(statement)
    }
}

macro_rules! query_from_builder {
    ($($builder:ty),*) => {
        $(
            impl From<$builder> for Query {
                fn from(builder: $builder) -> Self {
                    Query::Statement(builder.into())
                }
            }
        )*
    };
}

query_from_builder!(SelectBuilder, InsertBuilder, UpdateBuilder, DeleteBuilder);

/// sqlx-backed MySQL pool and dedicated connection
#[cfg(feature = "mysql")]
pub mod mysql {
    use super::*;
    use futures::TryStreamExt;
    use sqlx::mysql::{MySql, MySqlArguments, MySqlPool, MySqlRow};
    use sqlx::pool::PoolConnection;
    use sqlx::{Column, Database, Either, Row as _, TransactionManager};
    use tokio::sync::Mutex;

    /// MySQL connection pool wrapper
    #[derive(Clone)]
    pub struct MySqlConnectionPool {
        inner: MySqlPool,
    }

    impl MySqlConnectionPool {
        /// Create a new MySQL pool from a connection string
        pub async fn new(database_url: &str) -> Result<Self> {
            let pool = MySqlPool::connect(database_url).await?;
            Ok(Self { inner: pool })
        }

        /// Create from an existing MySqlPool
        pub fn from_pool(pool: MySqlPool) -> Self {
            Self { inner: pool }
        }
    }

    impl Executor for MySqlConnectionPool {
        async fn execute(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
            let (sql, params) = render::expand_array_params(sql, params)?;
            run(&self.inner, &sql, &params).await
        }
    }

    impl ConnectionPool for MySqlConnectionPool {
        type Connection = MySqlPooledConnection;

        async fn acquire(&self) -> Result<Self::Connection> {
            let conn = self.inner.acquire().await?;
            Ok(MySqlPooledConnection {
                inner: Mutex::new(conn),
            })
        }
    }

    /// A connection checked out of [`MySqlConnectionPool`].
    ///
    /// Transactions go through sqlx's transaction manager, so a connection
    /// dropped with a transaction still open queues a ROLLBACK before it
    /// returns to the pool.
    pub struct MySqlPooledConnection {
        inner: Mutex<PoolConnection<MySql>>,
    }

    impl Executor for MySqlPooledConnection {
        async fn execute(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
            let (sql, params) = render::expand_array_params(sql, params)?;
            let mut conn = self.inner.lock().await;
            run(&mut **conn, &sql, &params).await
        }
    }

    impl Connection for MySqlPooledConnection {
        async fn begin(&self) -> Result<()> {
            let mut conn = self.inner.lock().await;
            <MySql as Database>::TransactionManager::begin(&mut **conn).await?;
            Ok(())
        }

        async fn commit(&self) -> Result<()> {
            let mut conn = self.inner.lock().await;
            <MySql as Database>::TransactionManager::commit(&mut **conn).await?;
            Ok(())
        }

        async fn rollback(&self) -> Result<()> {
            let mut conn = self.inner.lock().await;
            <MySql as Database>::TransactionManager::rollback(&mut **conn).await?;
            Ok(())
        }

        async fn release(self) {
            drop(self);
        }
    }

    impl Drop for MySqlPooledConnection {
        fn drop(&mut self) {
            // No-op unless a transaction is still open
            <MySql as Database>::TransactionManager::start_rollback(&mut **self.inner.get_mut());
        }
    }

    async fn run<'c, E>(executor: E, sql: &str, params: &[Value]) -> Result<QueryResult>
    where
        E: sqlx::Executor<'c, Database = MySql>,
    {
        let query = bind_values(sqlx::query(sql), params);
        let mut stream = query.fetch_many(executor);

        let mut result = QueryResult::default();
        while let Some(step) = stream.try_next().await? {
            match step {
                Either::Left(done) => {
                    result.affected_rows += done.rows_affected();
                    if done.last_insert_id() > 0 {
                        result.insert_id = Some(done.last_insert_id());
                    }
                }
                Either::Right(row) => result.rows.push(row_to_map(&row)),
            }
        }
        Ok(result)
    }

    /// Bind Tabula values to a sqlx query
    fn bind_values<'q>(
        mut query: sqlx::query::Query<'q, MySql, MySqlArguments>,
        params: &[Value],
    ) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
        for param in params {
            query = match param {
                Value::Null => query.bind(None::<String>),
                Value::Bool(b) => query.bind(*b),
                Value::I32(i) => query.bind(*i),
                Value::I64(i) => query.bind(*i),
                Value::U64(u) => query.bind(*u),
                Value::F32(f) => query.bind(*f),
                Value::F64(f) => query.bind(*f),
                Value::String(s) => query.bind(s.clone()),
                Value::Bytes(b) => query.bind(b.clone()),
                Value::Json(j) => query.bind(sqlx::types::Json(j.clone())),
                // Nested lists survive expansion only inside other lists
                Value::Array(_) => query.bind(sqlx::types::Json(param.to_json())),
            };
        }
        query
    }

    fn row_to_map(row: &MySqlRow) -> Row {
        row.columns()
            .iter()
            .map(|column| (column.name().to_string(), decode_column(row, column.ordinal())))
            .collect()
    }

    type Decoder = fn(&MySqlRow, usize) -> Option<serde_json::Value>;

    fn decoder(name: &'static str, decode: Decoder) -> (&'static str, Decoder) {
        (name, decode)
    }

    /// Column decoders, tried in order until one accepts the column type
    fn decoders() -> Vec<(&'static str, Decoder)> {
        use serde_json::Value as Json;

        let mut list = vec![
            decoder("i64", |row, i| decode_as::<i64>(row, i, Json::from)),
            decoder("u64", |row, i| decode_as::<u64>(row, i, Json::from)),
            decoder("f64", |row, i| decode_as::<f64>(row, i, Json::from)),
            decoder("string", |row, i| decode_as::<String>(row, i, Json::String)),
            decoder("bool", |row, i| decode_as::<bool>(row, i, Json::Bool)),
            decoder("json", |row, i| decode_as::<sqlx::types::JsonValue>(row, i, |v| v)),
        ];

        #[cfg(feature = "decimal-support")]
        list.push(decoder("decimal", |row, i| {
            decode_as::<rust_decimal::Decimal>(row, i, |d| Json::String(d.to_string()))
        }));

        #[cfg(feature = "datetime-support")]
        list.extend([
            decoder("datetime", |row, i| {
                decode_as::<chrono::NaiveDateTime>(row, i, |t| Json::String(t.to_string()))
            }),
            decoder("timestamp", |row, i| {
                decode_as::<chrono::DateTime<chrono::Utc>>(row, i, |t| Json::String(t.to_rfc3339()))
            }),
            decoder("date", |row, i| {
                decode_as::<chrono::NaiveDate>(row, i, |d| Json::String(d.to_string()))
            }),
            decoder("time", |row, i| {
                decode_as::<chrono::NaiveTime>(row, i, |t| Json::String(t.to_string()))
            }),
        ]);

        list.push(decoder("bytes", |row, i| {
            decode_as::<Vec<u8>>(row, i, |bytes| {
                Json::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        }));
        // DECIMAL and temporal columns without their feature arrive as text
        list.push(decoder("text", |row, i| {
            row.try_get_unchecked::<Option<String>, _>(i)
                .ok()
                .map(|v| v.map(Json::String).unwrap_or(Json::Null))
        }));
        list
    }

    fn decode_as<T>(
        row: &MySqlRow,
        index: usize,
        convert: impl FnOnce(T) -> serde_json::Value,
    ) -> Option<serde_json::Value>
    where
        T: for<'r> sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
    {
        row.try_get::<Option<T>, _>(index)
            .ok()
            .map(|v| v.map(convert).unwrap_or(serde_json::Value::Null))
    }

    fn decode_column(row: &MySqlRow, index: usize) -> serde_json::Value {
        decoders()
            .into_iter()
            .find_map(|(_, decode)| decode(row, index))
            .unwrap_or_else(|| {
                tracing::warn!(
                    target: "tabula::mysql",
                    column = index,
                    "column type not decodable, returning NULL"
                );
                serde_json::Value::Null
            })
    }

}
