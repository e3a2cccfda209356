//! Tabula Core - active-record style table models over a parameterized SQL
//! statement builder.
//!
//! A [`Table`] describes one logical table. Its `build_*` methods turn
//! condition maps ([`Record`]) into statements without touching a database;
//! a [`Model`] binds the table to an [`Executor`] and runs them, decoding rows
//! with serde.
//!
//! ```
//! use tabula_core::{QueryBuilder, Record, Table};
//!
//! let users = Table::new("users").unwrap();
//! let query = users
//!     .build_list(
//!         &Record::new().with("status", "active").with("#name", "ann"),
//!         ("id", "name"),
//!         (10, 0),
//!     )
//!     .unwrap();
//! assert_eq!(
//!     query.to_literal().unwrap(),
//!     "SELECT id, name FROM users WHERE (status = 'active') AND (name LIKE '%ann%') LIMIT 10 OFFSET 0"
//! );
//! ```

pub mod builder;
pub mod condition;
pub mod error;
pub mod executor;
pub mod hooks;
pub mod model;
pub mod operator;
pub mod record;
pub mod statements;
pub mod table;
pub mod transaction;
pub mod value;

// Re-export main types
pub use builder::{
    DeleteBuilder, InsertBuilder, IntoColumns, QueryBuilder, SelectBuilder, SortDirection,
    Statement, UpdateBuilder,
};
pub use condition::compile_conditions;
pub use error::{classify, Error, Result};
pub use executor::{Connection, ConnectionPool, Executor, Query, QueryResult, Row};
pub use hooks::Hooks;
pub use model::{Model, Page};
pub use operator::Operator;
pub use record::{IntoField, Record};
pub use statements::{IntoUpdateKeys, UpdateKey};
pub use table::{PageOptions, Paging, Table, TableConfig};
pub use value::Value;

#[cfg(feature = "mysql")]
pub use executor::mysql::{MySqlConnectionPool, MySqlPooledConnection};

/// Start a SELECT on `table`
pub fn select(table: &str) -> SelectBuilder {
    SelectBuilder::new(table)
}

/// Start an INSERT into `table`
pub fn insert(table: &str) -> InsertBuilder {
    InsertBuilder::new(table)
}

/// Start an UPDATE of `table`
pub fn update(table: &str) -> UpdateBuilder {
    UpdateBuilder::new(table)
}

/// Start a DELETE from `table`
pub fn delete(table: &str) -> DeleteBuilder {
    DeleteBuilder::new(table)
}
