//! Query builder module

pub mod common;
pub mod delete;
pub mod insert;
pub mod render;
pub mod select;
pub mod update;

// Re-export types from submodules
pub use common::{
    Filterable, IntoColumns, IntoCondition, OrderByClause, QueryBuilder, SortDirection,
    WhereClause,
};
pub use delete::DeleteBuilder;
pub use insert::{InsertBuilder, IntoInsertData};
pub use select::{ColumnSelector, SelectBuilder};
pub use update::{IntoUpdateData, SetClause, UpdateBuilder};

use crate::{Result, Value};

/// A built, not yet executed statement of any kind
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectBuilder),
    Insert(InsertBuilder),
    Update(UpdateBuilder),
    Delete(DeleteBuilder),
}

impl Statement {
    /// SQL verb, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Select(_) => "SELECT",
            Statement::Insert(_) => "INSERT",
            Statement::Update(_) => "UPDATE",
            Statement::Delete(_) => "DELETE",
        }
    }

    fn inner(&self) -> &dyn QueryBuilder {
        match self {
            Statement::Select(q) => q,
            Statement::Insert(q) => q,
            Statement::Update(q) => q,
            Statement::Delete(q) => q,
        }
    }
}

impl QueryBuilder for Statement {
    fn to_sql(&self) -> Result<String> {
        self.inner().to_sql()
    }

    fn parameters(&self) -> Vec<Value> {
        self.inner().parameters()
    }
}

impl From<SelectBuilder> for Statement {
    fn from(q: SelectBuilder) -> Self {
        Statement::Select(q)
    }
}

impl From<InsertBuilder> for Statement {
    fn from(q: InsertBuilder) -> Self {
        Statement::Insert(q)
    }
}

impl From<UpdateBuilder> for Statement {
    fn from(q: UpdateBuilder) -> Self {
        Statement::Update(q)
    }
}

impl From<DeleteBuilder> for Statement {
    fn from(q: DeleteBuilder) -> Self {
        Statement::Delete(q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{delete, select};

    #[test]
    fn test_statement_dispatch() {
        let stmt = Statement::from(select("t").where_(("a", "b")));
        assert_eq!(stmt.kind(), "SELECT");
        assert_eq!(stmt.to_sql().unwrap(), "SELECT * FROM t WHERE (a = ?)");
        assert_eq!(stmt.to_literal().unwrap(), "SELECT * FROM t WHERE (a = 'b')");
    }

    #[test]
    fn test_to_param_is_repeatable() {
        let stmt = Statement::from(delete("t").where_(("id", 3)).limit(1));
        assert_eq!(stmt.to_param().unwrap(), stmt.to_param().unwrap());
    }
}
