//! Compiles condition maps into WHERE predicates.
//!
//! Each present entry of a [`Record`] selects one rule from its key, first
//! match wins:
//!
//! | key                 | value              | predicate                              |
//! |---------------------|--------------------|----------------------------------------|
//! | starts with `$`     | `[sql, p1, p2..]`  | `sql` bound to `p1, p2..`              |
//! | starts with `$`     | string             | the string, nothing bound              |
//! | contains `#`        | any                | `column LIKE ?` bound to `%value%`     |
//! | contains `$`        | any                | the key minus `$`, bound to the value  |
//! | plain               | array              | `column IN (?)` bound to the array     |
//! | plain               | scalar             | `column = ?`                           |
//!
//! The `$`-inside-the-key form only exists for compatibility with older
//! condition maps; prefer a leading `$` with an explicit parameter list.

use crate::builder::{Filterable, WhereClause};
use crate::operator::Operator;
use crate::{Error, Record, Result, Value};

const RAW_SIGIL: char = '$';
const LIKE_SIGIL: char = '#';

/// Append one WHERE predicate per present entry of `conditions`.
///
/// An empty (or all-absent) map appends nothing, leaving the statement
/// unfiltered.
pub fn compile_conditions<B>(statement: &mut B, conditions: &Record) -> Result<()>
where
    B: Filterable,
{
    for (key, value) in conditions.present() {
        statement.push_where(compile_entry(key, value)?);
    }
    Ok(())
}

/// Compile a single condition entry
pub fn compile_entry(key: &str, value: &Value) -> Result<WhereClause> {
    if key.starts_with(RAW_SIGIL) {
        return raw_clause(key, value);
    }

    if key.contains(LIKE_SIGIL) {
        let column = key.replacen(LIKE_SIGIL, "", 1);
        return Ok(WhereClause::raw(
            Operator::Like.predicate(&column),
            vec![Value::String(format!("%{}%", value.to_text()))],
        ));
    }

    if key.contains(RAW_SIGIL) {
        return Ok(WhereClause::raw(
            key.replacen(RAW_SIGIL, "", 1),
            vec![value.clone()],
        ));
    }

    Ok(WhereClause::raw(
        Operator::for_value(value).predicate(key),
        vec![value.clone()],
    ))
}

fn raw_clause(key: &str, value: &Value) -> Result<WhereClause> {
    match value {
        Value::Array(items) => {
            let (sql, params) = items.split_first().ok_or_else(|| {
                Error::invalid_argument(format!("raw condition '{key}' has an empty value list"))
            })?;
            let sql = sql.as_str().ok_or_else(|| {
                Error::invalid_argument(format!(
                    "raw condition '{key}' must start with a SQL string, got {}",
                    sql.type_name()
                ))
            })?;
            Ok(WhereClause::raw(sql, params.to_vec()))
        }
        Value::String(sql) => Ok(WhereClause::raw(sql.clone(), Vec::new())),
        other => Err(Error::invalid_argument(format!(
            "raw condition '{key}' must be a string or a list, got {}",
            other.type_name()
        ))),
    }
}
