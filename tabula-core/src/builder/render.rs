//! Placeholder rendering shared by the literal and execution forms

use crate::{Error, Result, Value};

/// Byte offsets of `?` placeholders, skipping quoted strings and identifiers
fn placeholders(sql: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, ch) in sql.char_indices() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' && q != '`' {
                    escaped = true;
                } else if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' | '`' => quote = Some(ch),
                '?' => positions.push(i),
                _ => {}
            },
        }
    }
    positions
}

fn check_arity(sql: &str, found: usize, params: &[Value]) -> Result<()> {
    if found != params.len() {
        return Err(Error::sql_generation(format!(
            "statement has {} placeholder(s) but {} parameter(s): {}",
            found,
            params.len(),
            sql
        )));
    }
    Ok(())
}

/// Replace every placeholder with the literal form of its parameter
pub fn inline_params(sql: &str, params: &[Value]) -> Result<String> {
    let positions = placeholders(sql);
    check_arity(sql, positions.len(), params)?;

    let mut out = String::with_capacity(sql.len());
    let mut last = 0;
    for (pos, param) in positions.iter().zip(params) {
        out.push_str(&sql[last..*pos]);
        out.push_str(&param.to_literal());
        last = pos + 1;
    }
    out.push_str(&sql[last..]);
    Ok(out)
}

/// Flatten array parameters into one placeholder per element.
///
/// `id IN (?)` bound to `[1, 2, 3]` becomes `id IN (?, ?, ?)` bound to
/// `1, 2, 3`. An empty array becomes a literal `NULL`, which matches nothing.
pub fn expand_array_params(sql: &str, params: &[Value]) -> Result<(String, Vec<Value>)> {
    let positions = placeholders(sql);
    check_arity(sql, positions.len(), params)?;

    if !params.iter().any(|p| matches!(p, Value::Array(_))) {
        return Ok((sql.to_string(), params.to_vec()));
    }

    let mut out = String::with_capacity(sql.len());
    let mut flat = Vec::with_capacity(params.len());
    let mut last = 0;
    for (pos, param) in positions.iter().zip(params) {
        out.push_str(&sql[last..*pos]);
        match param {
            Value::Array(items) if items.is_empty() => out.push_str("NULL"),
            Value::Array(items) => {
                out.push_str(&vec!["?"; items.len()].join(", "));
                flat.extend(items.iter().cloned());
            }
            other => {
                out.push('?');
                flat.push(other.clone());
            }
        }
        last = pos + 1;
    }
    out.push_str(&sql[last..]);
    Ok((out, flat))
}
