use tabula_core::{select, Operator, PageOptions, QueryBuilder, Record, Table, Value};

fn main() -> tabula_core::Result<()> {
    let users = Table::builder("users")
        .prefix("app_")
        .fields(["id", "name", "email"])
        .order_by("id", false)
        .build()?;

    // Condition maps: plain keys compare, arrays become IN, '#' searches
    let conditions = Record::new()
        .with("status", "active")
        .with("role", vec!["admin", "editor"])
        .with("#email", "example.com");
    let list = users.build_list(&conditions, (), PageOptions::new().limit(20))?;
    println!("LIST SQL: {}", list.to_literal()?);

    // A leading '$' passes a raw predicate with its own parameters
    let raw = Record::new().with(
        "$age",
        vec![Value::from("age BETWEEN ? AND ?"), Value::from(18), Value::from(30)],
    );
    let (sql, params) = users.build_count(&raw)?.to_param()?;
    println!("COUNT SQL: {sql} {params:?}");

    let search = users.build_search("ann", ("name", "email"), "id", ())?;
    println!("SEARCH SQL: {}", search.to_literal()?);

    let upsert = users.build_create_or_update(
        &Record::new().with("id", 7).with("name", "Ann").with("visits", 1),
        ("name", "visits"),
    )?;
    println!("UPSERT SQL: {}", upsert.to_literal()?);

    let bump = users.build_incr_fields(7, "visits", 1)?;
    println!("INCR SQL: {}", bump.to_literal()?);

    // Raw builders are available for anything a table method does not cover
    let custom = select("app_users")
        .select(("id", "name"))
        .where_(("email", Operator::Like, "%@example.com"))
        .order_by_desc("created_at")
        .limit(5);
    println!("CUSTOM SQL: {}", custom.to_literal()?);

    Ok(())
}
