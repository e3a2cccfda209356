mod common;

use common::MockPool;
use serde::Deserialize;
use serde_json::json;
use tabula_core::{
    Error, Hooks, Model, Page, PageOptions, QueryBuilder, QueryResult, Record, Row, Table, Value,
};
use tokio_test::{assert_err, assert_ok};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Article {
    id: i64,
    title: String,
    hits: i64,
}

fn articles(pool: &MockPool) -> Model<MockPool> {
    let table = Table::builder("articles")
        .prefix("blog_")
        .fields(["id", "title", "hits"])
        .order_by("id", false)
        .build()
        .unwrap();
    Model::new(table, pool.clone())
}

#[tokio::test]
async fn test_list_with_conditions_and_defaults() {
    let pool = MockPool::new();
    pool.respond_rows("SELECT", json!([{"id": 2, "title": "b", "hits": 0}]));
    let model = articles(&pool);

    let rows: Vec<Article> = assert_ok!(
        model
            .list(
                &Record::new().with("author", "ann").with("tag", vec!["rust", "sql"]),
                (),
                (),
            )
            .await
    );
    assert_eq!(rows[0].title, "b");
    assert_eq!(
        pool.events(),
        vec!["SELECT id, title, hits FROM blog_articles WHERE (author = ?) AND (tag IN (?)) ORDER BY id DESC LIMIT 999 OFFSET 0"]
    );
    assert_eq!(
        pool.params(),
        vec![vec![Value::from("ann"), Value::from(vec!["rust", "sql"])]]
    );
}

#[tokio::test]
async fn test_page_matches_list_and_count() {
    let pool = MockPool::new();
    pool.respond_rows("COUNT(*)", json!([{"c": 42}]))
        .respond_rows("SELECT id", json!([
            {"id": 1, "title": "a", "hits": 3},
            {"id": 2, "title": "b", "hits": 5}
        ]));
    let model = articles(&pool);
    let conditions = Record::new().with("#title", "a");
    let paging = PageOptions::new().limit(2).offset(4);

    let page: Page<Article> = assert_ok!(model.page(&conditions, (), paging.clone()).await);
    let list: Vec<Article> = assert_ok!(model.list(&conditions, (), paging).await);
    let count = assert_ok!(model.count(&conditions).await);

    assert_eq!(page, Page { count, list });
    assert_eq!(page.count, 42);
}

#[tokio::test]
async fn test_page_with_empty_list_still_counts() {
    let pool = MockPool::new();
    pool.respond_rows("COUNT(*)", json!([{"c": 0}]))
        .respond_rows("SELECT id", json!([]));
    let model = articles(&pool);

    let page: Page<Row> = assert_ok!(model.page(&Record::new(), (), ()).await);
    assert_eq!(page.count, 0);
    assert!(page.list.is_empty());
}

#[tokio::test]
async fn test_page_fails_on_unreadable_count() {
    let pool = MockPool::new();
    pool.respond_rows("COUNT(*)", json!([{"c": "not-a-number"}]))
        .respond_rows("SELECT id", json!([]));
    let model = articles(&pool);

    let err = assert_err!(model.page::<Row>(&Record::new(), (), ()).await);
    assert!(matches!(err, Error::Driver { .. }));
}

#[tokio::test]
async fn test_search_builds_or_of_likes() {
    let pool = MockPool::new();
    let model = articles(&pool);

    let _: Vec<Row> = assert_ok!(model.search("rust", ("title", "body"), "id", ()).await);
    assert_eq!(
        pool.events(),
        vec!["SELECT id FROM blog_articles WHERE (title LIKE ? OR body LIKE ?) ORDER BY id DESC LIMIT 10 OFFSET 0"]
    );
}

#[tokio::test]
async fn test_get_by_primary_missing_row_is_none() {
    let pool = MockPool::new();
    pool.respond("SELECT", QueryResult::default());
    let model = articles(&pool);

    let found: Option<Article> = assert_ok!(model.get_by_primary(99, ()).await);
    assert!(found.is_none());
}

#[tokio::test]
async fn test_absent_primary_fails_before_io() {
    let pool = MockPool::new();
    let model = articles(&pool);
    let missing: Option<i64> = None;

    let err = assert_err!(model.get_by_primary::<Article>(missing, ()).await);
    assert!(err.is_invalid_argument());
    let err = assert_err!(model.update_by_primary(missing, &Record::new().with("hits", 1)).await);
    assert!(err.is_invalid_argument());
    let err = assert_err!(model.delete_by_primary(missing, None).await);
    assert!(err.is_invalid_argument());
    let err = assert_err!(model.incr_fields(missing, "hits", 1).await);
    assert!(err.is_invalid_argument());

    assert!(pool.events().is_empty());
}

#[tokio::test]
async fn test_writes() {
    let pool = MockPool::new();
    pool.respond("INSERT", QueryResult::affected(2).with_insert_id(7));
    let model = articles(&pool);

    let result = assert_ok!(
        model
            .batch_insert(&[
                Record::new().with("title", "a").with("hits", 1),
                Record::new().with("title", "b"),
            ])
            .await
    );
    assert_eq!(result.affected_rows, 2);
    assert_eq!(result.insert_id, Some(7));

    assert_ok!(
        model
            .update_by_field_raw(
                &Record::new().with("id", 1),
                &Record::new().with("$hits", "hits = hits * 2").with("title", "c"),
            )
            .await
    );
    assert_ok!(model.delete_by_field(&Record::new().with("title", "c"), Some(10)).await);
    assert_ok!(
        model
            .create_or_update(&Record::new().with("id", 1).with("hits", 1), "hits")
            .await
    );

    assert_eq!(
        pool.events(),
        vec![
            "INSERT INTO blog_articles (title, hits) VALUES (?, ?), (?, DEFAULT)",
            "UPDATE blog_articles SET hits = hits * 2, title = ? WHERE (id = ?)",
            "DELETE FROM blog_articles WHERE (title = ?) LIMIT 10",
            "INSERT INTO blog_articles (id, hits) VALUES (?, ?) ON DUPLICATE KEY UPDATE hits = ?",
        ]
    );
}

#[tokio::test]
async fn test_duplicate_key_is_classified() {
    let pool = MockPool::new();
    pool.fail_on("INSERT", Some("1062"));
    let model = articles(&pool);

    let err = assert_err!(model.insert(&Record::new().with("id", 1)).await);
    assert!(err.is_duplicate_entry());
}

#[tokio::test]
async fn test_custom_error_hook_is_applied() {
    let pool = MockPool::new();
    pool.fail_on("DELETE", Some("1451"));
    let model = articles(&pool).with_hooks(Hooks::default().on_error(|err| match err.code().as_deref() {
        Some("1451") => Error::invalid_argument("row is still referenced"),
        _ => err,
    }));

    let err = assert_err!(model.delete_by_primary(1, None).await);
    assert_eq!(err.to_string(), "Invalid argument: row is still referenced");
}

#[tokio::test]
async fn test_query_accepts_text_pairs_and_statements() {
    let pool = MockPool::new();
    let model = articles(&pool);

    assert_ok!(model.query("SELECT 1").await);
    assert_ok!(model.query(("SELECT ?", vec![Value::from(2)])).await);
    let statement = model
        .table()
        .build_count(&Record::new().with("$recent", "created_at > NOW()"))
        .unwrap();
    assert_eq!(
        statement.to_sql().unwrap(),
        "SELECT COUNT(*) AS c FROM blog_articles WHERE (created_at > NOW())"
    );
    assert_ok!(model.query(statement).await);

    assert_eq!(pool.events().len(), 3);
    assert_eq!(pool.params()[1], vec![Value::I32(2)]);
}
