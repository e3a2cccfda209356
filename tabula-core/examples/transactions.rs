use serde::Deserialize;
use tabula_core::{
    Connection, ConnectionPool, Error, Executor, Model, QueryResult, Record, Result, Table, Value,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct Account {
    id: i64,
    balance: i64,
}

// Mock connection pool for demonstration (use MySqlConnectionPool in production)
#[derive(Clone)]
struct MockPool;

struct MockConnection;

fn respond(sql: &str) -> Result<QueryResult> {
    println!("   EXECUTE: {sql}");
    if sql.contains("frozen") {
        return Err(Error::driver(Some("1644"), "account is frozen"));
    }
    if sql.starts_with("SELECT") {
        let row = serde_json::json!({"id": 1, "balance": 900});
        return Ok(QueryResult::from_rows(
            row.as_object().into_iter().cloned().collect(),
        ));
    }
    Ok(QueryResult::affected(1))
}

impl Executor for MockPool {
    async fn execute(&self, sql: &str, _params: &[Value]) -> Result<QueryResult> {
        respond(sql)
    }
}

impl ConnectionPool for MockPool {
    type Connection = MockConnection;

    async fn acquire(&self) -> Result<Self::Connection> {
        println!("   ACQUIRE");
        Ok(MockConnection)
    }
}

impl Executor for MockConnection {
    async fn execute(&self, sql: &str, _params: &[Value]) -> Result<QueryResult> {
        respond(sql)
    }
}

impl Connection for MockConnection {
    async fn begin(&self) -> Result<()> {
        println!("   BEGIN");
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        println!("   COMMIT");
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        println!("   ROLLBACK");
        Ok(())
    }

    async fn release(self) {
        println!("   RELEASE");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tabula=trace".parse().map_err(
            |err| Error::invalid_argument(format!("bad log directive: {err}")),
        )?))
        .init();

    let accounts = Model::new(Table::new("accounts")?, MockPool);

    println!("Transfer with a callback:");
    let from: Option<Account> = accounts
        .transactions("transfer", |tx| {
            Box::pin(async move {
                tx.incr_fields(1, "balance", -100).await?;
                tx.incr_fields(2, "balance", 100).await?;
                tx.get_by_primary(1, ("id", "balance")).await
            })
        })
        .await?;
    if let Some(account) = from {
        println!("   account {} now holds {}", account.id, account.balance);
    }

    println!("Statement list that fails halfway:");
    let err = accounts
        .transaction_sqls(vec![
            "UPDATE accounts SET balance = balance - 5 WHERE id = 1",
            "UPDATE frozen SET balance = balance + 5 WHERE id = 2",
        ])
        .await
        .err();
    println!("   error: {err:?}");

    println!("Outside a transaction:");
    let updated = accounts
        .update_by_field(
            &Record::new().with("id", vec![1, 2]),
            &Record::new().with("audited", true),
        )
        .await?;
    println!("   updated {updated} rows");

    Ok(())
}
