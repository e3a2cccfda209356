//! Recording mock pool shared by the integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use tabula_core::{Connection, ConnectionPool, Error, Executor, QueryResult, Result, Row, Value};

type Log = Arc<Mutex<Vec<String>>>;
type Responses = Arc<Mutex<Vec<(String, QueryResult)>>>;

/// Pool recording every event as `BEGIN`, the executed SQL, `COMMIT`,
/// `ROLLBACK` or `RELEASE`
#[derive(Clone, Default)]
pub struct MockPool {
    log: Log,
    params: Arc<Mutex<Vec<Vec<Value>>>>,
    responses: Responses,
    failures: Arc<Mutex<Vec<(String, Option<String>)>>>,
    fail_commit: Arc<Mutex<bool>>,
    fail_rollback: Arc<Mutex<bool>>,
}

impl MockPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer statements containing `fragment` with `result`
    pub fn respond(&self, fragment: &str, result: QueryResult) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push((fragment.to_string(), result));
        self
    }

    /// Answer statements containing `fragment` with these rows
    pub fn respond_rows(&self, fragment: &str, rows: serde_json::Value) -> &Self {
        let rows: Vec<Row> = rows
            .as_array()
            .expect("rows must be a JSON array")
            .iter()
            .map(|row| row.as_object().expect("row must be an object").clone())
            .collect();
        self.respond(fragment, QueryResult::from_rows(rows))
    }

    /// Fail statements containing `fragment` with a driver error
    pub fn fail_on(&self, fragment: &str, code: Option<&str>) -> &Self {
        self.failures
            .lock()
            .unwrap()
            .push((fragment.to_string(), code.map(str::to_string)));
        self
    }

    pub fn fail_commit(&self) -> &Self {
        *self.fail_commit.lock().unwrap() = true;
        self
    }

    pub fn fail_rollback(&self) -> &Self {
        *self.fail_rollback.lock().unwrap() = true;
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn params(&self) -> Vec<Vec<Value>> {
        self.params.lock().unwrap().clone()
    }

    fn record(&self, event: &str) {
        self.log.lock().unwrap().push(event.to_string());
    }

    fn run(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.record(sql);
        self.params.lock().unwrap().push(params.to_vec());

        let failure = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .find(|(fragment, _)| sql.contains(fragment.as_str()))
            .cloned();
        if let Some((fragment, code)) = failure {
            return Err(Error::driver(code.as_deref(), format!("mock failure on '{fragment}'")));
        }

        let response = self
            .responses
            .lock()
            .unwrap()
            .iter()
            .find(|(fragment, _)| sql.contains(fragment.as_str()))
            .map(|(_, result)| result.clone());
        Ok(response.unwrap_or_else(|| QueryResult::affected(1)))
    }
}

impl Executor for MockPool {
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.run(sql, params)
    }
}

impl ConnectionPool for MockPool {
    type Connection = MockConnection;

    async fn acquire(&self) -> Result<Self::Connection> {
        Ok(MockConnection { pool: self.clone() })
    }
}

/// Dedicated connection sharing its pool's log
pub struct MockConnection {
    pool: MockPool,
}

impl Executor for MockConnection {
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.pool.run(sql, params)
    }
}

impl Connection for MockConnection {
    async fn begin(&self) -> Result<()> {
        self.pool.record("BEGIN");
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        self.pool.record("COMMIT");
        if *self.pool.fail_commit.lock().unwrap() {
            return Err(Error::driver(Some("1213"), "deadlock found when trying to commit"));
        }
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        self.pool.record("ROLLBACK");
        if *self.pool.fail_rollback.lock().unwrap() {
            return Err(Error::driver(None, "connection lost"));
        }
        Ok(())
    }

    async fn release(self) {
        self.pool.record("RELEASE");
    }
}
