//! Transactions on a dedicated connection
//!
//! Both entry points share one state machine:
//!
//! ```text
//! Idle -> ConnectionAcquired -> TransactionOpen -> Committed | RolledBack -> Released
//! ```
//!
//! Once a connection has been acquired it is released exactly once on every
//! path, including a failed BEGIN. A failure in the unit of work or in COMMIT
//! triggers ROLLBACK, then the original error is returned.
//!
//! Every error leaving a transaction passes the model's error hook exactly
//! once. Statements run inside the unit of work see their errors raw, so a
//! callback that wants duplicate-key translation before deciding what to do
//! calls [`classify`](crate::classify) itself.

use futures::future::BoxFuture;

use crate::executor::{Connection, ConnectionPool, Query, QueryResult};
use crate::{Error, Model, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransactionState {
    Idle,
    ConnectionAcquired,
    TransactionOpen,
    Committed,
    RolledBack,
    Released,
}

struct StateLog<'a> {
    label: &'a str,
    state: TransactionState,
}

impl<'a> StateLog<'a> {
    fn new(label: &'a str) -> Self {
        Self {
            label,
            state: TransactionState::Idle,
        }
    }

    fn advance(&mut self, next: TransactionState) {
        tracing::trace!(
            target: "tabula::transaction",
            transaction = self.label,
            from = ?self.state,
            to = ?next
        );
        self.state = next;
    }
}

impl<P: ConnectionPool> Model<P> {
    /// Run `work` inside a transaction on a dedicated connection.
    ///
    /// `work` receives this model bound to that connection. Its statements
    /// run in order on the one connection; an `Err` rolls everything back.
    ///
    /// # Examples
    /// ```no_run
    /// # async fn demo<P: tabula_core::ConnectionPool>(accounts: tabula_core::Model<P>) -> tabula_core::Result<()> {
    /// accounts
    ///     .transactions("transfer", |tx| {
    ///         Box::pin(async move {
    ///             tx.incr_fields(1, "balance", -100).await?;
    ///             tx.incr_fields(2, "balance", 100).await?;
    ///             Ok(())
    ///         })
    ///     })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn transactions<T, F>(&self, name: &str, work: F) -> Result<T>
    where
        T: Send,
        F: for<'c> FnOnce(Model<&'c P::Connection>) -> BoxFuture<'c, Result<T>> + Send,
    {
        if name.trim().is_empty() {
            return Err(Error::invalid_argument("transaction name must not be empty"));
        }

        let table = self.table.clone();
        let hooks = self.hooks.deferring_errors();
        self.run_transaction(name, move |conn| {
            work(Model {
                table,
                exec: conn,
                hooks,
            })
        })
        .await
    }

    /// Execute `queries` in order inside one transaction, stopping at the
    /// first failure. Returns one result per statement.
    pub async fn transaction_sqls<Q>(&self, queries: Vec<Q>) -> Result<Vec<QueryResult>>
    where
        Q: Into<Query>,
    {
        if queries.is_empty() {
            return Err(Error::invalid_argument(
                "transaction_sqls needs at least one statement",
            ));
        }
        let queries: Vec<Query> = queries.into_iter().map(Into::into).collect();

        let table = self.table.clone();
        let hooks = self.hooks.deferring_errors();
        self.run_transaction("transaction_sqls", move |conn| {
            Box::pin(async move {
                let tx = Model {
                    table,
                    exec: conn,
                    hooks,
                };
                let mut results = Vec::with_capacity(queries.len());
                for query in queries {
                    results.push(tx.query(query).await?);
                }
                Ok(results)
            })
        })
        .await
    }

    async fn run_transaction<T, F>(&self, label: &str, work: F) -> Result<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c P::Connection) -> BoxFuture<'c, Result<T>> + Send,
    {
        let mut log = StateLog::new(label);

        let conn = self.exec.acquire().await.map_err(|err| self.hooks.error(err))?;
        log.advance(TransactionState::ConnectionAcquired);

        let outcome = self.run_on(&conn, &mut log, work).await;

        conn.release().await;
        log.advance(TransactionState::Released);
        outcome
    }

    async fn run_on<T, F>(&self, conn: &P::Connection, log: &mut StateLog<'_>, work: F) -> Result<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c P::Connection) -> BoxFuture<'c, Result<T>> + Send,
    {
        conn.begin().await.map_err(|err| self.hooks.error(err))?;
        log.advance(TransactionState::TransactionOpen);

        let result = match work(conn).await {
            Ok(value) => conn.commit().await.map(|()| value),
            Err(err) => Err(err),
        };

        match result {
            Ok(value) => {
                log.advance(TransactionState::Committed);
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = conn.rollback().await {
                    tracing::warn!(
                        target: "tabula::transaction",
                        transaction = log.label,
                        error = %rollback_err,
                        "rollback failed"
                    );
                }
                log.advance(TransactionState::RolledBack);
                Err(self.hooks.error(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Executor;
    use crate::{Record, Table, Value};
    use std::sync::{Arc, Mutex};

    type Events = Arc<Mutex<Vec<String>>>;

    #[derive(Default)]
    struct MockPool {
        events: Events,
        fail_begin: bool,
    }

    struct MockConnection {
        events: Events,
        fail_begin: bool,
    }

    impl Executor for MockPool {
        async fn execute(&self, sql: &str, _params: &[Value]) -> Result<QueryResult> {
            self.events.lock().unwrap().push(format!("POOL {sql}"));
            Ok(QueryResult::affected(1))
        }
    }

    impl ConnectionPool for MockPool {
        type Connection = MockConnection;

        async fn acquire(&self) -> Result<Self::Connection> {
            Ok(MockConnection {
                events: self.events.clone(),
                fail_begin: self.fail_begin,
            })
        }
    }

    impl MockConnection {
        fn record(&self, event: &str) {
            self.events.lock().unwrap().push(event.to_string());
        }
    }

    impl Executor for MockConnection {
        async fn execute(&self, sql: &str, _params: &[Value]) -> Result<QueryResult> {
            self.record(sql);
            if sql.contains("fail") {
                return Err(Error::driver(Some("1146"), "no such table"));
            }
            Ok(QueryResult::affected(1))
        }
    }

    impl Connection for MockConnection {
        async fn begin(&self) -> Result<()> {
            self.record("BEGIN");
            if self.fail_begin {
                return Err(Error::driver(None, "begin refused"));
            }
            Ok(())
        }

        async fn commit(&self) -> Result<()> {
            self.record("COMMIT");
            Ok(())
        }

        async fn rollback(&self) -> Result<()> {
            self.record("ROLLBACK");
            Ok(())
        }

        async fn release(self) {
            self.record("RELEASE");
        }
    }

    fn events(model: &Model<MockPool>) -> Vec<String> {
        model.executor().events.lock().unwrap().clone()
    }

    fn model(pool: MockPool) -> Model<MockPool> {
        Model::new(Table::new("t").unwrap(), pool)
    }

    #[tokio::test]
    async fn test_transaction_sqls_commit() {
        let model = model(MockPool::default());
        let results = model
            .transaction_sqls(vec!["UPDATE t SET a = 1", "UPDATE t SET b = 2"])
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(
            events(&model),
            vec!["BEGIN", "UPDATE t SET a = 1", "UPDATE t SET b = 2", "COMMIT", "RELEASE"]
        );
    }

    #[tokio::test]
    async fn test_transaction_sqls_stop_at_first_failure() {
        let model = model(MockPool::default());
        let err = model
            .transaction_sqls(vec!["UPDATE t SET a = 1", "UPDATE fail", "UPDATE t SET c = 3"])
            .await
            .unwrap_err();
        assert_eq!(err.code().as_deref(), Some("1146"));
        assert_eq!(
            events(&model),
            vec!["BEGIN", "UPDATE t SET a = 1", "UPDATE fail", "ROLLBACK", "RELEASE"]
        );
    }

    #[tokio::test]
    async fn test_callback_error_rolls_back() {
        let model = model(MockPool::default());
        let result: Result<()> = model
            .transactions("two-writes", |tx| {
                Box::pin(async move {
                    tx.update_by_primary(1, &Record::new().with("a", 1)).await?;
                    tx.update_by_primary(2, &Record::new().with("a", 2)).await?;
                    Err(Error::invalid_argument("abort"))
                })
            })
            .await;
        assert!(result.unwrap_err().is_invalid_argument());
        assert_eq!(
            events(&model),
            vec![
                "BEGIN",
                "UPDATE t SET a = ? WHERE (id = ?)",
                "UPDATE t SET a = ? WHERE (id = ?)",
                "ROLLBACK",
                "RELEASE",
            ]
        );
    }

    fn counting(pool: MockPool) -> (Model<MockPool>, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let model = model(pool).with_hooks(crate::Hooks::default().on_error(move |err| {
            sink.lock().unwrap().push(err.to_string());
            err
        }));
        (model, seen)
    }

    #[tokio::test]
    async fn test_callback_error_passes_error_hook_once() {
        let (model, seen) = counting(MockPool::default());
        let result: Result<()> = model
            .transactions("abort", |_tx| {
                Box::pin(async move { Err(Error::invalid_argument("abort")) })
            })
            .await;
        assert!(result.unwrap_err().is_invalid_argument());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_statement_error_passes_error_hook_once() {
        let (model, seen) = counting(MockPool::default());
        let err = model
            .transactions("write", |tx| {
                Box::pin(async move {
                    tx.query("UPDATE fail").await?;
                    Ok(())
                })
            })
            .await
            .unwrap_err();
        assert_eq!(err.code().as_deref(), Some("1146"));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_begin_still_releases() {
        let model = model(MockPool {
            fail_begin: true,
            ..MockPool::default()
        });
        let err = model.transaction_sqls(vec!["SELECT 1"]).await.unwrap_err();
        assert!(matches!(err, Error::Driver { .. }));
        assert_eq!(events(&model), vec!["BEGIN", "RELEASE"]);
    }

    #[tokio::test]
    async fn test_preconditions_fail_before_acquire() {
        let model = model(MockPool::default());
        let err = model
            .transactions("", |_tx| Box::pin(async move { Ok(()) }))
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());

        let err = model.transaction_sqls(Vec::<&str>::new()).await.unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(events(&model).is_empty());
    }
}
