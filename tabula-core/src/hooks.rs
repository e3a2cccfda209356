//! Logging and error interception points for a [`Model`](crate::Model)

use std::fmt;
use std::sync::Arc;

use crate::error::{classify, Error};

/// Tracing target used for statement logging
pub const SQL_TARGET: &str = "tabula::sql";

type DebugFn = dyn Fn(&str) + Send + Sync;
type ErrorFn = dyn Fn(Error) -> Error + Send + Sync;

/// The `{on_debug, on_error}` capabilities injected into a model.
///
/// `on_debug` receives the literal SQL of every statement unless the
/// executor consumes it first. `on_error` sees every execution error and
/// returns the error to propagate; it can translate but never suppress.
///
/// # Examples
/// ```
/// use tabula_core::{Error, Hooks};
///
/// let hooks = Hooks::default()
///     .on_debug(|sql| println!("{sql}"))
///     .on_error(|err| match err.code().as_deref() {
///         Some("1213") => Error::driver(Some("1213"), "deadlock, try again"),
///         _ => tabula_core::classify(err),
///     });
/// # let _ = hooks;
/// ```
#[derive(Clone)]
pub struct Hooks {
    debug: Arc<DebugFn>,
    error: Arc<ErrorFn>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            debug: Arc::new(|sql| tracing::debug!(target: SQL_TARGET, "{sql}")),
            error: Arc::new(|err| {
                tracing::error!(target: SQL_TARGET, error = %err, "statement failed");
                classify(err)
            }),
        }
    }
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the statement log sink
    pub fn on_debug<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.debug = Arc::new(f);
        self
    }

    /// Replace the error hook
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(Error) -> Error + Send + Sync + 'static,
    {
        self.error = Arc::new(f);
        self
    }

    /// Same debug sink, errors passed through untouched. Used inside a
    /// transaction, whose outcome goes through the error hook once.
    pub(crate) fn deferring_errors(&self) -> Self {
        Self {
            debug: self.debug.clone(),
            error: Arc::new(|err| err),
        }
    }

    pub fn debug(&self, sql: &str) {
        (self.debug)(sql)
    }

    pub fn error(&self, err: Error) -> Error {
        (self.error)(err)
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_default_error_hook_classifies_duplicates() {
        let hooks = Hooks::default();
        let err = hooks.error(Error::driver(Some("1062"), "Duplicate entry '1' for key 'PRIMARY'"));
        assert!(err.is_duplicate_entry());

        let err = hooks.error(Error::driver(Some("1146"), "Table doesn't exist"));
        assert_eq!(err.code().as_deref(), Some("1146"));
    }

    #[test]
    fn test_custom_hooks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let hooks = Hooks::default()
            .on_debug(move |sql| sink.lock().unwrap().push(sql.to_string()))
            .on_error(|err| Error::invalid_argument(format!("wrapped: {err}")));

        hooks.debug("SELECT 1");
        assert_eq!(*seen.lock().unwrap(), vec!["SELECT 1".to_string()]);

        let err = hooks.error(Error::sql_generation("boom"));
        assert!(err.to_string().contains("wrapped: SQL generation error: boom"));
    }
}
