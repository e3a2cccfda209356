//! Error types for Tabula

use thiserror::Error;

/// The main error type for Tabula operations
#[derive(Error, Debug)]
pub enum Error {
    /// A caller-supplied argument is missing or unusable. Raised before any I/O.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A mapping used as a data source was empty once absent values were stripped
    #[error("Empty payload: {context} has no fields left to write")]
    EmptyPayload { context: String },

    /// Database connection or execution error from the sqlx adapter
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Execution error raised by any other connection implementation
    #[error("Driver error{}: {message}", code_suffix(.code))]
    Driver {
        code: Option<String>,
        message: String,
    },

    /// A unique or primary key constraint rejected the write
    #[error("Duplicate entry: {message}")]
    DuplicateEntry { message: String },

    /// SQL generation error
    #[error("SQL generation error: {message}")]
    SqlGeneration { message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience Result type for Tabula operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a new empty payload error
    pub fn empty_payload(context: impl Into<String>) -> Self {
        Self::EmptyPayload {
            context: context.into(),
        }
    }

    /// Create a new driver error
    pub fn driver(code: Option<&str>, message: impl Into<String>) -> Self {
        Self::Driver {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// Create a new SQL generation error
    pub fn sql_generation(message: impl Into<String>) -> Self {
        Self::SqlGeneration {
            message: message.into(),
        }
    }

    /// True for errors raised while validating builder arguments
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. } | Self::EmptyPayload { .. })
    }

    pub fn is_duplicate_entry(&self) -> bool {
        matches!(self, Self::DuplicateEntry { .. })
    }

    /// The driver-specific error code, when the connection reported one
    pub fn code(&self) -> Option<String> {
        match self {
            Self::Database(sqlx::Error::Database(db_err)) => {
                db_err.code().map(|code| code.into_owned())
            }
            Self::Driver { code, .. } => code.clone(),
            _ => None,
        }
    }
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(" [{c}]")).unwrap_or_default()
}

const DUPLICATE_CODES: &[&str] = &["1062", "23505", "ER_DUP_ENTRY"];

/// Default classification applied by the error hook.
///
/// Known duplicate-key codes become [`Error::DuplicateEntry`]; every other
/// error is returned unchanged.
pub fn classify(err: Error) -> Error {
    let duplicate = match &err {
        Error::Database(sqlx::Error::Database(db_err)) => {
            db_err.is_unique_violation()
                || db_err
                    .code()
                    .is_some_and(|code| DUPLICATE_CODES.contains(&code.as_ref()))
        }
        Error::Driver { code: Some(code), .. } => DUPLICATE_CODES.contains(&code.as_str()),
        _ => false,
    };

    if duplicate {
        Error::DuplicateEntry {
            message: err.to_string(),
        }
    } else {
        err
    }
}
