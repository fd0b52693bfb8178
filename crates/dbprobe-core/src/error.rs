use thiserror::Error;

/// Core error type shared across dbprobe crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Database error or driver failure.
    #[error("database error: {message}")]
    Db {
        message: String,
        /// SQLSTATE reported by the server, when there is one.
        code: Option<String>,
    },
    /// No connection string was supplied by flag, environment or config file.
    #[error("database url is not configured (set NEON_DATABASE_URL or DATABASE_URL)")]
    MissingDatabaseUrl,
    /// The connection string does not point at Postgres.
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
    /// The config file could not be parsed or holds invalid values.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A table the command depends on does not exist.
    #[error("table not found: {0}")]
    MissingTable(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a database error from a message without an SQLSTATE.
    pub fn db(message: impl Into<String>) -> Self {
        Error::Db {
            message: message.into(),
            code: None,
        }
    }

    /// SQLSTATE code for database errors, if the server sent one.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Error::Db { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Error::Config(value.to_string())
    }
}

/// Convenience alias for results returned by dbprobe crates.
pub type Result<T> = std::result::Result<T, Error>;
