//! Raw SQL and row mapping shared by the inspections.

use dbprobe_core::Error;

pub mod mapper;
pub mod queries;

/// Convert a driver error, keeping the server's SQLSTATE when present.
pub fn db_error(err: sqlx::Error) -> Error {
    let code = err
        .as_database_error()
        .and_then(|db| db.code())
        .map(|code| code.into_owned());
    Error::Db {
        message: err.to_string(),
        code,
    }
}
