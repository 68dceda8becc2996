//! Per-operation connection scope

use std::path::Path;

use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OpenFlags};

use crate::config::StoreConfig;
use crate::{Error, Result};

/// Open the configured database for one operation.
///
/// The file must already exist; provisioning is [`super::SchemaManager`]'s
/// job. The connection is closed when the returned value is dropped.
pub fn open(config: &StoreConfig) -> Result<Connection> {
    let path = config.database_path();
    if !path.is_file() {
        return Err(Error::StoreUnavailable {
            path,
            reason: "database does not exist (run `vacancydb init`)".to_string(),
        });
    }
    open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX)
}

/// Open the database file, creating it when missing.
pub(crate) fn open_or_create(path: &Path) -> Result<Connection> {
    open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
}

fn open_with_flags(path: &Path, flags: OpenFlags) -> Result<Connection> {
    let unavailable = |e: rusqlite::Error| match e.sqlite_error_code() {
        Some(rusqlite::ErrorCode::NotADatabase) => {
            Error::SchemaConflict(format!("{} is not a SQLite database", path.display()))
        }
        _ => Error::StoreUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    };

    let conn = Connection::open_with_flags(path, flags).map_err(unavailable)?;
    configure(&conn).map_err(unavailable)?;
    tracing::debug!("Opened connection to {}", path.display());
    Ok(conn)
}

fn configure(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    // SQLite's LOWER() only folds ASCII; vacancy titles are often Cyrillic.
    conn.create_scalar_function(
        "casefold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text = ctx.get::<Option<String>>(0)?;
            Ok(text.map(|s| s.to_lowercase()))
        },
    )
}
