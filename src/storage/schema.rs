//! Database schema definitions and provisioning

use std::collections::HashSet;

use rusqlite::Connection;
use tracing::{debug, info};

use super::connection;
use crate::config::StoreConfig;
use crate::{Error, Result};

/// Stamped into the file header of every database this crate creates ("VACB").
pub const APPLICATION_ID: i32 = 0x5641_4342;

/// SQL to create the organizations table
pub const CREATE_ORGANIZATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS organizations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE CHECK (length(trim(name)) > 0)
)
"#;

/// SQL to create the vacancies table
pub const CREATE_VACANCIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS vacancies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    salary_from INTEGER,
    salary_to INTEGER,
    currency TEXT CHECK (currency IS NULL OR length(currency) <= 10),
    url TEXT,
    organization_id INTEGER REFERENCES organizations(id)
)
"#;

/// SQL to create indexes. `organizations.name` is covered by its UNIQUE constraint.
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_vacancies_organization ON vacancies(organization_id)",
];

/// Columns each table must carry for the queries to work
const EXPECTED_COLUMNS: &[(&str, &[&str])] = &[
    ("organizations", &["id", "name"]),
    (
        "vacancies",
        &[
            "id",
            "name",
            "salary_from",
            "salary_to",
            "currency",
            "url",
            "organization_id",
        ],
    ),
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_ORGANIZATIONS_TABLE, CREATE_VACANCIES_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// Whether a provisioning step had to create anything
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provisioned {
    Created,
    AlreadyPresent,
}

impl Provisioned {
    pub fn is_created(self) -> bool {
        self == Provisioned::Created
    }
}

/// Creates the database file and tables on demand
pub struct SchemaManager<'a> {
    config: &'a StoreConfig,
}

impl<'a> SchemaManager<'a> {
    pub fn new(config: &'a StoreConfig) -> Self {
        Self { config }
    }

    /// Make sure the database file exists, creating it (and the data
    /// directory) when absent.
    ///
    /// An existing file stamped by another application is a
    /// [`Error::SchemaConflict`]. Concurrent callers race on file creation;
    /// SQLite is the only arbiter.
    pub fn ensure_database(&self) -> Result<Provisioned> {
        let path = self.config.database_path();

        if path.is_file() {
            let conn = connection::open(self.config)?;
            check_application_id(&conn, self.config)?;
            debug!("Database '{}' already present", self.config.name);
            return Ok(Provisioned::AlreadyPresent);
        }
        if path.exists() {
            return Err(Error::SchemaConflict(format!(
                "{} exists but is not a database file",
                path.display()
            )));
        }

        std::fs::create_dir_all(&self.config.data_dir).map_err(|e| Error::StoreUnavailable {
            path: self.config.data_dir.clone(),
            reason: e.to_string(),
        })?;

        let conn = connection::open_or_create(&path)?;
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL; PRAGMA application_id = {};",
            APPLICATION_ID
        ))?;

        info!("Database '{}' created at {}", self.config.name, path.display());
        Ok(Provisioned::Created)
    }

    /// Create the `organizations` and `vacancies` tables if they don't exist.
    ///
    /// Runs in one transaction and verifies the column layout afterwards, so
    /// a pre-existing table of the wrong shape is reported rather than used.
    pub fn ensure_tables(&self) -> Result<Provisioned> {
        let mut conn = connection::open(self.config)?;
        let tx = conn.transaction()?;

        let mut missing = 0;
        for (table, _) in EXPECTED_COLUMNS {
            if !table_exists(&tx, table)? {
                missing += 1;
            }
        }

        for stmt in all_schema_statements() {
            tx.execute(stmt, [])?;
        }
        for (table, columns) in EXPECTED_COLUMNS {
            verify_columns(&tx, table, columns)?;
        }
        tx.commit()?;

        if missing > 0 {
            info!("Tables created in '{}'", self.config.name);
            Ok(Provisioned::Created)
        } else {
            debug!("Tables already present in '{}'", self.config.name);
            Ok(Provisioned::AlreadyPresent)
        }
    }
}

fn check_application_id(conn: &Connection, config: &StoreConfig) -> Result<()> {
    let id: i32 = conn
        .query_row("PRAGMA application_id", [], |row| row.get(0))
        .map_err(|e| match e.sqlite_error_code() {
            Some(rusqlite::ErrorCode::NotADatabase) => Error::SchemaConflict(format!(
                "{} is not a SQLite database",
                config.database_path().display()
            )),
            _ => e.into(),
        })?;

    // 0 means the file was created by a plain SQLite client; accept it and
    // let the column check in ensure_tables decide.
    if id != 0 && id != APPLICATION_ID {
        return Err(Error::SchemaConflict(format!(
            "{} belongs to another application (application_id {:#x})",
            config.database_path().display(),
            id
        )));
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn verify_columns(conn: &Connection, table: &str, expected: &[&str]) -> Result<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let present = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<HashSet<_>>>()?;

    let missing: Vec<&str> = expected
        .iter()
        .copied()
        .filter(|column| !present.contains(*column))
        .collect();

    if !missing.is_empty() {
        return Err(Error::SchemaConflict(format!(
            "table '{}' is missing column(s): {}",
            table,
            missing.join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestStore;

    fn object_exists(conn: &Connection, kind: &str, name: &str) -> bool {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = ?1 AND name = ?2)",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn ensure_database_is_idempotent() {
        let store = TestStore::unprovisioned();
        let schema = SchemaManager::new(store.config());

        assert_eq!(schema.ensure_database().unwrap(), Provisioned::Created);
        assert!(store.config().database_path().is_file());
        assert_eq!(schema.ensure_database().unwrap(), Provisioned::AlreadyPresent);
    }

    #[test]
    fn ensure_database_creates_nested_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path().join("nested").join("data"), "jobs");

        assert!(SchemaManager::new(&config).ensure_database().unwrap().is_created());
        assert!(config.database_path().is_file());
    }

    #[test]
    fn created_database_is_stamped() {
        let store = TestStore::new();
        let conn = connection::open(store.config()).unwrap();
        let id: i32 = conn
            .query_row("PRAGMA application_id", [], |row| row.get(0))
            .unwrap();
        assert_eq!(id, APPLICATION_ID);
    }

    #[test]
    fn ensure_tables_is_idempotent() {
        let store = TestStore::unprovisioned();
        let schema = SchemaManager::new(store.config());
        schema.ensure_database().unwrap();

        assert_eq!(schema.ensure_tables().unwrap(), Provisioned::Created);
        assert_eq!(schema.ensure_tables().unwrap(), Provisioned::AlreadyPresent);

        let conn = connection::open(store.config()).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('organizations', 'vacancies')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }

    #[test]
    fn all_tables_and_indexes_exist() {
        let store = TestStore::new();
        let conn = connection::open(store.config()).unwrap();

        assert!(object_exists(&conn, "table", "organizations"));
        assert!(object_exists(&conn, "table", "vacancies"));
        assert!(object_exists(&conn, "index", "idx_vacancies_organization"));
    }

    #[test]
    fn ensure_tables_without_database_is_unavailable() {
        let store = TestStore::unprovisioned();
        let err = SchemaManager::new(store.config()).ensure_tables().unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable { .. }));
    }

    #[test]
    fn incompatible_table_is_conflict() {
        let store = TestStore::unprovisioned();
        let schema = SchemaManager::new(store.config());
        schema.ensure_database().unwrap();
        {
            let conn = connection::open(store.config()).unwrap();
            conn.execute_batch("CREATE TABLE organizations (id INTEGER PRIMARY KEY, title TEXT)")
                .unwrap();
        }

        let err = schema.ensure_tables().unwrap_err();
        match err {
            Error::SchemaConflict(msg) => assert!(msg.contains("name"), "{}", msg),
            other => panic!("expected schema conflict, got {:?}", other),
        }

        // The failed transaction must not leave a half-created schema behind
        let conn = connection::open(store.config()).unwrap();
        assert!(!object_exists(&conn, "table", "vacancies"));
    }

    #[test]
    fn foreign_application_is_conflict() {
        let store = TestStore::unprovisioned();
        let path = store.config().database_path();
        std::fs::create_dir_all(&store.config().data_dir).unwrap();
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("PRAGMA application_id = 42;").unwrap();
        }

        let err = SchemaManager::new(store.config()).ensure_database().unwrap_err();
        assert!(matches!(err, Error::SchemaConflict(_)));
    }

    #[test]
    fn non_sqlite_file_is_conflict() {
        let store = TestStore::unprovisioned();
        std::fs::create_dir_all(&store.config().data_dir).unwrap();
        std::fs::write(store.config().database_path(), "not a database\n".repeat(512)).unwrap();

        let err = SchemaManager::new(store.config()).ensure_database().unwrap_err();
        assert!(matches!(err, Error::SchemaConflict(_)), "{:?}", err);
    }
}
