//! # vacancydb - Job-vacancy store
//!
//! Ingests job postings into a SQLite database and answers a fixed set of
//! analytical queries over them.
//!
//! vacancydb provides:
//! - Idempotent provisioning of the database file and its tables
//! - Organization-deduplicating ingestion of vacancy records
//! - A query engine for employer counts, salary averages and keyword search
//! - A facade (`VacancyStore`) tying the three together behind one config

pub mod config;
pub mod model;
pub mod storage;
pub mod query;
pub mod store;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_support;

use std::path::PathBuf;

// Re-exports for convenient access
pub use config::StoreConfig;
pub use model::{
    AboveAverage, CompanySalary, CompanyVacancyCount, IngestReport, KeywordMatch, NewVacancy,
    OrganizationId, SalariedVacancy, SearchOutcome, VacancyId, VacancyListing,
};
pub use query::QueryEngine;
pub use storage::{IngestionWriter, Provisioned, SchemaManager};
pub use store::VacancyStore;

/// Result type alias for vacancydb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for vacancydb operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Store unavailable at {}: {reason}", path.display())]
    StoreUnavailable { path: PathBuf, reason: String },

    #[error("Schema conflict: {0}")]
    SchemaConflict(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::ConstraintViolation) => {
                Error::ConstraintViolation(err.to_string())
            }
            _ => Error::Storage(err),
        }
    }
}
