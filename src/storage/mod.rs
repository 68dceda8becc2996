//! Storage Layer - SQLite-backed persistence
//!
//! System of record is one SQLite file per store with tables:
//! - organizations(id, name)
//! - vacancies(id, name, salary_from, salary_to, currency, url, organization_id)
//!
//! Every operation opens its own connection through [`connection::open`] and
//! drops it before returning.

pub mod connection;
pub mod ingest;
pub mod schema;

pub use ingest::IngestionWriter;
pub use schema::{Provisioned, SchemaManager};
