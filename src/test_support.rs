//! Shared fixtures for unit tests

use tempfile::TempDir;

use crate::config::StoreConfig;
use crate::model::NewVacancy;
use crate::storage::{IngestionWriter, SchemaManager};

/// A store rooted in a temporary data directory, removed on drop
pub struct TestStore {
    _dir: TempDir,
    config: StoreConfig,
}

impl TestStore {
    /// A store with the database and tables already provisioned
    pub fn new() -> Self {
        let store = Self::unprovisioned();
        let schema = SchemaManager::new(&store.config);
        schema.ensure_database().unwrap();
        schema.ensure_tables().unwrap();
        store
    }

    /// Config pointing at a database that does not exist yet
    pub fn unprovisioned() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path().join("data"), "vacancies_test");
        Self { _dir: dir, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn writer(&self) -> IngestionWriter<'_> {
        IngestionWriter::new(&self.config)
    }

    pub fn seed(&self, records: &[NewVacancy]) {
        self.writer().ingest(records).unwrap();
    }
}

/// A vacancy for `employer` with the given salary bounds in `currency`
pub fn vacancy(
    title: &str,
    employer: &str,
    from: Option<i64>,
    to: Option<i64>,
    currency: &str,
) -> NewVacancy {
    NewVacancy::new(title)
        .with_salary(from, to, currency)
        .with_employer(employer)
}

/// `count` salary-less postings for `employer`
pub fn postings(employer: &str, count: usize) -> Vec<NewVacancy> {
    (0..count)
        .map(|i| NewVacancy::new(format!("{} opening {}", employer, i)).with_employer(employer))
        .collect()
}
