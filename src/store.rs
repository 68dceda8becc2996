//! Store facade - single entry point for callers

use tracing::info;

use crate::Result;
use crate::config::StoreConfig;
use crate::model::{IngestReport, NewVacancy, OrganizationId, VacancyId};
use crate::query::QueryEngine;
use crate::storage::{IngestionWriter, Provisioned, SchemaManager};

/// A provisioned vacancy store.
///
/// Holding a `VacancyStore` means the config was validated and the database
/// and tables were ensured when it was opened.
#[derive(Debug, Clone)]
pub struct VacancyStore {
    config: StoreConfig,
}

/// What [`VacancyStore::open`] had to create
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Provisioning {
    pub database: Provisioned,
    pub tables: Provisioned,
}

impl VacancyStore {
    /// Validate `config`, then ensure its database and tables exist
    pub fn open(config: StoreConfig) -> Result<Self> {
        Self::provision(config).map(|(store, _)| store)
    }

    /// Like [`VacancyStore::open`], also reporting what had to be created
    pub fn provision(config: StoreConfig) -> Result<(Self, Provisioning)> {
        config.validate()?;

        let schema = SchemaManager::new(&config);
        let provisioning = Provisioning {
            database: schema.ensure_database()?,
            tables: schema.ensure_tables()?,
        };
        info!(
            "Store '{}' ready at {}",
            config.name,
            config.database_path().display()
        );
        Ok((Self { config }, provisioning))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn schema(&self) -> SchemaManager<'_> {
        SchemaManager::new(&self.config)
    }

    pub fn writer(&self) -> IngestionWriter<'_> {
        IngestionWriter::new(&self.config)
    }

    /// A new query session with an empty working set
    pub fn queries(&self) -> QueryEngine<'_> {
        QueryEngine::new(&self.config)
    }

    pub fn insert_organization(&self, name: &str) -> Result<OrganizationId> {
        self.writer().insert_organization(name)
    }

    pub fn insert_vacancy(&self, record: &NewVacancy) -> Result<VacancyId> {
        self.writer().insert_vacancy(record)
    }

    pub fn ingest<'r, I>(&self, records: I) -> Result<IngestReport>
    where
        I: IntoIterator<Item = &'r NewVacancy>,
    {
        self.writer().ingest(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::test_support::{TestStore, vacancy};

    #[test]
    fn open_provisions_then_reports_present() {
        let fixture = TestStore::unprovisioned();

        let (_, first) = VacancyStore::provision(fixture.config().clone()).unwrap();
        assert_eq!(first.database, Provisioned::Created);
        assert_eq!(first.tables, Provisioned::Created);

        let (_, second) = VacancyStore::provision(fixture.config().clone()).unwrap();
        assert_eq!(second.database, Provisioned::AlreadyPresent);
        assert_eq!(second.tables, Provisioned::AlreadyPresent);
    }

    #[test]
    fn open_rejects_invalid_config() {
        let fixture = TestStore::unprovisioned();
        let config = StoreConfig::new(&fixture.config().data_dir, "../outside");

        let err = VacancyStore::open(config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn end_to_end_flow() {
        let fixture = TestStore::unprovisioned();
        let store = VacancyStore::open(fixture.config().clone()).unwrap();

        let report = store
            .ingest(&[
                vacancy("Senior Software Engineer", "Acme", Some(100), Some(200), "RUR"),
                vacancy("QA Engineer", "Acme", Some(50), Some(150), "RUR"),
                vacancy("Office Manager", "Globex", None, None, "RUR"),
            ])
            .unwrap();
        assert_eq!(report.vacancies, 3);
        assert_eq!(store.insert_organization("Acme").unwrap(), 1);

        let mut queries = store.queries();
        let top = queries.top_companies(10, 2).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].company, "Acme");

        let averages = queries.average_salary_per_company().unwrap();
        assert_eq!(averages[0].average_salary, 125.0);

        let above = queries.vacancies_above_average_salary().unwrap();
        assert_eq!(above.vacancies.len(), 1);
        assert_eq!(above.vacancies[0].vacancy, "Senior Software Engineer");

        let outcome = queries.vacancies_matching_keyword("engineer").unwrap();
        assert_eq!(outcome.matches().len(), 2);
    }
}
