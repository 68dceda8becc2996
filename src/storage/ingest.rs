//! Ingestion of organizations and vacancies
//!
//! Every statement commits on its own. An organization row is always written
//! before the vacancy that references it, so an interrupted run leaves no
//! orphaned vacancies behind.

use rusqlite::{Connection, params};
use tracing::{debug, info};

use super::connection;
use crate::Result;
use crate::config::StoreConfig;
use crate::model::{IngestReport, NewVacancy, OrganizationId, VacancyId};

/// Writes organizations (deduplicated by name) and vacancies
pub struct IngestionWriter<'a> {
    config: &'a StoreConfig,
}

impl<'a> IngestionWriter<'a> {
    pub fn new(config: &'a StoreConfig) -> Self {
        Self { config }
    }

    /// Insert an organization unless one with the same name exists.
    ///
    /// Surrounding whitespace is trimmed, then names are compared
    /// case-sensitively. Returns the id of the new or existing row.
    pub fn insert_organization(&self, name: &str) -> Result<OrganizationId> {
        let conn = connection::open(self.config)?;
        let (id, _) = insert_organization(&conn, name)?;
        Ok(id)
    }

    /// Insert a vacancy, creating its employer first when needed.
    pub fn insert_vacancy(&self, record: &NewVacancy) -> Result<VacancyId> {
        let conn = connection::open(self.config)?;
        let mut report = IngestReport::default();
        insert_record(&conn, record, &mut report)
    }

    /// Insert a vacancy row pointing at an already-known organization.
    ///
    /// An id with no matching organization fails with
    /// [`crate::Error::ConstraintViolation`].
    pub fn insert_vacancy_row(
        &self,
        organization_id: Option<OrganizationId>,
        record: &NewVacancy,
    ) -> Result<VacancyId> {
        let conn = connection::open(self.config)?;
        insert_vacancy_row(&conn, organization_id, record)
    }

    /// Insert every record in order, stopping at the first failure.
    ///
    /// Rows written before a failure stay committed.
    pub fn ingest<'r, I>(&self, records: I) -> Result<IngestReport>
    where
        I: IntoIterator<Item = &'r NewVacancy>,
    {
        let conn = connection::open(self.config)?;
        let mut report = IngestReport::default();

        for record in records {
            insert_record(&conn, record, &mut report)?;
        }

        info!(
            vacancies = report.vacancies,
            organizations_created = report.organizations_created,
            "Ingested vacancies into '{}'",
            self.config.name
        );
        Ok(report)
    }
}

fn insert_record(
    conn: &Connection,
    record: &NewVacancy,
    report: &mut IngestReport,
) -> Result<VacancyId> {
    let organization_id = match record.employer_name() {
        Some(name) => {
            let (id, created) = insert_organization(conn, name)?;
            if created {
                report.organizations_created += 1;
            }
            Some(id)
        }
        None => {
            report.without_employer += 1;
            None
        }
    };

    let id = insert_vacancy_row(conn, organization_id, record)?;
    report.vacancies += 1;
    Ok(id)
}

fn insert_organization(conn: &Connection, name: &str) -> Result<(OrganizationId, bool)> {
    // Same normalization as `NewVacancy::employer_name`; blank names hit the CHECK
    let name = name.trim();
    let inserted = conn.execute(
        "INSERT INTO organizations (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
        params![name],
    )?;
    let id: OrganizationId = conn.query_row(
        "SELECT id FROM organizations WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )?;

    if inserted > 0 {
        debug!(id, "Created organization '{}'", name);
    }
    Ok((id, inserted > 0))
}

fn insert_vacancy_row(
    conn: &Connection,
    organization_id: Option<OrganizationId>,
    record: &NewVacancy,
) -> Result<VacancyId> {
    conn.execute(
        r#"
        INSERT INTO vacancies (name, salary_from, salary_to, currency, url, organization_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            record.title,
            record.salary_from,
            record.salary_to,
            record.currency,
            record.url,
            organization_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}
