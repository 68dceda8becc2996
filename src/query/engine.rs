//! Query engine implementation
//!
//! Provides the fixed analytical queries over a populated store:
//! - Companies ranked by posting count (all, or the top-N working set)
//! - Average midpoint salary per top company
//! - Vacancies paid above the reference-currency average
//! - Case-insensitive keyword search over vacancy titles
//!
//! Each query opens its own connection and closes it before returning.

use rusqlite::{Connection, params, params_from_iter};
use tracing::debug;

use crate::Result;
use crate::config::StoreConfig;
use crate::model::{
    AboveAverage, CompanySalary, CompanyVacancyCount, KeywordMatch, OrganizationId,
    SalariedVacancy, SearchOutcome, VacancyListing,
};
use crate::storage::connection;

/// Default size of the top-companies working set
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// Default minimum posting count for a company to rank
pub const DEFAULT_MIN_COUNT: i64 = 2;

/// Ranked companies cached for one engine session, with the arguments that produced them
#[derive(Debug)]
struct WorkingSet {
    limit: usize,
    min_count: i64,
    companies: Vec<CompanyVacancyCount>,
}

impl WorkingSet {
    fn computed_with(&self, limit: usize, min_count: i64) -> bool {
        self.limit == limit && self.min_count == min_count
    }
}

/// Query engine for vacancy statistics.
///
/// The only state it carries is the top-companies working set, computed on
/// first use and reused by [`QueryEngine::average_salary_per_company`].
/// Create a fresh engine to see rows ingested after that.
pub struct QueryEngine<'a> {
    config: &'a StoreConfig,
    working_set: Option<WorkingSet>,
}

impl<'a> QueryEngine<'a> {
    /// Create a new query engine
    pub fn new(config: &'a StoreConfig) -> Self {
        Self {
            config,
            working_set: None,
        }
    }

    /// Every company with its posting count, busiest first.
    ///
    /// Companies without postings are listed with a count of zero. Ties are
    /// ordered by name.
    pub fn companies_and_vacancy_counts(&self) -> Result<Vec<CompanyVacancyCount>> {
        let conn = connection::open(self.config)?;
        let mut stmt = conn.prepare(
            "SELECT o.id, o.name, COUNT(v.id) AS postings
             FROM organizations o
             LEFT JOIN vacancies v ON v.organization_id = o.id
             GROUP BY o.id, o.name
             ORDER BY postings DESC, o.name ASC, o.id ASC",
        )?;
        let rows = stmt.query_map([], row_to_company_count)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Up to `limit` companies with at least `min_count` postings, busiest first.
    ///
    /// Ties are broken by company name, then id, so the ranking is
    /// reproducible. The result becomes this session's working set; calling
    /// again with the same arguments returns the cached set without touching
    /// the database, different arguments replace it.
    pub fn top_companies(
        &mut self,
        limit: usize,
        min_count: i64,
    ) -> Result<&[CompanyVacancyCount]> {
        let set = match self.working_set.take() {
            Some(set) if set.computed_with(limit, min_count) => set,
            _ => {
                let conn = connection::open(self.config)?;
                let companies = fetch_top_companies(&conn, limit, min_count)?;
                debug!(limit, min_count, found = companies.len(), "Computed top companies");
                WorkingSet {
                    limit,
                    min_count,
                    companies,
                }
            }
        };
        Ok(&self.working_set.insert(set).companies)
    }

    /// The cached working set, computed with the defaults if no ranking ran yet.
    pub fn working_set(&mut self) -> Result<&[CompanyVacancyCount]> {
        if self.working_set.is_none() {
            self.top_companies(DEFAULT_TOP_LIMIT, DEFAULT_MIN_COUNT)?;
        }
        Ok(self
            .working_set
            .as_ref()
            .map(|set| set.companies.as_slice())
            .unwrap_or(&[]))
    }

    /// Mean midpoint salary for each company in the working set, highest first.
    ///
    /// Vacancies missing either bound have no midpoint and are left out; a
    /// company left with no salaried vacancies yields no row.
    pub fn average_salary_per_company(&mut self) -> Result<Vec<CompanySalary>> {
        let ids: Vec<OrganizationId> = self
            .working_set()?
            .iter()
            .map(|company| company.organization_id)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // Only `?` placeholders are spliced in; the ids themselves are bound.
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT o.id, o.name, AVG((v.salary_from + v.salary_to) / 2.0) AS average_salary
             FROM vacancies v
             JOIN organizations o ON o.id = v.organization_id
             WHERE v.organization_id IN ({})
               AND v.salary_from IS NOT NULL
               AND v.salary_to IS NOT NULL
             GROUP BY o.id, o.name
             ORDER BY average_salary DESC, o.name ASC",
            placeholders
        );

        let conn = connection::open(self.config)?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(ids.iter()), |row| {
            Ok(CompanySalary {
                organization_id: row.get(0)?,
                company: row.get(1)?,
                average_salary: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Every vacancy with its company, in insertion order
    pub fn all_vacancies(&self) -> Result<Vec<VacancyListing>> {
        let conn = connection::open(self.config)?;
        let mut stmt = conn.prepare(
            "SELECT o.name, v.name, v.salary_from, v.salary_to, v.url
             FROM vacancies v
             LEFT JOIN organizations o ON o.id = v.organization_id
             ORDER BY v.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(VacancyListing {
                company: row.get(0)?,
                vacancy: row.get(1)?,
                salary_from: row.get(2)?,
                salary_to: row.get(3)?,
                url: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Vacancies whose midpoint salary is strictly above the average midpoint
    /// of postings in the reference currency.
    ///
    /// The average only looks at the reference currency, the candidates come
    /// from every currency. Vacancies missing a bound take part in neither.
    pub fn vacancies_above_average_salary(&self) -> Result<AboveAverage> {
        let currency = self.config.reference_currency.clone();
        let conn = connection::open(self.config)?;

        let threshold: Option<f64> = conn.query_row(
            "SELECT AVG((salary_from + salary_to) / 2.0)
             FROM vacancies
             WHERE currency = ?1
               AND salary_from IS NOT NULL
               AND salary_to IS NOT NULL",
            params![currency],
            |row| row.get(0),
        )?;

        let Some(threshold_value) = threshold else {
            debug!("No salaried vacancies in {}, no threshold", currency);
            return Ok(AboveAverage {
                currency,
                threshold: None,
                vacancies: Vec::new(),
            });
        };

        let mut stmt = conn.prepare(
            "SELECT v.name, v.salary_from, v.salary_to, v.currency, o.name,
                    (v.salary_from + v.salary_to) / 2.0 AS midpoint
             FROM vacancies v
             LEFT JOIN organizations o ON o.id = v.organization_id
             WHERE v.salary_from IS NOT NULL
               AND v.salary_to IS NOT NULL
               AND (v.salary_from + v.salary_to) / 2.0 > ?1
             ORDER BY midpoint DESC, v.id ASC",
        )?;
        let rows = stmt.query_map(params![threshold_value], |row| {
            Ok(SalariedVacancy {
                vacancy: row.get(0)?,
                salary_from: row.get(1)?,
                salary_to: row.get(2)?,
                currency: row.get(3)?,
                company: row.get(4)?,
                midpoint: row.get(5)?,
            })
        })?;
        let vacancies = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(AboveAverage {
            currency,
            threshold,
            vacancies,
        })
    }

    /// Vacancies whose title contains `word`, ignoring case.
    ///
    /// The term is bound as a parameter and matched with `instr`, so quotes
    /// and LIKE wildcards in it are plain text. Surrounding whitespace is
    /// ignored; an empty term matches everything.
    pub fn vacancies_matching_keyword(&self, word: &str) -> Result<SearchOutcome> {
        let needle = word.trim().to_lowercase();
        let conn = connection::open(self.config)?;
        let mut stmt = conn.prepare(
            "SELECT v.name, o.name, v.url
             FROM vacancies v
             LEFT JOIN organizations o ON o.id = v.organization_id
             WHERE ?1 = '' OR instr(casefold(v.name), ?1) > 0
             ORDER BY v.id",
        )?;
        let rows = stmt.query_map(params![needle], |row| {
            Ok(KeywordMatch {
                vacancy: row.get(0)?,
                company: row.get(1)?,
                url: row.get(2)?,
            })
        })?;
        let matches = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(found = matches.len(), "Keyword search for '{}'", needle);
        Ok(SearchOutcome::from_matches(matches))
    }
}

fn fetch_top_companies(
    conn: &Connection,
    limit: usize,
    min_count: i64,
) -> Result<Vec<CompanyVacancyCount>> {
    let mut stmt = conn.prepare(
        "SELECT o.id, o.name, COUNT(v.id) AS postings
         FROM organizations o
         JOIN vacancies v ON v.organization_id = o.id
         GROUP BY o.id, o.name
         HAVING COUNT(v.id) >= ?1
         ORDER BY postings DESC, o.name ASC, o.id ASC
         LIMIT ?2",
    )?;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt.query_map(params![min_count, limit], row_to_company_count)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn row_to_company_count(row: &rusqlite::Row) -> rusqlite::Result<CompanyVacancyCount> {
    Ok(CompanyVacancyCount {
        organization_id: row.get(0)?,
        company: row.get(1)?,
        vacancies: row.get(2)?,
    })
}
