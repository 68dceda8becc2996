//! Vacancy records and the typed rows returned by the query engine

use serde::{Deserialize, Serialize};

/// Surrogate key of an `organizations` row
pub type OrganizationId = i64;

/// Surrogate key of a `vacancies` row
pub type VacancyId = i64;

/// A posting as produced by the fetch client, before it is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVacancy {
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub salary_from: Option<i64>,
    #[serde(default)]
    pub salary_to: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub employer: Option<String>,
}

impl NewVacancy {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_salary(mut self, from: Option<i64>, to: Option<i64>, currency: &str) -> Self {
        self.salary_from = from;
        self.salary_to = to;
        self.currency = Some(currency.to_string());
        self
    }

    pub fn with_employer(mut self, employer: &str) -> Self {
        self.employer = Some(employer.to_string());
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    /// Trimmed employer name; blank names count as no employer.
    pub fn employer_name(&self) -> Option<&str> {
        self.employer
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyVacancyCount {
    pub organization_id: OrganizationId,
    pub company: String,
    pub vacancies: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanySalary {
    pub organization_id: OrganizationId,
    pub company: String,
    pub average_salary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VacancyListing {
    pub company: Option<String>,
    pub vacancy: String,
    pub salary_from: Option<i64>,
    pub salary_to: Option<i64>,
    pub url: Option<String>,
}

/// A vacancy with both salary bounds present
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalariedVacancy {
    pub vacancy: String,
    pub salary_from: i64,
    pub salary_to: i64,
    pub currency: Option<String>,
    pub company: Option<String>,
    pub midpoint: f64,
}

/// Result of the above-average salary query.
///
/// `threshold` is the mean midpoint over postings in `currency`; it is `None`
/// when no posting in that currency carries both salary bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AboveAverage {
    pub currency: String,
    pub threshold: Option<f64>,
    pub vacancies: Vec<SalariedVacancy>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordMatch {
    pub vacancy: String,
    pub company: Option<String>,
    pub url: Option<String>,
}

/// Outcome of a keyword search. An empty search is not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "matches", rename_all = "snake_case")]
pub enum SearchOutcome {
    Found(Vec<KeywordMatch>),
    NoMatches,
}

impl SearchOutcome {
    pub fn from_matches(matches: Vec<KeywordMatch>) -> Self {
        if matches.is_empty() {
            SearchOutcome::NoMatches
        } else {
            SearchOutcome::Found(matches)
        }
    }

    pub fn matches(&self) -> &[KeywordMatch] {
        match self {
            SearchOutcome::Found(matches) => matches,
            SearchOutcome::NoMatches => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SearchOutcome::NoMatches)
    }
}

/// Counters from one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub vacancies: usize,
    pub organizations_created: usize,
    pub without_employer: usize,
}

impl std::fmt::Display for IngestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Ingestion Summary:")?;
        writeln!(f, "  Vacancies: {}", self.vacancies)?;
        writeln!(f, "  New organizations: {}", self.organizations_created)?;
        writeln!(f, "  Without employer: {}", self.without_employer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_fetch_client_record() {
        let record: NewVacancy = serde_json::from_str(
            r#"{
                "name": "Rust Developer",
                "salary_from": 200000,
                "salary_to": null,
                "currency": "RUR",
                "url": "https://hh.ru/vacancy/1",
                "employer": "  Yandex  "
            }"#,
        )
        .unwrap();

        assert_eq!(record.title, "Rust Developer");
        assert_eq!(record.salary_from, Some(200000));
        assert_eq!(record.salary_to, None);
        assert_eq!(record.employer_name(), Some("Yandex"));
    }

    #[test]
    fn optional_fields_default_to_none() {
        let record: NewVacancy = serde_json::from_str(r#"{"title": "Tester"}"#).unwrap();
        assert_eq!(record, NewVacancy::new("Tester"));
        assert_eq!(record.employer_name(), None);
    }

    #[test]
    fn blank_employer_is_no_employer() {
        let record = NewVacancy::new("Courier").with_employer("   ");
        assert_eq!(record.employer_name(), None);
    }

    #[test]
    fn search_outcome_signals_no_matches() {
        let outcome = SearchOutcome::from_matches(Vec::new());
        assert!(outcome.is_empty());
        assert!(outcome.matches().is_empty());

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "no_matches");
    }
}
