use tabled::{settings::Style, Table, Tabled};

use crate::model::{
    CompanySalary, CompanyVacancyCount, KeywordMatch, SalariedVacancy, VacancyListing,
};

const MISSING: &str = "-";

#[derive(Tabled)]
struct SummaryRow<'a> {
    #[tabled(rename = "Metric")]
    metric: &'a str,
    #[tabled(rename = "Value")]
    value: &'a str,
}

/// Two-column metric/value table, e.g. the summary after a load
pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let rows: Vec<_> = stats
        .iter()
        .map(|&(metric, value)| SummaryRow { metric, value })
        .collect();
    render(&rows)
}

fn render<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

fn or_missing(value: Option<&str>) -> String {
    value.unwrap_or(MISSING).to_string()
}

fn amount(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| MISSING.to_string())
}

#[derive(Tabled)]
struct CompanyCountRow {
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Vacancies")]
    vacancies: i64,
}

pub fn companies_table(rows: &[CompanyVacancyCount]) -> String {
    let rows: Vec<_> = rows
        .iter()
        .map(|r| CompanyCountRow {
            company: r.company.clone(),
            vacancies: r.vacancies,
        })
        .collect();
    render(&rows)
}

#[derive(Tabled)]
struct CompanySalaryRow {
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Average salary")]
    average: String,
}

pub fn salaries_table(rows: &[CompanySalary]) -> String {
    let rows: Vec<_> = rows
        .iter()
        .map(|r| CompanySalaryRow {
            company: r.company.clone(),
            average: format!("{:.2}", r.average_salary),
        })
        .collect();
    render(&rows)
}

#[derive(Tabled)]
struct VacancyRow {
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Vacancy")]
    vacancy: String,
    #[tabled(rename = "From")]
    salary_from: String,
    #[tabled(rename = "To")]
    salary_to: String,
    #[tabled(rename = "URL")]
    url: String,
}

pub fn vacancies_table(rows: &[VacancyListing]) -> String {
    let rows: Vec<_> = rows
        .iter()
        .map(|r| VacancyRow {
            company: or_missing(r.company.as_deref()),
            vacancy: r.vacancy.clone(),
            salary_from: amount(r.salary_from),
            salary_to: amount(r.salary_to),
            url: or_missing(r.url.as_deref()),
        })
        .collect();
    render(&rows)
}

#[derive(Tabled)]
struct SalariedRow {
    #[tabled(rename = "Vacancy")]
    vacancy: String,
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Salary")]
    range: String,
    #[tabled(rename = "Midpoint")]
    midpoint: String,
}

pub fn salaried_table(rows: &[SalariedVacancy]) -> String {
    let rows: Vec<_> = rows
        .iter()
        .map(|r| SalariedRow {
            vacancy: r.vacancy.clone(),
            company: or_missing(r.company.as_deref()),
            range: format!(
                "{} - {} {}",
                r.salary_from,
                r.salary_to,
                r.currency.as_deref().unwrap_or("")
            )
            .trim_end()
            .to_string(),
            midpoint: format!("{:.2}", r.midpoint),
        })
        .collect();
    render(&rows)
}

#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "Vacancy")]
    vacancy: String,
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "URL")]
    url: String,
}

pub fn matches_table(rows: &[KeywordMatch]) -> String {
    let rows: Vec<_> = rows
        .iter()
        .map(|r| MatchRow {
            vacancy: r.vacancy.clone(),
            company: or_missing(r.company.as_deref()),
            url: or_missing(r.url.as_deref()),
        })
        .collect();
    render(&rows)
}
