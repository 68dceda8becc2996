//! vacancydb CLI - load job vacancies and report on employers and salaries

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vacancydb::config::{self, StoreConfig};
use vacancydb::query::{DEFAULT_MIN_COUNT, DEFAULT_TOP_LIMIT};
use vacancydb::ui::{self, table, Icons};
use vacancydb::{NewVacancy, Provisioned, QueryEngine, SearchOutcome, VacancyStore};

const DEFAULT_DATABASE_NAME: &str = "vacancies";

#[derive(Parser)]
#[command(name = "vacancydb")]
#[command(version)]
#[command(about = "Job-vacancy store - ingest postings and report employer and salary statistics")]
#[command(long_about = r#"
vacancydb keeps job postings in a SQLite database and answers:
  • Which companies post the most vacancies
  • What the top companies pay on average
  • Which vacancies pay above the average salary
  • Which vacancies mention a keyword

Example usage:
  vacancydb init
  vacancydb load vacancies.json
  vacancydb report
  vacancydb search engineer
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the database files (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Database name (overrides the config file)
    #[arg(short, long, global = true)]
    name: Option<String>,

    /// Currency that defines the average salary (overrides the config file)
    #[arg(long, global = true)]
    currency: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and tables if they don't exist
    Init,

    /// Load vacancies from a JSON array of records
    Load {
        /// Path to the JSON file produced by the fetch client
        path: PathBuf,
    },

    /// List companies with their number of vacancies
    Companies,

    /// Show the companies with the most vacancies
    Top {
        /// Maximum number of companies
        #[arg(short, long, default_value_t = DEFAULT_TOP_LIMIT)]
        limit: usize,

        /// Minimum number of vacancies for a company to rank
        #[arg(short, long, default_value_t = DEFAULT_MIN_COUNT)]
        min_count: i64,
    },

    /// Average salary for each of the top companies
    AvgSalary,

    /// List every vacancy
    Vacancies,

    /// Vacancies paid above the average salary
    AboveAverage,

    /// Find vacancies whose title contains a word
    Search {
        /// Word to look for (prompted when omitted)
        word: Option<String>,
    },

    /// Print every report in sequence
    Report {
        /// Also run a keyword search
        #[arg(short, long)]
        keyword: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(err) = run(cli) {
        ui::error(&format!("{:#}", err));
        std::process::exit(1);
    }
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    let json = cli.json;

    match cli.command {
        Commands::Init => {
            let (store, provisioning) = VacancyStore::provision(config)?;
            let path = store.config().database_path();
            if json {
                return emit(&provisioning);
            }

            if provisioning.database.is_created() {
                ui::notice(&format!("Database '{}' created", store.config().name));
            }
            if provisioning.tables.is_created() {
                ui::notice("Tables created");
            }
            if provisioning.database == Provisioned::AlreadyPresent
                && provisioning.tables == Provisioned::AlreadyPresent
            {
                ui::success("Database and tables already present");
            }
            ui::info("Database", &path.display().to_string());
        }

        Commands::Load { path } => {
            let records = read_records(&path)?;
            let store = VacancyStore::open(config)?;

            tracing::info!("Loading {} vacancies from {}", records.len(), path.display());
            let progress = ui::ingest_progress(records.len());
            let report = store.ingest(progress.wrap_iter(records.iter()));
            progress.finish_and_clear();
            let report = report?;

            if json {
                return emit(&report);
            }
            ui::success(&format!("Loaded {} vacancies", report.vacancies));
            if report.without_employer > 0 {
                ui::warn(&format!(
                    "{} vacancies have no employer and are left out of company reports",
                    report.without_employer
                ));
            }
            println!(
                "{}",
                table::stats_table(&[
                    ("Vacancies", report.vacancies.to_string().as_str()),
                    ("New organizations", report.organizations_created.to_string().as_str()),
                    ("Without employer", report.without_employer.to_string().as_str()),
                ])
            );
        }

        Commands::Companies => {
            let store = VacancyStore::open(config)?;
            print_companies(&store.queries(), json)?;
        }

        Commands::Top { limit, min_count } => {
            let store = VacancyStore::open(config)?;
            let mut queries = store.queries();
            let top = queries.top_companies(limit, min_count)?;

            if json {
                return emit(&top);
            }
            ui::header(
                Icons::STATS,
                &format!("Top {} companies (at least {} vacancies)", limit, min_count),
            );
            if top.is_empty() {
                ui::nothing_found("No company has enough vacancies.");
            } else {
                println!("{}", table::companies_table(top));
            }
        }

        Commands::AvgSalary => {
            let store = VacancyStore::open(config)?;
            print_average_salaries(&mut store.queries(), json)?;
        }

        Commands::Vacancies => {
            let store = VacancyStore::open(config)?;
            print_vacancies(&store.queries(), json)?;
        }

        Commands::AboveAverage => {
            let store = VacancyStore::open(config)?;
            print_above_average(&store.queries(), json)?;
        }

        Commands::Search { word } => {
            let word = match word {
                Some(word) => word,
                None => prompt_keyword()?,
            };
            let store = VacancyStore::open(config)?;
            print_search(&store.queries(), &word, json)?;
        }

        Commands::Report { keyword } => {
            let store = VacancyStore::open(config)?;
            let mut queries = store.queries();

            if json {
                let top = queries.working_set()?.to_vec();
                let mut report = serde_json::json!({
                    "companies": queries.companies_and_vacancy_counts()?,
                    "top_companies": top,
                    "average_salaries": queries.average_salary_per_company()?,
                    "vacancies": queries.all_vacancies()?,
                    "above_average": queries.vacancies_above_average_salary()?,
                });
                if let Some(word) = keyword {
                    let outcome = queries.vacancies_matching_keyword(&word)?;
                    report["search"] = serde_json::to_value(outcome)?;
                }
                return emit(&report);
            }

            print_companies(&queries, false)?;
            print_average_salaries(&mut queries, false)?;
            print_vacancies(&queries, false)?;
            print_above_average(&queries, false)?;
            if let Some(word) = keyword {
                print_search(&queries, &word, false)?;
            }
        }
    }

    Ok(())
}

/// Config file first, then command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    let mut config = config::load_config(cli.config.as_deref())?
        .unwrap_or_else(|| StoreConfig::new("data", DEFAULT_DATABASE_NAME));

    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(name) = &cli.name {
        config.name = name.clone();
    }
    if let Some(currency) = &cli.currency {
        config.reference_currency = currency.to_uppercase();
    }
    config.validate()?;
    Ok(config)
}

fn read_records(path: &Path) -> anyhow::Result<Vec<NewVacancy>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records: Vec<NewVacancy> = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON array of vacancies", path.display()))?;
    Ok(records)
}

fn prompt_keyword() -> anyhow::Result<String> {
    let term = console::Term::stderr();
    term.write_str("Enter a word to search vacancy titles for: ")?;
    Ok(term.read_line()?)
}

fn emit<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_companies(queries: &QueryEngine<'_>, json: bool) -> anyhow::Result<()> {
    let companies = queries.companies_and_vacancy_counts()?;
    if json {
        return emit(&companies);
    }

    ui::section(Icons::BUILDING, "Companies and vacancy counts");
    if companies.is_empty() {
        ui::nothing_found("No companies stored yet.");
    } else {
        println!("{}", table::companies_table(&companies));
    }
    Ok(())
}

fn print_average_salaries(queries: &mut QueryEngine<'_>, json: bool) -> anyhow::Result<()> {
    let averages = queries.average_salary_per_company()?;
    if json {
        return emit(&averages);
    }

    ui::section(Icons::MONEY, "Average salary at the top companies");
    if averages.is_empty() {
        ui::nothing_found("No salary data for the top companies.");
    } else {
        println!("{}", table::salaries_table(&averages));
    }
    Ok(())
}

fn print_vacancies(queries: &QueryEngine<'_>, json: bool) -> anyhow::Result<()> {
    let vacancies = queries.all_vacancies()?;
    if json {
        return emit(&vacancies);
    }

    ui::section(Icons::DATABASE, "All vacancies");
    if vacancies.is_empty() {
        ui::nothing_found("No vacancies stored yet.");
    } else {
        println!("{}", table::vacancies_table(&vacancies));
    }
    Ok(())
}

fn print_above_average(queries: &QueryEngine<'_>, json: bool) -> anyhow::Result<()> {
    let above = queries.vacancies_above_average_salary()?;
    if json {
        return emit(&above);
    }

    ui::section(Icons::MONEY, "Vacancies above the average salary");
    match above.threshold {
        None => ui::nothing_found(&format!(
            "No {} vacancies with a full salary range to average.",
            above.currency
        )),
        Some(threshold) => {
            ui::info(
                &format!("Average {} salary", above.currency),
                &format!("{:.2}", threshold),
            );
            if above.vacancies.is_empty() {
                ui::nothing_found("No vacancy pays above the average.");
            } else {
                println!("{}", table::salaried_table(&above.vacancies));
            }
        }
    }
    Ok(())
}

fn print_search(queries: &QueryEngine<'_>, word: &str, json: bool) -> anyhow::Result<()> {
    let outcome = queries.vacancies_matching_keyword(word)?;
    if json {
        return emit(&outcome);
    }

    ui::section(Icons::SEARCH, &format!("Vacancies matching '{}'", word.trim()));
    match outcome {
        SearchOutcome::Found(matches) => println!("{}", table::matches_table(&matches)),
        SearchOutcome::NoMatches => ui::nothing_found("Nothing found for your query."),
    }
    Ok(())
}
