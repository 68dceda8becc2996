use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

pub const DEFAULT_REFERENCE_CURRENCY: &str = "RUR";

/// Connection parameters for a vacancy store.
///
/// A store is a named SQLite file inside `data_dir`; the directory stands in
/// for the server that hosts the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    pub name: String,
    /// Currency whose postings define the "average salary" threshold.
    #[serde(default = "default_reference_currency")]
    pub reference_currency: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_reference_currency() -> String {
    DEFAULT_REFERENCE_CURRENCY.to_string()
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            name: name.into(),
            reference_currency: default_reference_currency(),
        }
    }

    pub fn with_reference_currency(mut self, currency: impl Into<String>) -> Self {
        self.reference_currency = currency.into();
        self
    }

    /// Path of the database file this config points at.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.db", self.name))
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Config("database name must not be empty".into()));
        }
        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::Config(format!(
                "database name '{}' may only contain ASCII letters, digits, '_' and '-'",
                self.name
            )));
        }

        let currency = &self.reference_currency;
        if currency.is_empty()
            || currency.len() > 10
            || !currency.chars().all(|c| c.is_ascii_uppercase())
        {
            return Err(Error::Config(format!(
                "reference currency '{}' must be 1-10 uppercase ASCII letters",
                currency
            )));
        }
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("vacancydb.toml")
}

/// Load and validate a config file.
///
/// Without an explicit path the default `vacancydb.toml` is tried, and its
/// absence yields `Ok(None)`. An explicit path that does not exist is an error.
pub fn load_config(path: Option<&Path>) -> Result<Option<StoreConfig>> {
    let path = match path {
        Some(path) if !path.exists() => {
            return Err(Error::Config(format!("config file {} not found", path.display())));
        }
        Some(path) => path.to_path_buf(),
        None => {
            let path = default_config_path();
            if !path.exists() {
                return Ok(None);
            }
            path
        }
    };

    let contents = std::fs::read_to_string(&path)?;
    let config = parse_config(&contents).map_err(|e| match e {
        Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
        other => other,
    })?;
    Ok(Some(config))
}

pub fn parse_config(contents: &str) -> Result<StoreConfig> {
    let config: StoreConfig =
        toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config = parse_config(r#"name = "vacancies""#).unwrap();
        assert_eq!(config.name, "vacancies");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.reference_currency, "RUR");
        assert_eq!(config.database_path(), PathBuf::from("data").join("vacancies.db"));
    }

    #[test]
    fn parses_full_config() {
        let config = parse_config(
            r#"
            data_dir = "/var/lib/vacancydb"
            name = "hh_2024"
            reference_currency = "USD"
            "#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/vacancydb"));
        assert_eq!(config.reference_currency, "USD");
    }

    #[test]
    fn rejects_missing_name() {
        let err = parse_config(r#"data_dir = "data""#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_path_like_name() {
        for name in ["", "../escape", "a b", "x;drop"] {
            let config = StoreConfig::new("data", name);
            assert!(
                matches!(config.validate(), Err(Error::Config(_))),
                "name {:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn rejects_bad_currency() {
        for currency in ["", "rur", "EURO-ZONE", "ABCDEFGHIJK"] {
            let config = StoreConfig::new("data", "vacancies").with_reference_currency(currency);
            assert!(matches!(config.validate(), Err(Error::Config(_))));
        }
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.toml");

        let err = load_config(Some(path.as_path())).unwrap_err();
        match err {
            Error::Config(msg) => assert!(msg.contains("typo.toml"), "{}", msg),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn loads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vacancydb.toml");
        std::fs::write(&path, "name = \"jobs\"\nreference_currency = \"EUR\"\n").unwrap();

        let loaded = load_config(Some(path.as_path())).unwrap().unwrap();
        assert_eq!(loaded.name, "jobs");
        assert_eq!(loaded.reference_currency, "EUR");
    }
}
