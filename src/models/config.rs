//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Classifiers;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Identifier of the spreadsheet the sink adapter writes to
    #[serde(default)]
    pub spreadsheet_id: String,

    /// Names of the collections read back as report input
    #[serde(default)]
    pub sources: Vec<String>,

    /// Report outputs, each with its own criteria
    #[serde(default)]
    pub destinations: Vec<Destination>,

    /// Project/subproject classification rules
    #[serde(default)]
    pub classifiers: Classifiers,

    /// Link alias table for equivalence and display
    #[serde(default)]
    pub links: LinkConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(AppError::config("No sources defined"));
        }

        let mut seen = HashSet::new();
        for dest in &self.destinations {
            if dest.sheet.trim().is_empty() {
                return Err(AppError::config("Destination with empty sheet name"));
            }
            if !seen.insert(dest.sheet.as_str()) {
                return Err(AppError::config(format!(
                    "Duplicate destination sheet '{}'",
                    dest.sheet
                )));
            }
            if let (Some(start), Some(end)) = (dest.criteria.start, dest.criteria.end) {
                if start >= end {
                    return Err(AppError::config(format!(
                        "Destination '{}': criteria.start must be before criteria.end",
                        dest.sheet
                    )));
                }
            }
        }

        for alias in &self.links.aliases {
            if alias.short.trim().is_empty() {
                return Err(AppError::config("links.aliases entry with empty short name"));
            }
            if alias.hosts.is_empty() {
                return Err(AppError::config(format!(
                    "links.aliases entry '{}' has no hosts",
                    alias.short
                )));
            }
        }

        Ok(())
    }
}

/// One report output.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Destination {
    /// Target sheet name, also the report label
    pub sheet: String,

    #[serde(default)]
    pub sort: SortMode,

    /// Also render a markdown summary
    #[serde(default)]
    pub summary: bool,

    #[serde(default)]
    pub criteria: Criteria,
}

/// Ordering applied to a destination's rows.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// By shipped date only
    #[default]
    Chronological,
    /// By project, subproject, type, then shipped date
    Report,
}

/// Filters for a destination.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Criteria {
    /// Exclusive lower bound; unset disables the date filter
    #[serde(default)]
    pub start: Option<NaiveDate>,

    /// Exclusive upper bound; unset disables the date filter
    #[serde(default)]
    pub end: Option<NaiveDate>,

    /// Case-insensitive project name; empty keeps every project
    #[serde(default)]
    pub project: String,

    /// Titles containing any of these are dropped
    #[serde(default)]
    pub exclude_titles: Vec<String>,
}

/// Long-form hosts that share resource IDs with a short alias host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostAlias {
    /// Short host, e.g. `b`
    pub short: String,

    /// Long-form hosts, e.g. `buganizer.corp.google.com`
    pub hosts: Vec<String>,

    /// Leading path segment dropped from long-form links, e.g. `issues`
    #[serde(default)]
    pub prefix: String,
}

/// Link handling settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkConfig {
    #[serde(default = "defaults::aliases")]
    pub aliases: Vec<HostAlias>,

    /// Hosts whose display label drops the query and `edit`/`view` suffix
    #[serde(default = "defaults::editor_hosts")]
    pub editor_hosts: Vec<String>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            aliases: defaults::aliases(),
            editor_hosts: defaults::editor_hosts(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use super::HostAlias;

    pub fn aliases() -> Vec<HostAlias> {
        vec![
            HostAlias {
                short: "b".to_string(),
                hosts: vec![
                    "buganizer.corp.google.com".to_string(),
                    "b.corp.google.com".to_string(),
                    "issuetracker.google.com".to_string(),
                ],
                prefix: "issues".to_string(),
            },
            HostAlias {
                short: "cl".to_string(),
                hosts: vec!["critique.corp.google.com".to_string()],
                prefix: "cl".to_string(),
            },
        ]
    }

    pub fn editor_hosts() -> Vec<String> {
        vec!["docs.google.com".to_string()]
    }

    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        spreadsheet_id = "sheet-123"
        sources = ["Source - Github", "Source - DriveFiles"]

        [[destinations]]
        sheet = "2023 Annual"
        sort = "report"
        summary = true
        [destinations.criteria]
        start = "2023-01-01"
        end = "2024-01-01"
        exclude_titles = ["Copy of"]

        [[destinations]]
        sheet = "Everything"

        [classifiers]
        exclusions = ["/drafts/"]
        [[classifiers.lists]]
        project = "Serverless"
        links = ["https://b/1"]
    "#;

    #[test]
    fn test_parse_sample() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.spreadsheet_id, "sheet-123");
        assert_eq!(config.destinations.len(), 2);

        let annual = &config.destinations[0];
        assert_eq!(annual.sort, SortMode::Report);
        assert!(annual.summary);
        assert_eq!(annual.criteria.start, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(annual.criteria.exclude_titles, vec!["Copy of"]);

        let everything = &config.destinations[1];
        assert_eq!(everything.sort, SortMode::Chronological);
        assert_eq!(everything.criteria, Criteria::default());

        assert_eq!(config.links, LinkConfig::default());
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.sources.len(), 2);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load(dir.path().join("missing.toml")),
            Err(AppError::Io(_))
        ));
    }

    #[test]
    fn test_unknown_sort_mode_rejected() {
        let text = "sources = [\"a\"]\n[[destinations]]\nsheet = \"x\"\nsort = \"random\"\n";
        assert!(matches!(Config::parse(text), Err(AppError::Toml(_))));
    }

    #[test]
    fn validate_rejects_missing_sources() {
        let mut config = Config::parse(SAMPLE).unwrap();
        config.sources.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_sheets() {
        let mut config = Config::parse(SAMPLE).unwrap();
        config.destinations[1].sheet = "2023 Annual".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let mut config = Config::parse(SAMPLE).unwrap();
        config.destinations[0].criteria.end = NaiveDate::from_ymd_opt(2022, 1, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_alias_without_hosts() {
        let mut config = Config::parse(SAMPLE).unwrap();
        config.links.aliases[0].hosts.clear();
        assert!(config.validate().is_err());
    }
}
