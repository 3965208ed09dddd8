//! Classifier rule configuration.
//!
//! These are the raw rules as written in the config file. They are compiled
//! into an immutable `RuleSet` before any artifact is classified.

use serde::{Deserialize, Serialize};

/// The `[classifiers]` section: ordered rules plus link exclusions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classifiers {
    /// Rules in priority order; for substring rules the last match wins
    #[serde(default)]
    pub lists: Vec<ClassifierRule>,

    /// Artifacts whose link contains any of these substrings are dropped
    #[serde(default)]
    pub exclusions: Vec<String>,
}

/// One classifier rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifierRule {
    /// Project stamped on matching artifacts
    pub project: String,

    /// Subproject stamped on matching artifacts
    #[serde(default)]
    pub subproject: String,

    /// Links matched by equivalence
    #[serde(default)]
    pub links: Vec<String>,

    /// Case-insensitive substring rules
    #[serde(default)]
    pub contains: ContainsRules,
}

impl ClassifierRule {
    /// Short description used in error messages.
    pub fn describe(&self, index: usize) -> String {
        if self.subproject.is_empty() {
            format!("#{} ({})", index, self.project)
        } else {
            format!("#{} ({}/{})", index, self.project, self.subproject)
        }
    }
}

/// Substring rules keyed by the artifact field they inspect.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContainsRules {
    #[serde(default)]
    pub title: Vec<String>,

    #[serde(default)]
    pub link: Vec<String>,
}

impl ContainsRules {
    /// Whether neither field has a phrase.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.link.is_empty()
    }
}
