//! Artifact data structures.

use std::fmt;
use std::ops::Deref;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::date::{self, SERIAL_FORMAT, TABLE_FORMAT};
use crate::utils::url::{Hyperlink, LinkMatcher};

/// Column headers of a report table, in field order.
pub const TABLE_HEADER: [&str; 7] = [
    "Type",
    "Project",
    "Subproject",
    "Title",
    "Role",
    "Shipped Date",
    "Link",
];

/// A single work product: a document, pull request or ticket.
///
/// `link` is the identity of an artifact; every other field is metadata
/// that classification may overwrite.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Artifact {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub link: String,

    /// Kind tag, e.g. "Doc" or "Pull Request"
    #[serde(default, rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub project: String,

    #[serde(default)]
    pub subproject: String,

    /// Relation of the owner to the artifact, e.g. "author" or "assignee"
    #[serde(default)]
    pub role: String,

    /// Unset dates sort before every set date
    #[serde(default)]
    pub shipped_date: Option<NaiveDate>,

    #[serde(default)]
    pub extra: String,
}

impl Artifact {
    /// Render this artifact as a table row in header order.
    pub fn to_row(&self, matcher: &LinkMatcher) -> Vec<String> {
        vec![
            self.kind.clone(),
            self.project.clone(),
            self.subproject.clone(),
            self.title.clone(),
            self.role.clone(),
            date::format_date(self.shipped_date, TABLE_FORMAT),
            matcher.hyperlink(&self.link).to_string(),
        ]
    }

    /// Rebuild an artifact from a table row read back from a sink.
    ///
    /// `index` is the zero-based row number used in error messages.
    pub fn from_row(index: usize, row: &[String]) -> Result<Self> {
        if row.len() < TABLE_HEADER.len() {
            return Err(AppError::row(
                index,
                format!("expected {} cells, found {}", TABLE_HEADER.len(), row.len()),
            ));
        }

        let cell = |i: usize| row[i].trim().to_string();
        let single_line = |i: usize| row[i].replace('\n', "").trim().to_string();

        let shipped_date = date::parse_cell(&row[5]).map_err(|e| AppError::row(index, e))?;
        let raw_link = cell(6);
        let link = Hyperlink::parse_formula(&raw_link).map_or(raw_link, |h| h.target);

        Ok(Self {
            title: single_line(3),
            link,
            kind: single_line(0),
            project: cell(1),
            subproject: cell(2),
            role: cell(4),
            shipped_date,
            extra: String::new(),
        })
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{}",
            self.kind,
            self.project,
            self.subproject,
            self.title,
            self.role,
            date::format_date(self.shipped_date, SERIAL_FORMAT),
            self.link
        )
    }
}

/// An ordered collection of artifacts.
///
/// Uniqueness is not enforced here; see `MassageOption::Unique`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Artifacts(Vec<Artifact>);

impl Artifacts {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append an artifact.
    pub fn push(&mut self, artifact: Artifact) {
        self.0.push(artifact);
    }

    /// Append every artifact of another collection.
    pub fn extend(&mut self, other: Artifacts) {
        self.0.extend(other.0);
    }

    /// Mutable access for in-place reordering.
    pub fn as_mut_slice(&mut self) -> &mut [Artifact] {
        &mut self.0
    }

    /// Unwrap into the underlying vector.
    pub fn into_inner(self) -> Vec<Artifact> {
        self.0
    }

    /// Project the collection into a header row plus one row per artifact.
    pub fn to_table_rows(&self, matcher: &LinkMatcher) -> Vec<Vec<String>> {
        let header = TABLE_HEADER.iter().map(|h| (*h).to_string()).collect();
        std::iter::once(header)
            .chain(self.0.iter().map(|a| a.to_row(matcher)))
            .collect()
    }

    /// Rebuild a collection from table rows.
    ///
    /// The first row is treated as the header and rows with fewer than
    /// seven cells are skipped.
    pub fn from_table_rows(rows: &[Vec<String>]) -> Result<Self> {
        rows.iter()
            .enumerate()
            .skip(1)
            .filter(|(_, row)| row.len() >= TABLE_HEADER.len())
            .map(|(i, row)| Artifact::from_row(i, row))
            .collect()
    }
}

impl Deref for Artifacts {
    type Target = [Artifact];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Artifact>> for Artifacts {
    fn from(v: Vec<Artifact>) -> Self {
        Self(v)
    }
}

impl FromIterator<Artifact> for Artifacts {
    fn from_iter<I: IntoIterator<Item = Artifact>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Artifacts {
    type Item = Artifact;
    type IntoIter = std::vec::IntoIter<Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Artifacts {
    type Item = &'a Artifact;
    type IntoIter = std::slice::Iter<'a, Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
