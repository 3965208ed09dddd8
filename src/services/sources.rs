// src/services/sources.rs

//! Mapping of native source records into artifacts.
//!
//! The fetching adapters live outside this crate; they hand their records
//! to these conversions so every source produces the same canonical shape.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Artifact, Artifacts};
use crate::utils::date;

/// A source adapter that produces artifacts for a query.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Run `query` against the backing service.
    async fn fetch_artifacts(&self, query: &str) -> Result<Artifacts>;
}

/// MIME types of the document store and the artifact type they map to.
const MIME_TYPES: [(&str, &str); 5] = [
    ("application/vnd.google-apps.spreadsheet", "Sheet"),
    ("application/vnd.google-apps.document", "Doc"),
    ("application/vnd.google-apps.presentation", "Slides"),
    ("application/vnd.google.colaboratory.corp", "Colab"),
    ("application/vnd.google-apps.form", "Form"),
];

/// Title markers that identify design documents.
const DESIGN_DOC_MARKERS: [&str; 2] = ["prd", "tdd"];

/// A file record from the document store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub title: String,
    pub alternate_link: String,
    /// RFC 3339 creation timestamp
    #[serde(default)]
    pub created_date: String,
    #[serde(default)]
    pub mime_type: String,
}

impl From<&DriveFile> for Artifact {
    fn from(file: &DriveFile) -> Self {
        let lower_title = file.title.to_lowercase();
        let kind = if DESIGN_DOC_MARKERS.iter().any(|m| lower_title.contains(m)) {
            "Design Doc"
        } else {
            MIME_TYPES
                .iter()
                .find(|(mime, _)| *mime == file.mime_type)
                .map_or("File", |(_, kind)| *kind)
        };

        Artifact {
            title: file.title.clone(),
            link: file.alternate_link.clone(),
            kind: kind.to_string(),
            role: "Author".to_string(),
            shipped_date: date::parse_timestamp(&file.created_date),
            ..Artifact::default()
        }
    }
}

/// Build the `mimeType='..' or ..` fragment of a document-store query.
pub fn mime_query(mime_types: &[&str]) -> String {
    mime_types
        .iter()
        .map(|m| format!("mimeType='{m}'"))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// A closed pull request from the issue tracker search API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullRequest {
    pub title: String,
    /// API URL, e.g. `https://api.github.com/repos/org/repo/issues/1`
    pub url: String,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl From<&PullRequest> for Artifact {
    fn from(pr: &PullRequest) -> Self {
        Artifact {
            title: pr.title.clone(),
            link: browser_url(&pr.url),
            kind: "Pull Request".to_string(),
            role: "author".to_string(),
            shipped_date: pr.closed_at.map(|t| t.date_naive()),
            ..Artifact::default()
        }
    }
}

/// Rewrite an issue tracker API URL into the URL a browser shows.
pub fn browser_url(api_url: &str) -> String {
    api_url.replace("api.", "").replace("/repos/", "/")
}

/// Convert a batch of native records.
pub fn to_artifacts<'a, T>(records: impl IntoIterator<Item = &'a T>) -> Artifacts
where
    T: 'a,
    Artifact: From<&'a T>,
{
    records.into_iter().map(Artifact::from).collect()
}
