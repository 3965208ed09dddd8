//! In-memory table store.
//!
//! Backs the CLI and tests. Tables are kept as raw cell rows, exactly what
//! a spreadsheet sink would hold, and parsed on every read.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::models::Artifacts;
use crate::services::ArtifactSource;
use crate::storage::ArtifactStore;
use crate::utils::url::LinkMatcher;

/// Table store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Vec<String>>>>,
    summaries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a named table from a collection.
    pub async fn insert_collection(&self, name: &str, artifacts: &Artifacts, matcher: &LinkMatcher) {
        self.tables
            .write()
            .await
            .insert(name.to_string(), artifacts.to_table_rows(matcher));
    }

    /// Raw rows of a table, header included.
    pub async fn rows(&self, name: &str) -> Option<Vec<Vec<String>>> {
        self.tables.read().await.get(name).cloned()
    }

    /// Summary written for a destination, if any.
    pub async fn summary(&self, name: &str) -> Option<String> {
        self.summaries.read().await.get(name).cloned()
    }

    /// Names of all tables, sorted.
    pub async fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn read_collection(&self, name: &str) -> Result<Artifacts> {
        let tables = self.tables.read().await;
        let rows = tables
            .get(name)
            .ok_or_else(|| AppError::store(name, "no such table"))?;
        Artifacts::from_table_rows(rows)
    }

    async fn write_collection(&self, name: &str, rows: &[Vec<String>]) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = tables.entry(name.to_string()).or_default();
        table.clear();
        table.extend_from_slice(rows);
        log::debug!("Wrote {} rows to '{name}'", rows.len());
        Ok(())
    }

    async fn write_summary(&self, name: &str, text: &str) -> Result<()> {
        self.summaries
            .write()
            .await
            .insert(name.to_string(), text.to_string());
        Ok(())
    }
}

/// Treats the query as a table name.
#[async_trait]
impl ArtifactSource for MemoryStore {
    async fn fetch_artifacts(&self, query: &str) -> Result<Artifacts> {
        self.read_collection(query).await
    }
}
