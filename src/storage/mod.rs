//! Storage port for report tables.
//!
//! A store holds named tables of string cells, the shape a spreadsheet
//! sink works with. Source collections are read back through the same
//! port, so a report can be rebuilt from what an earlier run wrote.
//!
//! ```text
//! read_collection("Source - Github")   -> Artifacts   (re-ingest)
//! write_collection("2023 Annual", ..)  -> clear, then write header + rows
//! write_summary("2023 Annual", ..)     -> markdown report
//! ```

pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Artifacts;

// Re-export for convenience
pub use memory::MemoryStore;

/// Trait for report table backends.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Read a named table back into artifacts.
    ///
    /// Fails when the table does not exist or a row cannot be parsed.
    async fn read_collection(&self, name: &str) -> Result<Artifacts>;

    /// Replace the contents of a named table with `rows`.
    ///
    /// Existing rows are cleared first, so a shorter report never leaves
    /// stale rows behind.
    async fn write_collection(&self, name: &str, rows: &[Vec<String>]) -> Result<()>;

    /// Store the rendered markdown summary of a destination.
    async fn write_summary(&self, name: &str, text: &str) -> Result<()>;
}
