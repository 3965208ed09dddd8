//! Service layer for the report pipeline.
//!
//! This module contains the business logic for:
//! - Artifact classification (`RuleSet`)
//! - Source record mapping (`DriveFile`, `PullRequest`)

mod classifier;
mod sources;

pub use classifier::{RuleSet, Stamp, Verdict};
pub use sources::{ArtifactSource, DriveFile, PullRequest, browser_url, mime_query, to_artifacts};
