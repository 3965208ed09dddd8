// src/models/mod.rs

//! Domain models for the report pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod artifact;
mod classifier;
mod config;

// Re-export all public types
pub use artifact::{Artifact, Artifacts, TABLE_HEADER};
pub use classifier::{ClassifierRule, Classifiers, ContainsRules};
pub use config::{Config, Criteria, Destination, HostAlias, LinkConfig, LoggingConfig, SortMode};
