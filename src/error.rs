// src/error.rs

//! Unified error handling for the report pipeline.

use std::fmt;

use thiserror::Error;

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed classifier rule
    #[error("Invalid classifier rule {rule}: {message}")]
    Rule { rule: String, message: String },

    /// Malformed table row during re-ingest
    #[error("Invalid row {row}: {message}")]
    Row { row: usize, message: String },

    /// Date value could not be parsed
    #[error("Invalid date '{value}': {message}")]
    Date { value: String, message: String },

    /// Sink or source adapter failure
    #[error("Store error for '{name}': {message}")]
    Store { name: String, message: String },

    /// A destination worker failed
    #[error("Destination '{name}' failed: {message}")]
    Destination { name: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a classifier rule error.
    pub fn rule(rule: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Rule {
            rule: rule.into(),
            message: message.to_string(),
        }
    }

    /// Create a row error.
    pub fn row(row: usize, message: impl fmt::Display) -> Self {
        Self::Row {
            row,
            message: message.to_string(),
        }
    }

    /// Create a date parsing error.
    pub fn date(value: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Date {
            value: value.into(),
            message: message.to_string(),
        }
    }

    /// Create a store error.
    pub fn store(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Store {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Create a destination error.
    pub fn destination(name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Destination {
            name: name.into(),
            message: message.to_string(),
        }
    }
}
