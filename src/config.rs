// src/config.rs

//! Configuration loading utilities.
//!
//! Loads the TOML configuration, validates it and compiles the classifier
//! rules. Every failure here is fatal to a run.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::services::RuleSet;
use crate::utils::url::LinkMatcher;

/// Load configuration from a TOML file and validate it.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load(path)
        .map_err(|e| AppError::config(format!("Failed to load {}: {e}", path.display())))?;
    config.validate()?;
    Ok(config)
}

/// Compile the classifier rules of a loaded configuration.
pub fn compile_rules(config: &Config) -> Result<RuleSet> {
    RuleSet::compile(&config.classifiers, LinkMatcher::from_config(&config.links))
}

/// Load, validate and compile in one step.
pub fn load_all(path: &Path) -> Result<(Config, RuleSet)> {
    let config = load_config(path)?;
    let rules = compile_rules(&config)?;
    log::info!(
        "Loaded {} sources, {} destinations, {} classifier rules",
        config.sources.len(),
        config.destinations.len(),
        rules.len()
    );
    Ok((config, rules))
}
