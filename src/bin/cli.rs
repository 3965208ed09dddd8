//! Work report CLI
//!
//! Runs the report pipeline over JSON artifact collections and prints the
//! results. Nothing is written to disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use work_report::{
    config,
    error::{AppError, Result},
    models::{Artifacts, Config},
    pipeline::{self, ReportTree},
    services::RuleSet,
    storage::MemoryStore,
    utils::log::level_filter,
};

/// work-report - Work Artifact Report Builder
#[derive(Parser, Debug)]
#[command(
    name = "work-report",
    version,
    about = "Classify and group work artifacts into reports"
)]
struct Cli {
    /// Path to the TOML configuration
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration and compile the classifier rules
    Validate,

    /// Build every destination and print its rows and summary
    Report {
        /// Source collection as NAME=FILE.json, repeatable
        #[arg(short, long = "input", value_parser = parse_input)]
        inputs: Vec<(String, PathBuf)>,
    },

    /// Print per-destination project/type counts without writing anything
    Analyze {
        /// Source collection as NAME=FILE.json, repeatable
        #[arg(short, long = "input", value_parser = parse_input)]
        inputs: Vec<(String, PathBuf)>,

        /// List every link under its type
        #[arg(long)]
        links: bool,
    },
}

fn parse_input(value: &str) -> std::result::Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=FILE, got '{value}'")),
    }
}

/// Initialize logging with a default filter when `RUST_LOG` is unset.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn read_artifacts(path: &Path) -> Result<Artifacts> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Seed an in-memory store with the given input files.
async fn seed_store(inputs: &[(String, PathBuf)], rules: &RuleSet) -> Result<MemoryStore> {
    let store = MemoryStore::new();
    for (name, path) in inputs {
        let artifacts = read_artifacts(path)?;
        log::info!(
            "Loaded {} artifacts for '{name}' from {}",
            artifacts.len(),
            path.display()
        );
        store
            .insert_collection(name, &artifacts, rules.matcher())
            .await;
    }
    Ok(store)
}

async fn report(config: &Config, rules: RuleSet, inputs: &[(String, PathBuf)]) -> Result<()> {
    let store = Arc::new(seed_store(inputs, &rules).await?);
    let outcome = pipeline::run_report(config, Arc::new(rules), store.clone()).await?;

    for written in &outcome.written {
        println!("== {} ==", written.name);
        for artifact in written.artifacts.iter() {
            println!("{artifact}");
        }
        if let Some(summary) = store.summary(&written.name).await {
            println!();
            print!("{summary}");
        }
        println!();
    }

    for failure in &outcome.failures {
        log::error!("{failure}");
    }

    match outcome.failures.into_iter().next() {
        Some(first) => Err(first),
        None => Ok(()),
    }
}

async fn analyze(
    config: &Config,
    rules: RuleSet,
    inputs: &[(String, PathBuf)],
    links: bool,
) -> Result<()> {
    let store = seed_store(inputs, &rules).await?;
    let source = pipeline::load_sources(&config.sources, &store).await?;
    let rules = Arc::new(rules);

    for destination in &config.destinations {
        let report = pipeline::build_destination(&source, destination, &rules);
        let tree = ReportTree::build(report.artifacts.iter());
        print!("{}", tree.outline(&report.name, links));

        let totals: Vec<String> = tree
            .counts()
            .iter()
            .map(|(kind, count)| format!("{kind}: {count}"))
            .collect();
        log::info!("{}: {}", report.name, totals.join(", "));
    }
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = config::load_all(&cli.config);
    let level = match &loaded {
        _ if cli.verbose => "debug".to_string(),
        Ok((config, _)) => level_filter(&config.logging.level).to_string(),
        Err(_) => "info".to_string(),
    };
    init_logging(&level);

    let (config, rules) = loaded.inspect_err(|e| log::error!("Config validation failed: {e}"))?;
    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Validate => {
            log::info!(
                "✓ Config OK ({} destinations, {} classifier rules)",
                config.destinations.len(),
                rules.len()
            );
        }

        Command::Report { inputs } => {
            if inputs.is_empty() {
                return Err(AppError::config("No --input collections given"));
            }
            report(&config, rules, &inputs).await?;
        }

        Command::Analyze { inputs, links } => {
            if inputs.is_empty() {
                return Err(AppError::config("No --input collections given"));
            }
            analyze(&config, rules, &inputs, links).await?;
        }
    }

    log::info!("Done!");

    Ok(())
}
