// src/pipeline/run.rs

//! Report run: read sources once, then build and write every destination
//! concurrently.

use std::sync::Arc;

use futures::future::join_all;

use crate::error::{AppError, Result};
use crate::models::{Artifacts, Config, Destination, SortMode};
use crate::services::RuleSet;
use crate::storage::ArtifactStore;
use crate::utils;
use crate::utils::url::LinkMatcher;

use super::massage::MassageOption;
use super::report::render_markdown;

/// The finished output of one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationReport {
    /// Sheet name, also the summary label
    pub name: String,
    pub artifacts: Artifacts,
    /// Markdown summary, when the destination asks for one
    pub summary: Option<String>,
}

impl DestinationReport {
    /// Table rows handed to the sink, header first.
    pub fn rows(&self, matcher: &LinkMatcher) -> Vec<Vec<String>> {
        self.artifacts.to_table_rows(matcher)
    }
}

/// Result of a whole report run.
#[derive(Debug, Default)]
pub struct RunOutcome {
    /// Destinations that were computed and written, in configuration order
    pub written: Vec<DestinationReport>,
    /// One error per destination that failed
    pub failures: Vec<AppError>,
}

impl RunOutcome {
    /// Whether every destination was written.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Compute one destination from the shared source collection.
///
/// Runs between-dates, classification, the project filter, each title
/// exclusion and dedup in that order, then sorts by the destination's mode
/// and renders the summary if requested. `source` is never modified.
pub fn build_destination(
    source: &Artifacts,
    destination: &Destination,
    rules: &Arc<RuleSet>,
) -> DestinationReport {
    let options = MassageOption::for_criteria(&destination.criteria, rules);
    let mut artifacts = source.massage(&options);

    match destination.sort {
        SortMode::Report => artifacts.sort_report(),
        SortMode::Chronological => artifacts.sort_chronological(),
    }

    let summary = destination
        .summary
        .then(|| render_markdown(&destination.sheet, &artifacts));

    DestinationReport {
        name: destination.sheet.clone(),
        artifacts,
        summary,
    }
}

/// Read and concatenate every source collection.
///
/// Any unreadable source aborts the run.
pub async fn load_sources(names: &[String], store: &dyn ArtifactStore) -> Result<Artifacts> {
    let mut all = Artifacts::new();
    for name in names {
        let artifacts = store.read_collection(name).await?;
        utils::log::sub_item(&format!("{name}: {} artifacts", artifacts.len()));
        all.extend(artifacts);
    }
    Ok(all)
}

async fn publish(
    store: &dyn ArtifactStore,
    report: &DestinationReport,
    matcher: &LinkMatcher,
) -> Result<()> {
    store
        .write_collection(&report.name, &report.rows(matcher))
        .await?;
    if let Some(summary) = &report.summary {
        store.write_summary(&report.name, summary).await?;
    }
    Ok(())
}

/// Run every configured destination.
///
/// Each destination works on its own copy of the shared source and is fully
/// computed before anything is written for it. A failing destination is
/// recorded in the outcome and does not stop the others.
pub async fn run_report(
    config: &Config,
    rules: Arc<RuleSet>,
    store: Arc<dyn ArtifactStore>,
) -> Result<RunOutcome> {
    utils::log::header("Building reports");

    utils::log::step(1, 2, "Reading sources");
    let source = Arc::new(load_sources(&config.sources, store.as_ref()).await?);

    utils::log::step(
        2,
        2,
        &format!("Writing {} destinations", config.destinations.len()),
    );

    let names: Vec<String> = config
        .destinations
        .iter()
        .map(|d| d.sheet.clone())
        .collect();

    let handles = config.destinations.iter().cloned().map(|destination| {
        let source = Arc::clone(&source);
        let rules = Arc::clone(&rules);
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            log::info!("Building '{}'", destination.sheet);
            let report = build_destination(&source, &destination, &rules);
            publish(store.as_ref(), &report, rules.matcher()).await?;
            Ok::<_, AppError>(report)
        })
    });

    let mut outcome = RunOutcome::default();
    for (name, joined) in names.into_iter().zip(join_all(handles).await) {
        match joined {
            Ok(Ok(report)) => {
                utils::log::sub_item(&format!("{name}: {} rows", report.artifacts.len()));
                outcome.written.push(report);
            }
            Ok(Err(error)) => {
                log::warn!("Destination '{name}' failed: {error}");
                outcome.failures.push(AppError::destination(name, error));
            }
            Err(error) => {
                log::error!("Destination '{name}' worker aborted: {error}");
                outcome.failures.push(AppError::destination(name, error));
            }
        }
    }

    utils::log::summary(
        "Report run",
        &[
            ("Artifacts read", source.len().to_string()),
            ("Destinations written", outcome.written.len().to_string()),
            ("Destinations failed", outcome.failures.len().to_string()),
        ],
    );

    Ok(outcome)
}
