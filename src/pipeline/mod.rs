//! Pipeline entry points for report runs.
//!
//! - `massage`: ordered filter/transform options over artifacts
//! - `report`: sorting and the grouped markdown projection
//! - `run_report`: per-destination fan-out and join

pub mod massage;
pub mod report;
pub mod run;

pub use massage::MassageOption;
pub use report::{MISSING_SUBPROJECT, ReportTree, render_markdown};
pub use run::{DestinationReport, RunOutcome, build_destination, load_sources, run_report};
