// src/pipeline/report.rs

//! Report projection: ordering, display normalization, and the grouped
//! project → subproject → type → links view used for rendering.

use std::collections::BTreeMap;
use std::fmt;

use crate::models::{Artifact, Artifacts};

/// Placeholder written over empty subprojects before rendering.
pub const MISSING_SUBPROJECT: &str = "N/A";

/// Display name for empty project/subproject keys in the outline.
const UNNAMED: &str = "[None]";

type TypeLinks = BTreeMap<String, Vec<String>>;
type Subprojects = BTreeMap<String, TypeLinks>;

impl Artifacts {
    /// Stable sort by project, subproject, type, then shipped date.
    pub fn sort_report(&mut self) {
        self.as_mut_slice().sort_by(|a, b| {
            (&a.project, &a.subproject, &a.kind, a.shipped_date).cmp(&(
                &b.project,
                &b.subproject,
                &b.kind,
                b.shipped_date,
            ))
        });
    }

    /// Stable sort by shipped date only.
    pub fn sort_chronological(&mut self) {
        self.as_mut_slice().sort_by_key(|a| a.shipped_date);
    }

    /// Replace empty subprojects with [`MISSING_SUBPROJECT`].
    ///
    /// Display-only; run after classification and dedup.
    pub fn fill_missing_subprojects(&mut self) {
        for art in self.as_mut_slice() {
            if art.subproject.is_empty() {
                art.subproject = MISSING_SUBPROJECT.to_string();
            }
        }
    }
}

/// Artifacts grouped by project, subproject and type.
///
/// Keys iterate in byte order; links keep the order they were added in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportTree {
    projects: BTreeMap<String, Subprojects>,
}

impl ReportTree {
    /// Group artifacts in their current order.
    pub fn build<'a>(artifacts: impl IntoIterator<Item = &'a Artifact>) -> Self {
        let mut tree = Self::default();
        for art in artifacts {
            tree.projects
                .entry(art.project.clone())
                .or_default()
                .entry(art.subproject.clone())
                .or_default()
                .entry(art.kind.clone())
                .or_default()
                .push(art.link.clone());
        }
        tree
    }

    /// Whether no artifact was added.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Links under one project/subproject/type.
    pub fn links(&self, project: &str, subproject: &str, kind: &str) -> Option<&[String]> {
        self.projects
            .get(project)?
            .get(subproject)?
            .get(kind)
            .map(Vec::as_slice)
    }

    /// Number of links per type across the whole tree.
    pub fn counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for types in self.projects.values().flat_map(BTreeMap::values) {
            for (kind, links) in types {
                *counts.entry(kind.clone()).or_insert(0) += links.len();
            }
        }
        counts
    }

    /// Render the tree as an indented plain-text outline with per-type
    /// counts, optionally listing every link.
    pub fn outline(&self, label: &str, with_links: bool) -> String {
        Outline {
            tree: self,
            label,
            with_links,
        }
        .to_string()
    }

    /// Render the tree as a markdown report under a `label` heading.
    pub fn to_markdown(&self, label: &str) -> String {
        Markdown { tree: self, label }.to_string()
    }
}

struct Outline<'a> {
    tree: &'a ReportTree,
    label: &'a str,
    with_links: bool,
}

impl fmt::Display for Outline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.label)?;
        for (project, subprojects) in &self.tree.projects {
            writeln!(f, "\t{}", display_name(project))?;
            for (subproject, types) in subprojects {
                writeln!(f, "\t\t{}", display_name(subproject))?;
                for (kind, links) in types {
                    writeln!(f, "\t\t\t{kind:<15} {:>4}", links.len())?;
                    if self.with_links {
                        for link in links {
                            writeln!(f, "\t\t\t\t{link}")?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

struct Markdown<'a> {
    tree: &'a ReportTree,
    label: &'a str,
}

impl fmt::Display for Markdown<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.label)?;
        for (project, subprojects) in &self.tree.projects {
            writeln!(f, "\n## {project}")?;
            for (subproject, types) in subprojects {
                writeln!(f, "\n### {subproject}")?;
                for (kind, links) in types {
                    writeln!(f, "\n#### {kind}\n")?;
                    for link in links {
                        writeln!(f, "* {link}")?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() { UNNAMED } else { name }
}

/// Render a collection as a markdown report.
///
/// Works on a copy: sorts it in report order, fills missing subprojects,
/// then groups and renders.
pub fn render_markdown(label: &str, artifacts: &Artifacts) -> String {
    let mut working = artifacts.clone();
    working.sort_report();
    working.fill_missing_subprojects();
    ReportTree::build(working.iter()).to_markdown(label)
}
