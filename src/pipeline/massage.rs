// src/pipeline/massage.rs

//! Massage engine: ordered filter and transform steps over artifacts.
//!
//! Every option borrows its input and returns a new collection, so the same
//! source can be massaged for several destinations at once.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::models::{Artifact, Artifacts, Criteria};
use crate::services::{RuleSet, Verdict};
use crate::utils::url::{LinkMatcher, ParsedLink};

/// Role preferred when deduplicating.
const PREFERRED_ROLE: &str = "assignee";

/// One composable pipeline step.
#[derive(Debug, Clone)]
pub enum MassageOption {
    /// Keep artifacts shipped strictly after the date
    After(NaiveDate),
    /// Keep artifacts shipped strictly before the date
    Before(NaiveDate),
    /// Keep artifacts strictly between the bounds; a no-op unless both are set
    Between {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    /// Keep artifacts whose project equals the name, ignoring case; empty keeps all
    ProjectFilter(String),
    /// Drop artifacts whose title contains the text
    ExcludeTitle(String),
    /// Classify with the rule set, removing dropped artifacts
    Classify(Arc<RuleSet>),
    /// Collapse equivalent links, preferring the assignee entry
    Unique(LinkMatcher),
}

impl MassageOption {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            MassageOption::After(_) => "after",
            MassageOption::Before(_) => "before",
            MassageOption::Between { .. } => "between",
            MassageOption::ProjectFilter(_) => "project_filter",
            MassageOption::ExcludeTitle(_) => "exclude_title",
            MassageOption::Classify(_) => "classify",
            MassageOption::Unique(_) => "unique",
        }
    }

    /// Apply this step to a collection.
    pub fn apply(&self, input: &Artifacts) -> Artifacts {
        match self {
            MassageOption::After(t) => keep(input, |a| a.shipped_date > Some(*t)),
            MassageOption::Before(t) => keep(input, |a| a.shipped_date < Some(*t)),
            MassageOption::Between {
                start: Some(start),
                end: Some(end),
            } => keep(input, |a| {
                a.shipped_date > Some(*start) && a.shipped_date < Some(*end)
            }),
            MassageOption::Between { .. } => input.clone(),
            MassageOption::ProjectFilter(name) if name.is_empty() => input.clone(),
            MassageOption::ProjectFilter(name) => {
                let wanted = name.to_lowercase();
                keep(input, |a| a.project.to_lowercase() == wanted)
            }
            MassageOption::ExcludeTitle(text) => keep(input, |a| !a.title.contains(text.as_str())),
            MassageOption::Classify(rules) => input
                .iter()
                .filter_map(|a| match rules.classify(a) {
                    Verdict::Kept(art) => Some(art),
                    Verdict::Dropped => None,
                })
                .collect(),
            MassageOption::Unique(matcher) => unique(input, matcher),
        }
    }

    /// Build the standard option sequence for a destination's criteria.
    pub fn for_criteria(criteria: &Criteria, rules: &Arc<RuleSet>) -> Vec<MassageOption> {
        let mut options = vec![
            MassageOption::Between {
                start: criteria.start,
                end: criteria.end,
            },
            MassageOption::Classify(Arc::clone(rules)),
            MassageOption::ProjectFilter(criteria.project.clone()),
        ];
        options.extend(
            criteria
                .exclude_titles
                .iter()
                .map(|t| MassageOption::ExcludeTitle(t.clone())),
        );
        options.push(MassageOption::Unique(rules.matcher().clone()));
        options
    }
}

impl fmt::Display for MassageOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Artifacts {
    /// Run every option in order, each consuming the previous result.
    pub fn massage(&self, options: &[MassageOption]) -> Artifacts {
        options.iter().fold(self.clone(), |current, option| {
            let next = option.apply(&current);
            log::debug!("{option}: {} -> {} artifacts", current.len(), next.len());
            next
        })
    }
}

fn keep(input: &Artifacts, predicate: impl Fn(&Artifact) -> bool) -> Artifacts {
    input.iter().filter(|a| predicate(a)).cloned().collect()
}

/// Equivalent links collapsed into one kept artifact.
struct Group {
    links: Vec<ParsedLink>,
    kept: Artifact,
}

impl Group {
    fn matches(&self, link: &ParsedLink) -> bool {
        self.links.iter().any(|l| l.equivalent(link))
    }

    fn offer(&mut self, art: &Artifact) {
        if self.kept.role != PREFERRED_ROLE && art.role == PREFERRED_ROLE {
            self.kept = art.clone();
        }
    }

    fn absorb(&mut self, other: Group) {
        self.links.extend(other.links);
        self.offer(&other.kept);
    }
}

/// Deduplicate by link equivalence.
///
/// A link joins every group holding a link equivalent to it; groups it
/// bridges are merged into the earliest one. Within a group the assignee
/// entry wins, otherwise the first seen. Groups come out in first-seen
/// order and no two kept links are equivalent.
fn unique(input: &Artifacts, matcher: &LinkMatcher) -> Artifacts {
    let mut groups: Vec<Group> = Vec::new();

    for art in input.iter() {
        let parsed = matcher.parse(&art.link);
        let hits: Vec<usize> = groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.matches(&parsed))
            .map(|(i, _)| i)
            .collect();

        let Some((&first, rest)) = hits.split_first() else {
            groups.push(Group {
                links: vec![parsed],
                kept: art.clone(),
            });
            continue;
        };

        for &index in rest.iter().rev() {
            let merged = groups.remove(index);
            groups[first].absorb(merged);
        }
        let group = &mut groups[first];
        group.links.push(parsed);
        group.offer(art);
    }

    groups.into_iter().map(|g| g.kept).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassifierRule, Classifiers, ContainsRules};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn art(title: &str, link: &str, date: Option<NaiveDate>) -> Artifact {
        Artifact {
            title: title.to_string(),
            link: link.to_string(),
            kind: "Doc".to_string(),
            shipped_date: date,
            ..Artifact::default()
        }
    }

    fn with_role(link: &str, role: &str) -> Artifact {
        Artifact {
            role: role.to_string(),
            ..art(role, link, Some(ymd(2023, 8, 1)))
        }
    }

    fn with_project(title: &str, project: &str) -> Artifact {
        Artifact {
            project: project.to_string(),
            ..art(title, &format!("https://example.com/{title}"), None)
        }
    }

    fn titles(arts: &Artifacts) -> Vec<&str> {
        arts.iter().map(|a| a.title.as_str()).collect()
    }

    fn dated() -> Artifacts {
        vec![
            art("july", "https://e.com/1", Some(ymd(2023, 7, 1))),
            art("unset", "https://e.com/2", None),
            art("aug", "https://e.com/3", Some(ymd(2023, 8, 21))),
            art("sept", "https://e.com/4", Some(ymd(2023, 9, 15))),
        ]
        .into()
    }

    #[test]
    fn test_after_and_before_are_strict() {
        let input = dated();
        let after = MassageOption::After(ymd(2023, 8, 21)).apply(&input);
        assert_eq!(titles(&after), vec!["sept"]);

        let before = MassageOption::Before(ymd(2023, 8, 21)).apply(&input);
        assert_eq!(titles(&before), vec!["july", "unset"]);
    }

    #[test]
    fn test_between() {
        let input = dated();
        let out = MassageOption::Between {
            start: Some(ymd(2023, 7, 1)),
            end: Some(ymd(2023, 9, 15)),
        }
        .apply(&input);
        assert_eq!(titles(&out), vec!["aug"]);
    }

    #[test]
    fn test_between_unset_bound_is_noop() {
        let input = dated();
        for (start, end) in [
            (None, Some(ymd(2023, 8, 1))),
            (Some(ymd(2023, 8, 1)), None),
            (None, None),
        ] {
            let out = MassageOption::Between { start, end }.apply(&input);
            assert_eq!(out, input);
        }
    }

    #[test]
    fn test_project_filter() {
        let input: Artifacts = vec![
            with_project("a", "Serverless"),
            with_project("b", "serverless"),
            with_project("c", "Serverless Extras"),
            with_project("d", ""),
        ]
        .into();
        let out = MassageOption::ProjectFilter("SERVERLESS".to_string()).apply(&input);
        assert_eq!(titles(&out), vec!["a", "b"]);

        let all = MassageOption::ProjectFilter(String::new()).apply(&input);
        assert_eq!(all, input);
    }

    #[test]
    fn test_exclude_title_is_case_sensitive() {
        let input: Artifacts = vec![
            art("Copy of plan", "https://e.com/1", None),
            art("copy of notes", "https://e.com/2", None),
            art("Plan", "https://e.com/3", None),
        ]
        .into();
        let out = MassageOption::ExcludeTitle("Copy of".to_string()).apply(&input);
        assert_eq!(titles(&out), vec!["copy of notes", "Plan"]);
    }

    #[test]
    fn test_classify_removes_dropped() {
        let classifiers = Classifiers {
            lists: vec![ClassifierRule {
                project: "P".to_string(),
                subproject: "S".to_string(),
                links: vec![],
                contains: ContainsRules {
                    title: vec!["plan".to_string()],
                    link: vec![],
                },
            }],
            exclusions: vec!["/private/".to_string()],
        };
        let rules = Arc::new(RuleSet::compile(&classifiers, LinkMatcher::default()).unwrap());
        let input: Artifacts = vec![
            art("Plan", "https://e.com/1", None),
            art("Secret plan", "https://e.com/private/2", None),
            art("Other", "https://e.com/3", None),
        ]
        .into();

        let out = MassageOption::Classify(rules).apply(&input);
        assert_eq!(titles(&out), vec!["Plan", "Other"]);
        assert_eq!(out[0].project, "P");
        assert_eq!(out[1].project, "");
    }

    #[test]
    fn test_unique_prefers_assignee() {
        let input: Artifacts = vec![
            with_role("https://b/1", "approver"),
            with_role("https://b/1", "assignee"),
        ]
        .into();
        let out = MassageOption::Unique(LinkMatcher::default()).apply(&input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].role, "assignee");
    }

    #[test]
    fn test_unique_keeps_first_without_assignee() {
        let input: Artifacts = vec![
            with_role("https://b/1", "author"),
            with_role("https://b/1", "reviewer"),
            with_role("https://b/1", "assignee"),
            with_role("https://b/1", "cc"),
        ]
        .into();
        let out = MassageOption::Unique(LinkMatcher::default()).apply(&input);
        assert_eq!(titles(&out), vec!["assignee"]);

        let input: Artifacts = vec![
            with_role("https://b/1", "author"),
            with_role("https://b/1", "reviewer"),
        ]
        .into();
        let out = MassageOption::Unique(LinkMatcher::default()).apply(&input);
        assert_eq!(titles(&out), vec!["author"]);
    }

    #[test]
    fn test_unique_groups_equivalent_links() {
        let input: Artifacts = vec![
            with_role("https://buganizer.corp.google.com/issues/7", "reporter"),
            with_role("http://b/7", "assignee"),
            with_role("https://b/8", "reporter"),
        ]
        .into();
        let out = MassageOption::Unique(LinkMatcher::default()).apply(&input);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].link, "http://b/7");
        assert_eq!(out[1].link, "https://b/8");
    }

    #[test]
    fn test_unique_is_idempotent() {
        let input: Artifacts = vec![
            with_role("https://e.com/a", "author"),
            with_role("https://e.com/b", "assignee"),
            with_role("https://E.com/a", "assignee"),
            with_role("https://e.com/c", "author"),
            with_role("https://e.com/b", "reviewer"),
        ]
        .into();
        let unique = MassageOption::Unique(LinkMatcher::default());
        let once = unique.apply(&input);
        let twice = unique.apply(&once);

        let mut once_links: Vec<_> = once.iter().map(|a| a.link.clone()).collect();
        let mut twice_links: Vec<_> = twice.iter().map(|a| a.link.clone()).collect();
        once_links.sort();
        twice_links.sort();
        assert_eq!(once_links, twice_links);
        assert_eq!(once.len(), 3);

        // The kept link can be shorter than the first one seen.
        let docs: Artifacts = vec![
            with_role("https://docs.google.com/document/d/abc/edit", "author"),
            with_role("https://docs.google.com/document/d/abc", "assignee"),
            with_role("https://docs.google.com/document/d/abc/view", "author"),
        ]
        .into();
        let once = unique.apply(&docs);
        let twice = unique.apply(&once);
        assert_eq!(once.len(), 1);
        assert_eq!(once[0].link, "https://docs.google.com/document/d/abc");
        assert_eq!(twice, once);
    }

    #[test]
    fn test_unique_merges_bridged_groups() {
        let input: Artifacts = vec![
            with_role("https://docs.google.com/document/d/abc/edit", "author"),
            with_role("https://e.com/other", "author"),
            with_role("https://docs.google.com/document/d/abc/view", "reviewer"),
            with_role("https://docs.google.com/document/d/abc", "assignee"),
        ]
        .into();
        let out = MassageOption::Unique(LinkMatcher::default()).apply(&input);
        let links: Vec<_> = out.iter().map(|a| a.link.as_str()).collect();
        assert_eq!(
            links,
            vec!["https://docs.google.com/document/d/abc", "https://e.com/other"]
        );
        assert_eq!(out[0].role, "assignee");
    }

    #[test]
    fn test_massage_does_not_touch_source() {
        let input = dated();
        let snapshot = input.clone();
        let out = input.massage(&[
            MassageOption::After(ymd(2023, 7, 1)),
            MassageOption::ExcludeTitle("sept".to_string()),
        ]);
        assert_eq!(titles(&out), vec!["aug"]);
        assert_eq!(input, snapshot);
    }

    #[test]
    fn test_massage_without_options_copies() {
        let input = dated();
        assert_eq!(input.massage(&[]), input);
    }

    #[test]
    fn test_for_criteria_order() {
        let rules = Arc::new(RuleSet::compile(&Classifiers::default(), LinkMatcher::default()).unwrap());
        let criteria = Criteria {
            exclude_titles: vec!["Copy of".to_string(), "Untitled".to_string()],
            ..Criteria::default()
        };
        let names: Vec<_> = MassageOption::for_criteria(&criteria, &rules)
            .iter()
            .map(MassageOption::name)
            .collect();
        assert_eq!(
            names,
            vec![
                "between",
                "classify",
                "project_filter",
                "exclude_title",
                "exclude_title",
                "unique"
            ]
        );
    }
}
