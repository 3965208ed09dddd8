// src/services/classifier.rs

//! Classifier engine.
//!
//! Assigns project and subproject to artifacts from the configured rules,
//! or drops them when their link hits an exclusion. Rules are compiled once
//! into an immutable `RuleSet` that can be shared across workers.

use crate::error::{AppError, Result};
use crate::models::{Artifact, Classifiers};
use crate::utils::url::{LinkMatcher, ParsedLink};

/// Outcome of classifying one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The artifact, possibly restamped
    Kept(Artifact),
    /// The link matched an exclusion
    Dropped,
}

/// Project and subproject values written onto matching artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    pub project: String,
    pub subproject: String,
}

impl Stamp {
    fn apply(&self, artifact: &mut Artifact) {
        artifact.project.clone_from(&self.project);
        artifact.subproject.clone_from(&self.subproject);
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    stamp: Stamp,
    title: Vec<String>,
    link: Vec<String>,
}

impl CompiledRule {
    fn matches(&self, title: &str, link: &str) -> bool {
        self.title.iter().any(|p| title.contains(p.as_str()))
            || self.link.iter().any(|p| link.contains(p.as_str()))
    }
}

#[derive(Debug, Clone)]
struct ExactLink {
    link: ParsedLink,
    rule: usize,
}

/// Compiled, read-only classifier rules.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
    exact: Vec<ExactLink>,
    exclusions: Vec<String>,
    matcher: LinkMatcher,
}

impl RuleSet {
    /// Validate and compile the configured rules.
    ///
    /// Every exact link is parsed up front so classification never has to
    /// build or cache anything.
    pub fn compile(classifiers: &Classifiers, matcher: LinkMatcher) -> Result<Self> {
        let mut rules = Vec::with_capacity(classifiers.lists.len());
        let mut exact = Vec::new();

        for (index, rule) in classifiers.lists.iter().enumerate() {
            let name = rule.describe(index);

            if rule.project.trim().is_empty() {
                return Err(AppError::rule(name, "missing project"));
            }
            if rule.links.is_empty() && rule.contains.is_empty() {
                log::warn!("Classifier rule {name} has no links or contains phrases");
            }

            for link in &rule.links {
                if link.trim().is_empty() {
                    return Err(AppError::rule(name, "empty entry in links"));
                }
                exact.push(ExactLink {
                    link: matcher.parse(link),
                    rule: index,
                });
            }

            rules.push(CompiledRule {
                stamp: Stamp {
                    project: rule.project.clone(),
                    subproject: rule.subproject.clone(),
                },
                title: Self::phrases(&name, "title", &rule.contains.title)?,
                link: Self::phrases(&name, "link", &rule.contains.link)?,
            });
        }

        if classifiers.exclusions.iter().any(|e| e.is_empty()) {
            return Err(AppError::config(
                "classifiers.exclusions contains an empty entry",
            ));
        }

        log::debug!(
            "Compiled {} classifier rules with {} exact links",
            rules.len(),
            exact.len()
        );

        Ok(Self {
            rules,
            exact,
            exclusions: classifiers.exclusions.clone(),
            matcher,
        })
    }

    fn phrases(name: &str, field: &str, phrases: &[String]) -> Result<Vec<String>> {
        phrases
            .iter()
            .map(|p| {
                let p = p.trim().to_lowercase();
                if p.is_empty() {
                    Err(AppError::rule(name, format!("empty phrase in contains.{field}")))
                } else {
                    Ok(p)
                }
            })
            .collect()
    }

    /// The matcher used for exact-link lookups.
    pub fn matcher(&self) -> &LinkMatcher {
        &self.matcher
    }

    /// Number of compiled rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules were configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check whether a link hits an exclusion substring.
    pub fn is_excluded(&self, link: &str) -> bool {
        self.exclusions.iter().any(|e| link.contains(e.as_str()))
    }

    /// Find the stamp of the first rule listing a link equivalent to `link`.
    pub fn search(&self, link: &str) -> Option<&Stamp> {
        let wanted = self.matcher.parse(link);
        self.exact
            .iter()
            .find(|entry| entry.link.equivalent(&wanted))
            .map(|entry| &self.rules[entry.rule].stamp)
    }

    /// Classify one artifact.
    ///
    /// Exclusions are checked first, then exact links, then substring rules
    /// in order with the last matching rule winning.
    pub fn classify(&self, artifact: &Artifact) -> Verdict {
        if self.is_excluded(&artifact.link) {
            log::debug!("Excluded {}", artifact.link);
            return Verdict::Dropped;
        }

        let mut result = artifact.clone();

        if let Some(stamp) = self.search(&artifact.link) {
            stamp.apply(&mut result);
            return Verdict::Kept(result);
        }

        let title = artifact.title.trim().to_lowercase();
        let link = artifact.link.trim().to_lowercase();
        if let Some(rule) = self.rules.iter().rev().find(|r| r.matches(&title, &link)) {
            rule.stamp.apply(&mut result);
        }

        Verdict::Kept(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassifierRule, ContainsRules};

    fn rule(project: &str, sub: &str, links: &[&str], title: &[&str], link: &[&str]) -> ClassifierRule {
        ClassifierRule {
            project: project.to_string(),
            subproject: sub.to_string(),
            links: links.iter().map(|s| (*s).to_string()).collect(),
            contains: ContainsRules {
                title: title.iter().map(|s| (*s).to_string()).collect(),
                link: link.iter().map(|s| (*s).to_string()).collect(),
            },
        }
    }

    fn artifact(title: &str, link: &str) -> Artifact {
        Artifact {
            title: title.to_string(),
            link: link.to_string(),
            kind: "Doc".to_string(),
            project: "Source".to_string(),
            subproject: "Adapter".to_string(),
            ..Artifact::default()
        }
    }

    fn compile(lists: Vec<ClassifierRule>, exclusions: &[&str]) -> RuleSet {
        let classifiers = Classifiers {
            lists,
            exclusions: exclusions.iter().map(|s| (*s).to_string()).collect(),
        };
        RuleSet::compile(&classifiers, LinkMatcher::default()).unwrap()
    }

    fn kept(verdict: Verdict) -> Artifact {
        match verdict {
            Verdict::Kept(a) => a,
            Verdict::Dropped => panic!("artifact was dropped"),
        }
    }

    #[test]
    fn test_exclusion_short_circuits() {
        let rules = compile(
            vec![rule("P", "S", &["https://example.com/drafts/1"], &[], &[])],
            &["/drafts/"],
        );
        let verdict = rules.classify(&artifact("t", "https://example.com/drafts/1"));
        assert_eq!(verdict, Verdict::Dropped);
    }

    #[test]
    fn test_exclusion_is_case_sensitive_substring() {
        let rules = compile(vec![], &["/drafts/"]);
        let verdict = rules.classify(&artifact("t", "https://example.com/DRAFTS/1"));
        assert!(matches!(verdict, Verdict::Kept(_)));
    }

    #[test]
    fn test_exact_link_uses_equivalence() {
        let rules = compile(
            vec![rule("Bugs", "Triage", &["b/295381611"], &[], &[])],
            &[],
        );
        let art = kept(rules.classify(&artifact(
            "t",
            "https://buganizer.corp.google.com/issues/295381611",
        )));
        assert_eq!(art.project, "Bugs");
        assert_eq!(art.subproject, "Triage");
    }

    #[test]
    fn test_exact_link_beats_contains() {
        let rules = compile(
            vec![
                rule("Exact", "E", &["https://example.com/doc"], &[], &[]),
                rule("Contains", "C", &[], &["design"], &[]),
            ],
            &[],
        );
        let art = kept(rules.classify(&artifact("Design doc", "https://example.com/doc")));
        assert_eq!(art.project, "Exact");
        assert_eq!(art.subproject, "E");
    }

    #[test]
    fn test_contains_last_match_wins() {
        let rules = compile(
            vec![
                rule("First", "One", &[], &["launch"], &[]),
                rule("Second", "Two", &[], &[], &["/launch/"]),
            ],
            &[],
        );
        let art = kept(rules.classify(&artifact(
            "Launch plan",
            "https://example.com/launch/plan",
        )));
        assert_eq!(art.project, "Second");
        assert_eq!(art.subproject, "Two");

        // Reversing the rule order flips the outcome.
        let rules = compile(
            vec![
                rule("Second", "Two", &[], &[], &["/launch/"]),
                rule("First", "One", &[], &["launch"], &[]),
            ],
            &[],
        );
        let art = kept(rules.classify(&artifact(
            "Launch plan",
            "https://example.com/launch/plan",
        )));
        assert_eq!(art.project, "First");
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let rules = compile(vec![rule("P", "S", &[], &["  SERVERLESS "], &[])], &[]);
        let art = kept(rules.classify(&artifact("Why serverless wins", "https://x.com")));
        assert_eq!(art.project, "P");
    }

    #[test]
    fn test_no_match_passes_through() {
        let rules = compile(vec![rule("P", "S", &["https://a.com/1"], &["zzz"], &[])], &[]);
        let original = artifact("Unrelated", "https://other.com/2");
        let art = kept(rules.classify(&original));
        assert_eq!(art, original);
    }

    #[test]
    fn test_search_returns_first_rule() {
        let rules = compile(
            vec![
                rule("A", "", &["https://example.com/x"], &[], &[]),
                rule("B", "", &["https://example.com/x"], &[], &[]),
            ],
            &[],
        );
        assert_eq!(rules.search("http://example.com/x/edit").unwrap().project, "A");
        assert!(rules.search("https://example.com/y").is_none());
    }

    #[test]
    fn test_compile_rejects_missing_project() {
        let classifiers = Classifiers {
            lists: vec![rule(" ", "S", &["https://a.com"], &[], &[])],
            exclusions: vec![],
        };
        let err = RuleSet::compile(&classifiers, LinkMatcher::default()).unwrap_err();
        assert!(matches!(err, AppError::Rule { ref rule, .. } if rule.starts_with("#0")));
    }

    #[test]
    fn test_compile_rejects_empty_phrase() {
        let classifiers = Classifiers {
            lists: vec![
                rule("Ok", "", &[], &["fine"], &[]),
                rule("Bad", "Sub", &[], &[], &[""]),
            ],
            exclusions: vec![],
        };
        let err = RuleSet::compile(&classifiers, LinkMatcher::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid classifier rule #1 (Bad/Sub): empty phrase in contains.link"
        );
    }

    #[test]
    fn test_compile_rejects_empty_exclusion() {
        let classifiers = Classifiers {
            lists: vec![],
            exclusions: vec![String::new()],
        };
        assert!(matches!(
            RuleSet::compile(&classifiers, LinkMatcher::default()),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_ruleset_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RuleSet>();
    }
}
