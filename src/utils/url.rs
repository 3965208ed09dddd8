// src/utils/url.rs

//! Link equivalence and display utilities.
//!
//! Links are compared structurally: each one is decomposed into host, path
//! segments and query, long-form hosts are rewritten to their short alias,
//! and two links are equivalent when the hosts agree and one path is a
//! segment-wise prefix of the other.

use std::fmt;

use url::Url;

use crate::models::{Artifact, HostAlias, LinkConfig};

/// A link decomposed into its comparable parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkKey {
    /// Lowercased host, after alias canonicalisation
    pub host: String,
    /// Non-empty path segments
    pub segments: Vec<String>,
    /// Query string, when present and non-empty
    pub query: Option<String>,
}

impl LinkKey {
    /// Check whether two keys denote the same resource.
    pub fn equivalent(&self, other: &LinkKey) -> bool {
        if self.host != other.host {
            return false;
        }
        if let (Some(a), Some(b)) = (&self.query, &other.query) {
            if a != b {
                return false;
            }
        }
        let shorter = self.segments.len().min(other.segments.len());
        self.segments[..shorter] == other.segments[..shorter]
    }
}

/// A link as understood by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLink {
    /// Parsed into host and path
    Structured(LinkKey),
    /// Could not be parsed; compared as normalized text
    Raw(String),
}

impl ParsedLink {
    /// Check whether two parsed links denote the same resource.
    pub fn equivalent(&self, other: &ParsedLink) -> bool {
        match (self, other) {
            (ParsedLink::Structured(a), ParsedLink::Structured(b)) => a.equivalent(b),
            (ParsedLink::Raw(a), ParsedLink::Raw(b)) => a == b,
            _ => false,
        }
    }
}

/// Resolves whether differently formatted links refer to the same resource.
#[derive(Debug, Clone)]
pub struct LinkMatcher {
    aliases: Vec<HostAlias>,
    editor_hosts: Vec<String>,
}

impl Default for LinkMatcher {
    fn default() -> Self {
        Self::from_config(&LinkConfig::default())
    }
}

impl LinkMatcher {
    /// Create a matcher from an alias table and document-editor hosts.
    pub fn new(aliases: Vec<HostAlias>, editor_hosts: Vec<String>) -> Self {
        let aliases = aliases
            .into_iter()
            .map(|alias| HostAlias {
                short: uniform(&alias.short),
                hosts: alias.hosts.iter().map(|h| uniform(h)).collect(),
                prefix: alias.prefix.trim().trim_matches('/').to_lowercase(),
            })
            .collect();
        let editor_hosts = editor_hosts.iter().map(|h| uniform(h)).collect();
        Self {
            aliases,
            editor_hosts,
        }
    }

    /// Create a matcher from the `[links]` configuration section.
    pub fn from_config(config: &LinkConfig) -> Self {
        Self::new(config.aliases.clone(), config.editor_hosts.clone())
    }

    /// Parse a link into its comparable form.
    pub fn parse(&self, link: &str) -> ParsedLink {
        let normalized = uniform(link);
        self.key(&normalized)
            .map_or(ParsedLink::Raw(normalized), ParsedLink::Structured)
    }

    /// Decompose a link into a `LinkKey`, applying the alias table.
    pub fn key(&self, link: &str) -> Option<LinkKey> {
        let normalized = uniform(link);
        if normalized.is_empty() {
            return None;
        }
        let with_scheme = if normalized.contains("://") {
            normalized
        } else {
            format!("https://{normalized}")
        };

        let parsed = Url::parse(&with_scheme).ok()?;
        let mut host = parsed.host_str()?.trim_start_matches("www.").to_string();
        if let Some(port) = parsed.port() {
            host = format!("{host}:{port}");
        }

        let mut segments: Vec<String> = parsed
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if let Some(alias) = self.aliases.iter().find(|a| a.hosts.contains(&host)) {
            let prefixed = alias.prefix.is_empty()
                || segments.first().is_some_and(|s| *s == alias.prefix);
            if prefixed {
                if !alias.prefix.is_empty() {
                    segments.remove(0);
                }
                host.clone_from(&alias.short);
            }
        }

        let query = parsed.query().filter(|q| !q.is_empty()).map(str::to_string);

        Some(LinkKey {
            host,
            segments,
            query,
        })
    }

    /// Check whether two links denote the same resource.
    pub fn equivalent(&self, a: &str, b: &str) -> bool {
        self.parse(a).equivalent(&self.parse(b))
    }

    /// Find the first artifact whose link is equivalent to `link`.
    pub fn search<'a>(&self, artifacts: &'a [Artifact], link: &str) -> Option<&'a Artifact> {
        let wanted = self.parse(link);
        artifacts
            .iter()
            .find(|art| self.parse(&art.link).equivalent(&wanted))
    }

    /// Render a link as a spreadsheet hyperlink with a shortened label.
    pub fn hyperlink(&self, link: &str) -> Hyperlink {
        Hyperlink {
            target: link.to_string(),
            label: self.label(link),
        }
    }

    /// Compute the display label for a link.
    ///
    /// Long-form alias hosts are rewritten to their short form and
    /// document-editor links lose their query and trailing `edit`/`view`.
    /// Everything else is shown unchanged.
    pub fn label(&self, link: &str) -> String {
        let Some(domain) = get_domain(link) else {
            return link.to_string();
        };

        if self.editor_hosts.contains(&domain) {
            if let Ok(parsed) = Url::parse(link.trim()) {
                let mut segments: Vec<&str> = parsed
                    .path_segments()
                    .map(|s| s.collect())
                    .unwrap_or_default();
                while segments
                    .last()
                    .is_some_and(|s| matches!(*s, "edit" | "view" | ""))
                {
                    segments.pop();
                }
                let host = parsed.host_str().unwrap_or_default();
                return format!("{}://{}/{}", parsed.scheme(), host, segments.join("/"))
                    .trim_end_matches('/')
                    .to_string();
            }
            return link.to_string();
        }

        if let Some(alias) = self.aliases.iter().find(|a| a.hosts.contains(&domain)) {
            let Some(scheme_end) = link.find("://") else {
                return link.to_string();
            };
            let after_scheme = &link[scheme_end + 3..];
            let rest = after_scheme
                .find('/')
                .map_or("", |idx| &after_scheme[idx..]);

            let stripped = if alias.prefix.is_empty() {
                Some(rest)
            } else {
                let prefix = format!("/{}", alias.prefix);
                rest.strip_prefix(prefix.as_str())
                    .filter(|r| r.is_empty() || r.starts_with('/'))
            };

            if let Some(tail) = stripped {
                return format!("{}://{}{}", &link[..scheme_end], alias.short, tail);
            }
        }

        link.to_string()
    }
}

/// A display-formatted link whose target is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    /// The stored link
    pub target: String,
    /// The shortened text shown to readers
    pub label: String,
}

impl Hyperlink {
    /// Parse a `=HYPERLINK("target","label")` spreadsheet formula.
    pub fn parse_formula(cell: &str) -> Option<Self> {
        let pattern =
            regex::Regex::new(r#"(?i)^\s*=HYPERLINK\(\s*"((?:[^"]|"")*)"\s*,\s*"((?:[^"]|"")*)"\s*\)\s*$"#)
                .ok()?;
        let caps = pattern.captures(cell)?;
        Some(Self {
            target: caps.get(1)?.as_str().replace("\"\"", "\""),
            label: caps.get(2)?.as_str().replace("\"\"", "\""),
        })
    }
}

impl fmt::Display for Hyperlink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "=HYPERLINK(\"{}\",\"{}\")",
            self.target.replace('"', "\"\""),
            self.label.replace('"', "\"\"")
        )
    }
}

/// Extract the lowercased domain from a URL.
pub fn get_domain(url: &str) -> Option<String> {
    let scheme_end = url.find("://")?;
    let after_scheme = &url[scheme_end + 3..];
    let domain = after_scheme.split(['/', '?', '#']).next()?;
    if domain.is_empty() {
        return None;
    }
    Some(domain.to_lowercase())
}

/// Trim and lowercase a link for comparison.
fn uniform(s: &str) -> String {
    s.trim().to_lowercase()
}
