//! Dependency discovery in free text.
//!
//! Two independent passes over the input:
//!
//! 1. **Phrase pass**: an ordered table of phrases ("depends on X",
//!    "blocked by X", …) each capturing an issue key such as `CORE-456`.
//!    Every match becomes a [`Confidence::High`] finding tagged with the
//!    phrase's [`Relationship`].
//! 2. **Keyword pass**: a static keyword → concept lookup. Mentioning `api`
//!    yields weak [`Relationship::Architectural`] findings against the
//!    generic `backend` and `gateway` concepts. Nothing is inferred beyond
//!    the table.
//!
//! Findings are not deduplicated: text that says both "depends on X" and
//! "requires X" yields two findings for `X`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::DiscoverConfig;

/// Issue-key shape captured by every phrase pattern. Only the phrase is
/// case-insensitive; the key must be upper case.
const ISSUE_KEY: &str = r"([A-Z][A-Z0-9_]*-[0-9]+)\b";

/// Kind of dependency a finding expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Relationship {
    Explicit,
    Blocker,
    Requirement,
    Sequence,
    Reliance,
    Architectural,
}

impl Relationship {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Explicit => "Explicit",
            Self::Blocker => "Blocker",
            Self::Requirement => "Requirement",
            Self::Sequence => "Sequence",
            Self::Reliance => "Reliance",
            Self::Architectural => "Architectural",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Confidence {
    High,
    Low,
}

impl Confidence {
    const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inferred dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub relationship: Relationship,
    pub target: String,
    pub confidence: Confidence,
    /// The text that triggered the finding.
    pub evidence: String,
}

// ---------------------------------------------------------------------------
// Pattern tables
// ---------------------------------------------------------------------------

const PHRASES: [(&str, Relationship); 5] = [
    (r"depends\s+on", Relationship::Explicit),
    (r"blocked\s+by", Relationship::Blocker),
    (r"requires", Relationship::Requirement),
    (r"after", Relationship::Sequence),
    (r"relies\s+on", Relationship::Reliance),
];

const BUILTIN_COUPLINGS: [(&str, &[&str]); 6] = [
    ("api", &["backend", "gateway"]),
    ("dashboard", &["component-library"]),
    ("database", &["schema-migration"]),
    ("schema", &["schema-migration"]),
    ("login", &["identity-provider"]),
    ("auth", &["identity-provider"]),
];

// Compiled once, shared by every analyzer.
static PHRASE_PATTERNS: OnceLock<Vec<(Regex, Relationship)>> = OnceLock::new();

fn phrase_patterns() -> &'static [(Regex, Relationship)] {
    PHRASE_PATTERNS.get_or_init(|| {
        PHRASES
            .iter()
            .map(|(phrase, rel)| {
                let re = Regex::new(&format!(r"\b(?i:{phrase})\s+{ISSUE_KEY}"))
                    .expect("phrase pattern is valid");
                (re, *rel)
            })
            .collect()
    })
}

fn keyword_regex(keyword: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword)))
}

#[derive(Debug, Clone)]
struct Coupling {
    keyword: String,
    pattern: Regex,
    concepts: Vec<String>,
}

// ---------------------------------------------------------------------------
// TextAnalyzer
// ---------------------------------------------------------------------------

/// Scans text for dependency phrases and architectural keywords.
#[derive(Debug, Clone)]
pub struct TextAnalyzer {
    couplings: Vec<Coupling>,
}

impl Default for TextAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextAnalyzer {
    /// Analyzer with the built-in keyword table.
    #[must_use]
    pub fn new() -> Self {
        let couplings = BUILTIN_COUPLINGS
            .iter()
            .filter_map(|(keyword, concepts)| {
                keyword_regex(keyword).ok().map(|pattern| Coupling {
                    keyword: (*keyword).to_string(),
                    pattern,
                    concepts: concepts.iter().map(|c| (*c).to_string()).collect(),
                })
            })
            .collect();
        Self { couplings }
    }

    /// Analyzer configured from `[discover]` in `depwave.toml`.
    ///
    /// Configured keywords are appended after the built-ins (or replace them
    /// when `builtin_couplings = false`), in keyword order.
    ///
    /// # Errors
    ///
    /// Returns an error if a keyword cannot be compiled into a pattern.
    pub fn from_config(config: &DiscoverConfig) -> Result<Self, regex::Error> {
        let mut analyzer = if config.builtin_couplings {
            Self::new()
        } else {
            Self {
                couplings: Vec::new(),
            }
        };
        analyzer.extend_couplings(&config.couplings)?;
        Ok(analyzer)
    }

    fn extend_couplings(&mut self, extra: &BTreeMap<String, Vec<String>>) -> Result<(), regex::Error> {
        for (keyword, concepts) in extra {
            let keyword = keyword.trim();
            if keyword.is_empty() || concepts.is_empty() {
                continue;
            }
            self.couplings.push(Coupling {
                keyword: keyword.to_string(),
                pattern: keyword_regex(keyword)?,
                concepts: concepts.clone(),
            });
        }
        Ok(())
    }

    /// Keywords the second pass looks for, in table order.
    #[must_use]
    pub fn keywords(&self) -> Vec<&str> {
        self.couplings.iter().map(|c| c.keyword.as_str()).collect()
    }

    /// Run both passes over `text`.
    ///
    /// Phrase findings come first (phrase table order, then text order),
    /// followed by keyword findings (keyword table order).
    #[instrument(skip_all, fields(len = text.len()))]
    pub fn find_dependencies(&self, text: &str) -> Vec<Finding> {
        let mut findings = Vec::new();

        for (pattern, relationship) in phrase_patterns() {
            for caps in pattern.captures_iter(text) {
                let (Some(whole), Some(target)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                findings.push(Finding {
                    relationship: *relationship,
                    target: target.as_str().to_string(),
                    confidence: Confidence::High,
                    evidence: whole.as_str().to_string(),
                });
            }
        }

        for coupling in &self.couplings {
            if !coupling.pattern.is_match(text) {
                continue;
            }
            for concept in &coupling.concepts {
                findings.push(Finding {
                    relationship: Relationship::Architectural,
                    target: concept.clone(),
                    confidence: Confidence::Low,
                    evidence: coupling.keyword.clone(),
                });
            }
        }

        debug!(findings = findings.len(), "dependency discovery complete");
        findings
    }
}
