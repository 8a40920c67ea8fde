//! Rule recommending `<ol>` for unordered lists whose content is ordered.
//!
//! # Rationale
//!
//! An ordered list lets screen readers announce "1 of 5"; instructions,
//! rankings and timelines marked up as `<ul>` lose that.
//!
//! # Classification
//!
//! The text of up to `max_sample` items is classified as sequential
//! ("Step 1", "First", "Then", "1."), ranking ("#1", "Top 10", "2nd place")
//! or chronological ("2019-05-01", "10:30", "March 3"). The rule fires when
//! one category reaches `threshold_percent` of the classifiable items and
//! strictly beats every other category. Ties and sub-threshold shares never
//! fire. Items whose text comes from a template expression are not sampled.
//!
//! # Configuration
//!
//! - `min_items`: smallest sample worth classifying (default: 2)
//! - `max_sample`: items sampled per list (default: 20)
//! - `threshold_percent`: required share of the winning category (default: 60)

use aria_lint_core::utils::group_members;
use aria_lint_core::{
    is_template_expression, Document, FixDescriptor, Rule, RuleConfig, Severity, Suggestion,
    Violation,
};
use regex::Regex;
use std::sync::LazyLock;

/// Rule code for list-semantics.
pub const CODE: &str = "AR012";

/// Rule name for list-semantics.
pub const NAME: &str = "list-semantics";

static SEQUENTIAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:step|phase|stage|part|chapter|lesson|module|round)\s*\d+\b|(?:first|second|third|fourth|fifth|then|next|finally|lastly|afterwards)\b|\d{1,3}\s*[.)]\s+\S)",
    )
    .expect("valid regex")
});

static RANKING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:#\s*\d+|no\.\s*\d+|top\s+\d+|rank(?:ed)?\s*\d+|\d+(?:st|nd|rd|th)\s+place\b|(?:gold|silver|bronze|winner|runner[- ]up)\b)",
    )
    .expect("valid regex")
});

static CHRONOLOGICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:\d{4}[-/.]\d{1,2}(?:[-/.]\d{1,2})?\b|\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}\b|\d{1,2}:\d{2}\b|(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+\d{1,4}\b|(?:19|20)\d{2}\b|(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b)",
    )
    .expect("valid regex")
});

/// Kind of order an item's text implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Instructions or steps.
    Sequential,
    /// Positions in a ranking.
    Ranking,
    /// Dates and times.
    Chronological,
}

impl ContentKind {
    const ALL: [Self; 3] = [Self::Sequential, Self::Ranking, Self::Chronological];

    fn pattern(self) -> &'static Regex {
        match self {
            Self::Sequential => &*SEQUENTIAL,
            Self::Ranking => &*RANKING,
            Self::Chronological => &*CHRONOLOGICAL,
        }
    }

    /// Returns true if `text` reads as this kind.
    #[must_use]
    pub fn matches(self, text: &str) -> bool {
        self.pattern().is_match(text.trim_start())
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Sequential => "sequential steps",
            Self::Ranking => "a ranking",
            Self::Chronological => "a chronology",
        }
    }
}

/// Outcome of classifying a list's items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Winning category.
    pub kind: ContentKind,
    /// Items matching it.
    pub matched: usize,
    /// Classifiable items sampled.
    pub sampled: usize,
}

/// Recommends ordered lists for ordered content.
#[derive(Debug, Clone)]
pub struct ListSemantics {
    min_items: usize,
    max_sample: usize,
    threshold_percent: usize,
    severity: Severity,
}

impl Default for ListSemantics {
    fn default() -> Self {
        Self::new()
    }
}

impl ListSemantics {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_items: 2,
            max_sample: 20,
            threshold_percent: 60,
            severity: Severity::Info,
        }
    }

    /// Sets the smallest sample worth classifying.
    #[must_use]
    pub fn min_items(mut self, min: usize) -> Self {
        self.min_items = min.max(1);
        self
    }

    /// Sets the required share of the winning category, in percent.
    #[must_use]
    pub fn threshold_percent(mut self, percent: usize) -> Self {
        self.threshold_percent = percent.clamp(1, 100);
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Classifies item texts; `None` unless one category clearly wins.
    #[must_use]
    pub fn classify<S: AsRef<str>>(&self, items: &[S]) -> Option<Classification> {
        let sample: Vec<&str> = items
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty() && !is_template_expression(s))
            .take(self.max_sample)
            .collect();
        if sample.len() < self.min_items {
            return None;
        }

        let counts: Vec<(ContentKind, usize)> = ContentKind::ALL
            .iter()
            .map(|&kind| (kind, sample.iter().filter(|s| kind.matches(s)).count()))
            .collect();
        let best = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
        let winners: Vec<ContentKind> = counts
            .iter()
            .filter(|(_, n)| *n == best)
            .map(|(k, _)| *k)
            .collect();

        match winners.as_slice() {
            [kind] if best > 0 && best * 100 >= sample.len() * self.threshold_percent => {
                Some(Classification {
                    kind: *kind,
                    matched: best,
                    sampled: sample.len(),
                })
            }
            _ => None,
        }
    }
}

fn config_usize(config: &RuleConfig, key: &str, current: usize) -> usize {
    let current_i = i64::try_from(current).unwrap_or(i64::MAX);
    usize::try_from(config.get_int(key, current_i)).unwrap_or(current)
}

impl Rule for ListSemantics {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Recommends <ol> for unordered lists of steps, rankings or dates"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn configure(&mut self, config: &RuleConfig) {
        self.min_items = config_usize(config, "min_items", self.min_items).max(1);
        self.max_sample = config_usize(config, "max_sample", self.max_sample).max(1);
        self.threshold_percent =
            config_usize(config, "threshold_percent", self.threshold_percent).clamp(1, 100);
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for list in doc.elements_named("ul") {
            let element = &doc.elements()[list];
            if !element.has_role("list") || !element.is_known_extent() {
                continue;
            }
            let texts: Vec<String> = group_members(doc, list, &["listitem"], &["list"])
                .into_iter()
                .map(|item| doc.inner_text(item))
                .collect();
            let Some(found) = self.classify(&texts) else {
                continue;
            };

            violations.push(
                Violation::new(
                    CODE,
                    NAME,
                    self.severity,
                    doc.open_tag_location(list),
                    format!(
                        "List items read as {} ({} of {} items); consider an ordered list (<ol>)",
                        found.kind.describe(),
                        found.matched,
                        found.sampled
                    ),
                )
                .with_suggestion(Suggestion::with_fix(
                    "Change <ul> to <ol>",
                    FixDescriptor::RenameTag {
                        new_name: "ol".into(),
                    },
                )),
            );
        }

        violations
    }
}
