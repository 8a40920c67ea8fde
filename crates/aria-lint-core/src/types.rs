//! Core types for lint violations and results.

use crate::fix::FixDescriptor;
use miette::{Diagnostic, LabeledSpan, SourceSpan};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::ops::Range;
use std::path::PathBuf;
use std::str::FromStr;

/// Severity level for lint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory heuristic finding, does not fail lint by default.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unknown severity '{other}' (expected: error, warning, info)"
            )),
        }
    }
}

impl From<Severity> for miette::Severity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Info => Self::Advice,
            Severity::Warning => Self::Warning,
            Severity::Error => Self::Error,
        }
    }
}

/// Location of a span in a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File the document was read from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number in characters (1-indexed).
    pub column: usize,
    /// Byte offset of the span start.
    pub offset: usize,
    /// Length of the span in bytes.
    pub length: usize,
}

impl Location {
    /// Creates a location from a byte span and its line/column.
    #[must_use]
    pub fn new(offset: usize, length: usize, line: usize, column: usize) -> Self {
        Self {
            file: None,
            line,
            column,
            offset,
            length,
        }
    }

    /// Sets the file for this location.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Byte range covered by this location.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }

    /// File name for display, `<input>` when the text has no file.
    #[must_use]
    pub fn display_file(&self) -> String {
        self.file
            .as_ref()
            .map_or_else(|| "<input>".to_string(), |f| f.display().to_string())
    }
}

/// A labeled span for additional context in violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Location of the label.
    pub location: Location,
    /// Message for this label.
    pub message: String,
}

impl Label {
    /// Creates a new label.
    #[must_use]
    pub fn new(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}

/// A suggested fix for a violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Human-readable description of the fix.
    pub message: String,
    /// Optional automatic edit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixDescriptor>,
}

impl Suggestion {
    /// Creates a new suggestion without automatic fix.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fix: None,
        }
    }

    /// Creates a new suggestion with automatic fix.
    #[must_use]
    pub fn with_fix(message: impl Into<String>, fix: FixDescriptor) -> Self {
        Self {
            message: message.into(),
            fix: Some(fix),
        }
    }
}

/// A lint violation found during analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code (e.g., "AR001").
    pub code: String,
    /// Rule name (e.g., "tablist-selection").
    pub rule: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Primary location of the violation.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Suggestions, each optionally carrying a fix.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
    /// Additional labels for context.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    /// Reference to external guidance (e.g., a WAI-ARIA section).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_ref: Option<String>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            location,
            message: message.into(),
            suggestions: Vec::new(),
            labels: Vec::new(),
            doc_ref: None,
        }
    }

    /// Adds a documentation reference to this violation.
    #[must_use]
    pub fn with_doc_ref(mut self, doc_ref: impl Into<String>) -> Self {
        self.doc_ref = Some(doc_ref.into());
        self
    }

    /// Adds a suggestion to this violation.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestions.push(suggestion);
        self
    }

    /// Adds a label to this violation.
    #[must_use]
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Byte range of the primary location.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.location.range()
    }

    /// Returns the fixes carried by this violation's suggestions.
    pub fn fixes(&self) -> impl Iterator<Item = &FixDescriptor> {
        self.suggestions.iter().filter_map(|s| s.fix.as_ref())
    }

    /// Returns true if at least one suggestion carries a fix.
    #[must_use]
    pub fn is_fixable(&self) -> bool {
        self.fixes().next().is_some()
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!(
            "{} {} at {}:{}:{}\n",
            self.code,
            self.rule,
            self.location.display_file(),
            self.location.line,
            self.location.column,
        );
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        for suggestion in &self.suggestions {
            let marker = if suggestion.fix.is_some() { " (fixable)" } else { "" };
            let _ = writeln!(output, "  = help: {}{marker}", suggestion.message);
        }
        if let Some(doc_ref) = &self.doc_ref {
            let _ = writeln!(output, "  = see: {doc_ref}");
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.location.display_file(),
            self.location.line,
            self.location.column,
            self.severity,
            self.code,
            self.message
        )?;
        if let Some(doc_ref) = &self.doc_ref {
            write!(f, " (see: {doc_ref})")?;
        }
        Ok(())
    }
}

/// A violation viewed as a miette diagnostic for rich terminal rendering.
///
/// Attach the document with [`miette::Report::with_source_code`] to render
/// the labelled spans.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    code: String,
    message: String,
    severity: Severity,
    help: Option<String>,
    span: SourceSpan,
    rule: String,
    labels: Vec<(SourceSpan, String)>,
    url: Option<String>,
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        let help = (!v.suggestions.is_empty()).then(|| {
            v.suggestions
                .iter()
                .map(|s| s.message.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        });
        Self {
            code: v.code.clone(),
            message: v.message.clone(),
            severity: v.severity,
            help,
            span: SourceSpan::from((v.location.offset, v.location.length)),
            rule: v.rule.clone(),
            labels: v
                .labels
                .iter()
                .map(|l| {
                    (
                        SourceSpan::from((l.location.offset, l.location.length)),
                        l.message.clone(),
                    )
                })
                .collect(),
            url: v.doc_ref.clone(),
        }
    }
}

impl Diagnostic for ViolationDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(&self.code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(self.severity.into())
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn Display + 'a>)
    }

    fn url<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        self.url
            .as_ref()
            .map(|u| Box::new(u) as Box<dyn Display + 'a>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let primary = LabeledSpan::new_primary_with_span(Some(self.rule.clone()), self.span);
        let extra = self
            .labels
            .iter()
            .map(|(span, message)| LabeledSpan::new_with_span(Some(message.clone()), *span));
        Some(Box::new(std::iter::once(primary).chain(extra)))
    }
}

/// Result of running lint analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All violations found, in document order.
    pub violations: Vec<Violation>,
    /// Number of files (documents) checked.
    pub files_checked: usize,
    /// Rules that faulted during evaluation and produced no diagnostics.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faulted_rules: Vec<String>,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    /// Returns true if there are any warnings or errors.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity >= Severity::Warning)
    }

    /// Returns true if no violations were found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns violations filtered by severity.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .collect()
    }

    /// Returns violations reported by one rule, by name or code.
    #[must_use]
    pub fn by_rule(&self, rule: &str) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|v| v.rule == rule || v.code == rule)
            .collect()
    }

    /// Counts violations by severity.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |severity| {
            self.violations
                .iter()
                .filter(|v| v.severity == severity)
                .count()
        };
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }

    /// Sets the file on every violation location.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        for v in &mut self.violations {
            v.location.file = Some(file.clone());
            for label in &mut v.labels {
                label.location.file = Some(file.clone());
            }
        }
        self
    }

    /// Formats violations as a test failure report.
    ///
    /// Produces a human-readable multi-line report suitable for `panic!()` messages
    /// in `cargo test` integration.
    #[must_use]
    pub fn format_test_report(&self, fail_on: Severity) -> String {
        use std::fmt::Write;

        let failing: Vec<&Violation> = self
            .violations
            .iter()
            .filter(|v| v.severity >= fail_on)
            .collect();

        let mut report = String::new();
        let _ = writeln!(
            report,
            "\n=== aria-lint: {} violation(s) ===\n",
            failing.len()
        );

        for v in &failing {
            let _ = writeln!(report, "{}", v.format());
        }

        let (errors, warnings, infos) = self.count_by_severity();
        let _ = writeln!(
            report,
            "Total: {} error(s), {} warning(s), {} info(s) in {} file(s)",
            errors, warnings, infos, self.files_checked
        );

        report
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }

    /// Adds violations from another result.
    pub fn extend(&mut self, other: Self) {
        self.violations.extend(other.violations);
        self.files_checked += other.files_checked;
        for rule in other.faulted_rules {
            if !self.faulted_rules.contains(&rule) {
                self.faulted_rules.push(rule);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_violation(severity: Severity) -> Violation {
        Violation::new(
            "AR003",
            "aria-reference",
            severity,
            Location::new(40, 12, 3, 5),
            "aria-controls references missing id 'panel-x'",
        )
    }

    #[test]
    fn severity_orders_and_parses() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert_eq!("WARN".parse::<Severity>(), Ok(Severity::Warning));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn violation_display_uses_input_placeholder_without_file() {
        let v = make_violation(Severity::Error);
        assert_eq!(
            v.to_string(),
            "<input>:3:5: error [AR003] aria-controls references missing id 'panel-x'"
        );
    }

    #[test]
    fn violation_format_marks_fixable_suggestions() {
        let v = make_violation(Severity::Error)
            .with_suggestion(Suggestion::new("add the missing element"))
            .with_suggestion(Suggestion::with_fix(
                "remove the attribute",
                FixDescriptor::RemoveAttribute {
                    name: "aria-controls".into(),
                },
            ));
        let formatted = v.format();
        assert!(formatted.contains("= help: add the missing element\n"));
        assert!(formatted.contains("= help: remove the attribute (fixable)"));
        assert!(v.is_fixable());
    }

    #[test]
    fn diagnostic_carries_code_and_severity() {
        let v = make_violation(Severity::Warning).with_doc_ref("https://www.w3.org/TR/wai-aria-1.2/");
        let diag = ViolationDiagnostic::from(&v);
        assert_eq!(diag.code().map(|c| c.to_string()), Some("AR003".into()));
        assert_eq!(diag.severity(), Some(miette::Severity::Warning));
        assert!(diag.url().is_some());
        assert_eq!(diag.labels().map(Iterator::count), Some(1));
    }

    #[test]
    fn has_violations_at_respects_threshold() {
        let mut result = LintResult::new();
        result.violations.push(make_violation(Severity::Warning));
        assert!(!result.has_violations_at(Severity::Error));
        assert!(result.has_violations_at(Severity::Warning));
        assert!(result.has_violations_at(Severity::Info));
    }

    #[test]
    fn with_file_sets_every_location() {
        let mut result = LintResult::new();
        result.violations.push(make_violation(Severity::Error));
        let result = result.with_file("templates/tabs.html");
        assert_eq!(
            result.violations[0].to_string(),
            "templates/tabs.html:3:5: error [AR003] aria-controls references missing id 'panel-x'"
        );
    }

    #[test]
    fn format_test_report_filters_by_severity() {
        let mut result = LintResult::new();
        result.files_checked = 2;
        result.violations.push(make_violation(Severity::Warning));
        result.violations.push(make_violation(Severity::Error));

        let report = result.format_test_report(Severity::Error);
        assert!(report.contains("1 violation(s)"));
        assert!(report.contains("Total: 1 error(s), 1 warning(s), 0 info(s) in 2 file(s)"));
    }
}
