//! Rule flagging deeply nested lists.
//!
//! Each level of list nesting is announced by screen readers, and deep trees
//! are slow to navigate. This is a usability heuristic, reported as `info`.
//!
//! Only the outermost list beyond the threshold is reported; the message
//! gives the deepest level reached beneath it.
//!
//! # Configuration
//!
//! - `max_depth`: deepest allowed nesting level (default: 3)

use aria_lint_core::{Document, Rule, RuleConfig, Severity, Suggestion, Violation};

/// Rule code for list-nesting-depth.
pub const CODE: &str = "AR010";

/// Rule name for list-nesting-depth.
pub const NAME: &str = "list-nesting-depth";

/// Default deepest allowed level.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Flags lists nested deeper than a threshold.
#[derive(Debug, Clone)]
pub struct ListNestingDepth {
    max_depth: usize,
    severity: Severity,
}

impl Default for ListNestingDepth {
    fn default() -> Self {
        Self::new()
    }
}

impl ListNestingDepth {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            severity: Severity::Info,
        }
    }

    /// Sets the deepest allowed nesting level.
    #[must_use]
    pub fn max_depth(mut self, max: usize) -> Self {
        self.max_depth = max.max(1);
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for ListNestingDepth {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags lists nested deeper than max_depth levels"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn configure(&mut self, config: &RuleConfig) {
        let current = i64::try_from(self.max_depth).unwrap_or(i64::MAX);
        let max = config.get_int("max_depth", current);
        self.max_depth = usize::try_from(max).unwrap_or(DEFAULT_MAX_DEPTH).max(1);
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        let elements = doc.elements();

        // Nesting level of every list, 1 for outermost lists. `None` when the
        // list or one of its enclosing lists has no known end or ancestry.
        let mut level: Vec<Option<usize>> = vec![None; elements.len()];
        for (idx, element) in elements.iter().enumerate() {
            if !element.has_role("list") || !element.is_known_extent() || element.detached {
                continue;
            }
            level[idx] = match doc.nearest_ancestor_with_role(idx, &["list"]) {
                Some(outer) => level[outer].map(|l| l + 1),
                None => Some(1),
            };
        }

        let mut violations = Vec::new();
        for (idx, depth) in level.iter().enumerate() {
            if *depth != Some(self.max_depth + 1) {
                continue;
            }
            let deepest = doc
                .descendants(idx)
                .filter_map(|d| level[d])
                .max()
                .unwrap_or(self.max_depth + 1)
                .max(self.max_depth + 1);

            violations.push(
                Violation::new(
                    CODE,
                    NAME,
                    self.severity,
                    doc.open_tag_location(idx),
                    format!(
                        "Lists are nested {deepest} levels deep here (maximum {})",
                        self.max_depth
                    ),
                )
                .with_suggestion(Suggestion::new(
                    "Flatten the hierarchy or split it into separate sections with headings",
                )),
            );
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested(levels: usize) -> String {
        let mut text = String::new();
        for i in 0..levels {
            text.push_str(&format!("<ul><li>level {}", i + 1));
        }
        for _ in 0..levels {
            text.push_str("</li></ul>");
        }
        text
    }

    #[test]
    fn five_levels_yield_one_diagnostic_at_level_four() {
        let text = nested(5);
        let v = ListNestingDepth::new().check(&Document::parse(&text));
        assert_eq!(v.len(), 1);
        let fourth = text.match_indices("<ul>").nth(3).unwrap().0;
        assert_eq!(v[0].location.offset, fourth);
        assert_eq!(v[0].message, "Lists are nested 5 levels deep here (maximum 3)");
        assert_eq!(v[0].severity, Severity::Info);
    }

    #[test]
    fn threshold_depth_passes_and_is_configurable() {
        let text = nested(3);
        assert!(ListNestingDepth::new().check(&Document::parse(&text)).is_empty());
        assert_eq!(
            ListNestingDepth::new()
                .max_depth(2)
                .check(&Document::parse(&text))
                .len(),
            1
        );
    }

    #[test]
    fn sibling_branches_are_reported_separately() {
        let deep = nested(2);
        let text = format!("<ol><li><ul><li>{deep}</li></ul></li><li><ul><li>{deep}</li></ul></li></ol>");
        let v = ListNestingDepth::new().check(&Document::parse(&text));
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn unterminated_lists_are_skipped() {
        let text = "<ul><li><ul><li><ul><li><ul><li>x";
        assert!(ListNestingDepth::new().check(&Document::parse(text)).is_empty());
    }

    #[test]
    fn lists_after_a_crossed_close_are_skipped() {
        let text = "<ul><li><ul><li><ul><li></div><ul><li>x</li></ul></li></ul></li></ul></li></ul>";
        assert!(ListNestingDepth::new().check(&Document::parse(text)).is_empty());
    }
}
