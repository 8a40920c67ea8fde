//! Rule forbidding skipped heading levels.
//!
//! Screen reader users navigate by heading level; jumping from `h2` to `h4`
//! suggests a missing section. Levels may go back up freely, and the first
//! heading of a template may start at any level since templates are often
//! fragments. `role="heading"` with a static `aria-level` counts too.

use aria_lint_core::utils::is_dynamic;
use aria_lint_core::{Document, ElementSpan, Label, Rule, Severity, Suggestion, Violation};

/// Rule code for heading-order.
pub const CODE: &str = "AR016";

/// Rule name for heading-order.
pub const NAME: &str = "heading-order";

/// Forbids skipping heading levels.
#[derive(Debug, Clone)]
pub struct HeadingOrder {
    severity: Severity,
}

impl Default for HeadingOrder {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadingOrder {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// Level of a heading; `None` for non-headings and dynamic levels.
fn heading_level(element: &ElementSpan) -> Option<u8> {
    if let Some(level) = element.attr("aria-level") {
        if !element.has_role("heading") || is_dynamic(Some(level)) {
            return None;
        }
        return level.trim().parse().ok().filter(|l| (1..=9).contains(l));
    }
    match element.tag_name.as_bytes() {
        [b'h', d @ b'1'..=b'6'] if element.has_role("heading") => Some(d - b'0'),
        _ => None,
    }
}

impl Rule for HeadingOrder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids skipping heading levels, e.g. h2 followed by h4"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut previous: Option<(usize, u8)> = None;

        for (idx, element) in doc.elements().iter().enumerate() {
            let Some(level) = heading_level(element) else {
                continue;
            };
            if let Some((prev_idx, prev)) = previous {
                if level > prev + 1 {
                    violations.push(
                        Violation::new(
                            CODE,
                            NAME,
                            self.severity,
                            doc.open_tag_location(idx),
                            format!("Heading level jumps from h{prev} to h{level}"),
                        )
                        .with_label(Label::new(
                            doc.open_tag_location(prev_idx),
                            format!("previous heading (h{prev})"),
                        ))
                        .with_suggestion(Suggestion::new(format!(
                            "Use h{} or add the missing intermediate heading",
                            prev + 1
                        ))),
                    );
                }
            }
            previous = Some((idx, level));
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(text: &str) -> Vec<String> {
        HeadingOrder::new()
            .check(&Document::parse(text))
            .into_iter()
            .map(|v| v.message)
            .collect()
    }

    #[test]
    fn skipped_levels_are_reported() {
        let found = messages("<h2>a</h2><h4>b</h4><h2>c</h2><h3>d</h3><h6>e</h6>");
        assert_eq!(
            found,
            vec![
                "Heading level jumps from h2 to h4".to_string(),
                "Heading level jumps from h3 to h6".to_string(),
            ]
        );
    }

    #[test]
    fn fragments_and_returning_up_are_fine() {
        assert!(messages("<h3>a</h3><h4>b</h4><h1>c</h1><h2>d</h2>").is_empty());
    }

    #[test]
    fn aria_headings_take_part() {
        let found = messages(r#"<h1>t</h1><div role="heading" aria-level="3">x</div>"#);
        assert_eq!(found, vec!["Heading level jumps from h1 to h3".to_string()]);
        assert!(messages(r#"<h1>t</h1><div role="heading" aria-level="${lvl}">x</div><h2>y</h2>"#).is_empty());
        assert!(messages(r#"<h2 role="tab">t</h2><h4>x</h4>"#).is_empty());
    }
}
