//! Rule for distinguishable landmarks.
//!
//! - A page has at most one visible `main` landmark.
//! - When there are several `navigation` landmarks, each needs an accessible
//!   name (`aria-label` or `aria-labelledby`), and the names must differ.

use aria_lint_core::utils::is_hidden;
use aria_lint_core::{
    is_template_expression, Document, Label, Rule, Severity, Suggestion, Violation,
};
use std::collections::HashMap;

/// Rule code for landmark-uniqueness.
pub const CODE: &str = "AR013";

/// Rule name for landmark-uniqueness.
pub const NAME: &str = "landmark-uniqueness";

/// Checks that landmarks can be told apart.
#[derive(Debug, Clone)]
pub struct LandmarkUniqueness {
    severity: Severity,
}

impl Default for LandmarkUniqueness {
    fn default() -> Self {
        Self::new()
    }
}

impl LandmarkUniqueness {
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

    fn check_main(&self, doc: &Document<'_>) -> Vec<Violation> {
        let mains: Vec<usize> = doc
            .elements_with_role("main")
            .filter(|&m| !is_hidden(&doc.elements()[m]))
            .collect();
        let Some((&first, rest)) = mains.split_first() else {
            return Vec::new();
        };
        rest.iter()
            .map(|&m| {
                Violation::new(
                    CODE,
                    NAME,
                    self.severity,
                    doc.open_tag_location(m),
                    format!("Page has {} main landmarks; only one may be visible", mains.len()),
                )
                .with_label(Label::new(doc.open_tag_location(first), "first main landmark"))
                .with_suggestion(Suggestion::new(
                    "Keep one <main> and mark the others hidden or use a different element",
                ))
            })
            .collect()
    }

    fn check_navigation(&self, doc: &Document<'_>) -> Vec<Violation> {
        let navs: Vec<usize> = doc.elements_with_role("navigation").collect();
        if navs.len() < 2 {
            return Vec::new();
        }

        let mut violations = Vec::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();
        for &nav in &navs {
            match accessible_name(doc, nav) {
                None => violations.push(
                    Violation::new(
                        CODE,
                        NAME,
                        self.severity,
                        doc.open_tag_location(nav),
                        format!(
                            "Page has {} navigation landmarks; this one has no aria-label or aria-labelledby",
                            navs.len()
                        ),
                    )
                    .with_suggestion(Suggestion::new(
                        "Name each navigation, e.g. aria-label=\"Main\" and aria-label=\"Footer\"",
                    )),
                ),
                Some(name) => {
                    let key = name.to_lowercase();
                    if let Some(&first) = by_name.get(&key) {
                        violations.push(
                            Violation::new(
                                CODE,
                                NAME,
                                self.severity,
                                doc.open_tag_location(nav),
                                format!("Navigation landmarks share the name \"{name}\""),
                            )
                            .with_label(Label::new(doc.open_tag_location(first), "same name here")),
                        );
                    } else {
                        by_name.insert(key, nav);
                    }
                }
            }
        }
        violations
    }
}

/// Static accessible name from `aria-label` or resolved `aria-labelledby`.
///
/// A dynamic label counts as named but never as a duplicate.
fn accessible_name(doc: &Document<'_>, idx: usize) -> Option<String> {
    let element = &doc.elements()[idx];
    if let Some(label) = element.attr("aria-label").map(str::trim).filter(|l| !l.is_empty()) {
        return Some(label.to_string());
    }
    let ids = element.attr("aria-labelledby")?;
    if is_template_expression(ids) {
        return Some(format!("{ids}#{idx}"));
    }
    let text: Vec<String> = ids
        .split_whitespace()
        .map(|id| match doc.resolve(id) {
            Some((target, _)) => doc.inner_text(target),
            None => id.to_string(),
        })
        .collect();
    let name = text.join(" ");
    (!name.trim().is_empty()).then_some(name)
}

impl Rule for LandmarkUniqueness {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Allows one main landmark and requires distinct names for repeated navigation"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        let mut violations = self.check_main(doc);
        violations.extend(self.check_navigation(doc));
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(text: &str) -> Vec<String> {
        LandmarkUniqueness::new()
            .check(&Document::parse(text))
            .into_iter()
            .map(|v| v.message)
            .collect()
    }

    #[test]
    fn second_visible_main_is_reported() {
        assert!(messages("<main>a</main><main hidden>b</main>").is_empty());
        assert_eq!(
            messages(r#"<main>a</main><div role="main">b</div>"#),
            vec!["Page has 2 main landmarks; only one may be visible".to_string()]
        );
    }

    #[test]
    fn repeated_navigation_needs_names() {
        assert!(messages("<nav>only</nav>").is_empty());
        let found = messages(r#"<nav aria-label="Primary">a</nav><nav>b</nav>"#);
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("has no aria-label or aria-labelledby"));
    }

    #[test]
    fn names_must_differ() {
        let text = r#"<h2 id="h">Site</h2><nav aria-labelledby="h">a</nav><nav aria-label="site">b</nav><nav aria-label="Footer">c</nav>"#;
        assert_eq!(
            messages(text),
            vec!["Navigation landmarks share the name \"site\"".to_string()]
        );
    }
}
