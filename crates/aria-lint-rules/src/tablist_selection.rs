//! Rule requiring exactly one selected tab per tablist.
//!
//! # Rationale
//!
//! Screen readers announce the tab carrying `aria-selected="true"` as the
//! current one. With none selected, users get no indication of which panel
//! is shown; with several, the announcement contradicts what is displayed.
//!
//! # Detected Patterns
//!
//! - A tablist whose tabs carry no `aria-selected="true"`
//! - A tablist with more than one `aria-selected="true"` tab
//!
//! Each tablist is reported once, at the tablist, however many tabs deviate.
//! Groups whose selection is computed by the template are not judged.

use aria_lint_core::utils::{group_members, is_dynamic, is_true};
use aria_lint_core::{Document, Label, Rule, Severity, Suggestion, Violation};

/// Rule code for tablist-selection.
pub const CODE: &str = "AR001";

/// Rule name for tablist-selection.
pub const NAME: &str = "tablist-selection";

/// Requires exactly one selected tab in each tablist.
#[derive(Debug, Clone)]
pub struct TablistSelection {
    severity: Severity,
}

impl Default for TablistSelection {
    fn default() -> Self {
        Self::new()
    }
}

impl TablistSelection {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for TablistSelection {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires exactly one aria-selected=\"true\" tab per tablist"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for tablist in doc.elements_with_role("tablist") {
            if !doc.elements()[tablist].is_known_extent() {
                continue;
            }
            let tabs = group_members(doc, tablist, &["tab"], &["tablist"]);
            if tabs.is_empty()
                || tabs
                    .iter()
                    .any(|&t| is_dynamic(doc.elements()[t].attr("aria-selected")))
            {
                continue;
            }

            let selected: Vec<usize> = tabs
                .iter()
                .copied()
                .filter(|&t| is_true(doc.elements()[t].attr("aria-selected")))
                .collect();

            match selected.len() {
                1 => {}
                0 => violations.push(
                    Violation::new(
                        CODE,
                        NAME,
                        self.severity,
                        doc.open_tag_location(tablist),
                        format!(
                            "Tablist has no selected tab; exactly one of its {} tabs must have aria-selected=\"true\"",
                            tabs.len()
                        ),
                    )
                    .with_suggestion(Suggestion::new(
                        "Mark the tab whose panel is initially shown with aria-selected=\"true\"",
                    ))
                    .with_doc_ref("https://www.w3.org/WAI/ARIA/apg/patterns/tabs/"),
                ),
                n => {
                    let mut violation = Violation::new(
                        CODE,
                        NAME,
                        self.severity,
                        doc.open_tag_location(tablist),
                        format!(
                            "Tablist has more than one selected tab ({n} tabs have aria-selected=\"true\")"
                        ),
                    )
                    .with_suggestion(Suggestion::new(
                        "Keep aria-selected=\"true\" on one tab and set the others to \"false\"",
                    ))
                    .with_doc_ref("https://www.w3.org/WAI/ARIA/apg/patterns/tabs/");
                    for &tab in &selected {
                        violation = violation.with_label(Label::new(
                            doc.attribute_location(tab, "aria-selected"),
                            "selected here",
                        ));
                    }
                    violations.push(violation);
                }
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str) -> Vec<Violation> {
        TablistSelection::new().check(&Document::parse(text))
    }

    #[test]
    fn single_selected_tab_passes() {
        let v = check(
            r#"<div role="tablist"><button role="tab" aria-selected="true">A</button><button role="tab" aria-selected="false">B</button></div>"#,
        );
        assert!(v.is_empty());
    }

    #[test]
    fn no_selected_tab_is_reported_once() {
        let v = check(
            r#"<div role="tablist"><button role="tab">A</button><button role="tab" aria-selected="false">B</button></div>"#,
        );
        assert_eq!(v.len(), 1);
        assert!(v[0].message.contains("no selected tab"));
        assert_eq!(v[0].location.offset, 0);
    }

    #[test]
    fn nested_tablists_are_judged_separately() {
        let v = check(
            r#"<div role="tablist"><span role="tab" aria-selected="true">A</span>
<div role="tablist"><span role="tab" aria-selected="true">x</span><span role="tab" aria-selected="true">y</span></div></div>"#,
        );
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].location.line, 2);
        assert_eq!(v[0].labels.len(), 2);
    }

    #[test]
    fn dynamic_selection_and_unknown_extent_are_skipped() {
        assert!(check(
            r#"<div role="tablist"><a role="tab" aria-selected="${first}">A</a><a role="tab" aria-selected="${!first}">B</a></div>"#
        )
        .is_empty());
        assert!(check(r#"<div role="tablist"><a role="tab">A</a>"#).is_empty());
    }
}
