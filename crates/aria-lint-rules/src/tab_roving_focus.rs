//! Rule checking the roving tabindex of tab groups.
//!
//! # Rationale
//!
//! A tablist is one stop in the tab sequence: the selected tab carries
//! `tabindex="0"` and every other tab `tabindex="-1"`, with arrow keys moving
//! between tabs. Any other arrangement either traps keyboard users on every
//! tab or makes the widget unreachable.
//!
//! # Detected Patterns
//!
//! - No tab of the group is focusable
//! - Several tabs of the group are focusable
//! - An inactive tab is focusable instead of `tabindex="-1"`
//! - The selected tab does not have `tabindex="0"`
//!
//! When exactly one tab is selected, an unreachable group is reported once, at
//! the selected tab, where the `tabindex="0"` fix applies. The group-level
//! message is used only when there is no single selected tab to fix.
//!
//! Tabs outside any tablist are grouped by their parent element, unless
//! crossed close tags left that parent uncertain.

use aria_lint_core::utils::{effective_tabindex, group_members, is_dynamic, is_true};
use aria_lint_core::{Document, FixDescriptor, Location, Rule, Severity, Suggestion, Violation};
use std::collections::BTreeMap;

/// Rule code for tab-roving-focus.
pub const CODE: &str = "AR002";

/// Rule name for tab-roving-focus.
pub const NAME: &str = "tab-roving-focus";

const DOC_REF: &str = "https://www.w3.org/WAI/ARIA/apg/practices/keyboard-interface/";

/// Checks roving tabindex consistency within tab groups.
#[derive(Debug, Clone)]
pub struct TabRovingFocus {
    severity: Severity,
}

impl Default for TabRovingFocus {
    fn default() -> Self {
        Self::new()
    }
}

impl TabRovingFocus {
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

    fn violation(&self, location: Location, message: impl Into<String>) -> Violation {
        Violation::new(CODE, NAME, self.severity, location, message).with_doc_ref(DOC_REF)
    }

    fn set_tabindex(value: &str) -> Suggestion {
        Suggestion::with_fix(
            format!("Set tabindex=\"{value}\""),
            FixDescriptor::SetAttributeValue {
                name: "tabindex".into(),
                value: value.into(),
            },
        )
    }

    fn check_group(&self, doc: &Document<'_>, anchor: usize, tabs: &[usize]) -> Vec<Violation> {
        let elements = doc.elements();
        let mut violations = Vec::new();

        let selected: Vec<usize> = tabs
            .iter()
            .copied()
            .filter(|&t| is_true(elements[t].attr("aria-selected")))
            .collect();
        let active = match selected.as_slice() {
            [only] => Some(*only),
            _ => None,
        };
        let focusable: Vec<usize> = tabs
            .iter()
            .copied()
            .filter(|&t| effective_tabindex(&elements[t]).is_some_and(|i| i >= 0))
            .collect();

        if focusable.is_empty() && active.is_none() {
            violations.push(
                self.violation(
                    doc.open_tag_location(anchor),
                    "No tab in the group is focusable; the selected tab should have tabindex=\"0\"",
                )
                .with_suggestion(Suggestion::new(
                    "Give the selected tab tabindex=\"0\" so the tablist is reachable with Tab",
                )),
            );
        }

        if focusable.len() > 1 {
            violations.push(
                self.violation(
                    doc.open_tag_location(anchor),
                    format!(
                        "{} tabs in the group are focusable; only the selected tab should be in the tab sequence",
                        focusable.len()
                    ),
                )
                .with_suggestion(Suggestion::new(
                    "Set tabindex=\"-1\" on inactive tabs and move focus with the arrow keys",
                )),
            );
        }

        if let Some(active) = active {
            for &tab in tabs.iter().filter(|&&t| t != active) {
                let index = effective_tabindex(&elements[tab]);
                if index.is_some_and(|i| i >= 0) {
                    violations.push(
                        self.violation(
                            doc.open_tag_location(tab),
                            "Inactive tab should have tabindex=\"-1\"",
                        )
                        .with_suggestion(Self::set_tabindex("-1")),
                    );
                }
            }

            if effective_tabindex(&elements[active]) != Some(0) {
                violations.push(
                    self.violation(
                        doc.open_tag_location(active),
                        "Selected tab should have tabindex=\"0\"",
                    )
                    .with_suggestion(Self::set_tabindex("0")),
                );
            }
        }

        violations
    }
}

impl Rule for TabRovingFocus {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Checks that exactly the selected tab is in the tab sequence"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        let elements = doc.elements();

        // Group key: the enclosing tablist, else the parent element.
        let mut groups: BTreeMap<Option<usize>, Vec<usize>> = BTreeMap::new();
        for tablist in doc.elements_with_role("tablist") {
            if elements[tablist].is_known_extent() {
                let tabs = group_members(doc, tablist, &["tab"], &["tablist"]);
                if !tabs.is_empty() {
                    groups.insert(Some(tablist), tabs);
                }
            }
        }
        for tab in doc.elements_with_role("tab") {
            let orphan = !elements[tab].detached
                && doc.nearest_ancestor_with_role(tab, &["tablist"]).is_none();
            if orphan {
                groups.entry(elements[tab].parent).or_default().push(tab);
            }
        }

        groups
            .into_iter()
            .filter(|(_, tabs)| {
                !tabs.iter().any(|&t| {
                    is_dynamic(elements[t].attr("tabindex"))
                        || is_dynamic(elements[t].attr("aria-selected"))
                })
            })
            .flat_map(|(key, tabs)| {
                let anchor = key.filter(|&k| elements[k].has_role("tablist")).unwrap_or(tabs[0]);
                self.check_group(doc, anchor, &tabs)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(text: &str) -> Vec<String> {
        TabRovingFocus::new()
            .check(&Document::parse(text))
            .into_iter()
            .map(|v| v.message)
            .collect()
    }

    #[test]
    fn selected_tab_needs_tabindex_zero() {
        let found = messages(r#"<div role="tab" aria-selected="true" tabindex="-1">A</div>"#);
        assert_eq!(found, vec!["Selected tab should have tabindex=\"0\"".to_string()]);

        assert!(messages(r#"<div role="tab" aria-selected="true" tabindex="0">A</div>"#).is_empty());
    }

    #[test]
    fn correct_roving_group_passes() {
        let text = r#"<div role="tablist">
  <button role="tab" aria-selected="true">A</button>
  <button role="tab" aria-selected="false" tabindex="-1">B</button>
</div>"#;
        assert!(messages(text).is_empty());
    }

    #[test]
    fn buttons_without_tabindex_are_all_focusable() {
        let text = r#"<div role="tablist"><button role="tab" aria-selected="true">A</button><button role="tab">B</button></div>"#;
        let found = messages(text);
        assert_eq!(found.len(), 2);
        assert!(found[0].starts_with("2 tabs in the group are focusable"));
        assert_eq!(found[1], "Inactive tab should have tabindex=\"-1\"");
    }

    #[test]
    fn unfocusable_group_without_selection() {
        let text = r#"<ul role="tablist"><li role="tab">A</li><li role="tab">B</li></ul>"#;
        let found = messages(text);
        assert_eq!(found.len(), 1);
        assert!(found[0].starts_with("No tab in the group is focusable"));
    }

    #[test]
    fn unreachable_group_with_selection_is_reported_at_the_selected_tab() {
        let text = r#"<div role="tablist"><span role="tab" aria-selected="true" tabindex="-1">A</span><span role="tab" tabindex="-1">B</span></div>"#;
        let v = TabRovingFocus::new().check(&Document::parse(text));
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].message, "Selected tab should have tabindex=\"0\"");
        assert_eq!(v[0].location.offset, text.find("<span").unwrap());
    }

    #[test]
    fn fixes_target_the_tab() {
        let text = r#"<div role="tablist"><span role="tab" aria-selected="true">A</span></div>"#;
        let v = TabRovingFocus::new().check(&Document::parse(text));
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].location.offset, text.find("<span").unwrap());
        assert!(v[0].is_fixable());
    }
}
