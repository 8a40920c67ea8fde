//! Rule requiring composite containers to own at least one item.
//!
//! # Detected Patterns
//!
//! | Container role | Expected item roles |
//! |----------------|---------------------|
//! | `tablist` | `tab` |
//! | `list` | `listitem` |
//! | `menu`, `menubar` | `menuitem`, `menuitemcheckbox`, `menuitemradio` |
//! | `listbox` | `option` |
//! | `radiogroup` | `radio` |
//! | `tree` | `treeitem` |
//! | `grid`, `table` | `row` |
//!
//! Items may be nested below generic wrappers or attached with `aria-owns`.
//! Containers are not judged when their end is unknown, when a crossed close
//! tag cut their content short, or when a template expression produces it.

use aria_lint_core::utils::is_true;
use aria_lint_core::{
    is_template_expression, Document, ReferenceKind, Rule, Severity, Suggestion, Violation,
};

/// Rule code for required-children.
pub const CODE: &str = "AR006";

/// Rule name for required-children.
pub const NAME: &str = "required-children";

const MENU_ITEMS: &[&str] = &["menuitem", "menuitemcheckbox", "menuitemradio"];

/// Container role and the item roles it must own.
const REQUIRED_CHILDREN: &[(&str, &[&str])] = &[
    ("tablist", &["tab"]),
    ("list", &["listitem"]),
    ("menu", MENU_ITEMS),
    ("menubar", MENU_ITEMS),
    ("listbox", &["option"]),
    ("radiogroup", &["radio"]),
    ("tree", &["treeitem"]),
    ("grid", &["row"]),
    ("table", &["row"]),
];

/// Requires containers to contain their expected item roles.
#[derive(Debug, Clone)]
pub struct RequiredChildren {
    severity: Severity,
}

impl Default for RequiredChildren {
    fn default() -> Self {
        Self::new()
    }
}

impl RequiredChildren {
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

fn owns_item(doc: &Document<'_>, container: usize, items: &[&str]) -> bool {
    let elements = doc.elements();
    doc.descendants(container)
        .any(|i| elements[i].has_any_role(items))
        || doc
            .index()
            .targets_of(container, ReferenceKind::Owns)
            .filter_map(|id| doc.resolve(id))
            .any(|(_, e)| e.has_any_role(items))
}

impl Rule for RequiredChildren {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires containers such as tablist and list to contain their item roles"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (idx, element) in doc.elements().iter().enumerate() {
            let Some(role) = element.role.as_deref() else {
                continue;
            };
            let Some((_, items)) = REQUIRED_CHILDREN.iter().find(|(r, _)| *r == role) else {
                continue;
            };
            if !element.is_known_extent() || is_true(element.attr("aria-busy")) {
                continue;
            }
            if doc
                .descendants(idx)
                .any(|d| !doc.elements()[d].is_known_extent())
            {
                continue;
            }
            let content = doc.text().get(element.content_range()).unwrap_or_default();
            if is_template_expression(content) || owns_item(doc, idx, items) {
                continue;
            }

            violations.push(
                Violation::new(
                    CODE,
                    NAME,
                    self.severity,
                    doc.open_tag_location(idx),
                    format!(
                        "Element with role \"{role}\" contains no element with role {}",
                        quoted_list(items)
                    ),
                )
                .with_suggestion(Suggestion::new(format!(
                    "Add at least one child with role \"{}\" or remove the container role",
                    items[0]
                ))),
            );
        }

        violations
    }
}

fn quoted_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|i| format!("\"{i}\""))
        .collect::<Vec<_>>()
        .join(" or ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str) -> Vec<Violation> {
        RequiredChildren::new().check(&Document::parse(text))
    }

    #[test]
    fn empty_tablist_is_reported_at_the_container() {
        let text = r#"<p>intro</p><div role="tablist"><span>nothing</span></div>"#;
        let v = check(text);
        assert_eq!(v.len(), 1);
        assert_eq!(
            v[0].message,
            "Element with role \"tablist\" contains no element with role \"tab\""
        );
        assert_eq!(v[0].location.offset, 12);
    }

    #[test]
    fn nested_and_owned_items_count() {
        assert!(check(r#"<div role="tablist"><div><a role="tab">A</a></div></div>"#).is_empty());
        assert!(check(
            r#"<div role="menu" aria-owns="m1"></div><div id="m1" role="menuitemradio">x</div>"#
        )
        .is_empty());
        assert!(check("<table><tbody><tr><td>1</td></tr></tbody></table>").is_empty());
    }

    #[test]
    fn template_content_and_unknown_extent_are_skipped() {
        assert!(check("<ul>{{ items }}</ul>").is_empty());
        assert!(check(r#"<ul aria-busy="true"></ul>"#).is_empty());
        assert!(check(r#"<div role="listbox">"#).is_empty());
        assert_eq!(check("<ul></ul><ol><li>x</li></ol>").len(), 1);
    }

    #[test]
    fn content_cut_by_a_crossed_close_is_not_judged() {
        assert!(check(r#"<ul class="steps"><span></ul><li>Preheat</li></span>"#).is_empty());
        assert_eq!(check(r#"<ul class="steps"><span></span></ul>"#).len(), 1);
    }

    #[test]
    fn menu_message_lists_alternatives() {
        let v = check(r#"<div role="menubar"></div>"#);
        assert!(v[0]
            .message
            .ends_with("\"menuitem\" or \"menuitemcheckbox\" or \"menuitemradio\""));
    }
}
