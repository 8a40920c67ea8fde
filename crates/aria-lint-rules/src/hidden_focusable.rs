//! Rule forbidding `aria-hidden="true"` on focusable content.
//!
//! # Rationale
//!
//! `aria-hidden` removes an element from the accessibility tree but not from
//! the tab sequence. Keyboard users then land on something a screen reader
//! cannot describe.
//!
//! # Detected Patterns
//!
//! - `aria-hidden="true"` on a focusable element
//! - `aria-hidden="true"` on a container with focusable descendants
//!
//! Descendants that are themselves removed (`hidden`, inline
//! `display: none`, `disabled`, `tabindex="-1"`) and containers marked
//! `inert` are ignored. Containers without a known end are not judged.

use aria_lint_core::utils::aria::has_hidden_style;
use aria_lint_core::utils::{is_focusable, is_true};
use aria_lint_core::{
    Document, ElementSpan, FixDescriptor, Label, Rule, Severity, Suggestion, Violation,
};

/// Rule code for hidden-focusable.
pub const CODE: &str = "AR015";

/// Rule name for hidden-focusable.
pub const NAME: &str = "hidden-focusable";

/// Forbids hiding focusable content from assistive technology.
#[derive(Debug, Clone)]
pub struct HiddenFocusable {
    severity: Severity,
}

impl Default for HiddenFocusable {
    fn default() -> Self {
        Self::new()
    }
}

impl HiddenFocusable {
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

fn reachable(element: &ElementSpan) -> bool {
    is_focusable(element) && !element.has_attr("hidden") && !has_hidden_style(element)
}

fn remove_aria_hidden() -> Suggestion {
    Suggestion::with_fix(
        "Remove aria-hidden",
        FixDescriptor::RemoveAttribute {
            name: "aria-hidden".into(),
        },
    )
}

impl Rule for HiddenFocusable {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids aria-hidden=\"true\" on focusable elements and their containers"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        let elements = doc.elements();
        let mut violations = Vec::new();

        for (idx, element) in elements.iter().enumerate() {
            if !is_true(element.attr("aria-hidden")) || element.has_attr("inert") {
                continue;
            }
            // Reported once, at the outermost hidden container.
            if doc
                .ancestors(idx)
                .any(|a| is_true(elements[a].attr("aria-hidden")))
            {
                continue;
            }

            if reachable(element) {
                violations.push(
                    Violation::new(
                        CODE,
                        NAME,
                        self.severity,
                        doc.attribute_location(idx, "aria-hidden"),
                        format!(
                            "Focusable <{}> has aria-hidden=\"true\"; keyboard users can reach content screen readers skip",
                            element.tag_name
                        ),
                    )
                    .with_suggestion(remove_aria_hidden())
                    .with_suggestion(Suggestion::new("Or add tabindex=\"-1\" to remove it from the tab sequence")),
                );
                continue;
            }

            if !element.is_known_extent() {
                continue;
            }
            let focusable: Vec<usize> = doc
                .descendants(idx)
                .filter(|&d| reachable(&elements[d]))
                .filter(|&d| {
                    !doc.ancestors(d)
                        .take_while(|&a| a != idx)
                        .any(|a| elements[a].has_attr("inert") || elements[a].has_attr("hidden"))
                })
                .collect();
            let Some(&first) = focusable.first() else {
                continue;
            };

            violations.push(
                Violation::new(
                    CODE,
                    NAME,
                    self.severity,
                    doc.attribute_location(idx, "aria-hidden"),
                    format!(
                        "Element with aria-hidden=\"true\" contains {} focusable element(s)",
                        focusable.len()
                    ),
                )
                .with_label(Label::new(doc.open_tag_location(first), "focusable here"))
                .with_suggestion(remove_aria_hidden())
                .with_suggestion(Suggestion::new(
                    "Or make the descendants unfocusable with tabindex=\"-1\" or inert",
                )),
            );
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str) -> Vec<Violation> {
        HiddenFocusable::new().check(&Document::parse(text))
    }

    #[test]
    fn focusable_element_itself() {
        let v = check(r#"<a href="/x" aria-hidden="true">x</a>"#);
        assert_eq!(v.len(), 1);
        assert!(v[0].message.starts_with("Focusable <a> has aria-hidden"));
        assert!(v[0].is_fixable());

        assert!(check(r#"<a href="/x" aria-hidden="true" tabindex="-1">x</a>"#).is_empty());
        assert!(check(r#"<span aria-hidden="true">★</span>"#).is_empty());
    }

    #[test]
    fn container_with_focusable_descendants() {
        let text = r#"<div aria-hidden="true">
  <p><button>Close</button></p>
  <input type="text" disabled>
  <div hidden><a href="/">x</a></div>
  <a href="/y">y</a>
</div>"#;
        let v = check(text);
        assert_eq!(v.len(), 1);
        assert_eq!(
            v[0].message,
            "Element with aria-hidden=\"true\" contains 2 focusable element(s)"
        );
        assert_eq!(v[0].labels[0].location.line, 2);
    }

    #[test]
    fn inert_and_nested_hidden_are_reported_once_or_not_at_all() {
        assert!(check(r#"<div aria-hidden="true" inert><button>x</button></div>"#).is_empty());
        let nested = r#"<div aria-hidden="true"><div aria-hidden="true"><button>x</button></div></div>"#;
        assert_eq!(check(nested).len(), 1);
    }
}
