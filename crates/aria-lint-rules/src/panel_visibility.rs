//! Rule checking that controlled panels agree with their controller's state.
//!
//! # Rationale
//!
//! A tab with `aria-selected="true"` or a disclosure button with
//! `aria-expanded="true"` tells assistive technology that the element it
//! controls (`aria-controls`) is shown. A hidden panel under an active
//! controller, or a visible panel under an inactive one, means the announced
//! state and the rendered page disagree.
//!
//! # Detected Patterns
//!
//! - Controller active, controlled element hidden
//! - Controller inactive, controlled element visible
//!
//! Hidden means the `hidden` attribute, an inline `display: none` or
//! `visibility: hidden`, `aria-hidden="true"` or a conventional hiding class.
//! Elements whose presentation is computed by the template are skipped.

use aria_lint_core::utils::aria::{has_hidden_class, has_hidden_style};
use aria_lint_core::utils::{is_dynamic, is_hidden, is_true};
use aria_lint_core::{
    Document, ElementSpan, FixDescriptor, Label, ReferenceKind, Rule, Severity, Suggestion,
    Violation,
};

/// Rule code for panel-visibility.
pub const CODE: &str = "AR005";

/// Rule name for panel-visibility.
pub const NAME: &str = "panel-visibility";

/// Attributes that decide whether an element is presented.
const PRESENTATION_ATTRS: &[&str] = &["hidden", "style", "class", "aria-hidden"];

/// Checks state/visibility coherence between controllers and panels.
#[derive(Debug, Clone)]
pub struct PanelVisibility {
    severity: Severity,
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelVisibility {
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

/// The state a controller announces, if it can be read statically.
fn controller_state(element: &ElementSpan) -> Option<(&'static str, bool)> {
    let attr = if element.has_role("tab") {
        "aria-selected"
    } else if element.has_attr("aria-expanded") {
        "aria-expanded"
    } else {
        return None;
    };
    let value = element.attr(attr)?;
    if is_dynamic(Some(value)) {
        return None;
    }
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some((attr, true)),
        "false" => Some((attr, false)),
        _ => None,
    }
}

fn presentation_is_dynamic(element: &ElementSpan) -> bool {
    PRESENTATION_ATTRS
        .iter()
        .any(|a| is_dynamic(element.attr(a)))
}

impl Rule for PanelVisibility {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Checks that controlled panels are shown exactly when their controller is active"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        let elements = doc.elements();
        let index = doc.index();
        let mut violations = Vec::new();

        for reference in index.references(ReferenceKind::Controls) {
            if reference.dynamic {
                continue;
            }
            let controller = &elements[reference.source];
            let Some((state_attr, active)) = controller_state(controller) else {
                continue;
            };
            let Some((panel_idx, panel)) = doc.resolve(&reference.target) else {
                continue;
            };
            if presentation_is_dynamic(panel) {
                continue;
            }

            let hidden = is_hidden(panel);
            let controller_label = Label::new(
                doc.attribute_location(reference.source, state_attr),
                format!("{state_attr}=\"{active}\" here"),
            );

            if active && hidden {
                let mut violation = Violation::new(
                    CODE,
                    NAME,
                    self.severity,
                    doc.open_tag_location(panel_idx),
                    format!(
                        "Element \"{}\" is hidden but its controller has {state_attr}=\"true\"",
                        reference.target
                    ),
                )
                .with_label(controller_label);
                if panel.has_attr("hidden") {
                    violation = violation.with_suggestion(Suggestion::with_fix(
                        "Remove the hidden attribute",
                        FixDescriptor::RemoveAttribute {
                            name: "hidden".into(),
                        },
                    ));
                } else if has_hidden_style(panel) || has_hidden_class(panel) {
                    violation = violation.with_suggestion(Suggestion::new(
                        "Show the element initially or set the controller's state to \"false\"",
                    ));
                }
                violations.push(violation);
            } else if !active && !hidden {
                violations.push(
                    Violation::new(
                        CODE,
                        NAME,
                        self.severity,
                        doc.open_tag_location(panel_idx),
                        format!(
                            "Element \"{}\" is visible but its controller has {state_attr}=\"false\"",
                            reference.target
                        ),
                    )
                    .with_label(controller_label)
                    .with_suggestion(Suggestion::with_fix(
                        "Hide the element with the hidden attribute",
                        FixDescriptor::AddAttributeIfAbsent {
                            name: "hidden".into(),
                            value: String::new(),
                        },
                    )),
                );
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(text: &str) -> Vec<Violation> {
        PanelVisibility::new().check(&Document::parse(text))
    }

    #[test]
    fn consistent_tabs_pass() {
        let text = r#"<div role="tablist">
<button role="tab" aria-selected="true" aria-controls="p1">A</button>
<button role="tab" aria-selected="false" aria-controls="p2" tabindex="-1">B</button>
</div>
<div id="p1" role="tabpanel">one</div>
<div id="p2" role="tabpanel" hidden>two</div>"#;
        assert!(check(text).is_empty());
    }

    #[test]
    fn both_directions_have_distinct_messages() {
        let text = r#"<button role="tab" aria-selected="true" aria-controls="p1">A</button>
<button role="tab" aria-selected="false" aria-controls="p2">B</button>
<div id="p1" hidden>one</div>
<div id="p2">two</div>"#;
        let v = check(text);
        assert_eq!(v.len(), 2);
        assert!(v[0].message.contains("\"p1\" is hidden"));
        assert!(v[1].message.contains("\"p2\" is visible"));
        assert_eq!(v[0].location.line, 3);
        assert!(v[0].is_fixable());
        assert!(v[1].is_fixable());
    }

    #[test]
    fn disclosure_with_style_and_class() {
        let text = r#"<button aria-expanded="true" aria-controls="menu">Menu</button>
<ul id="menu" style="display:none"><li>x</li></ul>
<button aria-expanded="false" aria-controls="faq">FAQ</button>
<div id="faq" class="collapse d-none">answer</div>"#;
        let v = check(text);
        assert_eq!(v.len(), 1);
        assert!(v[0].message.contains("aria-expanded=\"true\""));
        assert!(!v[0].is_fixable());
    }

    #[test]
    fn dynamic_state_is_skipped() {
        let text = r#"<button aria-expanded="${open}" aria-controls="x">t</button><div id="x">c</div>
<button aria-expanded="true" aria-controls="y">t</button><div id="y" th:classappend="x" class="${cls}">c</div>"#;
        assert!(check(text).is_empty());
    }
}
