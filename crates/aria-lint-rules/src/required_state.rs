//! Rule requiring the state attributes a role cannot work without.
//!
//! | Role (explicit) | Required attribute | Fix value |
//! |-----------------|--------------------|-----------|
//! | `tab` | `aria-selected` | `false` |
//! | `checkbox`, `radio`, `switch`, `menuitemcheckbox`, `menuitemradio` | `aria-checked` | `false` |
//! | `combobox` | `aria-expanded` | `false` |
//! | `heading` | `aria-level` | `2` |
//! | `slider` | `aria-valuenow` | `aria-valuemin`, else `0` |
//!
//! Only roles written in a `role` attribute are checked: native controls
//! (`<input type="checkbox">`, `<select>`, `<h2>`) carry their state natively.

use aria_lint_core::utils::has_explicit_role;
use aria_lint_core::{Document, ElementSpan, FixDescriptor, Rule, Severity, Suggestion, Violation};

/// Rule code for required-state.
pub const CODE: &str = "AR009";

/// Rule name for required-state.
pub const NAME: &str = "required-state";

/// Role, required attribute and the value a fix inserts.
const REQUIRED_STATES: &[(&str, &str, &str)] = &[
    ("tab", "aria-selected", "false"),
    ("checkbox", "aria-checked", "false"),
    ("radio", "aria-checked", "false"),
    ("switch", "aria-checked", "false"),
    ("menuitemcheckbox", "aria-checked", "false"),
    ("menuitemradio", "aria-checked", "false"),
    ("combobox", "aria-expanded", "false"),
    ("heading", "aria-level", "2"),
    ("slider", "aria-valuenow", "0"),
];

/// Reports missing required state attributes.
#[derive(Debug, Clone)]
pub struct RequiredState {
    severity: Severity,
}

impl Default for RequiredState {
    fn default() -> Self {
        Self::new()
    }
}

impl RequiredState {
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

fn fix_value(element: &ElementSpan, attr: &str, default: &str) -> String {
    if attr == "aria-valuenow" {
        if let Some(min) = element.attr("aria-valuemin").filter(|v| !v.trim().is_empty()) {
            return min.trim().to_string();
        }
    }
    default.to_string()
}

impl Rule for RequiredState {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires state attributes such as aria-selected on tab and aria-checked on checkbox"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (idx, element) in doc.elements().iter().enumerate() {
            let Some(&(role, attr, default)) = REQUIRED_STATES
                .iter()
                .find(|(role, _, _)| has_explicit_role(element, role))
            else {
                continue;
            };
            if element.has_attr(attr) {
                continue;
            }

            let value = fix_value(element, attr, default);
            violations.push(
                Violation::new(
                    CODE,
                    NAME,
                    self.severity,
                    doc.open_tag_location(idx),
                    format!("Element with role \"{role}\" is missing required attribute {attr}"),
                )
                .with_suggestion(Suggestion::with_fix(
                    format!("Add {attr}=\"{value}\""),
                    FixDescriptor::AddAttributeIfAbsent {
                        name: attr.into(),
                        value,
                    },
                )),
            );
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aria_lint_core::{apply_fix, NoopFilter};

    fn check(text: &str) -> Vec<Violation> {
        RequiredState::new().check(&Document::parse(text))
    }

    #[test]
    fn native_controls_are_exempt() {
        let text = r#"<input type="checkbox"><select></select><h2>t</h2><input type="range">"#;
        assert!(check(text).is_empty());
    }

    #[test]
    fn missing_states_are_reported_distinctly() {
        let text = r#"<span role="checkbox">a</span><div role="heading" aria-level="3">h</div><div role="Slider" aria-valuemin="5"></div>"#;
        let v = check(text);
        let messages: Vec<&str> = v.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Element with role \"checkbox\" is missing required attribute aria-checked",
                "Element with role \"slider\" is missing required attribute aria-valuenow",
            ]
        );
        assert_eq!(
            v[1].fixes().next(),
            Some(&FixDescriptor::AddAttributeIfAbsent {
                name: "aria-valuenow".into(),
                value: "5".into()
            })
        );
    }

    #[test]
    fn fix_inserts_after_last_attribute() {
        let text = r#"<li role="tab" id="t1">One</li>"#;
        let v = check(text);
        let fix = v[0].fixes().next().unwrap();
        let out = apply_fix(text, v[0].location.offset, fix, &NoopFilter).unwrap();
        insta::assert_snapshot!(
            out.edit().unwrap().apply(text).unwrap(),
            @r#"<li role="tab" id="t1" aria-selected="false">One</li>"#
        );
    }
}
