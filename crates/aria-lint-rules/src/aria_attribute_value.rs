//! Rule validating enumerated ARIA attribute values.
//!
//! # Rationale
//!
//! Assistive technology ignores an enumerated ARIA attribute whose value is
//! not one of its tokens, so `aria-selected="yes"` silently behaves like an
//! absent attribute. This is reported as an invalid value, separately from
//! the missing-attribute diagnostics of `required-state`.
//!
//! Values are compared ASCII case-insensitively after trimming. Values built
//! by a template expression are not judged.

use aria_lint_core::utils::is_dynamic;
use aria_lint_core::{Document, FixDescriptor, Rule, Severity, Suggestion, Violation};

/// Rule code for aria-attribute-value.
pub const CODE: &str = "AR008";

/// Rule name for aria-attribute-value.
pub const NAME: &str = "aria-attribute-value";

const BOOLEAN: &[&str] = &["true", "false"];
const BOOLEAN_UNDEFINED: &[&str] = &["true", "false", "undefined"];
const TRISTATE: &[&str] = &["true", "false", "mixed", "undefined"];

/// Attribute and its legal tokens.
const ENUMERATED: &[(&str, &[&str])] = &[
    ("aria-selected", BOOLEAN_UNDEFINED),
    ("aria-expanded", BOOLEAN_UNDEFINED),
    ("aria-hidden", BOOLEAN_UNDEFINED),
    ("aria-grabbed", BOOLEAN_UNDEFINED),
    ("aria-checked", TRISTATE),
    ("aria-pressed", TRISTATE),
    ("aria-disabled", BOOLEAN),
    ("aria-busy", BOOLEAN),
    ("aria-modal", BOOLEAN),
    ("aria-atomic", BOOLEAN),
    ("aria-multiline", BOOLEAN),
    ("aria-multiselectable", BOOLEAN),
    ("aria-readonly", BOOLEAN),
    ("aria-required", BOOLEAN),
    ("aria-orientation", &["horizontal", "vertical", "undefined"]),
    ("aria-live", &["off", "polite", "assertive"]),
    ("aria-autocomplete", &["inline", "list", "both", "none"]),
    ("aria-sort", &["ascending", "descending", "none", "other"]),
    (
        "aria-current",
        &["page", "step", "location", "date", "time", "true", "false"],
    ),
    (
        "aria-haspopup",
        &["false", "true", "menu", "listbox", "tree", "grid", "dialog"],
    ),
    ("aria-invalid", &["grammar", "false", "spelling", "true"]),
];

/// Space-separated token lists.
const TOKEN_LISTS: &[(&str, &[&str])] = &[(
    "aria-relevant",
    &["additions", "removals", "text", "all"],
)];

/// Validates values of enumerated ARIA attributes.
#[derive(Debug, Clone)]
pub struct AriaAttributeValue {
    severity: Severity,
}

impl Default for AriaAttributeValue {
    fn default() -> Self {
        Self::new()
    }
}

impl AriaAttributeValue {
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

/// Boolean spelling a value most likely meant.
fn boolean_correction(value: &str) -> Option<&'static str> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "1" | "on" => Some("true"),
        "no" | "0" | "off" => Some("false"),
        _ => None,
    }
}

fn is_legal(value: &str, legal: &[&str]) -> bool {
    legal.iter().any(|l| value.eq_ignore_ascii_case(l))
}

impl Rule for AriaAttributeValue {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires enumerated ARIA attributes to hold one of their legal values"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (idx, element) in doc.elements().iter().enumerate() {
            for attr in element.attributes.iter() {
                if is_dynamic(Some(&attr.value)) {
                    continue;
                }
                let value = attr.value.trim();

                let invalid = if let Some((_, legal)) =
                    ENUMERATED.iter().find(|(name, _)| attr.is(name))
                {
                    (!is_legal(value, legal)).then_some(*legal)
                } else if let Some((_, legal)) = TOKEN_LISTS.iter().find(|(name, _)| attr.is(name))
                {
                    let tokens_ok = !value.is_empty()
                        && value.split_whitespace().all(|t| is_legal(t, legal));
                    (!tokens_ok).then_some(*legal)
                } else {
                    None
                };
                let Some(legal) = invalid else {
                    continue;
                };

                let message = if value.is_empty() {
                    format!(
                        "{} has an empty value; expected one of: {}",
                        attr.name,
                        legal.join(", ")
                    )
                } else {
                    format!(
                        "Invalid value \"{value}\" for {}; expected one of: {}",
                        attr.name,
                        legal.join(", ")
                    )
                };
                let suggestion = match boolean_correction(value) {
                    Some(fixed) if legal.contains(&fixed) => Suggestion::with_fix(
                        format!("Use {}=\"{fixed}\"", attr.name),
                        FixDescriptor::SetAttributeValue {
                            name: attr.name.to_ascii_lowercase(),
                            value: fixed.into(),
                        },
                    ),
                    _ => Suggestion::new(format!("Use one of: {}", legal.join(", "))),
                };

                violations.push(
                    Violation::new(
                        CODE,
                        NAME,
                        self.severity,
                        doc.attribute_location(idx, &attr.name),
                        message,
                    )
                    .with_suggestion(suggestion),
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
        AriaAttributeValue::new().check(&Document::parse(text))
    }

    #[test]
    fn legal_values_pass() {
        let text = r#"<div role="tablist" aria-orientation="Vertical"><button role="tab" aria-selected="true" aria-expanded="false" aria-relevant="additions text">x</button></div>"#;
        assert!(check(text).is_empty());
    }

    #[test]
    fn invalid_boolean_gets_a_fix() {
        let text = r#"<button role="tab" aria-selected="yes">x</button>"#;
        let v = check(text);
        assert_eq!(v.len(), 1);
        assert_eq!(
            v[0].message,
            "Invalid value \"yes\" for aria-selected; expected one of: true, false, undefined"
        );
        assert_eq!(&text[v[0].range()], r#"aria-selected="yes""#);
        assert_eq!(
            v[0].fixes().next(),
            Some(&FixDescriptor::SetAttributeValue {
                name: "aria-selected".into(),
                value: "true".into()
            })
        );
    }

    #[test]
    fn empty_and_non_boolean_values() {
        let v = check(r#"<div aria-orientation="diagonal" aria-expanded aria-live="loud"></div>"#);
        let messages: Vec<&str> = v.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].starts_with("Invalid value \"diagonal\" for aria-orientation"));
        assert!(messages[1].starts_with("aria-expanded has an empty value"));
        assert!(messages[2].starts_with("Invalid value \"loud\""));
        assert!(v.iter().all(|v| !v.is_fixable()));
    }

    #[test]
    fn template_values_are_skipped() {
        assert!(check(r#"<a aria-current="${active ? 'page' : 'false'}">x</a>"#).is_empty());
        assert_eq!(check(r#"<p aria-relevant="all nonsense"></p>"#).len(), 1);
    }
}
