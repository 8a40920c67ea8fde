//! Rule for live regions.
//!
//! # Detected Patterns
//!
//! - `aria-live` contradicting the implicit politeness of `alert`
//!   (assertive) or `status` / `log` (polite)
//! - a live region carrying `aria-hidden="true"`, or inside an element that
//!   does, so its updates are never announced

use aria_lint_core::utils::{is_dynamic, is_true};
use aria_lint_core::{Document, FixDescriptor, Label, Rule, Severity, Suggestion, Violation};

/// Rule code for live-region.
pub const CODE: &str = "AR014";

/// Rule name for live-region.
pub const NAME: &str = "live-region";

/// Roles that are live regions, with their implicit politeness.
const LIVE_ROLES: &[(&str, &str)] = &[
    ("alert", "assertive"),
    ("status", "polite"),
    ("log", "polite"),
    ("timer", "off"),
    ("marquee", "off"),
];

/// Checks live region configuration.
#[derive(Debug, Clone)]
pub struct LiveRegion {
    severity: Severity,
}

impl Default for LiveRegion {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveRegion {
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

fn remove_attribute(name: &str) -> FixDescriptor {
    FixDescriptor::RemoveAttribute { name: name.into() }
}

impl Rule for LiveRegion {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Checks aria-live politeness and that live regions are not hidden"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        let elements = doc.elements();
        let mut violations = Vec::new();

        for (idx, element) in elements.iter().enumerate() {
            let live_role = element
                .role
                .as_deref()
                .and_then(|r| LIVE_ROLES.iter().find(|(role, _)| *role == r));
            let live_attr = element
                .attr("aria-live")
                .filter(|v| !is_dynamic(Some(*v)))
                .map(|v| v.trim().to_ascii_lowercase());

            if let (Some(&(role, implicit)), Some(explicit)) = (live_role, live_attr.as_deref()) {
                let contradicts = matches!(role, "alert" | "status" | "log")
                    && matches!(explicit, "off" | "polite" | "assertive")
                    && explicit != implicit;
                if contradicts {
                    violations.push(
                        Violation::new(
                            CODE,
                            NAME,
                            self.severity,
                            doc.attribute_location(idx, "aria-live"),
                            format!(
                                "aria-live=\"{explicit}\" contradicts the {implicit} politeness of role \"{role}\""
                            ),
                        )
                        .with_suggestion(Suggestion::with_fix(
                            "Remove aria-live and rely on the role",
                            remove_attribute("aria-live"),
                        )),
                    );
                }
            }

            let politeness = live_attr.as_deref().or(live_role.map(|(_, p)| *p));
            if !matches!(politeness, Some("polite" | "assertive")) {
                continue;
            }

            if is_true(element.attr("aria-hidden")) {
                violations.push(
                    Violation::new(
                        CODE,
                        NAME,
                        self.severity,
                        doc.attribute_location(idx, "aria-hidden"),
                        "Live region has aria-hidden=\"true\"; its updates will not be announced",
                    )
                    .with_suggestion(Suggestion::with_fix(
                        "Remove aria-hidden",
                        remove_attribute("aria-hidden"),
                    )),
                );
            } else if let Some(hider) = doc
                .ancestors(idx)
                .find(|&a| is_true(elements[a].attr("aria-hidden")))
            {
                violations.push(
                    Violation::new(
                        CODE,
                        NAME,
                        self.severity,
                        doc.open_tag_location(idx),
                        "Live region is inside an element with aria-hidden=\"true\"; its updates will not be announced",
                    )
                    .with_label(Label::new(
                        doc.attribute_location(hider, "aria-hidden"),
                        "hidden here",
                    ))
                    .with_suggestion(Suggestion::new(
                        "Move the live region out of the hidden container",
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
        LiveRegion::new().check(&Document::parse(text))
    }

    #[test]
    fn politeness_contradictions() {
        assert!(check(r#"<div role="alert" aria-live="assertive">x</div>"#).is_empty());
        assert!(check(r#"<output>x</output><div role="log">y</div>"#).is_empty());

        let v = check(r#"<div role="alert" aria-live="polite">x</div>"#);
        assert_eq!(v.len(), 1);
        assert_eq!(
            v[0].message,
            "aria-live=\"polite\" contradicts the assertive politeness of role \"alert\""
        );

        let v = check(r#"<p role="status" aria-live="off">x</p>"#);
        assert_eq!(v.len(), 1);
        assert!(v[0].is_fixable());
    }

    #[test]
    fn hidden_live_regions() {
        let text = r#"<div aria-live="polite" aria-hidden="true">saved</div>"#;
        let v = check(text);
        assert_eq!(v.len(), 1);
        assert_eq!(&text[v[0].range()], r#"aria-hidden="true""#);
        assert!(v[0].is_fixable());

        let nested = check(r#"<section aria-hidden="true"><div role="status">s</div></section>"#);
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].labels.len(), 1);
        assert!(!nested[0].is_fixable());
    }

    #[test]
    fn silent_regions_are_not_checked() {
        assert!(check(r#"<div aria-live="off" aria-hidden="true">x</div>"#).is_empty());
        assert!(check(r#"<div role="timer" aria-hidden="true">0:00</div>"#).is_empty());
    }
}
