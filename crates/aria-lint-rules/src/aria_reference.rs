//! Rule requiring id references to resolve.
//!
//! # Detected Patterns
//!
//! - `aria-controls`, `aria-labelledby`, `aria-describedby`, `aria-owns` or
//!   `for` naming an id that no element of the document carries
//!
//! The diagnostic is placed on the referencing attribute and names the
//! missing id. References built from template expressions are not checked.

use aria_lint_core::{Document, ReferenceKind, Rule, Severity, Suggestion, Violation};

/// Rule code for aria-reference.
pub const CODE: &str = "AR003";

/// Rule name for aria-reference.
pub const NAME: &str = "aria-reference";

/// Reports id references that do not resolve.
#[derive(Debug, Clone)]
pub struct AriaReference {
    severity: Severity,
    kinds: Vec<ReferenceKind>,
}

impl Default for AriaReference {
    fn default() -> Self {
        Self::new()
    }
}

impl AriaReference {
    /// Creates a new rule checking every reference kind.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
            kinds: ReferenceKind::ALL.to_vec(),
        }
    }

    /// Restricts the rule to the given reference kinds.
    #[must_use]
    pub fn kinds(mut self, kinds: impl IntoIterator<Item = ReferenceKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for AriaReference {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires aria-controls, aria-labelledby and for to name an existing id"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        let index = doc.index();
        self.kinds
            .iter()
            .flat_map(|&kind| index.references(kind))
            .filter(|r| !r.dynamic && index.resolve(&r.target).is_none())
            .map(|r| {
                Violation::new(
                    CODE,
                    NAME,
                    self.severity,
                    doc.attribute_location(r.source, r.kind.attribute()),
                    format!(
                        "{} references id \"{}\", which does not exist in this document",
                        r.kind, r.target
                    ),
                )
                .with_suggestion(Suggestion::new(format!(
                    "Add id=\"{}\" to the referenced element or correct the reference",
                    r.target
                )))
            })
            .collect()
    }
}
