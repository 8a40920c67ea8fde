//! Rule forbidding duplicate `id` values.
//!
//! An id referenced by `aria-controls` or `aria-labelledby` resolves to the
//! first element carrying it, so a second element with the same id silently
//! breaks the relationship. Every occurrence after the first is reported.

use aria_lint_core::{is_template_expression, Document, Label, Rule, Severity, Suggestion, Violation};

/// Rule code for duplicate-id.
pub const CODE: &str = "AR004";

/// Rule name for duplicate-id.
pub const NAME: &str = "duplicate-id";

/// Forbids duplicate ids.
#[derive(Debug, Clone)]
pub struct DuplicateId {
    severity: Severity,
}

impl Default for DuplicateId {
    fn default() -> Self {
        Self::new()
    }
}

impl DuplicateId {
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

impl Rule for DuplicateId {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids duplicate id values, which make references ambiguous"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        doc.index()
            .duplicate_ids()
            .iter()
            .filter(|(id, _)| !is_template_expression(id))
            .filter_map(|(id, idx)| {
                let (first, _) = doc.resolve(id)?;
                let first_location = doc.attribute_location(first, "id");
                Some(
                    Violation::new(
                        CODE,
                        NAME,
                        self.severity,
                        doc.attribute_location(*idx, "id"),
                        format!(
                            "Duplicate id \"{id}\" (first defined on line {})",
                            first_location.line
                        ),
                    )
                    .with_label(Label::new(first_location, "first defined here"))
                    .with_suggestion(Suggestion::new("Give each element a unique id")),
                )
            })
            .collect()
    }
}
