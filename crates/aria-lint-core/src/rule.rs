//! Rule trait for defining lint rules.

use crate::config::RuleConfig;
use crate::document::Document;
use crate::types::{Severity, Violation};

/// A stateless check over one document snapshot.
///
/// Rules see only the read-only [`Document`] (spans, roles, cross-reference
/// index). They must not depend on other rules or on evaluation order, and
/// may be run in parallel.
///
/// # Example
///
/// ```ignore
/// use aria_lint_core::{Document, Rule, Severity, Violation};
///
/// pub struct NoMarquee;
///
/// impl Rule for NoMarquee {
///     fn name(&self) -> &'static str { "no-marquee" }
///     fn code(&self) -> &'static str { "AR900" }
///
///     fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
///         doc.elements_named("marquee")
///             .map(|i| Violation::new(
///                 self.code(),
///                 self.name(),
///                 self.default_severity(),
///                 doc.open_tag_location(i),
///                 "<marquee> is not accessible",
///             ))
///             .collect()
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "tablist-selection").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "AR001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Whether this rule requires a reason when using allow directives.
    ///
    /// By default, rules with `Severity::Error` require a reason.
    fn requires_allow_reason(&self) -> bool {
        self.default_severity() == Severity::Error
    }

    /// Applies rule-specific options from `[rules.<name>]`.
    fn configure(&mut self, _config: &RuleConfig) {}

    /// Checks a document snapshot and returns any violations found.
    fn check(&self, doc: &Document<'_>) -> Vec<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
