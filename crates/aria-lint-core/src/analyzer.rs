//! Core analyzer orchestrating one evaluation pass.

use crate::collector::DiagnosticCollector;
use crate::config::{Config, ConfigError, RuleConfig};
use crate::document::Document;
use crate::filter::{ControlFlowFilter, MarkupFilter, NoopFilter};
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleBox};
use crate::types::{LintResult, Severity, Suggestion, Violation};
use crate::utils::allowance::AllowDirectives;

use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while building an analyzer.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Two rules share a name or code.
    #[error("Rule '{name}' conflicts with already registered rule '{existing}'")]
    DuplicateRule {
        /// Name of the rejected rule.
        name: String,
        /// Name of the rule already registered.
        existing: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    rules: Vec<RuleBox>,
    config: Option<Config>,
    filter: Option<Box<dyn MarkupFilter>>,
    parallel: Option<bool>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds boxed rules to the analyzer.
    #[must_use]
    pub fn rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = RuleBox>,
    {
        self.rules.extend(rules);
        self
    }

    /// Adds every rule of a registry.
    #[must_use]
    pub fn registry(mut self, registry: RuleRegistry) -> Self {
        self.rules.extend(registry.into_rules());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the input filter, replacing the one derived from configuration.
    #[must_use]
    pub fn filter<F: MarkupFilter + 'static>(mut self, filter: F) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Sets parallel rule evaluation, overriding `analyzer.parallel`.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    /// Builds the analyzer.
    ///
    /// Rules with a `[rules.<name>]` block receive its options through
    /// [`Rule::configure`].
    ///
    /// # Errors
    ///
    /// Returns an error if two rules share a name or code.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let mut registry = RuleRegistry::try_from(self.rules)?;
        for rule in registry.rules_mut() {
            if let Some(rule_config) = config.rule_config(rule.name()) {
                debug!("Configuring rule: {}", rule.name());
                rule.configure(rule_config);
            }
        }

        let filter: Box<dyn MarkupFilter> = match self.filter {
            Some(filter) => filter,
            None => match ControlFlowFilter::from_config(&config.filter) {
                Some(filter) => Box::new(filter),
                None => Box::new(NoopFilter),
            },
        };
        let parallel = self.parallel.unwrap_or(config.analyzer.parallel);

        Ok(Analyzer {
            registry,
            config,
            filter,
            parallel,
        })
    }
}

/// Runs the rule pipeline over documents.
///
/// Holds no per-document state: every [`Analyzer::analyze`] call is a pure
/// function of its input text. Use [`Analyzer::builder()`] to construct an
/// instance.
pub struct Analyzer {
    registry: RuleRegistry,
    config: Config,
    filter: Box<dyn MarkupFilter>,
    parallel: bool,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("registry", &self.registry)
            .field("parallel", &self.parallel)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.registry.len()
    }

    /// Returns the rule registry.
    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the input filter.
    #[must_use]
    pub fn filter(&self) -> &dyn MarkupFilter {
        self.filter.as_ref()
    }

    /// Gets the rule configuration for a specific rule.
    #[must_use]
    pub fn rule_config(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.config.rules.get(rule_name)
    }

    /// Scans `text` and evaluates every enabled rule.
    #[must_use]
    pub fn analyze(&self, text: &str) -> LintResult {
        let doc = Document::parse_filtered(text, self.filter.as_ref());
        self.evaluate(&doc)
    }

    /// Evaluates every enabled rule against a scanned document.
    #[must_use]
    pub fn evaluate(&self, doc: &Document<'_>) -> LintResult {
        debug!(
            "Starting pass: {} elements, {} rules",
            doc.elements().len(),
            self.registry.len()
        );

        let enabled: Vec<&dyn Rule> = self
            .registry
            .iter()
            .filter(|rule| {
                let enabled = self.config.is_rule_enabled(rule.name());
                if !enabled {
                    debug!("Skipping disabled rule: {}", rule.name());
                }
                enabled
            })
            .collect();

        let outputs: Vec<Option<Vec<Violation>>> = if self.parallel {
            enabled.par_iter().map(|rule| run_isolated(*rule, doc)).collect()
        } else {
            enabled.iter().map(|rule| run_isolated(*rule, doc)).collect()
        };

        let directives = if self.config.analyzer.respect_allow_comments {
            AllowDirectives::parse(doc.source())
        } else {
            AllowDirectives::default()
        };

        let mut result = LintResult::new();
        let mut collector = DiagnosticCollector::new();
        for (rule, output) in enabled.iter().zip(outputs) {
            let Some(violations) = output else {
                result.faulted_rules.push(rule.name().to_string());
                continue;
            };
            let violations = self.apply_severity_override(rule.name(), violations);
            collector.extend(self.apply_allowances(*rule, &directives, violations));
        }

        result.violations = collector.finish(doc.len());
        result.files_checked = 1;

        debug!("Pass complete: {} violations", result.violations.len());
        result
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        rule_name: &str,
        mut violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if let Some(severity) = self.config.rule_severity(rule_name) {
            for v in &mut violations {
                v.severity = severity;
            }
        }
        violations
    }

    /// Drops violations covered by allow comments.
    ///
    /// An allowance without a reason for a rule that requires one is replaced
    /// by a warning about the missing reason.
    fn apply_allowances(
        &self,
        rule: &dyn Rule,
        directives: &AllowDirectives,
        violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if directives.is_empty() {
            return violations;
        }
        let names = [rule.name(), rule.code()];
        violations
            .into_iter()
            .filter_map(|v| {
                let check = directives.check(v.location.line, &names);
                if !check.is_allowed() {
                    return Some(v);
                }
                if rule.requires_allow_reason() && check.reason().is_none() {
                    return Some(
                        Violation::new(
                            rule.code(),
                            rule.name(),
                            Severity::Warning,
                            v.location,
                            format!(
                                "Allow directive for '{}' is missing required reason",
                                rule.name()
                            ),
                        )
                        .with_suggestion(Suggestion::new(
                            "Add reason=\"...\" to explain why this exception is necessary",
                        )),
                    );
                }
                None
            })
            .collect()
    }
}

/// Runs one rule, isolating panics so the rest of the pipeline continues.
fn run_isolated(rule: &dyn Rule, doc: &Document<'_>) -> Option<Vec<Violation>> {
    match catch_unwind(AssertUnwindSafe(|| rule.check(doc))) {
        Ok(violations) => Some(violations),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!("Rule {} faulted and was skipped: {}", rule.name(), message);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Location;

    struct Marquee;

    impl Rule for Marquee {
        fn name(&self) -> &'static str {
            "no-marquee"
        }
        fn code(&self) -> &'static str {
            "T001"
        }
        fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
            doc.elements_named("marquee")
                .map(|i| {
                    Violation::new(
                        self.code(),
                        self.name(),
                        self.default_severity(),
                        doc.open_tag_location(i),
                        "marquee is not accessible",
                    )
                })
                .collect()
        }
    }

    struct Faulty;

    impl Rule for Faulty {
        fn name(&self) -> &'static str {
            "faulty"
        }
        fn code(&self) -> &'static str {
            "T002"
        }
        fn check(&self, _doc: &Document<'_>) -> Vec<Violation> {
            panic!("rule bug");
        }
    }

    struct EveryElement;

    impl Rule for EveryElement {
        fn name(&self) -> &'static str {
            "every-element"
        }
        fn code(&self) -> &'static str {
            "T003"
        }
        fn default_severity(&self) -> Severity {
            Severity::Info
        }
        fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
            let mut out: Vec<Violation> = (0..doc.elements().len())
                .rev()
                .map(|i| {
                    Violation::new(
                        self.code(),
                        self.name(),
                        self.default_severity(),
                        doc.open_tag_location(i),
                        "element",
                    )
                })
                .collect();
            out.push(Violation::new(
                self.code(),
                self.name(),
                self.default_severity(),
                Location::new(0, 3, 1, 1),
                "element",
            ));
            out
        }
    }

    #[test]
    fn faulting_rule_does_not_abort_pipeline() {
        let analyzer = Analyzer::builder()
            .rule(Faulty)
            .rule(Marquee)
            .build()
            .unwrap();
        let result = analyzer.analyze("<marquee>x</marquee>");
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].rule, "no-marquee");
        assert_eq!(result.faulted_rules, vec!["faulty".to_string()]);
    }

    #[test]
    fn duplicate_rules_are_rejected() {
        let err = Analyzer::builder().rule(Marquee).rule(Marquee).build();
        assert!(matches!(err, Err(AnalyzerError::DuplicateRule { .. })));
    }

    #[test]
    fn disabled_rules_and_severity_overrides() {
        let config = Config::parse(
            r#"
[rules.no-marquee]
severity = "warning"

[rules.every-element]
enabled = false
"#,
        )
        .unwrap();
        let analyzer = Analyzer::builder()
            .rule(Marquee)
            .rule(EveryElement)
            .config(config)
            .build()
            .unwrap();
        let result = analyzer.analyze("<p><marquee>x</marquee></p>");
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].severity, Severity::Warning);
    }

    #[test]
    fn output_is_ordered_and_deduplicated() {
        let analyzer = Analyzer::builder().rule(EveryElement).build().unwrap();
        let result = analyzer.analyze("<p><b>x</b><i>y</i></p>");
        let offsets: Vec<usize> = result.violations.iter().map(|v| v.location.offset).collect();
        assert_eq!(offsets, vec![0, 3, 11]);
    }

    #[test]
    fn parallel_matches_sequential() {
        let text = "<p><marquee>a</marquee><b>b</b></p><marquee>c</marquee>";
        let sequential = Analyzer::builder()
            .rule(Marquee)
            .rule(EveryElement)
            .build()
            .unwrap()
            .analyze(text);
        let parallel = Analyzer::builder()
            .rule(Marquee)
            .rule(EveryElement)
            .parallel(true)
            .build()
            .unwrap()
            .analyze(text);
        assert_eq!(sequential.violations, parallel.violations);
    }

    #[test]
    fn allow_comments_suppress_and_demand_reasons() {
        let text = "<!-- aria-lint: allow(no-marquee) -->\n<marquee>a</marquee>\n<!-- aria-lint: allow(T001) reason=\"legacy banner\" -->\n<marquee>b</marquee>\n<marquee>c</marquee>";
        let analyzer = Analyzer::builder().rule(Marquee).build().unwrap();
        let result = analyzer.analyze(text);

        let lines: Vec<(usize, Severity)> = result
            .violations
            .iter()
            .map(|v| (v.location.line, v.severity))
            .collect();
        assert_eq!(lines, vec![(2, Severity::Warning), (5, Severity::Error)]);
        assert!(result.violations[0]
            .message
            .contains("missing required reason"));
    }

    #[test]
    fn allow_comments_can_be_ignored() {
        let text = "<!-- aria-lint: allow(all) reason=\"x\" -->\n<marquee>a</marquee>";
        let config = Config::parse("[analyzer]\nrespect_allow_comments = false").unwrap();
        let analyzer = Analyzer::builder()
            .rule(Marquee)
            .config(config)
            .build()
            .unwrap();
        assert_eq!(analyzer.analyze(text).violations.len(), 1);
    }
}
