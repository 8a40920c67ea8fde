//! Evaluate/fix loop over one document.

use crate::analyzer::Analyzer;
use crate::fix::{apply_fix, FixError, FixOutcome, TextEdit};
use crate::types::LintResult;
use serde::Serialize;
use tracing::debug;

/// Default cap on fix passes for [`LintSession::fix_all`].
pub const DEFAULT_MAX_PASSES: usize = 32;

/// Summary of [`LintSession::fix_all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixReport {
    /// Number of fixes applied.
    pub applied: usize,
    /// Number of evaluate/apply passes run.
    pub passes: usize,
    /// Violations left after the last evaluation.
    pub remaining: usize,
    /// Whether the loop stopped because nothing fixable was left.
    pub converged: bool,
    /// Final document text.
    pub text: String,
}

impl FixReport {
    /// Returns true if any fix changed the text.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.applied > 0
    }
}

/// One document under edit.
///
/// Diagnostics are only valid for the text they were computed from: an
/// applied fix discards them, and the next [`LintSession::apply`] fails with
/// [`FixError::StaleDiagnostics`] until [`LintSession::evaluate`] runs again.
#[derive(Debug)]
pub struct LintSession<'a> {
    analyzer: &'a Analyzer,
    text: String,
    result: Option<LintResult>,
}

impl<'a> LintSession<'a> {
    /// Starts a session over `text`. Nothing is evaluated yet.
    #[must_use]
    pub fn new(analyzer: &'a Analyzer, text: impl Into<String>) -> Self {
        Self {
            analyzer,
            text: text.into(),
            result: None,
        }
    }

    /// Current text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consumes the session, returning the current text.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }

    /// Diagnostics of the current text, if evaluated since the last fix.
    #[must_use]
    pub fn result(&self) -> Option<&LintResult> {
        self.result.as_ref()
    }

    /// Returns true if diagnostics must be recomputed before applying a fix.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.result.is_none()
    }

    /// Runs the full pipeline over the current text.
    pub fn evaluate(&mut self) -> &LintResult {
        self.result.insert(self.analyzer.analyze(&self.text))
    }

    /// Applies fix `suggestion` of violation `violation`.
    ///
    /// An applied fix invalidates every diagnostic. A skipped fix leaves the
    /// text, and therefore the diagnostics, untouched.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::StaleDiagnostics`] if the diagnostics were
    /// invalidated, or an index/anchor error if the fix cannot be computed.
    pub fn apply(&mut self, violation: usize, suggestion: usize) -> Result<FixOutcome, FixError> {
        let result = self.result.as_ref().ok_or(FixError::StaleDiagnostics)?;
        let v = result
            .violations
            .get(violation)
            .ok_or(FixError::NoSuchViolation {
                index: violation,
                count: result.violations.len(),
            })?;
        let fix = v
            .suggestions
            .get(suggestion)
            .and_then(|s| s.fix.as_ref())
            .ok_or(FixError::NoSuchFix {
                violation,
                suggestion,
            })?;

        let outcome = apply_fix(&self.text, v.location.offset, fix, self.analyzer.filter())?;
        if let FixOutcome::Applied(edit) = &outcome {
            self.commit(edit)?;
        }
        Ok(outcome)
    }

    /// Repeatedly evaluates and applies the first applicable fix until no
    /// fixable violation remains or `max_passes` fixes were applied.
    pub fn fix_all(&mut self, max_passes: usize) -> FixReport {
        let mut applied = 0;
        let mut passes = 0;
        let mut converged = false;

        loop {
            self.evaluate();
            if passes >= max_passes {
                debug!("Stopping after {} fix passes", passes);
                break;
            }
            passes += 1;

            let Some(edit) = self.first_applicable_edit() else {
                converged = true;
                break;
            };
            let unchanged = edit
                .apply(&self.text)
                .map_or(true, |next| next == self.text);
            if unchanged || self.commit(&edit).is_err() {
                debug!("Fix at {:?} made no change; stopping", edit.range);
                converged = true;
                break;
            }
            applied += 1;
        }

        FixReport {
            applied,
            passes,
            remaining: self.result.as_ref().map_or(0, |r| r.violations.len()),
            converged,
            text: self.text.clone(),
        }
    }

    fn first_applicable_edit(&self) -> Option<TextEdit> {
        let result = self.result.as_ref()?;
        let filter = self.analyzer.filter();
        result.violations.iter().find_map(|v| {
            v.fixes().find_map(|fix| {
                match apply_fix(&self.text, v.location.offset, fix, filter) {
                    Ok(FixOutcome::Applied(edit)) => Some(edit),
                    Ok(FixOutcome::Skipped(_)) => None,
                    Err(e) => {
                        debug!("Ignoring fix from {}: {}", v.rule, e);
                        None
                    }
                }
            })
        })
    }

    fn commit(&mut self, edit: &TextEdit) -> Result<(), FixError> {
        self.text = edit.apply(&self.text)?;
        self.result = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::fix::FixDescriptor;
    use crate::rule::Rule;
    use crate::types::{Suggestion, Violation};

    /// Every `<img>` needs `alt`.
    struct ImgAlt;

    impl Rule for ImgAlt {
        fn name(&self) -> &'static str {
            "img-alt"
        }
        fn code(&self) -> &'static str {
            "T010"
        }
        fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
            doc.elements_named("img")
                .filter(|&i| !doc.elements()[i].has_attr("alt"))
                .map(|i| {
                    Violation::new(
                        self.code(),
                        self.name(),
                        self.default_severity(),
                        doc.open_tag_location(i),
                        "img needs alt",
                    )
                    .with_suggestion(Suggestion::new("describe the image"))
                    .with_suggestion(Suggestion::with_fix(
                        "mark as decorative",
                        FixDescriptor::AddAttributeIfAbsent {
                            name: "alt".into(),
                            value: String::new(),
                        },
                    ))
                })
                .collect()
        }
    }

    fn analyzer() -> Analyzer {
        Analyzer::builder().rule(ImgAlt).build().unwrap()
    }

    #[test]
    fn apply_requires_fresh_diagnostics() {
        let analyzer = analyzer();
        let mut session = LintSession::new(&analyzer, r#"<img src="a"><img src="b">"#);
        assert_eq!(session.apply(0, 1), Err(FixError::StaleDiagnostics));

        assert_eq!(session.evaluate().violations.len(), 2);
        assert!(session.apply(0, 1).unwrap().edit().is_some());
        assert!(session.is_stale());
        assert_eq!(session.apply(0, 1), Err(FixError::StaleDiagnostics));

        assert_eq!(session.evaluate().violations.len(), 1);
        session.apply(0, 1).unwrap();
        insta::assert_snapshot!(session.text(), @r#"<img src="a" alt><img src="b" alt>"#);
    }

    #[test]
    fn bad_indices_keep_diagnostics() {
        let analyzer = analyzer();
        let mut session = LintSession::new(&analyzer, r#"<img src="a">"#);
        session.evaluate();
        assert_eq!(
            session.apply(3, 0),
            Err(FixError::NoSuchViolation { index: 3, count: 1 })
        );
        assert_eq!(
            session.apply(0, 0),
            Err(FixError::NoSuchFix {
                violation: 0,
                suggestion: 0
            })
        );
        assert!(!session.is_stale());
    }

    #[test]
    fn fix_all_converges() {
        let analyzer = analyzer();
        let mut session = LintSession::new(&analyzer, "<p><img src=a><img src=b /></p>");
        let report = session.fix_all(DEFAULT_MAX_PASSES);
        assert_eq!(report.applied, 2);
        assert!(report.converged);
        assert_eq!(report.remaining, 0);
        insta::assert_snapshot!(report.text, @"<p><img src=a alt><img src=b alt /></p>");
    }

    #[test]
    fn fix_all_respects_pass_limit() {
        let analyzer = analyzer();
        let mut session = LintSession::new(&analyzer, "<img><img><img>");
        let report = session.fix_all(1);
        assert_eq!(report.applied, 1);
        assert!(!report.converged);
        assert_eq!(report.remaining, 2);
    }
}
