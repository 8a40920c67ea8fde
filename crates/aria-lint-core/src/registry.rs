//! Explicit, per-engine rule registry.

use crate::analyzer::AnalyzerError;
use crate::rule::{Rule, RuleBox};

/// Ordered set of rules with unique names and codes.
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<RuleBox>,
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.name()))
            .finish()
    }
}

impl RuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::DuplicateRule`] if a rule with the same name
    /// or code is already registered.
    pub fn register(&mut self, rule: RuleBox) -> Result<(), AnalyzerError> {
        if let Some(existing) = self
            .rules
            .iter()
            .find(|r| r.name() == rule.name() || r.code() == rule.code())
        {
            return Err(AnalyzerError::DuplicateRule {
                name: rule.name().to_string(),
                existing: existing.name().to_string(),
            });
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Looks a rule up by name or code.
    #[must_use]
    pub fn get(&self, name_or_code: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.name() == name_or_code || r.code().eq_ignore_ascii_case(name_or_code))
            .map(AsRef::as_ref)
    }

    /// Returns true if a rule with this name or code is registered.
    #[must_use]
    pub fn contains(&self, name_or_code: &str) -> bool {
        self.get(name_or_code).is_some()
    }

    /// Registered rules in registration order.
    #[must_use]
    pub fn rules(&self) -> &[RuleBox] {
        &self.rules
    }

    /// Consumes the registry, returning its rules.
    #[must_use]
    pub fn into_rules(self) -> Vec<RuleBox> {
        self.rules
    }

    /// Mutable access for configuration.
    pub(crate) fn rules_mut(&mut self) -> &mut [RuleBox] {
        &mut self.rules
    }

    /// Keeps only rules matching `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&dyn Rule) -> bool) {
        self.rules.retain(|r| keep(r.as_ref()));
    }

    /// Iterates over the rules.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(AsRef::as_ref)
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl TryFrom<Vec<RuleBox>> for RuleRegistry {
    type Error = AnalyzerError;

    fn try_from(rules: Vec<RuleBox>) -> Result<Self, Self::Error> {
        let mut registry = Self::new();
        for rule in rules {
            registry.register(rule)?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::types::Violation;

    struct Named(&'static str, &'static str);

    impl Rule for Named {
        fn name(&self) -> &'static str {
            self.0
        }
        fn code(&self) -> &'static str {
            self.1
        }
        fn check(&self, _doc: &Document<'_>) -> Vec<Violation> {
            Vec::new()
        }
    }

    #[test]
    fn rejects_duplicate_names_and_codes() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(Named("a", "AR001"))).unwrap();
        assert!(matches!(
            registry.register(Box::new(Named("a", "AR002"))),
            Err(AnalyzerError::DuplicateRule { .. })
        ));
        assert!(matches!(
            registry.register(Box::new(Named("b", "AR001"))),
            Err(AnalyzerError::DuplicateRule { .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn looks_up_by_name_or_code() {
        let registry =
            RuleRegistry::try_from(vec![Box::new(Named("a", "AR001")) as RuleBox, Box::new(Named("b", "AR002"))])
                .unwrap();
        assert_eq!(registry.get("b").map(Rule::code), Some("AR002"));
        assert_eq!(registry.get("ar001").map(Rule::name), Some("a"));
        assert!(!registry.contains("c"));
        assert_eq!(registry.iter().map(Rule::name).collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
