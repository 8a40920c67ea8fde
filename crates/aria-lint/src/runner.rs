//! Turns a [`Config`] into a ready-to-use [`Linter`].
//!
//! The runner resolves the preset, validates rule names, applies `fail_on`
//! and offers one-call helpers for linting and fixing strings.

use aria_lint_core::{
    Analyzer, AnalyzerError, Config, ConfigError, FixReport, LintResult, LintSession, Severity,
    DEFAULT_MAX_PASSES,
};
use aria_lint_rules::{all_rules, Preset};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Config file names searched in a project directory, in priority order.
pub const CONFIG_CANDIDATES: &[&str] = &["aria-lint.toml", ".aria-lint.toml"];

/// Errors raised while assembling a [`Linter`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// The configuration could not be read or parsed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The preset name is not one of the built-in presets.
    #[error("Unknown preset `{name}`. Valid presets: recommended, strict, minimal")]
    UnknownPreset {
        /// Preset name as written.
        name: String,
    },

    /// A rule name or code does not match any built-in rule.
    #[error("Unknown rule `{name}`. Run `aria-lint list-rules` for the available rules")]
    UnknownRule {
        /// Rule name as written.
        name: String,
    },

    /// The `fail_on` value is not a severity.
    #[error("Unknown severity `{name}`. Valid values: error, warning, info")]
    UnknownSeverity {
        /// Severity as written.
        name: String,
    },

    /// The analyzer rejected the rule set.
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
}

/// Builder for a [`Linter`].
///
/// Explicit settings take precedence over the configuration file, which
/// takes precedence over the defaults (`recommended`, fail on `error`).
#[derive(Debug, Default)]
pub struct LinterBuilder {
    config: Config,
    preset: Option<String>,
    fail_on: Option<String>,
    only: Vec<String>,
}

impl LinterBuilder {
    /// Uses `config` as the base configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Overrides the configured preset.
    #[must_use]
    pub fn preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    /// Overrides the configured `fail_on` severity.
    #[must_use]
    pub fn fail_on(mut self, severity: impl Into<String>) -> Self {
        self.fail_on = Some(severity.into());
        self
    }

    /// Restricts the run to the named rules (names or codes), regardless of preset.
    #[must_use]
    pub fn only<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only.extend(rules.into_iter().map(Into::into));
        self
    }

    /// Builds the linter.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown preset, rule or severity, or if the
    /// analyzer cannot be built.
    pub fn build(self) -> Result<Linter, LoadError> {
        let preset = resolve_preset(self.preset.as_deref(), &self.config)?;
        let fail_on = resolve_fail_on(self.fail_on.as_deref(), &self.config)?;
        check_rule_names(self.config.rules.keys())?;
        check_rule_names(self.only.iter())?;

        let rules = if self.only.is_empty() {
            preset.rules()
        } else {
            all_rules()
                .into_iter()
                .filter(|r| {
                    self.only
                        .iter()
                        .any(|n| n == r.name() || n.eq_ignore_ascii_case(r.code()))
                })
                .collect()
        };
        debug!("Preset {preset}: {} rule(s), fail on {fail_on}", rules.len());

        let analyzer = Analyzer::builder()
            .rules(rules)
            .config(self.config)
            .build()?;
        Ok(Linter { analyzer, fail_on })
    }
}

/// A configured analyzer plus the severity that fails a run.
#[derive(Debug)]
pub struct Linter {
    analyzer: Analyzer,
    fail_on: Severity,
}

impl Linter {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> LinterBuilder {
        LinterBuilder::default()
    }

    /// Creates a linter from a configuration, honoring its preset and `fail_on`.
    ///
    /// # Errors
    ///
    /// See [`LinterBuilder::build`].
    pub fn from_config(config: Config) -> Result<Self, LoadError> {
        Self::builder().config(config).build()
    }

    /// Creates a linter from the first config file found in `dir`, or the
    /// defaults if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be loaded.
    pub fn discover(dir: &Path) -> Result<Self, LoadError> {
        let config = match find_config(dir) {
            Some(path) => {
                debug!("Using config {}", path.display());
                Config::from_file(&path)?
            }
            None => Config::default(),
        };
        Self::from_config(config)
    }

    /// The underlying analyzer.
    #[must_use]
    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Severity at which a run fails.
    #[must_use]
    pub fn fail_on(&self) -> Severity {
        self.fail_on
    }

    /// Lints one template.
    #[must_use]
    pub fn lint_str(&self, text: &str) -> LintResult {
        self.analyzer.analyze(text)
    }

    /// Applies fixes to one template until it settles.
    #[must_use]
    pub fn fix_str(&self, text: &str, max_passes: usize) -> FixReport {
        LintSession::new(&self.analyzer, text).fix_all(max_passes)
    }

    /// Opens a fix session over one template.
    #[must_use]
    pub fn session(&self, text: impl Into<String>) -> LintSession<'_> {
        LintSession::new(&self.analyzer, text)
    }

    /// Whether `result` contains a violation at or above `fail_on`.
    #[must_use]
    pub fn fails(&self, result: &LintResult) -> bool {
        result.has_violations_at(self.fail_on)
    }
}

/// Returns the first config candidate that exists in `dir`.
#[must_use]
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

fn default_linter() -> Linter {
    match Linter::from_config(Config::default()) {
        Ok(linter) => linter,
        Err(e) => unreachable!("default configuration is valid: {e}"),
    }
}

/// Lints `text` with the recommended preset.
#[must_use]
pub fn lint_str(text: &str) -> LintResult {
    default_linter().lint_str(text)
}

/// Fixes `text` with the recommended preset.
#[must_use]
pub fn fix_str(text: &str) -> FixReport {
    default_linter().fix_str(text, DEFAULT_MAX_PASSES)
}

/// Lints `text` with the project configuration and panics with a report if
/// it has violations at or above `fail_on`.
///
/// Intended for `cargo test`: the config is looked up from
/// `CARGO_MANIFEST_DIR` (or the current directory).
///
/// # Panics
///
/// Panics if the configuration cannot be loaded or violations are found.
pub fn assert_accessible(text: &str) {
    let root = std::env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let linter = Linter::discover(&root).unwrap_or_else(|e| panic!("aria-lint: {e}"));
    let result = linter.lint_str(text);
    if linter.fails(&result) {
        panic!("{}", result.format_test_report(linter.fail_on()));
    }
}

/// Resolves the effective preset from explicit arg > config > default.
fn resolve_preset(explicit: Option<&str>, config: &Config) -> Result<Preset, LoadError> {
    let name = explicit
        .or(config.preset.as_deref())
        .unwrap_or("recommended");
    name.parse().map_err(|_| LoadError::UnknownPreset {
        name: name.to_string(),
    })
}

/// Resolves the effective `fail_on` severity from explicit arg > config > default.
fn resolve_fail_on(explicit: Option<&str>, config: &Config) -> Result<Severity, LoadError> {
    let name = explicit.or(config.fail_on.as_deref()).unwrap_or("error");
    name.parse().map_err(|_| LoadError::UnknownSeverity {
        name: name.to_string(),
    })
}

fn check_rule_names<'a>(names: impl Iterator<Item = &'a String>) -> Result<(), LoadError> {
    let known = all_rules();
    for name in names {
        if !known
            .iter()
            .any(|r| r.name() == name || r.code().eq_ignore_ascii_case(name))
        {
            return Err(LoadError::UnknownRule { name: name.clone() });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_preset_defaults_to_recommended() {
        let config = Config::default();
        assert_eq!(resolve_preset(None, &config).unwrap(), Preset::Recommended);
    }

    #[test]
    fn resolve_preset_explicit_takes_precedence() {
        let mut config = Config::default();
        config.preset = Some("minimal".to_string());
        assert_eq!(resolve_preset(Some("strict"), &config).unwrap(), Preset::Strict);
        assert_eq!(resolve_preset(None, &config).unwrap(), Preset::Minimal);
    }

    #[test]
    fn resolve_preset_invalid() {
        let err = resolve_preset(Some("nonexistent"), &Config::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnknownPreset { ref name } if name == "nonexistent"));
    }

    #[test]
    fn resolve_fail_on_precedence() {
        let mut config = Config::default();
        assert_eq!(resolve_fail_on(None, &config).unwrap(), Severity::Error);

        config.fail_on = Some("info".to_string());
        assert_eq!(resolve_fail_on(None, &config).unwrap(), Severity::Info);
        assert_eq!(resolve_fail_on(Some("warning"), &config).unwrap(), Severity::Warning);
        assert!(resolve_fail_on(Some("critical"), &config).is_err());
    }

    #[test]
    fn unknown_rule_blocks_are_rejected() {
        let config = Config::parse("[rules.no-such-rule]\nenabled = false\n").unwrap();
        let err = Linter::from_config(config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown rule `no-such-rule`. Run `aria-lint list-rules` for the available rules"
        );
    }

    #[test]
    fn only_selects_by_name_or_code() {
        let linter = Linter::builder()
            .only(["duplicate-id", "ar016"])
            .build()
            .unwrap();
        assert_eq!(linter.analyzer().rule_count(), 2);
        assert!(Linter::builder().only(["nope"]).build().is_err());
    }

    #[test]
    fn fail_on_controls_failure() {
        let text = "<h1>a</h1><h3>b</h3>";
        let strict = Linter::builder().fail_on("warning").build().unwrap();
        assert!(strict.fails(&strict.lint_str(text)));

        let lenient = Linter::from_config(Config::default()).unwrap();
        assert!(!lenient.fails(&lenient.lint_str(text)));
    }

    #[test]
    fn discover_reads_project_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".aria-lint.toml"), "preset = \"minimal\"\n").unwrap();
        let linter = Linter::discover(dir.path()).unwrap();
        assert_eq!(linter.analyzer().rule_count(), 3);

        std::fs::write(dir.path().join("aria-lint.toml"), "preset = \"strict\"\n").unwrap();
        let linter = Linter::discover(dir.path()).unwrap();
        assert_eq!(linter.analyzer().rule_count(), 16);
    }
}
