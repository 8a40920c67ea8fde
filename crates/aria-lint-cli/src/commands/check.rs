//! Check command implementation.

use anyhow::{Context, Result};
use aria_lint::Linter;
use rayon::prelude::*;
use std::path::PathBuf;

use super::output::{self, FileReport};
use crate::settings::Settings;
use crate::OutputFormat;

/// Runs the check command.
pub fn run(settings: &Settings, format: OutputFormat) -> Result<()> {
    let linter = settings.linter()?;
    let files = settings.templates()?;
    tracing::info!(
        "Checking {} template(s) under {} with {} rules (config: {})",
        files.len(),
        settings.target().display(),
        linter.analyzer().rule_count(),
        settings.origin()
    );

    let reports = lint_files(&linter, &files)?;
    output::print(&reports, format)?;

    if reports.iter().any(|r| linter.fails(&r.result)) {
        std::process::exit(1);
    }
    Ok(())
}

/// Lints every file on the rayon pool, keeping the input order.
pub fn lint_files(linter: &Linter, files: &[PathBuf]) -> Result<Vec<FileReport>> {
    files
        .par_iter()
        .map(|path| {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let result = linter.lint_str(&source).with_file(path);
            Ok(FileReport {
                path: path.clone(),
                source,
                result,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn reports_keep_file_order_and_paths() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.html");
        let b = tmp.path().join("b.html");
        fs::write(&a, r#"<div id="x"></div><div id="x"></div>"#).unwrap();
        fs::write(&b, "<p>fine</p>").unwrap();

        let linter = Linter::builder().build().unwrap();
        let reports = lint_files(&linter, &[a.clone(), b]).unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].result.violations.len(), 1);
        assert_eq!(reports[0].result.violations[0].location.file.as_ref(), Some(&a));
        assert!(linter.fails(&reports[0].result));
        assert!(reports[1].result.is_clean());
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let linter = Linter::builder().build().unwrap();
        let err = lint_files(&linter, &[tmp.path().join("gone.html")]).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));
    }
}
