//! Fix command implementation.

use anyhow::{Context, Result};
use aria_lint::{FixReport, Linter};
use rayon::prelude::*;
use std::path::PathBuf;

use crate::settings::Settings;

/// Runs the fix command.
pub fn run(settings: &Settings, dry_run: bool, max_passes: usize) -> Result<()> {
    let linter = settings.linter()?;
    let files = settings.templates()?;
    tracing::info!(
        "Fixing {} template(s) under {} (config: {})",
        files.len(),
        settings.target().display(),
        settings.origin()
    );

    let outcomes = fix_files(&linter, &files, max_passes, dry_run)?;

    let verb = if dry_run { "Would fix" } else { "Fixed" };
    let mut applied = 0;
    let mut changed = 0;
    let mut failing = false;
    for (path, report) in &outcomes {
        if !report.converged {
            tracing::warn!(
                "{}: fixes did not settle within {max_passes} passes",
                path.display()
            );
        }
        if report.changed() {
            changed += 1;
            applied += report.applied;
            println!(
                "{verb} {}: {} fix(es), {} violation(s) remaining",
                path.display(),
                report.applied,
                report.remaining
            );
        }
        failing |= linter.fails(&linter.lint_str(&report.text));
    }
    println!(
        "{verb} {applied} issue(s) in {changed} of {} file(s)",
        outcomes.len()
    );

    if failing {
        std::process::exit(1);
    }
    Ok(())
}

/// Fixes every file on the rayon pool and writes the changed ones.
fn fix_files(
    linter: &Linter,
    files: &[PathBuf],
    max_passes: usize,
    dry_run: bool,
) -> Result<Vec<(PathBuf, FixReport)>> {
    files
        .par_iter()
        .map(|path| {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let report = linter.fix_str(&text, max_passes);
            if report.changed() && !dry_run {
                std::fs::write(path, &report.text)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::debug!("Wrote {}", path.display());
            }
            Ok((path.clone(), report))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const BROKEN: &str = r#"<div role="switch" tabindex="0">Dark mode</div>"#;

    #[test]
    fn writes_fixed_files() {
        let tmp = TempDir::new().unwrap();
        let page = tmp.path().join("settings.html");
        fs::write(&page, BROKEN).unwrap();

        let linter = Linter::builder().build().unwrap();
        let outcomes = fix_files(&linter, &[page.clone()], 8, false).unwrap();

        assert_eq!(outcomes[0].1.applied, 1);
        assert_eq!(
            fs::read_to_string(&page).unwrap(),
            r#"<div role="switch" tabindex="0" aria-checked="false">Dark mode</div>"#
        );
    }

    #[test]
    fn dry_run_leaves_files_alone() {
        let tmp = TempDir::new().unwrap();
        let page = tmp.path().join("settings.html");
        fs::write(&page, BROKEN).unwrap();

        let linter = Linter::builder().build().unwrap();
        let outcomes = fix_files(&linter, &[page.clone()], 8, true).unwrap();

        assert!(outcomes[0].1.changed());
        assert_eq!(fs::read_to_string(&page).unwrap(), BROKEN);
    }
}
