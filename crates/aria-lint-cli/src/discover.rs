//! Template discovery.
//!
//! Walks a directory with `.gitignore` support and keeps files matching the
//! `[analyzer] include` globs and none of the `exclude` globs. Globs match
//! paths relative to the walked directory.

use anyhow::{bail, Context, Result};
use aria_lint::AnalyzerConfig;
use glob::{MatchOptions, Pattern};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Returns the templates to check under `path`, sorted.
///
/// A file path is returned as-is, whatever its extension.
pub fn templates(path: &Path, config: &AnalyzerConfig) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("No such file or directory: {}", path.display());
    }

    let include = compile(&config.include).context("Invalid include pattern")?;
    let exclude = compile(&config.exclude).context("Invalid exclude pattern")?;

    let mut builder = WalkBuilder::new(path);
    builder
        .hidden(false)
        .git_ignore(config.respect_gitignore)
        .git_global(config.respect_gitignore)
        .git_exclude(config.respect_gitignore)
        .require_git(false);

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let relative = entry.path().strip_prefix(path).unwrap_or(entry.path());
        if !matches_any(&include, relative) {
            continue;
        }
        if matches_any(&exclude, relative) {
            debug!("Excluding: {}", relative.display());
            continue;
        }
        files.push(entry.into_path());
    }

    files.sort();
    Ok(files)
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("`{p}`")))
        .collect()
}

fn matches_any(patterns: &[Pattern], path: &Path) -> bool {
    patterns
        .iter()
        .any(|p| p.matches_path_with(path, MATCH_OPTIONS))
}
