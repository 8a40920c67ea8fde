//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = r#"# aria-lint configuration

# recommended | strict | minimal
preset = "recommended"

# Exit with status 1 when a violation at or above this severity is found
fail_on = "error"

[analyzer]
# Directory checked when no path is given
# root = "./src/main/webapp"

# Template files to check
# include = ["**/*.html", "**/*.jsp", "**/*.erb", "**/*.hbs", "**/*.njk"]

# Glob patterns to exclude from analysis
exclude = [
    "**/node_modules/**",
    "**/target/**",
    "**/vendor/**",
]

# Respect .gitignore files
respect_gitignore = true

# Honor <!-- aria-lint: allow(rule) reason="..." --> comments
respect_allow_comments = true

[filter]
# Blank template control-flow tags such as <c:forEach> before scanning
enabled = true
prefixes = ["c", "fn", "fmt", "jsp", "th", "ui", "tiles"]

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.required-parent]
# Fragments rendered into a list elsewhere start with a bare <li>
ignore_top_level = false

# [rules.list-nesting-depth]
# max_depth = 3

# [rules.list-item-count]
# max_items = 50

# [rules.list-semantics]
# severity = "warning"
# threshold_percent = 60
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let path = write_config(Path::new("."), force)?;

    println!("Created {}", path.display());
    println!("\nNext steps:");
    println!("  1. Edit aria-lint.toml to configure rules");
    println!("  2. Run: aria-lint check");

    Ok(())
}

fn write_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join("aria-lint.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aria_lint::{Config, Linter};
    use tempfile::TempDir;

    #[test]
    fn default_config_builds_a_linter() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.preset.as_deref(), Some("recommended"));
        assert!(config.filter.enabled);
        assert!(Linter::from_config(config).is_ok());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("aria-lint.toml"), "preset = \"strict\"\n").unwrap();

        assert!(write_config(tmp.path(), false).is_err());
        let path = write_config(tmp.path(), true).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), DEFAULT_CONFIG);
    }
}
