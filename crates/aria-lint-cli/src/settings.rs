//! Run settings for `check` and `fix`.
//!
//! The config file is the first of:
//!
//! 1. `--config` (or `ARIA_LINT_CONFIG`), taken as given;
//! 2. `aria-lint.toml` or `.aria-lint.toml` in the checked directory or one
//!    of its ancestors, up to the repository root (the first directory with
//!    a `.git` entry);
//! 3. `config.toml` in `$ARIA_LINT_CONFIG_DIR`, else `~/.aria-lint/`.
//!
//! Without any of them the built-in defaults apply. A relative
//! `[analyzer] root` in a project or explicit file is read from that file's
//! directory, so `aria-lint check` works from any subdirectory.
//!
//! Flags win over the file: `--preset` and `--fail-on` replace `preset` and
//! `fail_on`, `--include` replaces the include globs, `--exclude` adds to
//! the exclude globs and `--rules` runs only the named rules.

use anyhow::{Context, Result};
use aria_lint::{find_config, Config, Linter};
use clap::Args;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::discover;

/// File name looked up in the global config directory.
const GLOBAL_CONFIG: &str = "config.toml";

/// Flags shared by `check` and `fix`.
#[derive(Debug, Clone, Default, Args)]
pub struct LintArgs {
    /// Template file or directory (default: `[analyzer] root`)
    pub path: Option<PathBuf>,

    /// Rule preset, replacing `preset` from the config
    #[arg(long)]
    pub preset: Option<String>,

    /// Lowest severity that fails the run, replacing `fail_on`
    #[arg(long)]
    pub fail_on: Option<String>,

    /// Run only these rules (names or codes, comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub rules: Vec<String>,

    /// Template globs, replacing `[analyzer] include` (repeatable)
    #[arg(short, long)]
    pub include: Vec<String>,

    /// Globs to skip in addition to `[analyzer] exclude` (repeatable)
    #[arg(short, long)]
    pub exclude: Vec<String>,
}

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Named on the command line.
    Flag(PathBuf),
    /// Found beside or above the templates.
    Project(PathBuf),
    /// The per-user fallback.
    Global(PathBuf),
    /// No file; built-in defaults.
    Builtin,
}

impl ConfigOrigin {
    /// Finds the config for templates under `start`.
    #[must_use]
    pub fn locate(start: &Path, flag: Option<&Path>) -> Self {
        let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
        Self::locate_with(&start, flag, global_dir())
    }

    fn locate_with(start: &Path, flag: Option<&Path>, global: Option<PathBuf>) -> Self {
        if let Some(path) = flag {
            return Self::Flag(path.to_path_buf());
        }

        for dir in start.ancestors() {
            if let Some(path) = find_config(dir) {
                return Self::Project(path);
            }
            if dir.join(".git").exists() {
                debug!("Stopped config lookup at repository root {}", dir.display());
                break;
            }
        }

        global
            .map(|dir| dir.join(GLOBAL_CONFIG))
            .filter(|path| path.is_file())
            .map_or(Self::Builtin, Self::Global)
    }

    /// The config file, unless defaults are used.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Flag(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Builtin => None,
        }
    }

    /// Directory that relative paths in the file are read from.
    fn base_dir(&self) -> Option<&Path> {
        match self {
            Self::Flag(p) | Self::Project(p) => p.parent(),
            Self::Global(_) | Self::Builtin => None,
        }
    }
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(p) | Self::Project(p) => write!(f, "{}", p.display()),
            Self::Global(p) => write!(f, "{} (global)", p.display()),
            Self::Builtin => f.write_str("built-in defaults"),
        }
    }
}

/// `$ARIA_LINT_CONFIG_DIR`, else `~/.aria-lint`.
fn global_dir() -> Option<PathBuf> {
    std::env::var_os("ARIA_LINT_CONFIG_DIR")
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|home| home.join(".aria-lint")))
}

/// Effective settings of one `check` or `fix` run.
#[derive(Debug)]
pub struct Settings {
    origin: ConfigOrigin,
    config: Config,
    target: PathBuf,
    preset: Option<String>,
    fail_on: Option<String>,
    only: Vec<String>,
}

impl Settings {
    /// Locates and loads the config for `args`, then applies the flags.
    pub fn load(args: &LintArgs, config_flag: Option<&Path>) -> Result<Self> {
        let start = match args.path.as_deref() {
            Some(path) if path.is_file() => path.parent().unwrap_or(Path::new(".")),
            Some(path) => path,
            None => Path::new("."),
        };
        let start = if start.as_os_str().is_empty() {
            Path::new(".")
        } else {
            start
        };
        Self::from_origin(args, ConfigOrigin::locate(start, config_flag))
    }

    fn from_origin(args: &LintArgs, origin: ConfigOrigin) -> Result<Self> {
        let mut config = match origin.path() {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => Config::default(),
        };
        debug!("Configuration: {origin}");

        if let Some(base) = origin.base_dir() {
            if config.analyzer.root.is_relative() {
                config.analyzer.root = base.join(&config.analyzer.root);
            }
        }
        if !args.include.is_empty() {
            config.analyzer.include.clone_from(&args.include);
        }
        config.analyzer.exclude.extend(args.exclude.iter().cloned());

        let target = args
            .path
            .clone()
            .unwrap_or_else(|| config.analyzer.root.clone());

        Ok(Self {
            origin,
            config,
            target,
            preset: args.preset.clone(),
            fail_on: args.fail_on.clone(),
            only: args
                .rules
                .iter()
                .map(|rule| rule.trim().to_string())
                .filter(|rule| !rule.is_empty())
                .collect(),
        })
    }

    /// Where the configuration came from.
    #[must_use]
    pub fn origin(&self) -> &ConfigOrigin {
        &self.origin
    }

    /// File or directory to lint.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Builds the linter, flags taking precedence over the file.
    pub fn linter(&self) -> Result<Linter> {
        let mut builder = Linter::builder()
            .config(self.config.clone())
            .only(self.only.iter().map(String::as_str));
        if let Some(preset) = &self.preset {
            builder = builder.preset(preset.as_str());
        }
        if let Some(fail_on) = &self.fail_on {
            builder = builder.fail_on(fail_on.as_str());
        }
        builder.build().context("Failed to build linter")
    }

    /// Templates under the target, filtered by the include and exclude globs.
    pub fn templates(&self) -> Result<Vec<PathBuf>> {
        discover::templates(&self.target, &self.config.analyzer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aria_lint::Severity;
    use std::fs;
    use tempfile::TempDir;

    fn repo() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().canonicalize().unwrap().join("site");
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("web/pages")).unwrap();
        (tmp, root)
    }

    #[test]
    fn nearest_config_above_the_templates_wins() {
        let (_tmp, root) = repo();
        fs::write(root.join("aria-lint.toml"), "").unwrap();
        let pages = root.join("web/pages");

        assert_eq!(
            ConfigOrigin::locate_with(&pages, None, None),
            ConfigOrigin::Project(root.join("aria-lint.toml"))
        );

        fs::write(root.join("web/.aria-lint.toml"), "").unwrap();
        assert_eq!(
            ConfigOrigin::locate_with(&pages, None, None),
            ConfigOrigin::Project(root.join("web/.aria-lint.toml"))
        );
    }

    #[test]
    fn lookup_stops_at_the_repository_root() {
        let (tmp, root) = repo();
        fs::write(tmp.path().join("aria-lint.toml"), "").unwrap();
        let global = TempDir::new().unwrap();

        let pages = root.join("web/pages");
        assert_eq!(
            ConfigOrigin::locate_with(&pages, None, Some(global.path().to_path_buf())),
            ConfigOrigin::Builtin
        );

        fs::write(global.path().join("config.toml"), "preset = \"minimal\"\n").unwrap();
        let origin = ConfigOrigin::locate_with(&pages, None, Some(global.path().to_path_buf()));
        assert_eq!(origin, ConfigOrigin::Global(global.path().join("config.toml")));
        assert!(origin.to_string().ends_with("(global)"));
    }

    #[test]
    fn flag_is_used_as_given() {
        let (_tmp, root) = repo();
        fs::write(root.join("aria-lint.toml"), "").unwrap();
        let flag = root.join("missing.toml");

        let origin = ConfigOrigin::locate_with(&root, Some(&flag), None);
        assert_eq!(origin, ConfigOrigin::Flag(flag));

        let err = Settings::from_origin(&LintArgs::default(), origin).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load config: "));
    }

    #[test]
    fn flags_take_precedence_over_the_file() {
        let (_tmp, root) = repo();
        let file = root.join("aria-lint.toml");
        fs::write(&file, "preset = \"minimal\"\nfail_on = \"warning\"\n").unwrap();

        let from_file =
            Settings::from_origin(&LintArgs::default(), ConfigOrigin::Project(file.clone()))
                .unwrap()
                .linter()
                .unwrap();
        assert_eq!(from_file.analyzer().rule_count(), 3);
        assert_eq!(from_file.fail_on(), Severity::Warning);

        let args = LintArgs {
            preset: Some("strict".into()),
            fail_on: Some("info".into()),
            ..LintArgs::default()
        };
        let overridden = Settings::from_origin(&args, ConfigOrigin::Project(file))
            .unwrap()
            .linter()
            .unwrap();
        assert_eq!(overridden.analyzer().rule_count(), 16);
        assert_eq!(overridden.fail_on(), Severity::Info);
    }

    #[test]
    fn rules_flag_selects_and_validates() {
        let args = LintArgs {
            rules: vec!["AR001".into(), " duplicate-id ".into(), String::new()],
            ..LintArgs::default()
        };
        let linter = Settings::from_origin(&args, ConfigOrigin::Builtin)
            .unwrap()
            .linter()
            .unwrap();
        assert_eq!(linter.analyzer().rule_count(), 2);

        let args = LintArgs {
            rules: vec!["AR999".into()],
            ..LintArgs::default()
        };
        let err = Settings::from_origin(&args, ConfigOrigin::Builtin)
            .unwrap()
            .linter()
            .unwrap_err();
        assert!(format!("{err:#}").contains("Unknown rule `AR999`"));
    }

    #[test]
    fn relative_root_is_read_from_the_config_directory() {
        let (_tmp, root) = repo();
        let file = root.join("aria-lint.toml");
        fs::write(&file, "[analyzer]\nroot = \"web\"\n").unwrap();

        let settings =
            Settings::from_origin(&LintArgs::default(), ConfigOrigin::Project(file.clone()))
                .unwrap();
        assert_eq!(settings.target(), root.join("web"));

        let args = LintArgs {
            path: Some(PathBuf::from("other")),
            ..LintArgs::default()
        };
        let settings = Settings::from_origin(&args, ConfigOrigin::Project(file)).unwrap();
        assert_eq!(settings.target(), Path::new("other"));
    }

    #[test]
    fn glob_flags_reach_discovery() {
        let (_tmp, root) = repo();
        fs::write(root.join("web/pages/index.vm"), "<p>a</p>").unwrap();
        fs::write(root.join("web/pages/draft.vm"), "<p>b</p>").unwrap();
        fs::write(root.join("web/pages/index.html"), "<p>c</p>").unwrap();

        let args = LintArgs {
            path: Some(root.join("web")),
            include: vec!["**/*.vm".into()],
            exclude: vec!["**/draft.vm".into()],
            ..LintArgs::default()
        };
        let settings = Settings::from_origin(&args, ConfigOrigin::Builtin).unwrap();
        assert_eq!(
            settings.templates().unwrap(),
            vec![root.join("web/pages/index.vm")]
        );
    }
}
