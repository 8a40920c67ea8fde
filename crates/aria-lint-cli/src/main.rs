//! `aria-lint` command line.
//!
//! ```bash
//! aria-lint check [PATH] [--format pretty] [--preset strict] [--fail-on warning]
//! aria-lint fix [PATH] [--dry-run]
//! aria-lint list-rules
//! aria-lint init [--force]
//! ```
//!
//! `check` exits with status 1 when a violation reaches `fail_on`; `fix`
//! does the same for what is left after fixing.

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod discover;
mod settings;

use settings::{LintArgs, Settings};

/// Accessibility linter for server-rendered templates
#[derive(Parser)]
#[command(name = "aria-lint", author, version, about)]
struct Cli {
    /// Configuration file, skipping project and global lookup
    #[arg(short, long, global = true, env = "ARIA_LINT_CONFIG")]
    config: Option<PathBuf>,

    /// Log engine decisions (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report accessibility violations in templates
    Check {
        #[command(flatten)]
        lint: LintArgs,

        /// How violations are printed
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Apply the available fixes to templates in place
    Fix {
        #[command(flatten)]
        lint: LintArgs,

        /// Print what would change without writing files
        #[arg(long)]
        dry_run: bool,

        /// Fixes applied per file before giving up
        #[arg(long, default_value_t = aria_lint::DEFAULT_MAX_PASSES)]
        max_passes: usize,
    },

    /// Print the rules and presets
    ListRules,

    /// Write a starter aria-lint.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Grouped by rule, with help lines.
    #[default]
    Text,
    /// The aggregate result as JSON.
    Json,
    /// One line per violation.
    Compact,
    /// Annotated source snippets.
    Pretty,
}

/// `ARIA_LINT_LOG` when set, else a level from `-q` / `-v`.
fn log_filter(verbose: u8, quiet: bool) -> EnvFilter {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    EnvFilter::try_from_env("ARIA_LINT_LOG").unwrap_or_else(|_| EnvFilter::new(level))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, cli.quiet))
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Check { lint, format } => {
            let settings = Settings::load(&lint, cli.config.as_deref())?;
            commands::check::run(&settings, format)
        }
        Command::Fix {
            lint,
            dry_run,
            max_passes,
        } => {
            let settings = Settings::load(&lint, cli.config.as_deref())?;
            commands::fix::run(&settings, dry_run, max_passes)
        }
        Command::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
        Command::Init { force } => commands::init::run(force),
    }
}
