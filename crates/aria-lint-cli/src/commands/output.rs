//! Shared output formatting for lint results.

use anyhow::Result;
use aria_lint::{LintResult, Severity, ViolationDiagnostic};
use miette::{NamedSource, Report};
use std::path::PathBuf;

use crate::OutputFormat;

/// Lint result of one template, with the text it was computed from.
#[derive(Debug)]
pub struct FileReport {
    /// Template path.
    pub path: PathBuf,
    /// Template text.
    pub source: String,
    /// Violations, located in `path`.
    pub result: LintResult,
}

/// Print lint results in the specified format.
pub fn print(reports: &[FileReport], format: OutputFormat) -> Result<()> {
    let mut total = LintResult::new();
    for report in reports {
        total.extend(report.result.clone());
    }

    match format {
        OutputFormat::Text => print_text(&total),
        OutputFormat::Json => return print_json(&total),
        OutputFormat::Compact => print_compact(&total),
        OutputFormat::Pretty => print_pretty(reports, &total),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    for violation in &result.violations {
        let severity_indicator = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        println!(
            "{} {} at {}:{}:{}",
            violation.code,
            violation.rule,
            violation.location.display_file(),
            violation.location.line,
            violation.location.column,
        );
        println!("  {}: {}", severity_indicator, violation.message);
        for label in &violation.labels {
            println!(
                "  - {}:{}: {}",
                label.location.line, label.location.column, label.message
            );
        }
        for suggestion in &violation.suggestions {
            let marker = if suggestion.fix.is_some() { " (fixable)" } else { "" };
            println!("  = help: {}{marker}", suggestion.message);
        }
        println!();
    }

    print_summary(result);
}

fn print_summary(result: &LintResult) {
    let (errors, warnings, infos) = result.count_by_severity();

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, infos, result.files_checked
    );
    if !result.faulted_rules.is_empty() {
        println!(
            "\x1b[33mRules that faulted and were skipped: {}\x1b[0m",
            result.faulted_rules.join(", ")
        );
    }
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
}

fn print_pretty(reports: &[FileReport], total: &LintResult) {
    for report in reports {
        let name = report.path.display().to_string();
        for violation in &report.result.violations {
            let diagnostic = Report::new(ViolationDiagnostic::from(violation))
                .with_source_code(NamedSource::new(&name, report.source.clone()));
            println!("{diagnostic:?}");
        }
    }
    print_summary(total);
}
