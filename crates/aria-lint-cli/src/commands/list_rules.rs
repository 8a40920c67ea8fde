//! List rules command implementation.

use aria_lint::rules::{all_rules, Preset};

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<8} {:<22} {:<9} Description", "Code", "Name", "Severity");
    println!("{}", "-".repeat(90));

    for rule in all_rules() {
        println!(
            "{:<8} {:<22} {:<9} {}",
            rule.code(),
            rule.name(),
            rule.default_severity().to_string(),
            rule.description()
        );
    }

    println!("\nPresets:");
    for preset in [Preset::Recommended, Preset::Strict, Preset::Minimal] {
        let codes: Vec<&str> = preset.rules().iter().map(|r| r.code()).collect();
        let default = if preset == Preset::Recommended {
            " (default)"
        } else {
            ""
        };
        println!("  {:<12} - {}{default}", preset.as_str(), codes.join(", "));
    }

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  aria-lint check --rules tablist-selection,aria-reference");
    println!("  aria-lint check --rules AR001,AR003,AR004");
}
