//! Comment-based allowance directives.
//!
//! Supports directives like:
//! ```text
//! <!-- aria-lint: allow(tablist-selection) reason="selection set by script" -->
//! ```
//!
//! Template comment syntaxes (`{# ... #}`, `<%-- ... --%>`, `{{!-- ... --}}`)
//! are accepted as well. A directive applies to its own line and the next one.

use std::collections::{HashMap, HashSet};

/// Comment openers a directive may follow.
const COMMENT_OPENERS: &[&str] = &["<!--", "{#", "<%--", "{{!--", "{{!"];

/// Result of checking for allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Rule is not allowed.
    Denied,
    /// Rule is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed allowance directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowDirective {
    /// Rule names or codes that are allowed.
    pub rules: HashSet<String>,
    /// Optional reason for the allowance.
    pub reason: Option<String>,
}

impl AllowDirective {
    fn covers(&self, names: &[&str]) -> bool {
        self.rules.contains("all") || names.iter().any(|n| self.rules.contains(*n))
    }
}

/// Every directive of a document, keyed by 1-indexed line.
#[derive(Debug, Clone, Default)]
pub struct AllowDirectives {
    by_line: HashMap<usize, AllowDirective>,
}

impl AllowDirectives {
    /// Collects the directives of `content`.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let by_line = content
            .lines()
            .enumerate()
            .filter_map(|(i, line)| parse_allow_directive(line).map(|d| (i + 1, d)))
            .collect();
        Self { by_line }
    }

    /// Returns true if the document has no directives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }

    /// Checks whether a violation on `line` from a rule known by any of
    /// `names` (name, code) is allowed.
    #[must_use]
    pub fn check(&self, line: usize, names: &[&str]) -> AllowCheck {
        // Check the line itself and the line before
        for check_line in [line, line.saturating_sub(1)] {
            if check_line == 0 {
                continue;
            }
            if let Some(directive) = self.by_line.get(&check_line) {
                if directive.covers(names) {
                    return AllowCheck::Allowed {
                        reason: directive.reason.clone(),
                    };
                }
            }
        }
        AllowCheck::Denied
    }
}

/// Parses an allowance directive from a line.
#[must_use]
pub fn parse_allow_directive(line: &str) -> Option<AllowDirective> {
    let marker = line.find("aria-lint:")?;
    let before = line[..marker].trim_end();
    if !COMMENT_OPENERS.iter().any(|o| before.ends_with(o)) {
        return None;
    }

    let directive = line[marker + "aria-lint:".len()..].trim_start();
    let allow_content = directive.strip_prefix("allow(")?;

    // Find closing paren
    let paren_end = allow_content.find(')')?;
    let rules: HashSet<String> = allow_content[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if rules.is_empty() {
        return None;
    }

    // Parse optional reason
    let rest = allow_content[paren_end + 1..].trim_start();
    let reason = rest
        .strip_prefix("reason=")
        .and_then(|r| r.trim_start().strip_prefix('"'))
        .and_then(|r| r.find('"').map(|end| r[..end].trim().to_string()))
        .filter(|r| !r.is_empty());

    Some(AllowDirective { rules, reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allow_directive() {
        let directive = parse_allow_directive("<!-- aria-lint: allow(duplicate-id) -->").unwrap();
        assert!(directive.rules.contains("duplicate-id"));
        assert!(directive.reason.is_none());
    }

    #[test]
    fn test_parse_allow_directive_with_reason() {
        let directive = parse_allow_directive(
            r#"  <!-- aria-lint: allow(tablist-selection, AR002) reason="set by script" -->"#,
        )
        .unwrap();
        assert!(directive.rules.contains("tablist-selection"));
        assert!(directive.rules.contains("AR002"));
        assert_eq!(directive.reason.as_deref(), Some("set by script"));
    }

    #[test]
    fn test_template_comment_syntaxes() {
        assert!(parse_allow_directive("{# aria-lint: allow(all) #}").is_some());
        assert!(parse_allow_directive("<%-- aria-lint: allow(all) --%>").is_some());
        assert!(parse_allow_directive("{{!-- aria-lint: allow(all) --}}").is_some());
    }

    #[test]
    fn test_directive_outside_comment_is_ignored() {
        assert!(parse_allow_directive("<p>aria-lint: allow(all)</p>").is_none());
        assert!(parse_allow_directive("<!-- aria-lint: allow() -->").is_none());
        assert!(parse_allow_directive("<!-- aria-lint: deny(x) -->").is_none());
    }

    #[test]
    fn test_check_same_and_previous_line() {
        let content = "<div>\n<!-- aria-lint: allow(duplicate-id) -->\n<p id=\"x\"></p>\n<p id=\"x\"></p>\n</div>";
        let directives = AllowDirectives::parse(content);
        assert!(directives.check(2, &["duplicate-id"]).is_allowed());
        assert!(directives.check(3, &["duplicate-id", "AR004"]).is_allowed());
        assert!(!directives.check(4, &["duplicate-id"]).is_allowed());
        assert!(!directives.check(3, &["aria-reference"]).is_allowed());
    }

    #[test]
    fn test_all_and_codes() {
        let directives =
            AllowDirectives::parse("<!-- aria-lint: allow(all) reason=\"legacy markup\" -->\n<ul>");
        let check = directives.check(2, &["list-semantics", "AR012"]);
        assert_eq!(check.reason(), Some("legacy markup"));

        let directives = AllowDirectives::parse("<ul> <!-- aria-lint: allow(AR012) -->");
        assert!(directives.check(1, &["list-semantics", "AR012"]).is_allowed());
        assert_eq!(directives.check(1, &["AR012"]).reason(), None);
    }
}
