//! Rule requiring item roles to appear inside their container role.
//!
//! # Detected Patterns
//!
//! - `tab` outside a `tablist`
//! - `li` / `listitem` outside a `list`
//! - explicit `option` outside a `listbox`
//! - `menuitem*` outside a `menu` or `menubar`
//! - `treeitem` outside a `tree`
//!
//! The context is the nearest ancestor that has a role; generic wrappers
//! (including control-flow tags left by the template) are transparent. An
//! orphan `li` can be fixed by wrapping it in `<ul>`. Items opened after a
//! crossed close tag are skipped, since their real container is unknown.
//!
//! # Configuration
//!
//! - `ignore_top_level`: skip items with no ancestor role at all, for
//!   template fragments included into a container elsewhere (default: false)

use aria_lint_core::utils::has_explicit_role;
use aria_lint_core::{
    Document, ElementSpan, FixDescriptor, Rule, RuleConfig, Severity, Suggestion, Violation,
};

/// Rule code for required-parent.
pub const CODE: &str = "AR007";

/// Rule name for required-parent.
pub const NAME: &str = "required-parent";

/// Item role and the roles of its permitted containers.
const REQUIRED_PARENT: &[(&str, &[&str])] = &[
    ("tab", &["tablist"]),
    ("listitem", &["list", "directory"]),
    ("option", &["listbox", "group"]),
    ("menuitem", &["menu", "menubar", "group"]),
    ("menuitemcheckbox", &["menu", "menubar", "group"]),
    ("menuitemradio", &["menu", "menubar", "group"]),
    ("treeitem", &["tree", "group"]),
];

/// Roles that do not establish a context.
const TRANSPARENT_ROLES: &[&str] = &["none", "presentation", "generic"];

/// Requires items to be contained in their container role.
#[derive(Debug, Clone)]
pub struct RequiredParent {
    severity: Severity,
    ignore_top_level: bool,
}

impl Default for RequiredParent {
    fn default() -> Self {
        Self::new()
    }
}

impl RequiredParent {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Warning,
            ignore_top_level: false,
        }
    }

    /// Skips items that have no ancestor role at all.
    #[must_use]
    pub fn ignore_top_level(mut self, ignore: bool) -> Self {
        self.ignore_top_level = ignore;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// Native `<option>` is governed by `select`/`datalist`, not ARIA context.
fn applies_to(element: &ElementSpan, role: &str) -> bool {
    role != "option" || has_explicit_role(element, "option")
}

fn context_role<'d>(doc: &'d Document<'_>, idx: usize) -> Option<(usize, &'d str)> {
    doc.ancestors(idx).find_map(|a| {
        doc.elements()[a]
            .role
            .as_deref()
            .filter(|r| !TRANSPARENT_ROLES.contains(r))
            .map(|r| (a, r))
    })
}

impl Rule for RequiredParent {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires tabs, list items and menu items to be inside their container role"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn configure(&mut self, config: &RuleConfig) {
        self.ignore_top_level = config.get_bool("ignore_top_level", self.ignore_top_level);
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (idx, element) in doc.elements().iter().enumerate() {
            let Some(role) = element.role.as_deref() else {
                continue;
            };
            let Some((_, parents)) = REQUIRED_PARENT.iter().find(|(r, _)| *r == role) else {
                continue;
            };
            if !applies_to(element, role) || element.detached {
                continue;
            }

            let context = context_role(doc, idx);
            if context.is_some_and(|(_, r)| parents.contains(&r)) {
                continue;
            }
            if context.is_none() && self.ignore_top_level {
                continue;
            }

            let found = context.map_or_else(
                || "no container".to_string(),
                |(_, r)| format!("role \"{r}\""),
            );
            let mut violation = Violation::new(
                CODE,
                NAME,
                self.severity,
                doc.open_tag_location(idx),
                format!(
                    "Element with role \"{role}\" must be contained in an element with role \"{}\" (found {found})",
                    parents[0]
                ),
            );
            violation = if element.tag_name == "li" && element.is_known_extent() {
                violation.with_suggestion(Suggestion::with_fix(
                    "Wrap the item in <ul>",
                    FixDescriptor::WrapRange {
                        tag: "ul".into(),
                        attrs: Vec::new(),
                    },
                ))
            } else {
                violation.with_suggestion(Suggestion::new(format!(
                    "Move the element into a \"{}\" container",
                    parents[0]
                )))
            };
            violations.push(violation);
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aria_lint_core::{apply_fix, NoopFilter};

    fn check(text: &str) -> Vec<Violation> {
        RequiredParent::new().check(&Document::parse(text))
    }

    #[test]
    fn items_in_their_containers_pass() {
        let text = r#"<ul><li>a</li></ul>
<div role="tablist"><div class="wrap"><button role="tab">t</button></div></div>
<div role="menu"><div role="group"><div role="menuitem">m</div></div></div>
<select><option>x</option></select>
<div role="listbox"><div role="option">o</div></div>"#;
        assert!(check(text).is_empty());
    }

    #[test]
    fn orphan_tab_names_the_wrong_context() {
        let v = check(r#"<nav><a role="tab" href="/">t</a></nav>"#);
        assert_eq!(v.len(), 1);
        assert_eq!(
            v[0].message,
            "Element with role \"tab\" must be contained in an element with role \"tablist\" (found role \"navigation\")"
        );
        assert!(!v[0].is_fixable());
    }

    #[test]
    fn orphan_list_item_wraps_in_ul() {
        let text = "<div><li>only</li></div>";
        let v = check(text);
        assert_eq!(v.len(), 1);
        let fix = v[0].fixes().next().unwrap();
        let edit = apply_fix(text, v[0].location.offset, fix, &NoopFilter)
            .unwrap()
            .edit()
            .cloned()
            .unwrap();
        insta::assert_snapshot!(edit.apply(text).unwrap(), @"<div><ul><li>only</li></ul></div>");
    }

    #[test]
    fn top_level_items_can_be_ignored() {
        let text = "<li>fragment</li>";
        assert_eq!(check(text).len(), 1);
        let mut rule = RequiredParent::new();
        let config: RuleConfig = toml::from_str("ignore_top_level = true").unwrap();
        rule.configure(&config);
        assert!(rule.check(&Document::parse(text)).is_empty());
    }

    #[test]
    fn items_after_a_crossed_close_are_skipped() {
        assert!(check("<ul><li>a</li></div><li>b</li></ul>").is_empty());
        assert_eq!(check("<ul><li>a</li></ul><li>b</li>").len(), 1);
    }
}
