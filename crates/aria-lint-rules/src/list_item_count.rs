//! Rule flagging very long flat lists.
//!
//! Screen readers announce "list, N items"; long lists are tedious to
//! navigate without grouping. Heuristic, reported as `info`.
//!
//! # Configuration
//!
//! - `max_items`: largest allowed number of items (default: 50)

use aria_lint_core::utils::group_members;
use aria_lint_core::{Document, Rule, RuleConfig, Severity, Suggestion, Violation};

/// Rule code for list-item-count.
pub const CODE: &str = "AR011";

/// Rule name for list-item-count.
pub const NAME: &str = "list-item-count";

/// Default largest allowed number of items.
pub const DEFAULT_MAX_ITEMS: usize = 50;

/// Flags lists with too many items.
#[derive(Debug, Clone)]
pub struct ListItemCount {
    max_items: usize,
    severity: Severity,
}

impl Default for ListItemCount {
    fn default() -> Self {
        Self::new()
    }
}

impl ListItemCount {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            severity: Severity::Info,
        }
    }

    /// Sets the largest allowed number of items.
    #[must_use]
    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = max;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for ListItemCount {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags lists with more than max_items items"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn configure(&mut self, config: &RuleConfig) {
        let current = i64::try_from(self.max_items).unwrap_or(i64::MAX);
        let max = config.get_int("max_items", current);
        self.max_items = usize::try_from(max).unwrap_or(DEFAULT_MAX_ITEMS);
    }

    fn check(&self, doc: &Document<'_>) -> Vec<Violation> {
        doc.elements_with_role("list")
            .filter(|&list| doc.elements()[list].is_known_extent())
            .filter_map(|list| {
                let count = group_members(doc, list, &["listitem"], &["list"]).len();
                (count > self.max_items).then(|| {
                    Violation::new(
                        CODE,
                        NAME,
                        self.severity,
                        doc.open_tag_location(list),
                        format!("List has {count} items (maximum {})", self.max_items),
                    )
                    .with_suggestion(Suggestion::new(
                        "Split the list into groups with headings, or paginate it",
                    ))
                })
            })
            .collect()
    }
}
