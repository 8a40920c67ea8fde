//! # aria-lint-rules
//!
//! Built-in accessibility rules for aria-lint.
//!
//! Each rule is a stateless check over one scanned [`Document`]: it reads
//! element spans, roles and the cross-reference index and reports
//! [`Violation`]s, some with a machine-applicable fix.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | AR001 | `tablist-selection` | Exactly one selected tab per tablist |
//! | AR002 | `tab-roving-focus` | Roving tabindex within tab groups |
//! | AR003 | `aria-reference` | `aria-controls` / `aria-labelledby` / `for` must resolve |
//! | AR004 | `duplicate-id` | Ids must be unique |
//! | AR005 | `panel-visibility` | Controlled panels agree with their controller's state |
//! | AR006 | `required-children` | Containers contain their item roles |
//! | AR007 | `required-parent` | Items sit inside their container role |
//! | AR008 | `aria-attribute-value` | Enumerated ARIA attributes hold legal values |
//! | AR009 | `required-state` | Roles carry their required state attributes |
//! | AR010 | `list-nesting-depth` | Lists nested too deeply (heuristic) |
//! | AR011 | `list-item-count` | Lists with too many items (heuristic) |
//! | AR012 | `list-semantics` | Ordered content in `<ul>` (heuristic) |
//! | AR013 | `landmark-uniqueness` | One main; repeated navigation is named |
//! | AR014 | `live-region` | Live region politeness and visibility |
//! | AR015 | `hidden-focusable` | No `aria-hidden` on focusable content |
//! | AR016 | `heading-order` | Heading levels do not skip |
//!
//! ## Usage
//!
//! ```ignore
//! use aria_lint_core::Analyzer;
//! use aria_lint_rules::{AriaReference, TablistSelection};
//!
//! let analyzer = Analyzer::builder()
//!     .rule(TablistSelection::new())
//!     .rule(AriaReference::new())
//!     .build()?;
//! ```
//!
//! [`Document`]: aria_lint_core::Document

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod aria_attribute_value;
mod aria_reference;
mod duplicate_id;
mod heading_order;
mod hidden_focusable;
mod landmark_uniqueness;
mod list_item_count;
mod list_nesting_depth;
mod list_semantics;
mod live_region;
mod panel_visibility;
mod presets;
mod required_children;
mod required_parent;
mod required_state;
mod tab_roving_focus;
mod tablist_selection;

pub use aria_attribute_value::AriaAttributeValue;
pub use aria_reference::AriaReference;
pub use duplicate_id::DuplicateId;
pub use heading_order::HeadingOrder;
pub use hidden_focusable::HiddenFocusable;
pub use landmark_uniqueness::LandmarkUniqueness;
pub use list_item_count::ListItemCount;
pub use list_nesting_depth::ListNestingDepth;
pub use list_semantics::{Classification, ContentKind, ListSemantics};
pub use live_region::LiveRegion;
pub use panel_visibility::PanelVisibility;
pub use presets::{all_rules, minimal_rules, recommended_rules, strict_rules, Preset};
pub use required_children::RequiredChildren;
pub use required_parent::RequiredParent;
pub use required_state::RequiredState;
pub use tab_roving_focus::TabRovingFocus;
pub use tablist_selection::TablistSelection;

/// Re-export core types for convenience.
pub use aria_lint_core::{Rule, RuleBox, Severity, Violation};

/// Looks up a built-in rule by name or code (case-insensitive for codes).
#[must_use]
pub fn rule_by_name(name: &str) -> Option<RuleBox> {
    all_rules()
        .into_iter()
        .find(|r| r.name() == name || r.code().eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_and_codes_are_unique() {
        let rules = all_rules();
        let names: HashSet<&str> = rules.iter().map(|r| r.name()).collect();
        let codes: HashSet<&str> = rules.iter().map(|r| r.code()).collect();
        assert_eq!(names.len(), rules.len());
        assert_eq!(codes.len(), rules.len());
        assert!(rules.iter().all(|r| !r.description().is_empty()));
    }

    #[test]
    fn lookup_by_name_or_code() {
        assert_eq!(rule_by_name("duplicate-id").map(|r| r.code()), Some("AR004"));
        assert_eq!(rule_by_name("ar012").map(|r| r.name()), Some("list-semantics"));
        assert!(rule_by_name("no-such-rule").is_none());
    }
}
