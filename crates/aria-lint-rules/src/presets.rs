//! Rule presets for common configurations.

use crate::{
    AriaAttributeValue, AriaReference, DuplicateId, HeadingOrder, HiddenFocusable,
    LandmarkUniqueness, ListItemCount, ListNestingDepth, ListSemantics, LiveRegion,
    PanelVisibility, RequiredChildren, RequiredParent, RequiredState, TabRovingFocus,
    TablistSelection,
};
use aria_lint_core::RuleBox;
use std::str::FromStr;

/// Preset configurations for aria-lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Every correctness rule.
    Recommended,
    /// Correctness rules plus the list heuristics.
    Strict,
    /// Broken references and invalid values only, for gradual adoption.
    Minimal,
}

impl Preset {
    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        match self {
            Self::Recommended => recommended_rules(),
            Self::Strict => strict_rules(),
            Self::Minimal => minimal_rules(),
        }
    }

    /// Preset name as written in configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::Strict => "strict",
            Self::Minimal => "minimal",
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recommended" => Ok(Self::Recommended),
            "strict" => Ok(Self::Strict),
            "minimal" => Ok(Self::Minimal),
            other => Err(format!(
                "unknown preset '{other}' (expected recommended, strict or minimal)"
            )),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the recommended set of rules.
///
/// Includes every correctness rule: AR001-AR009 and AR013-AR016.
#[must_use]
pub fn recommended_rules() -> Vec<RuleBox> {
    vec![
        Box::new(TablistSelection::new()),
        Box::new(TabRovingFocus::new()),
        Box::new(AriaReference::new()),
        Box::new(DuplicateId::new()),
        Box::new(PanelVisibility::new()),
        Box::new(RequiredChildren::new()),
        Box::new(RequiredParent::new()),
        Box::new(AriaAttributeValue::new()),
        Box::new(RequiredState::new()),
        Box::new(LandmarkUniqueness::new()),
        Box::new(LiveRegion::new()),
        Box::new(HiddenFocusable::new()),
        Box::new(HeadingOrder::new()),
    ]
}

/// Returns the strict set of rules.
///
/// Includes all recommended rules plus the list heuristics:
/// - `list-nesting-depth` (AR010)
/// - `list-item-count` (AR011)
/// - `list-semantics` (AR012)
#[must_use]
pub fn strict_rules() -> Vec<RuleBox> {
    all_rules()
}

/// Returns the minimal set of rules.
///
/// For gradual adoption, only includes:
/// - `aria-reference` (AR003)
/// - `duplicate-id` (AR004)
/// - `aria-attribute-value` (AR008)
#[must_use]
pub fn minimal_rules() -> Vec<RuleBox> {
    vec![
        Box::new(AriaReference::new()),
        Box::new(DuplicateId::new()),
        Box::new(AriaAttributeValue::new()),
    ]
}

/// Returns all available rules, in code order.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(TablistSelection::new()),
        Box::new(TabRovingFocus::new()),
        Box::new(AriaReference::new()),
        Box::new(DuplicateId::new()),
        Box::new(PanelVisibility::new()),
        Box::new(RequiredChildren::new()),
        Box::new(RequiredParent::new()),
        Box::new(AriaAttributeValue::new()),
        Box::new(RequiredState::new()),
        Box::new(ListNestingDepth::new()),
        Box::new(ListItemCount::new()),
        Box::new(ListSemantics::new()),
        Box::new(LandmarkUniqueness::new()),
        Box::new(LiveRegion::new()),
        Box::new(HiddenFocusable::new()),
        Box::new(HeadingOrder::new()),
    ]
}
