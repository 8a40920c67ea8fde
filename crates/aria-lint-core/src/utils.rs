//! Utility functions for rule implementations.

pub mod allowance;
pub mod aria;

// Re-export commonly used utilities for rule implementations
#[doc(inline)]
pub use allowance::{AllowCheck, AllowDirectives};
#[doc(inline)]
pub use aria::{
    effective_tabindex, group_members, has_explicit_role, is_dynamic, is_focusable, is_hidden,
    is_true, parse_tabindex,
};
