//! # aria-lint
//!
//! Accessibility linter for server-rendered templates (JSP, ERB, Jinja,
//! Handlebars, plain HTML). Checks ARIA roles, states and id relationships
//! without building a DOM, and repairs what can be repaired mechanically.
//!
//! This is the facade crate that re-exports core functionality and rules.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! let result = aria_lint::lint_str(r#"<div role="tablist"><div role="tab">A</div></div>"#);
//! for violation in &result.violations {
//!     println!("{violation}");
//! }
//! ```
//!
//! ## `cargo test` Integration
//!
//! ```rust,ignore
//! #[test]
//! fn checkout_page_is_accessible() {
//!     aria_lint::assert_accessible(include_str!("../templates/checkout.html"));
//! }
//! ```
//!
//! Configure via `aria-lint.toml` next to the crate's `Cargo.toml`.
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use aria_lint::{Config, Linter};
//!
//! let linter = Linter::builder()
//!     .config(Config::from_file("aria-lint.toml".as_ref())?)
//!     .preset("strict")
//!     .build()?;
//!
//! let report = linter.fix_str(&template, aria_lint::DEFAULT_MAX_PASSES);
//! ```

#![forbid(unsafe_code)]

// Re-export core types and traits
pub use aria_lint_core::*;

/// Built-in rules and presets.
pub mod rules {
    pub use aria_lint_rules::*;
}

mod runner;

pub use runner::{
    assert_accessible, find_config, fix_str, lint_str, Linter, LinterBuilder, LoadError,
    CONFIG_CANDIDATES,
};
