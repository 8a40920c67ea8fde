//! # aria-lint-core
//!
//! Core framework for accessibility linting of server-rendered templates.
//!
//! Templates (JSP, Thymeleaf, Jinja, ERB, Handlebars, plain HTML) are not
//! well-formed documents, so nothing here builds a DOM. Instead the crate
//! provides:
//!
//! - a tolerant, quote-aware span scanner ([`scan_elements`]) that records
//!   each element's extent, attributes and resolved role
//! - a [`CrossReferenceIndex`] over `id` and the ARIA relationship attributes
//! - the [`Rule`] trait and the [`Analyzer`] that runs rules over a
//!   [`Document`], isolating faults and honouring allow comments
//! - a [`FixDescriptor`] vocabulary with an engine that turns fixes into
//!   minimal [`TextEdit`]s, and a [`LintSession`] that keeps diagnostics and
//!   text in step
//!
//! ## Example
//!
//! ```ignore
//! use aria_lint_core::{Analyzer, LintSession};
//!
//! let analyzer = Analyzer::builder()
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let mut session = LintSession::new(&analyzer, template);
//! for v in &session.evaluate().violations {
//!     println!("{v}");
//! }
//! let report = session.fix_all(aria_lint_core::DEFAULT_MAX_PASSES);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod attributes;
mod collector;
mod config;
mod document;
mod element;
mod filter;
mod fix;
mod index;
mod registry;
mod rule;
mod scanner;
mod session;
mod types;

/// Utility modules for rule implementations.
pub mod utils;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use attributes::{implicit_role, resolve_role, Attribute, Attributes, Quote};
pub use collector::DiagnosticCollector;
pub use config::{
    AnalyzerConfig, Config, ConfigError, FilterConfig, RuleConfig, DEFAULT_INCLUDE,
};
pub use document::Document;
pub use element::{ElementSpan, Extent};
pub use filter::{ControlFlowFilter, MarkupFilter, NoopFilter, DEFAULT_PREFIXES};
pub use fix::{apply_fix, FixDescriptor, FixError, FixOutcome, SkipReason, TextEdit};
pub use index::{is_template_expression, CrossReferenceIndex, Reference, ReferenceKind};
pub use registry::RuleRegistry;
pub use rule::{Rule, RuleBox};
pub use scanner::{
    find_element_end, is_void_element, scan_elements, ScanEnd, Tag, TagKind, TagLexer,
    VOID_ELEMENTS,
};
pub use session::{FixReport, LintSession, DEFAULT_MAX_PASSES};
pub use types::{
    Label, LintResult, Location, Severity, Suggestion, Violation, ViolationDiagnostic,
};
pub use utils::allowance::{AllowCheck, AllowDirectives};
