//! Fix mutation engine.
//!
//! A [`FixDescriptor`] is pure data. It is applied against the current text by
//! re-locating its anchor element: open tags at or before the anchor offset
//! are walked backwards until one encloses it, and that element's end is found
//! with the span scanner. The result is a single [`TextEdit`] or a skip; a fix
//! never writes partially.

use crate::attributes::{Attribute, Attributes, Quote};
use crate::element::Extent;
use crate::filter::MarkupFilter;
use crate::scanner::{element_ends, ScanEnd, TagKind, TagLexer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;
use std::ops::Range;
use tracing::debug;

/// A textual correction, independent of any live document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FixDescriptor {
    /// Adds `name="value"` unless the attribute exists. An empty value adds a
    /// bare attribute.
    AddAttributeIfAbsent {
        /// Attribute name.
        name: String,
        /// Attribute value.
        value: String,
    },
    /// Sets the attribute to `value`, double-quoted, adding it if missing.
    SetAttributeValue {
        /// Attribute name.
        name: String,
        /// Attribute value.
        value: String,
    },
    /// Removes the attribute if present.
    RemoveAttribute {
        /// Attribute name.
        name: String,
    },
    /// Wraps the anchored element in a new parent element.
    WrapRange {
        /// Wrapper tag name.
        tag: String,
        /// Wrapper attributes, in order.
        #[serde(default)]
        attrs: Vec<(String, String)>,
    },
    /// Removes the anchored element.
    RemoveRange,
    /// Renames the anchored element's opening and close tags.
    RenameTag {
        /// New tag name.
        new_name: String,
    },
}

impl FixDescriptor {
    /// Short human-readable description.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::AddAttributeIfAbsent { name, value } if value.is_empty() => {
                format!("add `{name}`")
            }
            Self::AddAttributeIfAbsent { name, value } => format!("add `{name}=\"{value}\"`"),
            Self::SetAttributeValue { name, value } => format!("set `{name}=\"{value}\"`"),
            Self::RemoveAttribute { name } => format!("remove `{name}`"),
            Self::WrapRange { tag, .. } => format!("wrap in `<{tag}>`"),
            Self::RemoveRange => "remove element".to_string(),
            Self::RenameTag { new_name } => format!("rename to `<{new_name}>`"),
        }
    }

    fn validate(&self) -> Result<(), FixError> {
        match self {
            Self::AddAttributeIfAbsent { name, .. }
            | Self::SetAttributeValue { name, .. }
            | Self::RemoveAttribute { name } => check_attribute_name(name),
            Self::WrapRange { tag, attrs } => {
                check_tag_name(tag)?;
                attrs.iter().try_for_each(|(name, _)| check_attribute_name(name))
            }
            Self::RenameTag { new_name } => check_tag_name(new_name),
            Self::RemoveRange => Ok(()),
        }
    }
}

/// Replacement of one byte range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    /// Replaced byte range.
    pub range: Range<usize>,
    /// Replacement text.
    pub replacement: String,
}

impl TextEdit {
    /// Creates an edit.
    #[must_use]
    pub fn new(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    /// Creates an insertion at `offset`.
    #[must_use]
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::new(offset..offset, text)
    }

    /// Returns `text` with this edit applied.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::EditOutOfBounds`] if the range is not a valid
    /// character range of `text`.
    pub fn apply(&self, text: &str) -> Result<String, FixError> {
        let (Some(before), Some(after)) = (text.get(..self.range.start), text.get(self.range.end..))
        else {
            return Err(FixError::EditOutOfBounds {
                start: self.range.start,
                end: self.range.end,
                len: text.len(),
            });
        };
        if self.range.start > self.range.end {
            return Err(FixError::EditOutOfBounds {
                start: self.range.start,
                end: self.range.end,
                len: text.len(),
            });
        }
        let mut out = String::with_capacity(before.len() + self.replacement.len() + after.len());
        out.push_str(before);
        out.push_str(&self.replacement);
        out.push_str(after);
        Ok(out)
    }
}

/// Why a fix produced no edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// No element encloses the anchor offset.
    AnchorNotFound,
    /// The document already has the desired shape.
    AlreadySatisfied,
    /// The anchored element has no known end.
    UnknownExtent,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AnchorNotFound => write!(f, "anchor element not found"),
            Self::AlreadySatisfied => write!(f, "already satisfied"),
            Self::UnknownExtent => write!(f, "element end unknown"),
        }
    }
}

/// Result of computing a fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    /// The fix is one edit.
    Applied(TextEdit),
    /// The fix was abandoned without changes.
    Skipped(SkipReason),
}

impl FixOutcome {
    /// Returns the edit if the fix applies.
    #[must_use]
    pub fn edit(&self) -> Option<&TextEdit> {
        match self {
            Self::Applied(edit) => Some(edit),
            Self::Skipped(_) => None,
        }
    }
}

/// Errors raised by fix application.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixError {
    /// Diagnostics were invalidated by an earlier fix.
    #[error("diagnostics are stale; re-evaluate the document before applying another fix")]
    StaleDiagnostics,

    /// Violation index out of range.
    #[error("no violation at index {index} ({count} available)")]
    NoSuchViolation {
        /// Requested index.
        index: usize,
        /// Number of violations.
        count: usize,
    },

    /// Suggestion index out of range or suggestion without a fix.
    #[error("violation {violation} has no fix at suggestion index {suggestion}")]
    NoSuchFix {
        /// Violation index.
        violation: usize,
        /// Requested suggestion index.
        suggestion: usize,
    },

    /// Anchor offset beyond the end of the document.
    #[error("anchor offset {anchor} is beyond the document length {len}")]
    AnchorOutOfBounds {
        /// Anchor offset.
        anchor: usize,
        /// Document length.
        len: usize,
    },

    /// Edit range is not a valid range of the document.
    #[error("edit range {start}..{end} is invalid for a document of length {len}")]
    EditOutOfBounds {
        /// Range start.
        start: usize,
        /// Range end.
        end: usize,
        /// Document length.
        len: usize,
    },

    /// Tag or attribute name that cannot be written into markup.
    #[error("invalid name '{name}'")]
    InvalidName {
        /// Rejected name.
        name: String,
    },
}

/// Computes the edit for `fix`, anchored at byte offset `anchor` of `source`.
///
/// Structure is scanned on `filter`'s output, edits are computed on `source`.
///
/// # Errors
///
/// Returns an error if the anchor lies outside `source` or the descriptor
/// names an invalid tag or attribute.
pub fn apply_fix(
    source: &str,
    anchor: usize,
    fix: &FixDescriptor,
    filter: &dyn MarkupFilter,
) -> Result<FixOutcome, FixError> {
    if anchor > source.len() {
        return Err(FixError::AnchorOutOfBounds {
            anchor,
            len: source.len(),
        });
    }
    fix.validate()?;

    let scanned = filter.filter(source);
    let Some((target, parent)) = locate(&scanned, anchor) else {
        debug!("Skipping fix at {anchor}: no enclosing element");
        return Ok(FixOutcome::Skipped(SkipReason::AnchorNotFound));
    };

    let outcome = match fix {
        FixDescriptor::AddAttributeIfAbsent { name, value } => {
            let attrs = target.attributes(source);
            if attrs.contains(name) {
                FixOutcome::Skipped(SkipReason::AlreadySatisfied)
            } else {
                FixOutcome::Applied(insert_attribute(&target, &attrs, name, value))
            }
        }
        FixDescriptor::SetAttributeValue { name, value } => {
            let attrs = target.attributes(source);
            match attrs.find(name) {
                Some(attr) if attr.value == *value && attr.quote == Quote::Double => {
                    FixOutcome::Skipped(SkipReason::AlreadySatisfied)
                }
                Some(attr) => FixOutcome::Applied(TextEdit::new(
                    attr.range.clone(),
                    format_attribute(&attr.name, value, true),
                )),
                None => FixOutcome::Applied(insert_attribute(&target, &attrs, name, value)),
            }
        }
        FixDescriptor::RemoveAttribute { name } => {
            let attrs = target.attributes(source);
            match attrs.find(name) {
                Some(attr) => FixOutcome::Applied(remove_attribute(source, &target, attr)),
                None => FixOutcome::Skipped(SkipReason::AlreadySatisfied),
            }
        }
        FixDescriptor::WrapRange { tag, attrs } => {
            if !target.scan.extent.is_known() {
                FixOutcome::Skipped(SkipReason::UnknownExtent)
            } else if parent.is_some_and(|p| p.is_tight_wrapper(source, &target, tag)) {
                FixOutcome::Skipped(SkipReason::AlreadySatisfied)
            } else {
                wrap(source, &target, tag, attrs)?
            }
        }
        FixDescriptor::RemoveRange => {
            if target.scan.extent.is_known() {
                FixOutcome::Applied(TextEdit::new(target.range(), ""))
            } else {
                FixOutcome::Skipped(SkipReason::UnknownExtent)
            }
        }
        FixDescriptor::RenameTag { new_name } => rename(source, &target, new_name)?,
    };

    match &outcome {
        FixOutcome::Applied(edit) => debug!(
            "Fix {:?} at {}: replacing {:?} with {:?}",
            fix.describe(),
            anchor,
            edit.range,
            edit.replacement
        ),
        FixOutcome::Skipped(reason) => {
            debug!("Fix {:?} at {} skipped: {}", fix.describe(), anchor, reason);
        }
    }
    Ok(outcome)
}

/// An element located for a fix.
#[derive(Debug, Clone, Copy)]
struct Located<'a> {
    name: &'a str,
    start: usize,
    scan: ScanEnd,
}

impl Located<'_> {
    fn name_end(&self) -> usize {
        self.start + 1 + self.name.len()
    }

    fn range(&self) -> Range<usize> {
        self.start..self.scan.end
    }

    fn attributes(&self, source: &str) -> Attributes {
        source
            .get(self.start..self.scan.open_end)
            .map(|tag| Attributes::parse(tag, self.start))
            .unwrap_or_default()
    }

    /// Whether this element is a `tag` wrapper around `child` with only
    /// whitespace around it.
    fn is_tight_wrapper(&self, source: &str, child: &Located<'_>, tag: &str) -> bool {
        let blank = |range: Range<usize>| {
            source
                .get(range)
                .is_some_and(|s| s.trim().is_empty())
        };
        self.name.eq_ignore_ascii_case(tag)
            && blank(self.scan.open_end..child.start)
            && blank(child.scan.end..self.scan.close_start)
    }
}

/// Finds the innermost element enclosing `anchor`, and its parent.
fn locate(text: &str, anchor: usize) -> Option<(Located<'_>, Option<Located<'_>>)> {
    let ends: HashMap<usize, ScanEnd> = element_ends(text).into_iter().collect();
    let opens: Vec<_> = TagLexer::new(text)
        .take_while(|tag| tag.start <= anchor)
        .filter(|tag| matches!(tag.kind, TagKind::Open { .. }))
        .collect();

    let mut enclosing = opens.iter().rev().filter_map(|tag| {
        let scan = *ends.get(&tag.start)?;
        (tag.start == anchor || anchor < scan.end).then_some(Located {
            name: tag.name,
            start: tag.start,
            scan,
        })
    });

    let target = enclosing.next()?;
    Some((target, enclosing.next()))
}

fn format_attribute(name: &str, value: &str, force_value: bool) -> String {
    if value.is_empty() && !force_value {
        name.to_string()
    } else {
        format!("{name}=\"{}\"", value.replace('"', "&quot;"))
    }
}

fn insert_attribute(target: &Located<'_>, attrs: &Attributes, name: &str, value: &str) -> TextEdit {
    let at = attrs
        .iter()
        .last()
        .map_or(target.name_end(), |a| a.range.end);
    TextEdit::insert(at, format!(" {}", format_attribute(name, value, false)))
}

fn remove_attribute(source: &str, target: &Located<'_>, attr: &Attribute) -> TextEdit {
    let bytes = source.as_bytes();
    let floor = target.name_end();
    let mut start = attr.range.start;
    while start > floor && bytes[start - 1].is_ascii_whitespace() {
        start -= 1;
    }
    TextEdit::new(start..attr.range.end, "")
}

fn wrap(
    source: &str,
    target: &Located<'_>,
    tag: &str,
    attrs: &[(String, String)],
) -> Result<FixOutcome, FixError> {
    let content = source.get(target.range()).ok_or(FixError::EditOutOfBounds {
        start: target.start,
        end: target.scan.end,
        len: source.len(),
    })?;

    let mut replacement = format!("<{tag}");
    for (name, value) in attrs {
        let _ = write!(replacement, " {}", format_attribute(name, value, false));
    }
    let _ = write!(replacement, ">{content}</{tag}>");
    Ok(FixOutcome::Applied(TextEdit::new(target.range(), replacement)))
}

fn rename(source: &str, target: &Located<'_>, new_name: &str) -> Result<FixOutcome, FixError> {
    if target.name.eq_ignore_ascii_case(new_name) {
        return Ok(FixOutcome::Skipped(SkipReason::AlreadySatisfied));
    }
    match target.scan.extent {
        Extent::Unterminated | Extent::Crossed => {
            Ok(FixOutcome::Skipped(SkipReason::UnknownExtent))
        }
        Extent::Closed => {
            let close_name_start = target.scan.close_start + 2;
            let close_name_len = source
                .get(close_name_start..)
                .map_or(0, |rest| {
                    rest.bytes()
                        .take_while(|&b| {
                            b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
                        })
                        .count()
                });
            let middle = source
                .get(target.name_end()..close_name_start)
                .ok_or(FixError::EditOutOfBounds {
                    start: target.name_end(),
                    end: close_name_start,
                    len: source.len(),
                })?;
            Ok(FixOutcome::Applied(TextEdit::new(
                target.start + 1..close_name_start + close_name_len,
                format!("{new_name}{middle}{new_name}"),
            )))
        }
        Extent::SelfClosed | Extent::Void | Extent::Implied => Ok(FixOutcome::Applied(
            TextEdit::new(target.start + 1..target.name_end(), new_name),
        )),
    }
}

fn check_tag_name(name: &str) -> Result<(), FixError> {
    let valid = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(FixError::InvalidName {
            name: name.to_string(),
        })
    }
}

fn check_attribute_name(name: &str) -> Result<(), FixError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| !c.is_whitespace() && !c.is_control() && !matches!(c, '"' | '\'' | '>' | '/' | '=' | '<'));
    if valid {
        Ok(())
    } else {
        Err(FixError::InvalidName {
            name: name.to_string(),
        })
    }
}
