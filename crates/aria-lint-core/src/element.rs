//! Scanned element spans.

use crate::attributes::Attributes;
use crate::scanner::{TagKind, TagLexer};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// How the end of an element was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Extent {
    /// Ended by its own `</tag>`.
    Closed,
    /// Written as `<tag ... />`.
    SelfClosed,
    /// HTML void element (`br`, `img`, `input`, ...).
    Void,
    /// Optional end tag left out: ended by an auto-closing sibling or by an
    /// ancestor's close tag.
    Implied,
    /// Cut short by a close tag belonging to something else, such as
    /// `</div>` while a `<span>` is still open or a stray `</span>`.
    Crossed,
    /// No end found before the end of the document.
    Unterminated,
}

impl Extent {
    /// Returns false when the end was guessed from malformed markup.
    #[must_use]
    pub fn is_known(self) -> bool {
        !matches!(self, Self::Crossed | Self::Unterminated)
    }
}

/// A located element in a document snapshot.
///
/// Spans are recomputed on every scan and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSpan {
    /// Lowercased tag name.
    pub tag_name: String,
    /// Offset of the opening `<`.
    pub start: usize,
    /// Offset one past the opening tag's `>`.
    pub open_end: usize,
    /// Offset of the close tag, or `end` when there is none.
    pub close_start: usize,
    /// Offset one past the end of the element (exclusive).
    pub end: usize,
    /// How `end` was determined.
    pub extent: Extent,
    /// Attributes of the opening tag.
    pub attributes: Attributes,
    /// Explicit or implied role.
    pub role: Option<String>,
    /// Index of the enclosing element.
    pub parent: Option<usize>,
    /// Nesting depth, 0 for top-level elements.
    pub depth: usize,
    /// Opened while a crossed element's own close tag was still pending, so
    /// `parent` may not be the ancestor the author wrote.
    pub detached: bool,
}

impl ElementSpan {
    /// Returns the value of an attribute.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// Returns true if the element carries the attribute.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }

    /// Returns true if the element's role equals `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }

    /// Returns true if the element's role is one of `roles`.
    #[must_use]
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        self.role.as_deref().is_some_and(|r| roles.contains(&r))
    }

    /// Returns true unless the element's end is unknown.
    #[must_use]
    pub fn is_known_extent(&self) -> bool {
        self.extent.is_known()
    }

    /// Byte range of the whole element.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Byte range of the opening tag.
    #[must_use]
    pub fn open_tag_range(&self) -> Range<usize> {
        self.start..self.open_end
    }

    /// Byte range between the opening and the close tag.
    #[must_use]
    pub fn content_range(&self) -> Range<usize> {
        self.open_end.min(self.close_start)..self.close_start
    }

    /// Text content with tags and comments removed and whitespace collapsed.
    ///
    /// Derived on demand from `source`, the text the span was scanned from.
    #[must_use]
    pub fn inner_text(&self, source: &str) -> String {
        let Some(content) = source.get(self.content_range()) else {
            return String::new();
        };

        let mut raw = String::with_capacity(content.len());
        let mut last = 0;
        for tag in TagLexer::new(content) {
            raw.push_str(&content[last..tag.start]);
            raw.push(' ');
            last = tag.end;
            if tag.kind == TagKind::Markup && !tag.terminated {
                break;
            }
        }
        if last < content.len() {
            raw.push_str(&content[last..]);
        }

        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::Extent;
    use crate::scanner::scan_elements;

    #[test]
    fn inner_text_strips_tags_and_comments() {
        let text = "<li>Step <b>1</b><!-- note --> now</li>";
        let spans = scan_elements(text);
        assert_eq!(spans[0].inner_text(text), "Step 1 now");
    }

    #[test]
    fn guessed_ends_are_unknown() {
        assert!(Extent::Implied.is_known());
        assert!(!Extent::Crossed.is_known());
        assert!(!Extent::Unterminated.is_known());
    }

    #[test]
    fn inner_text_of_void_element_is_empty() {
        let text = r#"<img alt="x">"#;
        let spans = scan_elements(text);
        assert_eq!(spans[0].inner_text(text), "");
    }
}
