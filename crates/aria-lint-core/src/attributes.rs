//! Attribute extraction and role resolution for opening tags.
//!
//! Values are kept as raw text: entities are not decoded and template
//! expressions are left untouched.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Quoting style of an attribute value as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quote {
    /// `name="value"`
    Double,
    /// `name='value'`
    Single,
    /// `name=value`
    Unquoted,
    /// Boolean-style `name` without a value.
    Bare,
}

/// A single attribute of an opening tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name as written.
    pub name: String,
    /// Raw value; empty for bare attributes.
    pub value: String,
    /// Absolute byte range of the whole attribute, including quotes.
    pub range: Range<usize>,
    /// Absolute byte range of the name.
    pub name_range: Range<usize>,
    /// Absolute byte range of the value without quotes, if a value was written.
    pub value_range: Option<Range<usize>>,
    /// Quoting style.
    pub quote: Quote,
}

impl Attribute {
    /// Returns true if this attribute's name matches `name` case-insensitively.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Ordered attribute map with case-insensitive lookup.
///
/// Duplicate names are preserved in source order; lookups return the first
/// occurrence, which is the one browsers honour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    items: Vec<Attribute>,
}

impl Attributes {
    /// Parses the attributes of an opening tag.
    ///
    /// `tag` is the opening-tag substring starting at `<` (the closing `>` may
    /// be missing for unterminated tags). `base` is the absolute offset of
    /// `tag` within the document so that recorded ranges are absolute.
    #[must_use]
    pub fn parse(tag: &str, base: usize) -> Self {
        let bytes = tag.as_bytes();
        let mut items = Vec::new();

        // Skip `<` and the tag name.
        let mut pos = usize::from(bytes.first() == Some(&b'<'));
        while pos < bytes.len() && !is_name_terminator(bytes[pos]) {
            pos += 1;
        }

        loop {
            while pos < bytes.len() && (bytes[pos].is_ascii_whitespace() || bytes[pos] == b'/') {
                pos += 1;
            }
            if pos >= bytes.len() || bytes[pos] == b'>' {
                break;
            }

            let name_start = pos;
            while pos < bytes.len() && !is_name_terminator(bytes[pos]) && bytes[pos] != b'=' {
                pos += 1;
            }
            if pos == name_start {
                // Stray quote or `=` with no name; step over it.
                pos += 1;
                continue;
            }
            let name_end = pos;

            let mut cursor = pos;
            while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
                cursor += 1;
            }

            let (value_range, quote, attr_end) = if bytes.get(cursor) == Some(&b'=') {
                cursor += 1;
                while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
                    cursor += 1;
                }
                match bytes.get(cursor) {
                    Some(&q @ (b'"' | b'\'')) => {
                        let value_start = cursor + 1;
                        let value_end = bytes[value_start..]
                            .iter()
                            .position(|&b| b == q)
                            .map_or(bytes.len(), |i| value_start + i);
                        let quote = if q == b'"' { Quote::Double } else { Quote::Single };
                        let end = (value_end + 1).min(bytes.len());
                        (Some(value_start..value_end), quote, end)
                    }
                    Some(_) => {
                        let value_start = cursor;
                        let mut value_end = cursor;
                        while value_end < bytes.len()
                            && !bytes[value_end].is_ascii_whitespace()
                            && bytes[value_end] != b'>'
                        {
                            value_end += 1;
                        }
                        (Some(value_start..value_end), Quote::Unquoted, value_end)
                    }
                    None => (Some(cursor..cursor), Quote::Unquoted, cursor),
                }
            } else {
                (None, Quote::Bare, name_end)
            };

            let value = value_range
                .as_ref()
                .map(|r| tag[r.clone()].to_string())
                .unwrap_or_default();

            items.push(Attribute {
                name: tag[name_start..name_end].to_string(),
                value,
                range: base + name_start..base + attr_end,
                name_range: base + name_start..base + name_end,
                value_range: value_range.map(|r| base + r.start..base + r.end),
                quote,
            });

            pos = attr_end.max(name_end);
        }

        Self { items }
    }

    /// Returns the value of the first attribute named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.find(name).map(|a| a.value.as_str())
    }

    /// Returns the first attribute named `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Attribute> {
        self.items.iter().find(|a| a.is(name))
    }

    /// Returns true if an attribute named `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Iterates attributes in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.items.iter()
    }

    /// Number of attributes, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the tag has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn is_name_terminator(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'>' | b'/' | b'"' | b'\'')
}

/// Resolves the role of an element.
///
/// An explicit `role` wins (first token, lowercased); otherwise the implicit
/// role of the tag applies. `None` means the element has no role.
#[must_use]
pub fn resolve_role(tag_name: &str, attributes: &Attributes) -> Option<String> {
    if let Some(explicit) = attributes
        .get("role")
        .and_then(|v| v.split_whitespace().next())
    {
        return Some(explicit.to_ascii_lowercase());
    }
    implicit_role(tag_name, attributes).map(str::to_string)
}

/// Returns the role a tag carries without an explicit `role` attribute.
#[must_use]
pub fn implicit_role(tag_name: &str, attributes: &Attributes) -> Option<&'static str> {
    let role = match tag_name {
        "nav" => "navigation",
        "main" => "main",
        "header" => "banner",
        "footer" => "contentinfo",
        "aside" => "complementary",
        "form" => "form",
        "section" => "region",
        "article" => "article",
        "ul" | "ol" | "menu" => "list",
        "li" => "listitem",
        "button" | "summary" => "button",
        "a" | "area" => {
            if attributes.contains("href") {
                "link"
            } else {
                return None;
            }
        }
        "table" => "table",
        "tr" => "row",
        "td" => "cell",
        "th" => "columnheader",
        "dialog" => "dialog",
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "heading",
        "img" => {
            if attributes.get("alt") == Some("") {
                "presentation"
            } else {
                "img"
            }
        }
        "hr" => "separator",
        "select" => {
            let sized = attributes
                .get("size")
                .and_then(|s| s.trim().parse::<u32>().ok())
                .is_some_and(|n| n > 1);
            if attributes.contains("multiple") || sized {
                "listbox"
            } else {
                "combobox"
            }
        }
        "option" => "option",
        "textarea" => "textbox",
        "progress" => "progressbar",
        "output" => "status",
        "details" | "fieldset" | "optgroup" => "group",
        "input" => return input_role(attributes),
        _ => return None,
    };
    Some(role)
}

fn input_role(attributes: &Attributes) -> Option<&'static str> {
    let kind = attributes
        .get("type")
        .map(|t| t.trim().to_ascii_lowercase())
        .unwrap_or_default();
    let role = match kind.as_str() {
        "checkbox" => "checkbox",
        "radio" => "radio",
        "range" => "slider",
        "button" | "submit" | "reset" | "image" => "button",
        "number" => "spinbutton",
        "search" => "searchbox",
        "hidden" | "file" | "color" | "date" | "datetime-local" | "month" | "time" | "week"
        | "password" => return None,
        _ => {
            if attributes.contains("list") {
                "combobox"
            } else {
                "textbox"
            }
        }
    };
    Some(role)
}
