//! Input filters applied before scanning.
//!
//! Template languages wrap markup in control-flow constructs (`<c:forEach>`,
//! `{% for %}`, `<% if %>`) that are not part of the rendered element tree.
//! A filter blanks those constructs out so structural checks see the markup a
//! browser would. Filters never change the byte length of the text, so every
//! offset computed on filtered text is valid in the original.

use crate::config::FilterConfig;
use crate::scanner::{TagKind, TagLexer};
use std::borrow::Cow;
use std::ops::Range;

/// Namespace prefixes blanked by default.
pub const DEFAULT_PREFIXES: &[&str] = &["c", "fn", "fmt", "jsp", "th", "ui", "tiles"];

/// Pre-processing step applied to document text before scanning.
///
/// Implementations must return text of exactly the same byte length with
/// newlines in the same positions.
pub trait MarkupFilter: Send + Sync {
    /// Returns the filtered text.
    fn filter<'a>(&self, text: &'a str) -> Cow<'a, str>;
}

/// Filter that passes text through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFilter;

impl MarkupFilter for NoopFilter {
    fn filter<'a>(&self, text: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(text)
    }
}

/// Blanks template control flow: namespaced tags, scriptlets, statement
/// blocks and block helpers.
///
/// Output expressions (`<%= x %>`, `{{ x }}`, `${x}`) are left in place.
#[derive(Debug, Clone)]
pub struct ControlFlowFilter {
    prefixes: Vec<String>,
}

impl Default for ControlFlowFilter {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIXES.iter().copied())
    }
}

impl ControlFlowFilter {
    /// Creates a filter blanking tags in the given namespaces.
    #[must_use]
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(|p| p.into().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Builds the filter described by `[filter]` configuration.
    ///
    /// Returns `None` when filtering is disabled.
    #[must_use]
    pub fn from_config(config: &FilterConfig) -> Option<Self> {
        config.enabled.then(|| Self::new(config.prefixes.iter().cloned()))
    }

    fn is_filtered_tag(&self, name: &str) -> bool {
        name.split_once(':')
            .is_some_and(|(prefix, _)| self.prefixes.iter().any(|p| p.eq_ignore_ascii_case(prefix)))
    }

    fn tag_ranges(&self, text: &str) -> Vec<Range<usize>> {
        if self.prefixes.is_empty() {
            return Vec::new();
        }
        TagLexer::new(text)
            .filter(|tag| {
                matches!(tag.kind, TagKind::Open { .. } | TagKind::Close)
                    && self.is_filtered_tag(tag.name)
            })
            .map(|tag| tag.start..tag.end)
            .collect()
    }
}

impl MarkupFilter for ControlFlowFilter {
    fn filter<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut ranges = delimited_ranges(text);
        ranges.extend(self.tag_ranges(text));
        if ranges.is_empty() {
            return Cow::Borrowed(text);
        }
        Cow::Owned(blank(text, ranges))
    }
}

/// Opening and closing delimiters of blanked template constructs.
const DELIMITERS: &[(&str, &str)] = &[
    ("<%--", "--%>"),
    ("<%", "%>"),
    ("{%", "%}"),
    ("{#", "#}"),
    ("{{!--", "--}}"),
    ("{{!", "}}"),
    ("{{#", "}}"),
    ("{{/", "}}"),
    ("{{^", "}}"),
    ("{{else", "}}"),
];

fn delimited_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut pos = 0;

    while let Some(found) = text[pos..].find(['<', '{']) {
        let start = pos + found;
        let rest = &text[start..];

        // `<%=` and `<%@` are output expressions and directives, not control flow.
        let opener = DELIMITERS
            .iter()
            .find(|(open, _)| rest.starts_with(open))
            .filter(|(open, _)| !(*open == "<%" && (rest.starts_with("<%=") || rest.starts_with("<%@"))));

        match opener {
            Some((open, close)) => {
                let end = text[start + open.len()..]
                    .find(close)
                    .map_or(text.len(), |i| start + open.len() + i + close.len());
                ranges.push(start..end);
                pos = end;
            }
            None => pos = start + 1,
        }
    }

    ranges
}

/// Replaces every character inside `ranges` with spaces, byte for byte,
/// keeping line breaks.
fn blank(text: &str, mut ranges: Vec<Range<usize>>) -> String {
    ranges.sort_by_key(|r| r.start);
    let mut out = String::with_capacity(text.len());
    let mut ranges = ranges.into_iter();
    let mut current: Option<Range<usize>> = ranges.next();

    for (offset, ch) in text.char_indices() {
        while current.as_ref().is_some_and(|r| offset >= r.end) {
            current = ranges.next();
        }
        let inside = current.as_ref().is_some_and(|r| r.contains(&offset));
        if inside && ch != '\n' && ch != '\r' {
            out.extend(std::iter::repeat(' ').take(ch.len_utf8()));
        } else {
            out.push(ch);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filtered(text: &str) -> String {
        ControlFlowFilter::default().filter(text).into_owned()
    }

    #[test]
    fn blanks_namespaced_tags_keeping_length() {
        let text = r#"<ul><c:forEach items="${steps}" var="s"><li>${s}</li></c:forEach></ul>"#;
        let out = filtered(text);
        assert_eq!(out.len(), text.len());
        assert!(!out.contains("forEach"));
        assert!(out.contains("<li>${s}</li>"));
    }

    #[test]
    fn keeps_output_expressions() {
        let text = "<p><%= name %> {{ title }}</p>";
        assert_eq!(filtered(text), text);
    }

    #[test]
    fn blanks_statements_and_block_helpers() {
        let text = "{% for x in xs %}<li>{{#if a}}x{{else}}y{{/if}}</li>{% endfor %}";
        let out = filtered(text);
        assert_eq!(out.len(), text.len());
        let words: Vec<&str> = out.split_whitespace().collect();
        assert_eq!(words, vec!["<li>", "x", "y", "</li>"]);
    }

    #[test]
    fn blanks_scriptlets_but_not_directives() {
        let text = "<%@ page x %><% if (a > b) { %><b>x</b><% } %>";
        let out = filtered(text);
        assert!(out.starts_with("<%@ page x %>"));
        assert!(!out.contains("if (a"));
        assert!(out.contains("<b>x</b>"));
    }

    #[test]
    fn preserves_newlines_and_multibyte_length() {
        let text = "<th:block>\né</th:block>{# ü\n #}";
        let out = filtered(text);
        assert_eq!(out.len(), text.len());
        assert_eq!(out.matches('\n').count(), 2);
        assert!(out.contains('é'));
        assert!(!out.contains('ü'));
    }

    #[test]
    fn unconfigured_prefix_is_kept() {
        let filter = ControlFlowFilter::new(["c"]);
        let text = "<th:block><p>x</p></th:block>";
        assert_eq!(filter.filter(text), text);
    }

    #[test]
    fn unterminated_statement_runs_to_end() {
        let text = "<p>a</p>{% if";
        assert_eq!(filtered(text), "<p>a</p>     ");
    }

    #[test]
    fn noop_filter_borrows() {
        assert!(matches!(NoopFilter.filter("<p>"), Cow::Borrowed(_)));
    }
}
