//! Balanced-tag span scanner.
//!
//! This is deliberately not an HTML parser. A quote-aware lexer finds tag
//! boundaries in semi-structured template markup, and a stack of open names
//! decides where each element ends:
//!
//! - characters inside a quoted attribute value never act as `<` or `>`;
//! - a close tag pops back to the nearest open element of the same name;
//!   elements opened after it end there as well, [`Extent::Implied`] when
//!   their end tag is optional and [`Extent::Crossed`] otherwise;
//! - a close tag matching nothing that is open ends every open element at
//!   that position as [`Extent::Crossed`], unless it is the late close of an
//!   element already crossed, which is consumed silently;
//! - while a crossed element's close is still pending, new elements are
//!   marked `detached` because their parent links may be wrong;
//! - `li`, `p`, `option`, `dt`, `dd`, `tr`, `td` and `th` are ended by an
//!   opening tag of the same name;
//! - elements still open at the end of the text are [`Extent::Unterminated`].
//!
//! [`find_element_end`] answers for a single element and [`scan_elements`]
//! builds every span of a document; both read the same forward pass.

use crate::attributes::{resolve_role, Attributes};
use crate::element::{ElementSpan, Extent};

/// HTML elements that never have content or a close tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text until their close tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Elements ended by an opening tag of the same name.
const AUTO_CLOSING: &[&str] = &["li", "p", "option", "dt", "dd", "tr", "td", "th"];

/// Returns true for HTML void elements.
#[must_use]
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Kind of a lexed tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `<name ...>` or `<name ... />`.
    Open {
        /// Whether the tag ends with `/>`.
        self_closing: bool,
    },
    /// `</name>`.
    Close,
    /// Comment, doctype, CDATA or processing instruction.
    Markup,
}

/// A tag found by [`TagLexer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Tag kind.
    pub kind: TagKind,
    /// Tag name as written; empty for [`TagKind::Markup`].
    pub name: &'a str,
    /// Offset of `<`.
    pub start: usize,
    /// Offset one past `>`, or the text length if unterminated.
    pub end: usize,
    /// Whether the closing `>` was found.
    pub terminated: bool,
}

/// Forward, quote-aware lexer over the tags of a text.
///
/// A `<` not followed by a letter, `/letter`, `!` or `?` is plain text.
#[derive(Debug, Clone)]
pub struct TagLexer<'a> {
    text: &'a str,
    pos: usize,
    raw_until: Option<&'static str>,
}

impl<'a> TagLexer<'a> {
    /// Creates a lexer over the whole text.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self::at(text, 0)
    }

    /// Creates a lexer starting at byte offset `pos`.
    #[must_use]
    pub fn at(text: &'a str, pos: usize) -> Self {
        Self {
            text,
            pos: pos.min(text.len()),
            raw_until: None,
        }
    }

    fn bytes(&self) -> &'a [u8] {
        self.text.as_bytes()
    }

    fn find_from(&self, from: usize, needle: &str) -> Option<usize> {
        self.text.get(from..)?.find(needle).map(|i| from + i)
    }

    fn markup(&mut self, start: usize, terminator: &str) -> Tag<'a> {
        let (end, terminated) = match self.find_from(start + 2, terminator) {
            Some(i) => (i + terminator.len(), true),
            None => (self.text.len(), false),
        };
        self.pos = end;
        Tag {
            kind: TagKind::Markup,
            name: "",
            start,
            end,
            terminated,
        }
    }

    fn read_name(&self, from: usize) -> usize {
        let bytes = self.bytes();
        let mut end = from;
        while end < bytes.len()
            && (bytes[end].is_ascii_alphanumeric() || matches!(bytes[end], b'-' | b'_' | b':' | b'.'))
        {
            end += 1;
        }
        end
    }

    fn open_tag(&mut self, start: usize) -> Tag<'a> {
        let bytes = self.bytes();
        let name_end = self.read_name(start + 1);
        let name = &self.text[start + 1..name_end];

        let mut quote: Option<u8> = None;
        let mut after_eq = false;
        let mut cursor = name_end;
        let mut close = None;
        while cursor < bytes.len() {
            let b = bytes[cursor];
            match quote {
                Some(q) => {
                    if b == q {
                        quote = None;
                    }
                }
                None => match b {
                    b'>' => {
                        close = Some(cursor);
                        break;
                    }
                    b'=' => after_eq = true,
                    b'"' | b'\'' if after_eq => {
                        quote = Some(b);
                        after_eq = false;
                    }
                    b if b.is_ascii_whitespace() => {}
                    _ => after_eq = false,
                },
            }
            cursor += 1;
        }

        let (end, terminated, self_closing) = match close {
            Some(gt) => (gt + 1, true, gt > name_end && bytes[gt - 1] == b'/'),
            None => (bytes.len(), false, false),
        };
        self.pos = end;

        if terminated && !self_closing {
            let lower = name.to_ascii_lowercase();
            self.raw_until = RAW_TEXT_ELEMENTS.iter().copied().find(|r| *r == lower);
        }

        Tag {
            kind: TagKind::Open { self_closing },
            name,
            start,
            end,
            terminated,
        }
    }

    fn close_tag(&mut self, start: usize) -> Tag<'a> {
        let name_end = self.read_name(start + 2);
        let name = &self.text[start + 2..name_end];
        let (end, terminated) = match self.find_from(name_end, ">") {
            Some(i) => (i + 1, true),
            None => (self.text.len(), false),
        };
        self.pos = end;
        Tag {
            kind: TagKind::Close,
            name,
            start,
            end,
            terminated,
        }
    }

    fn skip_raw_text(&mut self, element: &str) {
        let bytes = self.bytes();
        let mut from = self.pos;
        while let Some(i) = self.find_from(from, "</") {
            let name_end = self.read_name(i + 2);
            if self.text[i + 2..name_end].eq_ignore_ascii_case(element) {
                self.pos = i;
                return;
            }
            from = i + 2;
        }
        self.pos = bytes.len();
    }
}

impl<'a> Iterator for TagLexer<'a> {
    type Item = Tag<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(element) = self.raw_until.take() {
            self.skip_raw_text(element);
        }

        loop {
            let start = self.find_from(self.pos, "<")?;
            let bytes = self.bytes();
            let next = bytes.get(start + 1).copied();

            match next {
                Some(b) if b.is_ascii_alphabetic() => return Some(self.open_tag(start)),
                Some(b'/') if bytes.get(start + 2).is_some_and(u8::is_ascii_alphabetic) => {
                    return Some(self.close_tag(start));
                }
                Some(b'!') => {
                    let terminator = if self.text[start..].starts_with("<!--") {
                        "-->"
                    } else if self.text[start..].starts_with("<![CDATA[") {
                        "]]>"
                    } else {
                        ">"
                    };
                    return Some(self.markup(start, terminator));
                }
                Some(b'?') => return Some(self.markup(start, ">")),
                _ => self.pos = start + 1,
            }
        }
    }
}

/// Result of [`find_element_end`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanEnd {
    /// Offset one past the opening tag.
    pub open_end: usize,
    /// Offset of the close tag, or `end` when there is none.
    pub close_start: usize,
    /// Offset one past the element; the text length if unterminated.
    pub end: usize,
    /// How the end was determined.
    pub extent: Extent,
}

/// Finds the structural end of the element whose `<` is at `start`.
///
/// Returns `None` if no opening tag starts at `start`. Never fails otherwise:
/// an element without a recognisable end reports the text length with
/// [`Extent::Unterminated`].
///
/// Close tags seen earlier in the text decide whether a later close belongs
/// to this element, so the answer comes from the same forward pass as
/// [`scan_elements`].
#[must_use]
pub fn find_element_end(text: &str, start: usize) -> Option<ScanEnd> {
    walk(text)
        .into_iter()
        .find(|node| node.start == start)
        .map(|node| node.scan)
}

/// Start offset and structural end of every element, in document order.
pub(crate) fn element_ends(text: &str) -> Vec<(usize, ScanEnd)> {
    walk(text).into_iter().map(|node| (node.start, node.scan)).collect()
}

/// Scans every element of `text` in one forward pass.
///
/// Spans are returned in document order with parent links and depths.
#[must_use]
pub fn scan_elements(text: &str) -> Vec<ElementSpan> {
    walk(text)
        .into_iter()
        .map(|node| {
            let attributes = Attributes::parse(&text[node.start..node.scan.open_end], node.start);
            let role = resolve_role(&node.tag_name, &attributes);
            ElementSpan {
                start: node.start,
                open_end: node.scan.open_end,
                close_start: node.scan.close_start,
                end: node.scan.end,
                extent: node.scan.extent,
                role,
                attributes,
                tag_name: node.tag_name,
                parent: node.parent,
                depth: node.depth,
                detached: node.detached,
            }
        })
        .collect()
}

/// Structure of one element before its attributes are parsed.
#[derive(Debug)]
struct Node {
    tag_name: String,
    start: usize,
    scan: ScanEnd,
    parent: Option<usize>,
    depth: usize,
    detached: bool,
}

impl Node {
    fn end_at(&mut self, offset: usize, extent: Extent) {
        self.scan.close_start = offset;
        self.scan.end = offset;
        self.scan.extent = extent;
    }
}

fn walk(text: &str) -> Vec<Node> {
    let mut nodes: Vec<Node> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    // Names of crossed elements whose own close tag has not been seen yet.
    let mut owed: Vec<String> = Vec::new();

    for tag in TagLexer::new(text) {
        match tag.kind {
            TagKind::Open { self_closing } => {
                let name = tag.name.to_ascii_lowercase();
                if AUTO_CLOSING.contains(&name.as_str())
                    && open.last().is_some_and(|&top| nodes[top].tag_name == name)
                {
                    if let Some(top) = open.pop() {
                        nodes[top].end_at(tag.start, Extent::Implied);
                    }
                }

                let void = is_void_element(&name);
                let (end, extent) = if !tag.terminated {
                    (text.len(), Extent::Unterminated)
                } else if self_closing {
                    (tag.end, Extent::SelfClosed)
                } else if void {
                    (tag.end, Extent::Void)
                } else {
                    // Provisional until the matching close is seen.
                    (text.len(), Extent::Unterminated)
                };
                let idx = nodes.len();
                nodes.push(Node {
                    tag_name: name,
                    start: tag.start,
                    scan: ScanEnd {
                        open_end: tag.end,
                        close_start: end,
                        end,
                        extent,
                    },
                    parent: open.last().copied(),
                    depth: open.len(),
                    detached: !owed.is_empty(),
                });
                if tag.terminated && !self_closing && !void {
                    open.push(idx);
                }
            }
            TagKind::Close => {
                let name = tag.name.to_ascii_lowercase();
                if let Some(pos) = open.iter().rposition(|&i| nodes[i].tag_name == name) {
                    for &inner in &open[pos + 1..] {
                        let node = &mut nodes[inner];
                        if AUTO_CLOSING.contains(&node.tag_name.as_str()) {
                            node.end_at(tag.start, Extent::Implied);
                        } else {
                            node.end_at(tag.start, Extent::Crossed);
                            owed.push(node.tag_name.clone());
                        }
                    }
                    let matched = &mut nodes[open[pos]];
                    matched.scan.close_start = tag.start;
                    matched.scan.end = tag.end;
                    matched.scan.extent = Extent::Closed;
                    open.truncate(pos);
                } else if let Some(late) = owed.iter().rposition(|n| *n == name) {
                    owed.remove(late);
                } else {
                    for &inner in &open {
                        nodes[inner].end_at(tag.start, Extent::Crossed);
                        owed.push(nodes[inner].tag_name.clone());
                    }
                    open.clear();
                }
            }
            TagKind::Markup => {}
        }
    }

    nodes
}
