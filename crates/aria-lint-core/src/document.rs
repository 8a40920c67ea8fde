//! Immutable document snapshot handed to rules.

use crate::element::ElementSpan;
use crate::filter::MarkupFilter;
use crate::index::CrossReferenceIndex;
use crate::scanner::scan_elements;
use crate::types::Location;
use std::borrow::Cow;

/// One scanned snapshot of a document: spans, children and cross references.
///
/// Built once per evaluation pass and shared read-only by every rule.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    source: &'a str,
    text: Cow<'a, str>,
    elements: Vec<ElementSpan>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
    index: CrossReferenceIndex,
    line_starts: Vec<usize>,
}

impl<'a> Document<'a> {
    /// Scans `source` as-is.
    #[must_use]
    pub fn parse(source: &'a str) -> Self {
        Self::build(source, Cow::Borrowed(source))
    }

    /// Scans `source` after passing it through `filter`.
    #[must_use]
    pub fn parse_filtered(source: &'a str, filter: &dyn MarkupFilter) -> Self {
        let text = filter.filter(source);
        debug_assert_eq!(text.len(), source.len(), "filters must preserve length");
        Self::build(source, text)
    }

    fn build(source: &'a str, text: Cow<'a, str>) -> Self {
        let elements = scan_elements(&text);
        let index = CrossReferenceIndex::build(&elements);

        let mut children = vec![Vec::new(); elements.len()];
        let mut roots = Vec::new();
        for (idx, element) in elements.iter().enumerate() {
            match element.parent {
                Some(parent) => children[parent].push(idx),
                None => roots.push(idx),
            }
        }

        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Self {
            source,
            text,
            elements,
            children,
            roots,
            index,
            line_starts,
        }
    }

    /// Original, unfiltered text.
    #[must_use]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Text the spans were scanned from.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the document in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Returns true for an empty document.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// All elements in document order.
    #[must_use]
    pub fn elements(&self) -> &[ElementSpan] {
        &self.elements
    }

    /// Element by index.
    #[must_use]
    pub fn element(&self, idx: usize) -> Option<&ElementSpan> {
        self.elements.get(idx)
    }

    /// Cross-reference index of this snapshot.
    #[must_use]
    pub fn index(&self) -> &CrossReferenceIndex {
        &self.index
    }

    /// Indices of top-level elements.
    #[must_use]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Indices of direct children.
    #[must_use]
    pub fn children(&self, idx: usize) -> &[usize] {
        self.children.get(idx).map_or(&[], Vec::as_slice)
    }

    /// Indices of all descendants, in document order.
    pub fn descendants(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let depth = self.elements.get(idx).map_or(usize::MAX, |e| e.depth);
        (idx + 1..self.elements.len()).take_while(move |&j| self.elements[j].depth > depth)
    }

    /// Indices of ancestors, nearest first.
    pub fn ancestors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.elements.get(idx).and_then(|e| e.parent), move |&i| {
            self.elements[i].parent
        })
    }

    /// Nearest ancestor whose role is one of `roles`.
    #[must_use]
    pub fn nearest_ancestor_with_role(&self, idx: usize, roles: &[&str]) -> Option<usize> {
        self.ancestors(idx)
            .find(|&a| self.elements[a].has_any_role(roles))
    }

    /// Indices of elements with the given role.
    pub fn elements_with_role<'r>(&'r self, role: &'r str) -> impl Iterator<Item = usize> + 'r {
        self.elements
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.has_role(role))
            .map(|(i, _)| i)
    }

    /// Indices of elements with the given (lowercase) tag name.
    pub fn elements_named<'r>(&'r self, tag: &'r str) -> impl Iterator<Item = usize> + 'r {
        self.elements
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.tag_name == tag)
            .map(|(i, _)| i)
    }

    /// Collapsed text content of an element.
    #[must_use]
    pub fn inner_text(&self, idx: usize) -> String {
        self.elements
            .get(idx)
            .map(|e| e.inner_text(&self.text))
            .unwrap_or_default()
    }

    /// Resolves an id to its owning element.
    #[must_use]
    pub fn resolve(&self, id: &str) -> Option<(usize, &ElementSpan)> {
        let idx = self.index.resolve(id)?;
        Some((idx, &self.elements[idx]))
    }

    /// Location of a byte range.
    #[must_use]
    pub fn location(&self, start: usize, end: usize) -> Location {
        let start = start.min(self.source.len());
        let end = end.clamp(start, self.source.len());
        let line = self.line_starts.partition_point(|&s| s <= start);
        let line_start = self.line_starts[line - 1];
        let column = self
            .source
            .get(line_start..start)
            .map_or(start - line_start, |s| s.chars().count())
            + 1;
        Location::new(start, end - start, line, column)
    }

    /// Location of an element's opening tag.
    #[must_use]
    pub fn open_tag_location(&self, idx: usize) -> Location {
        self.elements.get(idx).map_or_else(
            || self.location(0, 0),
            |e| self.location(e.start, e.open_end),
        )
    }

    /// Location of a whole element.
    #[must_use]
    pub fn element_location(&self, idx: usize) -> Location {
        self.elements.get(idx).map_or_else(
            || self.location(0, 0),
            |e| self.location(e.start, e.end),
        )
    }

    /// Location of an attribute, falling back to the opening tag.
    #[must_use]
    pub fn attribute_location(&self, idx: usize, name: &str) -> Location {
        match self
            .elements
            .get(idx)
            .and_then(|e| e.attributes.find(name))
        {
            Some(attr) => self.location(attr.range.start, attr.range.end),
            None => self.open_tag_location(idx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ControlFlowFilter;

    const TABS: &str = r#"<div role="tablist">
  <button role="tab" id="t1" aria-controls="p1">One</button>
  <button role="tab" id="t2" aria-controls="p2">Two</button>
</div>
<div role="tabpanel" id="p1">First</div>"#;

    #[test]
    fn tree_queries() {
        let doc = Document::parse(TABS);
        let tablist = doc.elements_with_role("tablist").next().unwrap();
        assert_eq!(doc.children(tablist), &[1, 2]);
        assert_eq!(doc.descendants(tablist).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(doc.ancestors(2).collect::<Vec<_>>(), vec![0]);
        assert_eq!(doc.nearest_ancestor_with_role(2, &["tablist"]), Some(0));
        assert_eq!(doc.roots(), &[0, 3]);
        assert_eq!(doc.inner_text(0), "One Two");
    }

    #[test]
    fn resolves_references() {
        let doc = Document::parse(TABS);
        assert_eq!(doc.resolve("p1").map(|(i, _)| i), Some(3));
        assert!(doc.resolve("p2").is_none());
    }

    #[test]
    fn locations_are_one_based() {
        let doc = Document::parse(TABS);
        let loc = doc.open_tag_location(1);
        assert_eq!((loc.line, loc.column), (2, 3));
        assert_eq!(loc.offset, TABS.find("<button").unwrap());

        let attr = doc.attribute_location(1, "aria-controls");
        assert_eq!(&TABS[attr.range()], r#"aria-controls="p1""#);
        assert_eq!(attr.line, 2);
    }

    #[test]
    fn columns_count_characters() {
        let text = "<p>é<b>x</b></p>";
        let doc = Document::parse(text);
        let loc = doc.open_tag_location(1);
        assert_eq!(loc.column, 5);
        assert_eq!(loc.offset, 5);
    }

    #[test]
    fn filtered_structure_keeps_original_offsets() {
        let text = "<ul>\n<c:forEach items=\"${xs}\">\n<li>${x}</li>\n</c:forEach>\n</ul>";
        let doc = Document::parse_filtered(text, &ControlFlowFilter::default());
        let names: Vec<&str> = doc.elements().iter().map(|e| e.tag_name.as_str()).collect();
        assert_eq!(names, vec!["ul", "li"]);
        assert_eq!(doc.elements()[1].parent, Some(0));
        assert_eq!(doc.open_tag_location(1).line, 3);
        assert_eq!(doc.source(), text);
    }

    #[test]
    fn location_clamps_out_of_range() {
        let doc = Document::parse("<p>");
        let loc = doc.location(10, 20);
        assert_eq!((loc.offset, loc.length), (3, 0));
    }
}
