//! Cross-reference index over a scanned document.

use crate::element::ElementSpan;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Attribute whose value names other elements by `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceKind {
    /// `aria-controls`
    Controls,
    /// `aria-labelledby`
    LabelledBy,
    /// `aria-describedby`
    DescribedBy,
    /// `aria-owns`
    Owns,
    /// `for` (labels and outputs)
    For,
}

impl ReferenceKind {
    /// Every reference kind, in reporting order.
    pub const ALL: [Self; 5] = [
        Self::Controls,
        Self::LabelledBy,
        Self::DescribedBy,
        Self::Owns,
        Self::For,
    ];

    /// Attribute name carrying this kind of reference.
    #[must_use]
    pub fn attribute(self) -> &'static str {
        match self {
            Self::Controls => "aria-controls",
            Self::LabelledBy => "aria-labelledby",
            Self::DescribedBy => "aria-describedby",
            Self::Owns => "aria-owns",
            Self::For => "for",
        }
    }

    /// Whether the attribute holds a whitespace-separated id list.
    #[must_use]
    pub fn is_multi(self) -> bool {
        !matches!(self, Self::For)
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.attribute())
    }
}

/// One id reference from a source element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Reference kind.
    pub kind: ReferenceKind,
    /// Index of the referencing element.
    pub source: usize,
    /// Referenced id text.
    pub target: String,
    /// Whether the id is built from a template expression and cannot be resolved statically.
    pub dynamic: bool,
}

/// Index of ids and id references, built once per snapshot.
#[derive(Debug, Clone, Default)]
pub struct CrossReferenceIndex {
    by_id: HashMap<String, usize>,
    duplicates: Vec<(String, usize)>,
    references: HashMap<ReferenceKind, Vec<Reference>>,
}

impl CrossReferenceIndex {
    /// Builds the index in a single pass over `elements`.
    #[must_use]
    pub fn build(elements: &[ElementSpan]) -> Self {
        let mut index = Self::default();

        for (idx, element) in elements.iter().enumerate() {
            if let Some(id) = element.attr("id").filter(|id| !id.trim().is_empty()) {
                if index.by_id.contains_key(id) {
                    index.duplicates.push((id.to_string(), idx));
                } else {
                    index.by_id.insert(id.to_string(), idx);
                }
            }

            for kind in ReferenceKind::ALL {
                let Some(value) = element.attr(kind.attribute()) else {
                    continue;
                };
                let dynamic = is_template_expression(value);
                let targets: Vec<&str> = if dynamic || !kind.is_multi() {
                    vec![value.trim()]
                } else {
                    value.split_whitespace().collect()
                };
                let refs = index.references.entry(kind).or_default();
                for target in targets.into_iter().filter(|t| !t.is_empty()) {
                    refs.push(Reference {
                        kind,
                        source: idx,
                        target: target.to_string(),
                        dynamic,
                    });
                }
            }
        }

        index
    }

    /// Resolves an id to the index of its (first) owning element.
    ///
    /// `None` is the explicit "unresolved" result.
    #[must_use]
    pub fn resolve(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Number of distinct ids.
    #[must_use]
    pub fn id_count(&self) -> usize {
        self.by_id.len()
    }

    /// Later occurrences of ids that were already taken.
    #[must_use]
    pub fn duplicate_ids(&self) -> &[(String, usize)] {
        &self.duplicates
    }

    /// References of one kind, in document order.
    #[must_use]
    pub fn references(&self, kind: ReferenceKind) -> &[Reference] {
        self.references.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// All references, grouped by kind in [`ReferenceKind::ALL`] order.
    pub fn all_references(&self) -> impl Iterator<Item = &Reference> {
        ReferenceKind::ALL
            .into_iter()
            .flat_map(move |kind| self.references(kind).iter())
    }

    /// Ids referenced by `source` through `kind`.
    pub fn targets_of(&self, source: usize, kind: ReferenceKind) -> impl Iterator<Item = &str> {
        self.references(kind)
            .iter()
            .filter(move |r| r.source == source && !r.dynamic)
            .map(|r| r.target.as_str())
    }

    /// Elements that reference `id` through `kind`.
    pub fn referrers_of<'a>(
        &'a self,
        id: &'a str,
        kind: ReferenceKind,
    ) -> impl Iterator<Item = usize> + 'a {
        self.references(kind)
            .iter()
            .filter(move |r| r.target == id)
            .map(|r| r.source)
    }
}

/// Returns true if `value` contains template-expression syntax.
#[must_use]
pub fn is_template_expression(value: &str) -> bool {
    const MARKERS: &[&str] = &["${", "#{", "*{", "{{", "{%", "<%", "[[", "@{"];
    MARKERS.iter().any(|m| value.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan_elements;

    fn index_of(text: &str) -> (Vec<ElementSpan>, CrossReferenceIndex) {
        let elements = scan_elements(text);
        let index = CrossReferenceIndex::build(&elements);
        (elements, index)
    }

    #[test]
    fn resolves_ids_and_reports_missing() {
        let (elements, index) = index_of(r#"<div id="a"></div><span id="b"></span>"#);
        assert_eq!(index.resolve("b"), Some(1));
        assert_eq!(elements[1].tag_name, "span");
        assert_eq!(index.resolve("missing"), None);
        assert_eq!(index.id_count(), 2);
    }

    #[test]
    fn tokenizes_multi_id_references() {
        let (_, index) = index_of(r#"<div aria-labelledby="t1  t2" aria-controls="p"></div>"#);
        let labelled: Vec<&str> = index.targets_of(0, ReferenceKind::LabelledBy).collect();
        assert_eq!(labelled, vec!["t1", "t2"]);
        assert_eq!(index.references(ReferenceKind::Controls).len(), 1);
    }

    #[test]
    fn for_is_a_single_id() {
        let (_, index) = index_of(r#"<label for="name">Name</label>"#);
        let refs = index.references(ReferenceKind::For);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].target, "name");
    }

    #[test]
    fn records_duplicate_ids() {
        let (_, index) = index_of(r#"<p id="x"></p><p id="x"></p>"#);
        assert_eq!(index.resolve("x"), Some(0));
        assert_eq!(index.duplicate_ids(), &[("x".to_string(), 1)]);
    }

    #[test]
    fn template_references_are_dynamic() {
        let (_, index) = index_of(r#"<button aria-controls="panel-${item.id}"></button>"#);
        let refs = index.references(ReferenceKind::Controls);
        assert_eq!(refs.len(), 1);
        assert!(refs[0].dynamic);
        assert_eq!(index.targets_of(0, ReferenceKind::Controls).count(), 0);
    }

    #[test]
    fn finds_referrers() {
        let (_, index) = index_of(
            r#"<button role="tab" aria-controls="p1"></button><div id="p1" role="tabpanel"></div>"#,
        );
        let referrers: Vec<usize> = index.referrers_of("p1", ReferenceKind::Controls).collect();
        assert_eq!(referrers, vec![0]);
    }
}
