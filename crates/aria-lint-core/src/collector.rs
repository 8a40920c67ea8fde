//! Diagnostic collector.

use crate::types::Violation;
use std::collections::HashMap;
use tracing::warn;

/// Accumulates violations from every rule into one ordered list.
///
/// The only merging performed is of exact duplicates: same byte range and
/// same message. Overlapping diagnostics from different rules are kept.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    violations: Vec<Violation>,
}

impl DiagnosticCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one violation.
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Number of violations collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns violations in document order, exact duplicates merged.
    ///
    /// Ranges reaching past `doc_len` are clamped to the document.
    #[must_use]
    pub fn finish(self, doc_len: usize) -> Vec<Violation> {
        let mut out: Vec<Violation> = Vec::with_capacity(self.violations.len());
        let mut seen: HashMap<(usize, usize, String), usize> = HashMap::new();

        for mut v in self.violations {
            clamp(&mut v, doc_len);
            let key = (v.location.offset, v.location.length, v.message.clone());
            match seen.get(&key) {
                Some(&at) => {
                    let kept = &mut out[at];
                    for suggestion in v.suggestions {
                        if !kept.suggestions.contains(&suggestion) {
                            kept.suggestions.push(suggestion);
                        }
                    }
                }
                None => {
                    seen.insert(key, out.len());
                    out.push(v);
                }
            }
        }

        // Stable: equal offsets keep rule registration order.
        out.sort_by_key(|v| v.location.offset);
        out
    }
}

impl Extend<Violation> for DiagnosticCollector {
    fn extend<T: IntoIterator<Item = Violation>>(&mut self, iter: T) {
        self.violations.extend(iter);
    }
}

fn clamp(v: &mut Violation, doc_len: usize) {
    let loc = &mut v.location;
    if loc.offset > doc_len || loc.offset + loc.length > doc_len {
        warn!(
            "Rule {} reported range {}..{} outside document of length {}",
            v.rule,
            loc.offset,
            loc.offset + loc.length,
            doc_len
        );
        loc.offset = loc.offset.min(doc_len);
        loc.length = loc.length.min(doc_len - loc.offset);
    }
}
