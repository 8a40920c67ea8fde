//! ARIA state and focus helpers shared by rules.
//!
//! All helpers work on raw attribute text as written in the template.

use crate::document::Document;
use crate::element::ElementSpan;
use crate::index::is_template_expression;
use regex::Regex;
use std::sync::LazyLock;

/// Class names conventionally used to hide content.
pub const HIDDEN_CLASSES: &[&str] = &[
    "hidden",
    "d-none",
    "is-hidden",
    "hide",
    "invisible",
    "visually-hidden-focusable",
];

/// Returns true if an attribute value is the ARIA literal `true`.
#[must_use]
pub fn is_true(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Returns true if an attribute value is built by the template at render
/// time and cannot be judged statically.
#[must_use]
pub fn is_dynamic(value: Option<&str>) -> bool {
    value.is_some_and(is_template_expression)
}

/// Returns true if the `role` attribute itself names `role`, as opposed to a
/// role implied by the tag.
#[must_use]
pub fn has_explicit_role(element: &ElementSpan, role: &str) -> bool {
    element
        .attr("role")
        .and_then(|v| v.split_whitespace().next())
        .is_some_and(|r| r.eq_ignore_ascii_case(role))
}

/// Descendants of `container` with a role in `member_roles` whose nearest
/// ancestor with a role in `container_roles` is `container` itself.
///
/// Members of nested groups belong to the nested group only.
#[must_use]
pub fn group_members(
    doc: &Document<'_>,
    container: usize,
    member_roles: &[&str],
    container_roles: &[&str],
) -> Vec<usize> {
    doc.descendants(container)
        .filter(|&i| doc.elements()[i].has_any_role(member_roles))
        .filter(|&i| doc.nearest_ancestor_with_role(i, container_roles) == Some(container))
        .collect()
}

/// Parses the element's `tabindex`, if present and numeric.
#[must_use]
pub fn parse_tabindex(element: &ElementSpan) -> Option<i64> {
    element.attr("tabindex")?.trim().parse().ok()
}

/// Returns true for elements that take keyboard focus without `tabindex`.
#[must_use]
pub fn is_natively_focusable(element: &ElementSpan) -> bool {
    if element.has_attr("disabled") {
        return false;
    }
    let editable = element
        .attr("contenteditable")
        .is_some_and(|v| !v.trim().eq_ignore_ascii_case("false"));
    editable
        || match element.tag_name.as_str() {
            "a" | "area" => element.has_attr("href"),
            "button" | "select" | "textarea" | "summary" | "iframe" => true,
            "input" => !element
                .attr("type")
                .is_some_and(|t| t.trim().eq_ignore_ascii_case("hidden")),
            "audio" | "video" => element.has_attr("controls"),
            _ => false,
        }
}

/// Tab index the browser applies: the explicit value, `0` for natively
/// focusable elements, otherwise `None`.
#[must_use]
pub fn effective_tabindex(element: &ElementSpan) -> Option<i64> {
    parse_tabindex(element).or_else(|| is_natively_focusable(element).then_some(0))
}

/// Returns true if the element is in the sequential focus order.
#[must_use]
pub fn is_focusable(element: &ElementSpan) -> bool {
    !element.has_attr("disabled") && effective_tabindex(element).is_some_and(|t| t >= 0)
}

static HIDDEN_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|;)\s*(?:display\s*:\s*none|visibility\s*:\s*hidden)\s*(?:!important\s*)?(?:;|$)")
        .expect("valid regex")
});

/// Returns true if an inline `style` hides the element.
#[must_use]
pub fn has_hidden_style(element: &ElementSpan) -> bool {
    element
        .attr("style")
        .is_some_and(|style| HIDDEN_STYLE.is_match(style))
}

/// Returns true if a class conventionally used for hiding is present.
#[must_use]
pub fn has_hidden_class(element: &ElementSpan) -> bool {
    element.attr("class").is_some_and(|classes| {
        classes
            .split_whitespace()
            .any(|c| HIDDEN_CLASSES.iter().any(|h| c.eq_ignore_ascii_case(h)))
    })
}

/// Returns true if the element is presented hidden: `hidden`, an inline
/// `display: none` / `visibility: hidden`, `aria-hidden="true"` or a hiding
/// class.
#[must_use]
pub fn is_hidden(element: &ElementSpan) -> bool {
    element.has_attr("hidden")
        || is_true(element.attr("aria-hidden"))
        || has_hidden_style(element)
        || has_hidden_class(element)
}

/// Returns true if only `class` hides the element, which script usually toggles.
#[must_use]
pub fn is_hidden_by_class_only(element: &ElementSpan) -> bool {
    has_hidden_class(element)
        && !element.has_attr("hidden")
        && !is_true(element.attr("aria-hidden"))
        && !has_hidden_style(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan_elements;

    fn first(text: &str) -> ElementSpan {
        scan_elements(text).remove(0)
    }

    #[test]
    fn tabindex_and_focus() {
        assert_eq!(parse_tabindex(&first(r#"<div tabindex=" -1 ">"#)), Some(-1));
        assert_eq!(parse_tabindex(&first(r#"<div tabindex="x">"#)), None);
        assert_eq!(effective_tabindex(&first("<button>")), Some(0));
        assert_eq!(effective_tabindex(&first("<div>")), None);
        assert_eq!(effective_tabindex(&first(r#"<a href="/" tabindex="-1">"#)), Some(-1));
        assert!(is_focusable(&first(r#"<a href="/">"#)));
        assert!(!is_focusable(&first("<a>")));
        assert!(!is_focusable(&first("<button disabled>")));
        assert!(!is_focusable(&first(r#"<input type="hidden">"#)));
        assert!(is_focusable(&first(r#"<div contenteditable>"#)));
    }

    #[test]
    fn hidden_detection() {
        assert!(is_hidden(&first("<div hidden>")));
        assert!(is_hidden(&first(r#"<div aria-hidden="true">"#)));
        assert!(is_hidden(&first(r#"<div style="color: red; display : none">"#)));
        assert!(is_hidden(&first(r#"<div style="visibility:hidden !important;">"#)));
        assert!(is_hidden(&first(r#"<div class="panel d-none">"#)));
        assert!(!is_hidden(&first(r#"<div style="display: noneish">"#)));
        assert!(!is_hidden(&first(r#"<div aria-hidden="false" class="hidden-xs">"#)));
        assert!(is_hidden_by_class_only(&first(r#"<div class="is-hidden">"#)));
    }

    #[test]
    fn group_members_stop_at_nested_groups() {
        let doc = Document::parse(
            r#"<ul id="a"><li>1</li><li><ul id="b"><li>2</li></ul></li><div><li>3</li></div></ul>"#,
        );
        let outer = doc.resolve("a").unwrap().0;
        let inner = doc.resolve("b").unwrap().0;
        let outer_items = group_members(&doc, outer, &["listitem"], &["list"]);
        assert_eq!(outer_items.len(), 3);
        assert_eq!(group_members(&doc, inner, &["listitem"], &["list"]).len(), 1);
        assert!(has_explicit_role(&first(r#"<span role="Tab">"#), "tab"));
        assert!(!has_explicit_role(&first("<button>"), "button"));
    }

    #[test]
    fn literal_true_and_dynamic_values() {
        assert!(is_true(Some(" TRUE ")));
        assert!(!is_true(Some("yes")));
        assert!(!is_true(None));
        assert!(is_dynamic(Some("${active}")));
        assert!(!is_dynamic(Some("true")));
    }
}
