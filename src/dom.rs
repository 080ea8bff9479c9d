//! DOM Operations Adapter
//!
//! Thin helpers over the `dom_query` crate used by the pre-normalizer and the
//! parser. Rewrites are done by rebuilding markup strings and swapping them in
//! with `replace_with_html`, so callers re-select after every edit.

// Re-export core types for external use
pub use dom_query::{Document, NodeRef, Selection};

// Re-export StrTendril for external use
pub use tendril::StrTendril;

// === Parsing & Serialization ===

/// Parse an HTML string (document or fragment) into a document.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Serialize the children of `<body>`.
///
/// Fragments parsed with [`parse`] are placed inside a synthetic body, so this
/// returns the fragment again after any edits.
#[must_use]
pub fn body_html(doc: &Document) -> String {
    doc.select("body").inner_html().to_string()
}

/// Serialize a single node: elements as outer HTML, text nodes escaped.
///
/// Comments and other node types serialize to nothing.
#[must_use]
pub fn node_html(node: &NodeRef) -> String {
    if node.is_element() {
        Selection::from(*node).html().to_string()
    } else if node.is_text() {
        let text = node.text();
        html_escape::encode_text(&*text).into_owned()
    } else {
        String::new()
    }
}

/// Build an opening tag with the given attributes, values escaped.
#[must_use]
pub fn open_tag(tag: &str, attrs: &[(String, String)]) -> String {
    let mut out = format!("<{tag}");
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(value));
        out.push('"');
    }
    out.push('>');
    out
}

// === Attribute Operations ===

/// Get any attribute value
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// Get a non-blank attribute value, trimmed.
#[must_use]
pub fn non_empty_attribute(sel: &Selection, name: &str) -> Option<String> {
    get_attribute(sel, name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get all attributes as key-value pairs, in source order.
///
/// Returns empty vector if node has no attributes or if selection is empty.
#[must_use]
pub fn get_all_attributes(sel: &Selection) -> Vec<(String, String)> {
    sel.nodes()
        .first()
        .map(|node| {
            node.attrs()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// Check whether the element's class list contains `class` (ASCII case-insensitive).
#[must_use]
pub fn has_class(sel: &Selection, class: &str) -> bool {
    get_attribute(sel, "class").is_some_and(|list| {
        list.split_ascii_whitespace()
            .any(|c| c.eq_ignore_ascii_case(class))
    })
}

// === Tag/Node Information ===

/// Get tag name (lowercase)
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes().first().and_then(node_tag)
}

/// Get the lowercase tag name of an element node.
#[must_use]
pub fn node_tag(node: &NodeRef) -> Option<String> {
    if !node.is_element() {
        return None;
    }
    node.node_name().map(|t| t.to_ascii_lowercase())
}

// === Text Content ===

/// Get all text content of node and descendants
///
/// Returns `StrTendril` for zero-copy passing. Use `.to_string()` only when
/// you need owned storage.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}

/// Get outer HTML content
#[inline]
#[must_use]
pub fn outer_html(sel: &Selection) -> StrTendril {
    sel.html()
}

// === Tree Navigation ===

/// Get all child nodes (elements, text and comments) in document order.
#[must_use]
pub fn child_nodes<'a>(sel: &Selection<'a>) -> Vec<NodeRef<'a>> {
    sel.nodes()
        .first()
        .map(NodeRef::children)
        .unwrap_or_default()
}

/// Get the parent element of the first node, if any.
#[must_use]
pub fn parent_element<'a>(sel: &Selection<'a>) -> Option<Selection<'a>> {
    sel.nodes()
        .first()
        .and_then(NodeRef::parent)
        .filter(NodeRef::is_element)
        .map(Selection::from)
}

/// Find the closest ancestor element whose tag is in `tags`.
#[must_use]
pub fn closest_ancestor<'a>(sel: &Selection<'a>, tags: &[&str]) -> Option<Selection<'a>> {
    let mut current = sel.nodes().first().and_then(NodeRef::parent);
    while let Some(node) = current {
        if let Some(tag) = node_tag(&node) {
            if tags.contains(&tag.as_str()) {
                return Some(Selection::from(node));
            }
        }
        current = node.parent();
    }
    None
}

/// Check whether any ancestor element has a tag in `tags`.
#[inline]
#[must_use]
pub fn has_ancestor(sel: &Selection, tags: &[&str]) -> bool {
    closest_ancestor(sel, tags).is_some()
}

// === Tree Manipulation ===

/// Replace element with HTML
#[inline]
pub fn replace_with_html(sel: &Selection, html: &str) {
    sel.replace_with_html(html);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_html_round_trips_fragment() {
        let doc = parse("<p>one</p><p>two</p>");
        assert_eq!(body_html(&doc), "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_node_html_escapes_text() {
        let doc = parse("<p>a &lt; b<b>bold</b></p>");
        let p = doc.select("p");
        let parts: Vec<String> = child_nodes(&p).iter().map(node_html).collect();
        assert_eq!(parts, vec!["a &lt; b".to_string(), "<b>bold</b>".to_string()]);
    }

    #[test]
    fn test_open_tag_escapes_values() {
        let attrs = vec![("title".to_string(), "say \"hi\"".to_string())];
        assert_eq!(open_tag("p", &attrs), "<p title=\"say &quot;hi&quot;\">");
        assert_eq!(open_tag("div", &[]), "<div>");
    }

    #[test]
    fn test_get_all_attributes() {
        let doc = parse(r#"<a href="/x" target="_blank">x</a>"#);
        let attrs = get_all_attributes(&doc.select("a"));
        assert_eq!(attrs.len(), 2);
        assert!(attrs.contains(&("href".to_string(), "/x".to_string())));
        assert!(attrs.contains(&("target".to_string(), "_blank".to_string())));
    }

    #[test]
    fn test_has_class_tokenizes() {
        let doc = parse(r#"<div class="Card featured">x</div>"#);
        let div = doc.select("div");
        assert!(has_class(&div, "card"));
        assert!(has_class(&div, "featured"));
        assert!(!has_class(&div, "car"));
    }

    #[test]
    fn test_closest_ancestor() {
        let doc = parse("<ul><li><p><a href=\"#\">x</a></p></li></ul>");
        let a = doc.select("a");
        assert!(has_ancestor(&a, &["li"]));
        assert_eq!(
            closest_ancestor(&a, &["p", "li"]).and_then(|s| tag_name(&s)),
            Some("p".to_string())
        );
        assert!(!has_ancestor(&a, &["table"]));
    }

    #[test]
    fn test_operations_on_empty_selection() {
        let doc = parse("<div>x</div>");
        let missing = doc.select("section");
        assert!(tag_name(&missing).is_none());
        assert!(get_all_attributes(&missing).is_empty());
        assert!(child_nodes(&missing).is_empty());
        assert!(parent_element(&missing).is_none());
    }

    #[test]
    fn test_replace_with_html() {
        let doc = parse(r#"<div><span id="old">old</span></div>"#);
        replace_with_html(&doc.select("#old"), r#"<strong id="new">new</strong>"#);
        assert!(doc.select("#old").is_empty());
        assert!(doc.select("#new").exists());
    }
}
