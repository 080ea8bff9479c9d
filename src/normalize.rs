//! HTML Pre-normalization
//!
//! Structural fixups applied to the rendered page HTML before parsing. Each
//! rule repairs one occurrence and reports whether it changed anything; the
//! driver re-runs all rules until none applies, since one fix can expose
//! another (an image lifted out of a link may now sit directly in a paragraph).

use log::{debug, trace, warn};

use crate::dom::{self, Document, NodeRef, Selection};
use crate::options::Options;

/// Attribute on the wrapper element the parser's embed rule keys off.
pub const EMBED_MARKER_ATTR: &str = "data-embed";

/// Upper bound on fix applications per document.
const MAX_FIXES: usize = 2_000;

/// Elements that already give inline content a block parent.
const TEXT_BLOCK_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "td", "th", "dt", "dd",
    "summary", "figcaption", "caption",
];

/// Inline siblings that are pulled into the paragraph created around a bare link.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "br", "cite", "code", "em", "font", "i", "kbd", "mark",
    "q", "s", "small", "span", "strike", "strong", "sub", "sup", "time", "u",
];

/// Elements a link must not contain to be wrapped in a paragraph.
const BLOCK_DESCENDANTS: &str = "div, p, h1, h2, h3, h4, h5, h6, ul, ol, table, blockquote, section, figure, details";

/// Normalize rendered page HTML into a shape the parser can map one-to-one.
///
/// Total: malformed input yields best-effort output, never an error.
///
/// # Example
///
/// ```rust
/// use content_migrate::{normalize::normalize_html, Options};
///
/// let html = r#"<p>Before<img src="a.png">After</p>"#;
/// let fixed = normalize_html(html, &Options::default());
/// assert_eq!(fixed, r#"<p>Before</p><img src="a.png"><p>After</p>"#);
/// ```
#[must_use]
pub fn normalize_html(html: &str, options: &Options) -> String {
    let doc = dom::parse(html);

    let mut fixes = 0;
    while fixes < MAX_FIXES && apply_one_fix(&doc, options) {
        fixes += 1;
    }
    if fixes == MAX_FIXES {
        warn!("pre-normalizer stopped after {MAX_FIXES} fixes; output may still contain nested media");
    }

    let out = dom::body_html(&doc);
    debug!("pre-normalizer applied {fixes} fixes ({} -> {} chars)", html.len(), out.len());
    out
}

/// Apply the first rule that finds something to fix.
fn apply_one_fix(doc: &Document, options: &Options) -> bool {
    lift_image_from_link(doc, options)
        || hoist_media_from_paragraph(doc)
        || wrap_bare_link(doc)
        || wrap_embed(doc)
}

/// Move images out of the link that wraps them and leave a text link behind.
///
/// The link text becomes the alt text of the first image, or the image-link
/// placeholder when no image has one.
fn lift_image_from_link(doc: &Document, options: &Options) -> bool {
    for node in doc.select("a img").nodes() {
        let img = Selection::from(*node);
        let Some(link) = dom::closest_ancestor(&img, &["a"]) else {
            continue;
        };
        if dom::has_class(&link, "card") {
            continue;
        }

        let images = link.select("img");
        let mut images_html = String::new();
        let mut alt = None;
        for image in images.nodes() {
            let image = Selection::from(*image);
            images_html.push_str(&dom::outer_html(&image));
            if alt.is_none() {
                alt = dom::non_empty_attribute(&image, "alt");
            }
        }

        let label = alt.unwrap_or_else(|| options.image_link_placeholder.clone());

        let replacement = format!(
            "{images_html}{}{}</a>",
            dom::open_tag("a", &dom::get_all_attributes(&link)),
            html_escape::encode_text(&label)
        );
        trace!("lifted {} image(s) out of link", images.length());
        dom::replace_with_html(&link, &replacement);
        return true;
    }
    false
}

/// Split a paragraph around a directly contained image or iframe.
fn hoist_media_from_paragraph(doc: &Document) -> bool {
    let Some(media_node) = doc.select("p > img, p > iframe").nodes().first().copied() else {
        return false;
    };
    let media = Selection::from(media_node);
    let Some(paragraph) = dom::parent_element(&media) else {
        return false;
    };

    let open = dom::open_tag("p", &dom::get_all_attributes(&paragraph));
    let mut before = Fragment::default();
    let mut after = Fragment::default();
    let mut seen = false;

    for child in dom::child_nodes(&paragraph) {
        if child.id == media_node.id {
            seen = true;
            continue;
        }
        if seen {
            after.push(&child);
        } else {
            before.push(&child);
        }
    }

    let mut replacement = String::new();
    if before.has_content {
        replacement.push_str(&format!("{open}{}</p>", before.html));
    }
    replacement.push_str(&dom::outer_html(&media));
    if after.has_content {
        replacement.push_str(&format!("{open}{}</p>", after.html));
    }

    trace!("hoisted <{}> out of paragraph", dom::tag_name(&media).unwrap_or_default());
    dom::replace_with_html(&paragraph, &replacement);
    true
}

/// Wrap a link that has no text-block ancestor, together with its inline
/// neighbours, in a new paragraph.
fn wrap_bare_link(doc: &Document) -> bool {
    for node in doc.select("a").nodes() {
        let link = Selection::from(*node);
        if dom::has_class(&link, "card")
            || dom::has_ancestor(&link, TEXT_BLOCK_TAGS)
            || link.select(BLOCK_DESCENDANTS).exists()
        {
            continue;
        }
        let Some(parent) = dom::parent_element(&link) else {
            continue;
        };

        let siblings = dom::child_nodes(&parent);
        let Some(index) = siblings.iter().position(|n| n.id == node.id) else {
            continue;
        };
        let mut start = index;
        while start > 0 && is_inline_node(&siblings[start - 1]) {
            start -= 1;
        }
        let mut end = index;
        while end + 1 < siblings.len() && is_inline_node(&siblings[end + 1]) {
            end += 1;
        }

        let run: String = siblings[start..=end].iter().map(dom::node_html).collect();
        for (i, sibling) in siblings[start..=end].iter().enumerate() {
            if start + i != index {
                Selection::from(*sibling).remove();
            }
        }

        trace!("wrapped bare link run of {} node(s) in a paragraph", end - start + 1);
        dom::replace_with_html(&link, &format!("<p>{run}</p>"));
        return true;
    }
    false
}

/// Wrap an iframe in the embed marker element unless it already is.
fn wrap_embed(doc: &Document) -> bool {
    for node in doc.select("iframe").nodes() {
        let iframe = Selection::from(*node);
        let wrapped = dom::parent_element(&iframe)
            .is_some_and(|p| dom::tag_name(&p).as_deref() == Some("div") && p.has_attr(EMBED_MARKER_ATTR));
        if wrapped {
            continue;
        }

        let replacement = format!(
            "<div {EMBED_MARKER_ATTR}=\"iframe\">{}</div>",
            dom::outer_html(&iframe)
        );
        dom::replace_with_html(&iframe, &replacement);
        return true;
    }
    false
}

fn is_inline_node(node: &NodeRef) -> bool {
    if node.is_text() {
        return true;
    }
    dom::node_tag(node).is_some_and(|tag| INLINE_TAGS.contains(&tag.as_str()))
}

/// Serialized half of a split paragraph.
#[derive(Default)]
struct Fragment {
    html: String,
    has_content: bool,
}

impl Fragment {
    fn push(&mut self, node: &NodeRef) {
        if node.is_text() {
            if !node.text().trim().is_empty() {
                self.has_content = true;
            }
        } else if dom::node_tag(node).is_some_and(|t| t != "br") {
            self.has_content = true;
        }
        self.html.push_str(&dom::node_html(node));
    }
}
