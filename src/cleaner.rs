//! Tree cleaner.
//!
//! A fixed sequence of structural repair passes run between parsing and block
//! compilation. Every pass takes the node list by value and returns the
//! rewritten list, works bottom-up, and is idempotent on its own; the whole
//! sequence is idempotent as well.

use std::collections::BTreeMap;

use log::{debug, trace};

use crate::options::Options;
use crate::tree::{LinkAttrs, Mark, Node, TableAttrs, Tree};
use crate::url_utils::is_absolute_url;

/// A cleaning pass over a node list.
type Pass = fn(Vec<Node>, &Options) -> Vec<Node>;

/// Passes in the order they run.
const PASSES: &[(&str, Pass)] = &[
    ("table captions", inject_table_captions),
    ("table images", replace_table_images),
    ("break marks", strip_break_marks),
    ("header rows", promote_header_rows),
    ("double breaks", split_double_breaks),
    ("empty nodes", prune_empty_nodes),
    ("embeds", serialize_embeds),
    ("link attributes", whitelist_link_attrs),
];

/// Clean a tree with the default options.
#[must_use]
pub fn clean(tree: Tree) -> Tree {
    clean_with(tree, &Options::default())
}

/// Run every cleaning pass over `tree`.
///
/// # Example
///
/// ```rust
/// use content_migrate::{cleaner, parser};
///
/// let tree = cleaner::clean(parser::parse("<p>one<br><br>two</p><p><br></p>"));
/// assert_eq!(tree.content.len(), 2);
/// assert_eq!(tree.content[1].plain_text(), "two");
/// ```
#[must_use]
pub fn clean_with(tree: Tree, options: &Options) -> Tree {
    let mut content = tree.content;
    for (name, pass) in PASSES {
        content = pass(content, options);
        trace!("after {name} pass: {} top-level nodes", content.len());
    }
    debug!("cleaned tree has {} top-level nodes", content.len());
    Tree::new(content)
}

/// Rewrite a node list bottom-up: children first, then `f` on the node
/// itself, which may replace it with any number of nodes.
fn rewrite(nodes: Vec<Node>, f: &impl Fn(Node) -> Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .flat_map(|node| f(node.map_content(|children| rewrite(children, f))))
        .collect()
}

/// Give every table a caption (empty when the source had none) and drop rows
/// that have no cells or only blank ones.
fn inject_table_captions(nodes: Vec<Node>, _options: &Options) -> Vec<Node> {
    rewrite(nodes, &|node| match node {
        Node::Table { attrs, content } => vec![Node::Table {
            attrs: TableAttrs {
                caption: Some(attrs.caption.unwrap_or_default()),
            },
            content: content.into_iter().filter(|row| !is_empty_row(row)).collect(),
        }],
        other => vec![other],
    })
}

fn is_empty_row(row: &Node) -> bool {
    match row {
        Node::TableRow { content } => content.is_empty() || content.iter().all(Node::is_blank),
        _ => false,
    }
}

/// Replace images inside table cells with a paragraph naming the source.
fn replace_table_images(nodes: Vec<Node>, options: &Options) -> Vec<Node> {
    rewrite(nodes, &|node| match node {
        cell @ (Node::TableHeader { .. } | Node::TableCell { .. }) => {
            vec![cell.map_content(|content| textualize_images(content, &options.table_image_prefix))]
        }
        other => vec![other],
    })
}

fn textualize_images(nodes: Vec<Node>, prefix: &str) -> Vec<Node> {
    nodes
        .into_iter()
        .map(|node| match node {
            Node::Image { attrs } => {
                trace!("textualized table image {}", attrs.src);
                Node::paragraph(vec![Node::plain(format!("{prefix} {}", attrs.src))])
            }
            other => other.map_content(|c| textualize_images(c, prefix)),
        })
        .collect()
}

fn strip_break_marks(nodes: Vec<Node>, _options: &Options) -> Vec<Node> {
    rewrite(nodes, &|node| match node {
        Node::HardBreak { .. } => vec![Node::hard_break()],
        other => vec![other],
    })
}

/// Turn the cells of each table's first row into header cells.
fn promote_header_rows(nodes: Vec<Node>, _options: &Options) -> Vec<Node> {
    rewrite(nodes, &|node| match node {
        Node::Table { attrs, mut content } => {
            if let Some(first) = content.first_mut() {
                let row = std::mem::replace(first, Node::TableRow { content: Vec::new() });
                *first = row.map_content(|cells| cells.into_iter().map(into_header).collect());
            }
            vec![Node::Table { attrs, content }]
        }
        other => vec![other],
    })
}

fn into_header(cell: Node) -> Node {
    match cell {
        Node::TableCell { attrs, content } => Node::TableHeader { attrs, content },
        other => other,
    }
}

/// Split paragraphs at every pair of consecutive breaks.
fn split_double_breaks(nodes: Vec<Node>, _options: &Options) -> Vec<Node> {
    rewrite(nodes, &|node| match node {
        Node::Paragraph { attrs, content } => {
            let mut parts = Vec::new();
            let mut current = Vec::new();
            let mut iter = content.into_iter().peekable();
            while let Some(child) = iter.next() {
                if child.is_break() && iter.peek().is_some_and(Node::is_break) {
                    iter.next();
                    parts.push(std::mem::take(&mut current));
                } else {
                    current.push(child);
                }
            }
            parts.push(current);
            parts
                .into_iter()
                .map(|content| Node::Paragraph {
                    attrs: attrs.clone(),
                    content,
                })
                .collect()
        }
        other => vec![other],
    })
}

/// Remove paragraphs, headings and header cells holding nothing but breaks,
/// and table rows left without cells.
fn prune_empty_nodes(nodes: Vec<Node>, _options: &Options) -> Vec<Node> {
    rewrite(nodes, &|node| {
        let empty = match &node {
            Node::Paragraph { .. } | Node::Heading { .. } | Node::TableHeader { .. } => node.is_blank(),
            Node::TableRow { content } => content.is_empty(),
            _ => false,
        };
        if empty {
            Vec::new()
        } else {
            vec![node]
        }
    })
}

/// Serialize iframe attributes into literal markup and settle the title.
fn serialize_embeds(nodes: Vec<Node>, _options: &Options) -> Vec<Node> {
    rewrite(nodes, &|node| match node {
        Node::Iframe { attrs, .. } => {
            let title = attrs.get("title").map(|t| t.trim().to_string()).unwrap_or_default();
            let content = iframe_markup(&attrs);
            vec![Node::Iframe {
                attrs,
                content: Some(content),
                title: Some(title),
            }]
        }
        other => vec![other],
    })
}

/// `<iframe …></iframe>` with `src` first, then `title`, then the rest by name.
pub(crate) fn iframe_markup(attrs: &BTreeMap<String, String>) -> String {
    let mut out = String::from("<iframe");
    let ordered = ["src", "title"]
        .into_iter()
        .filter_map(|key| attrs.get_key_value(key))
        .chain(attrs.iter().filter(|(k, _)| k.as_str() != "src" && k.as_str() != "title"));
    for (name, value) in ordered {
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&html_escape::encode_double_quoted_attribute(value));
            out.push('"');
        }
    }
    out.push_str("></iframe>");
    out
}

/// Reduce link marks to `href`, keeping `target="_blank"` only for absolute links
/// that already opened in a new tab.
fn whitelist_link_attrs(nodes: Vec<Node>, _options: &Options) -> Vec<Node> {
    rewrite(nodes, &|node| match node {
        Node::Text { text, marks } => vec![Node::Text {
            text,
            marks: marks.into_iter().map(whitelist_mark).collect(),
        }],
        other => vec![other],
    })
}

fn whitelist_mark(mark: Mark) -> Mark {
    match mark {
        Mark::Link { attrs } => {
            let blank = attrs.target.as_deref() == Some("_blank") && is_absolute_url(&attrs.href).0;
            Mark::Link {
                attrs: LinkAttrs {
                    href: attrs.href,
                    target: blank.then(|| "_blank".to_string()),
                    ..LinkAttrs::default()
                },
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::parser::parse;
    use crate::tree::{CellAttrs, ParagraphAttrs};

    fn cell(text: &str) -> Node {
        Node::TableCell {
            attrs: CellAttrs::default(),
            content: vec![Node::paragraph(vec![Node::plain(text)])],
        }
    }

    fn row(cells: Vec<Node>) -> Node {
        Node::TableRow { content: cells }
    }

    #[test]
    fn test_table_caption_and_empty_rows() {
        let tree = Tree::new(vec![Node::Table {
            attrs: TableAttrs::default(),
            content: vec![
                row(vec![cell("a")]),
                row(vec![]),
                row(vec![Node::TableCell {
                    attrs: CellAttrs::default(),
                    content: vec![Node::paragraph(vec![Node::hard_break()])],
                }]),
            ],
        }]);
        let out = clean(tree);
        let Node::Table { attrs, content } = &out.content[0] else {
            panic!("expected table");
        };
        assert_eq!(attrs.caption.as_deref(), Some(""));
        assert_eq!(content.len(), 1);
    }

    #[test]
    fn test_table_images_become_text_and_first_row_headers() {
        let tree = clean(parse(
            r#"<table><tr><td><img src="/chart.png"></td></tr><tr><td>b</td></tr></table>"#,
        ));
        let Node::Table { content, .. } = &tree.content[0] else {
            panic!("expected table");
        };
        let Node::TableHeader { content: header, .. } = &content[0].content()[0] else {
            panic!("expected promoted header");
        };
        assert_eq!(header[0].plain_text(), "Image removed from table: /chart.png");
        assert!(matches!(content[1].content()[0], Node::TableCell { .. }));
    }

    #[test]
    fn test_break_marks_removed() {
        let tree = clean(parse("<p><b>a<br>b</b></p>"));
        assert_eq!(tree.content[0].content()[1], Node::hard_break());
    }

    #[test]
    fn test_double_breaks_split_paragraph_and_keep_class() {
        let tree = clean(parse(r#"<p class="lead">a<br><br>b<br><br><br>c</p>"#));
        let texts: Vec<String> = tree.content.iter().map(Node::plain_text).collect();
        assert_eq!(texts, vec!["a", "b", " c"]);
        assert!(matches!(
            &tree.content[1],
            Node::Paragraph { attrs: ParagraphAttrs { class: Some(c) }, .. } if c == "lead"
        ));
    }

    #[test]
    fn test_empty_nodes_pruned() {
        let tree = clean(parse("<h2> </h2><p><br></p><p>kept</p><ul><li><p></p></li></ul>"));
        assert_eq!(tree.content.len(), 2);
        assert_eq!(tree.content[0].plain_text(), "kept");
        assert_eq!(tree.content[1].content()[0], Node::ListItem { content: vec![] });
    }

    #[test]
    fn test_iframe_markup_orders_src_and_title_first() {
        let mut attrs = BTreeMap::new();
        attrs.insert("width".to_string(), "560".to_string());
        attrs.insert("title".to_string(), "Form \"A\"".to_string());
        attrs.insert("src".to_string(), "https://forms.office.com/x".to_string());
        attrs.insert("allowfullscreen".to_string(), String::new());
        let out = clean(Tree::new(vec![Node::Iframe {
            attrs,
            content: None,
            title: None,
        }]));
        let Node::Iframe { content, title, .. } = &out.content[0] else {
            panic!("expected iframe");
        };
        assert_eq!(
            content.as_deref(),
            Some(r#"<iframe src="https://forms.office.com/x" title="Form &quot;A&quot;" allowfullscreen width="560"></iframe>"#)
        );
        assert_eq!(title.as_deref(), Some("Form \"A\""));
    }

    #[test]
    fn test_link_attributes_whitelisted() {
        let tree = clean(parse(
            r#"<p><a href="https://x.test" target="_blank" rel="noopener" class="btn">a</a>
               <a href="/local" target="_blank">b</a></p>"#,
        ));
        let links: Vec<&Mark> = tree.content[0]
            .content()
            .iter()
            .filter_map(|n| match n {
                Node::Text { marks, .. } => marks.first(),
                _ => None,
            })
            .collect();
        assert_eq!(
            links[0],
            &Mark::Link {
                attrs: LinkAttrs {
                    href: "https://x.test".to_string(),
                    target: Some("_blank".to_string()),
                    ..LinkAttrs::default()
                }
            }
        );
        assert_eq!(links[1], &Mark::link("/local"));
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let html = r#"
            <h1>T</h1><p><b>x<br></b><br>y<br><br><br></p>
            <table><tr><td></td><td><img src="a.png"></td></tr><tr><td><br></td></tr></table>
            <div data-embed="iframe"><iframe src="https://example.com/e" width="1"></iframe></div>
            <ul><li>a<br><br>b</li></ul><p><a href="http://x.test" target="_blank" rel="x">l</a></p>"#;
        let once = clean(parse(html));
        let twice = clean(once.clone());
        assert_eq!(once, twice);
    }
}
