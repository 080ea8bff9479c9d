//! HTML → intermediate tree parser.
//!
//! Table-driven: [`rules::NODE_RULES`] maps elements to tree nodes and
//! [`rules::MARK_RULES`] maps inline elements to marks, both tried in priority
//! order. Everything unmatched is flattened into its parent so no text is lost.
//!
//! Two walking modes exist. In block context, inline content collects into a
//! pending run that becomes a paragraph at the next block boundary. In inline
//! context, text and breaks carry the active marks, and media found there is
//! lifted out so the enclosing paragraph or heading is split around it.

pub mod handlers;
pub mod rules;

use log::debug;

use crate::dom::{self, NodeRef, Selection};
use crate::patterns::WHITESPACE_NORMALIZE;
use crate::tree::{add_mark, Mark, Node, Tree};

pub use rules::{MarkRule, NodeRule, RuleSet, DEFAULT_RULES};

/// Elements whose content is never page text.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "title", "meta", "link",
];

/// Unknown elements that continue the current inline run instead of ending it.
const INLINE_CONTAINER_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "font",
    "i", "ins", "kbd", "label", "mark", "q", "s", "samp", "small", "span",
    "strike", "strong", "sub", "sup", "time", "tt", "u", "var",
];

/// Parse normalized HTML with the default rule set.
///
/// # Example
///
/// ```rust
/// use content_migrate::parser;
/// use content_migrate::tree::{Mark, Node};
///
/// let tree = parser::parse("<p>Hello <b>world</b></p>");
/// assert_eq!(
///     tree.content,
///     vec![Node::paragraph(vec![
///         Node::plain("Hello "),
///         Node::text("world", vec![Mark::Bold]),
///     ])]
/// );
/// ```
#[must_use]
pub fn parse(html: &str) -> Tree {
    parse_with_rules(html, &DEFAULT_RULES)
}

/// Parse HTML with a caller-supplied rule set.
#[must_use]
pub fn parse_with_rules(html: &str, rules: &RuleSet) -> Tree {
    let doc = dom::parse(html);
    let ctx = Context { rules };
    let content = ctx.blocks(&doc.select("body"));
    debug!("parsed {} top-level nodes from {} chars of HTML", content.len(), html.len());
    Tree::new(content)
}

/// A piece of inline content.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Text or break belonging to the current block.
    Run(Node),
    /// Block-level node found inside inline content; splits the block.
    Lifted(Node),
}

/// Parsing context handed to rule builders.
pub struct Context<'r> {
    rules: &'r RuleSet,
}

impl Context<'_> {
    /// Parse the children of `parent` in block context.
    #[must_use]
    pub fn blocks(&self, parent: &Selection) -> Vec<Node> {
        self.blocks_of(&dom::child_nodes(parent))
    }

    /// Parse a list of sibling nodes in block context.
    #[must_use]
    pub fn blocks_of(&self, nodes: &[NodeRef]) -> Vec<Node> {
        let mut walker = BlockWalker {
            ctx: self,
            out: Vec::new(),
            run: Vec::new(),
        };
        for node in nodes {
            walker.walk(node);
        }
        walker.finish()
    }

    /// Parse the children of `parent` in inline context with the given active marks.
    #[must_use]
    pub fn inline(&self, parent: &Selection, marks: &[Mark]) -> Vec<Inline> {
        let mut out = Vec::new();
        for child in dom::child_nodes(parent) {
            self.inline_node(&child, marks, &mut out);
        }
        out
    }

    fn inline_node(&self, node: &NodeRef, marks: &[Mark], out: &mut Vec<Inline>) {
        if node.is_text() {
            let text = collapse_whitespace(&node.text());
            if !text.is_empty() {
                out.push(Inline::Run(Node::text(text, marks.to_vec())));
            }
            return;
        }
        let Some(tag) = dom::node_tag(node) else {
            return;
        };
        if SKIPPED_TAGS.contains(&tag.as_str()) {
            return;
        }
        if tag == "br" {
            out.push(Inline::Run(Node::HardBreak {
                marks: marks.to_vec(),
            }));
            return;
        }

        let sel = Selection::from(*node);
        if let Some(rule) = self.rules.node_rule(&sel).filter(|r| r.lifts) {
            out.extend((rule.build)(&sel, self).into_iter().map(Inline::Lifted));
            return;
        }

        let mut active = marks.to_vec();
        if let Some(mark) = self.rules.mark(&sel) {
            add_mark(&mut active, mark);
        }
        for child in dom::child_nodes(&sel) {
            self.inline_node(&child, &active, out);
        }
    }
}

/// Block-context walker with a pending inline run.
struct BlockWalker<'c, 'r> {
    ctx: &'c Context<'r>,
    out: Vec<Node>,
    run: Vec<Inline>,
}

impl BlockWalker<'_, '_> {
    fn walk(&mut self, node: &NodeRef) {
        if node.is_text() {
            self.ctx.inline_node(node, &[], &mut self.run);
            return;
        }
        let Some(tag) = dom::node_tag(node) else {
            return;
        };
        if SKIPPED_TAGS.contains(&tag.as_str()) {
            return;
        }

        let sel = Selection::from(*node);
        if let Some(rule) = self.ctx.rules.node_rule(&sel) {
            self.flush_run();
            self.out.extend((rule.build)(&sel, self.ctx));
            return;
        }

        if tag == "br" || self.ctx.rules.mark(&sel).is_some() {
            self.ctx.inline_node(node, &[], &mut self.run);
        } else if INLINE_CONTAINER_TAGS.contains(&tag.as_str()) {
            for child in dom::child_nodes(&sel) {
                self.walk(&child);
            }
        } else {
            // Unknown container: its children stand on their own.
            self.flush_run();
            for child in dom::child_nodes(&sel) {
                self.walk(&child);
            }
            self.flush_run();
        }
    }

    fn flush_run(&mut self) {
        if self.run.is_empty() {
            return;
        }
        let run = std::mem::take(&mut self.run);
        self.out.extend(split_inline(run, Node::paragraph, false));
    }

    fn finish(mut self) -> Vec<Node> {
        self.flush_run();
        self.out
    }
}

/// Turn inline pieces into blocks built by `make`, split around lifted nodes.
///
/// With `keep_empty`, a block with no content is still emitted when nothing
/// was lifted (an empty `<p>` stays a paragraph for the cleaner to judge).
#[must_use]
pub fn split_inline(
    pieces: Vec<Inline>,
    make: impl Fn(Vec<Node>) -> Node,
    keep_empty: bool,
) -> Vec<Node> {
    let lifted_any = pieces.iter().any(|p| matches!(p, Inline::Lifted(_)));
    let mut out = Vec::new();
    let mut current = Vec::new();

    for piece in pieces {
        match piece {
            Inline::Run(node) => current.push(node),
            Inline::Lifted(node) => {
                let content = normalize_inline(std::mem::take(&mut current));
                if !content.is_empty() {
                    out.push(make(content));
                }
                out.push(node);
            }
        }
    }

    let content = normalize_inline(current);
    if !content.is_empty() || (keep_empty && !lifted_any) {
        out.push(make(content));
    }
    out
}

/// Collapse whitespace runs to single spaces.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_NORMALIZE.replace_all(text, " ").into_owned()
}

/// Tidy inline content: merge adjacent text runs with identical marks, drop
/// doubled spaces across runs, and trim at the edges and around breaks.
#[must_use]
pub fn normalize_inline(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    // Leading spaces are dropped at the start of the block and after breaks or spaces.
    let mut skip_space = true;

    for node in nodes {
        match node {
            Node::Text { text, marks } => {
                let text = if skip_space {
                    text.trim_start().to_string()
                } else {
                    text
                };
                if text.is_empty() {
                    continue;
                }
                skip_space = text.ends_with(' ');
                if let Some(Node::Text {
                    text: prev,
                    marks: prev_marks,
                }) = out.last_mut()
                {
                    if *prev_marks == marks {
                        prev.push_str(&text);
                        continue;
                    }
                }
                out.push(Node::Text { text, marks });
            }
            Node::HardBreak { marks } => {
                trim_trailing_space(&mut out);
                out.push(Node::HardBreak { marks });
                skip_space = true;
            }
            other => {
                skip_space = false;
                out.push(other);
            }
        }
    }

    trim_trailing_space(&mut out);
    out
}

fn trim_trailing_space(nodes: &mut Vec<Node>) {
    if let Some(Node::Text { text, .. }) = nodes.last_mut() {
        let trimmed_len = text.trim_end().len();
        text.truncate(trimmed_len);
        if text.is_empty() {
            nodes.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{CellAttrs, HeadingAttrs, ImageAttrs, ListAttrs, ParagraphAttrs};

    #[test]
    fn test_plain_paragraph_with_bold() {
        let tree = parse("<p>Hello <b>world</b></p>");
        assert_eq!(
            tree.content,
            vec![Node::paragraph(vec![
                Node::plain("Hello "),
                Node::text("world", vec![Mark::Bold]),
            ])]
        );
    }

    #[test]
    fn test_nested_marks_keep_order_and_dedupe() {
        let tree = parse("<p><b>a<i>b<strong>c</strong></i></b></p>");
        assert_eq!(
            tree.content[0].content(),
            &[
                Node::text("a", vec![Mark::Bold]),
                Node::text("bc", vec![Mark::Bold, Mark::Italic]),
            ]
        );
    }

    #[test]
    fn test_heading_drops_marks() {
        let tree = parse("<h2>The <em>big</em> <a href=\"/x\">news</a></h2>");
        assert_eq!(tree.content, vec![Node::heading(2, "The big news")]);
    }

    #[test]
    fn test_legacy_heading_class_is_kept_on_paragraph() {
        let tree = parse(r#"<p class="h 3">Title</p>"#);
        assert_eq!(
            tree.content,
            vec![Node::Paragraph {
                attrs: ParagraphAttrs {
                    class: Some("h 3".to_string())
                },
                content: vec![Node::plain("Title")],
            }]
        );
    }

    #[test]
    fn test_loose_text_in_div_becomes_paragraphs() {
        let tree = parse("<div>first <i>x</i></div><div>second</div>");
        assert_eq!(tree.content.len(), 2);
        assert_eq!(tree.content[0].plain_text(), "first x");
        assert_eq!(tree.content[1].plain_text(), "second");
    }

    #[test]
    fn test_unknown_inline_wrapper_is_flattened() {
        let tree = parse("<p><span class=\"x\">a</span> <font>b</font></p>");
        assert_eq!(tree.content, vec![Node::paragraph(vec![Node::plain("a b")])]);
    }

    #[test]
    fn test_scripts_are_skipped() {
        let tree = parse("<p>a<script>alert(1)</script></p><style>p{}</style>");
        assert_eq!(tree.content, vec![Node::paragraph(vec![Node::plain("a")])]);
    }

    #[test]
    fn test_break_carries_marks_and_trims_spaces() {
        let tree = parse("<p><b>a <br> b</b></p>");
        assert_eq!(
            tree.content[0].content(),
            &[
                Node::text("a", vec![Mark::Bold]),
                Node::HardBreak {
                    marks: vec![Mark::Bold]
                },
                Node::text("b", vec![Mark::Bold]),
            ]
        );
    }

    #[test]
    fn test_link_mark_keeps_raw_attributes() {
        let tree = parse(r#"<p><a href="https://x.test" target="_blank" rel="noopener">x</a></p>"#);
        let Node::Text { marks, .. } = &tree.content[0].content()[0] else {
            panic!("expected text");
        };
        let Mark::Link { attrs } = &marks[0] else {
            panic!("expected link");
        };
        assert_eq!(attrs.href, "https://x.test");
        assert_eq!(attrs.target.as_deref(), Some("_blank"));
        assert_eq!(attrs.rel.as_deref(), Some("noopener"));
    }

    #[test]
    fn test_nested_image_splits_paragraph() {
        let tree = parse(r#"<p>a <span><img src="i.png" alt="I"></span> b</p>"#);
        assert_eq!(
            tree.content,
            vec![
                Node::paragraph(vec![Node::plain("a")]),
                Node::Image {
                    attrs: ImageAttrs {
                        src: "i.png".to_string(),
                        alt: Some("I".to_string()),
                        title: None,
                    }
                },
                Node::paragraph(vec![Node::plain("b")]),
            ]
        );
    }

    #[test]
    fn test_lists_and_items() {
        let tree = parse("<ol start=\"3\"><li>one</li><li><p>two</p><ul><li>inner</li></ul></li></ol>");
        let Node::OrderedList { attrs, content } = &tree.content[0] else {
            panic!("expected ordered list");
        };
        assert_eq!(*attrs, ListAttrs { start: 3 });
        assert_eq!(content.len(), 2);
        assert_eq!(
            content[0],
            Node::ListItem {
                content: vec![Node::paragraph(vec![Node::plain("one")])]
            }
        );
        assert!(matches!(content[1].content()[1], Node::UnorderedList { .. }));
    }

    #[test]
    fn test_table_cells_are_distinct_types() {
        let tree = parse(
            "<table><caption>Prices</caption><thead><tr><th>Item</th></tr></thead>\
             <tbody><tr><td colspan=\"2\">Tea</td></tr></tbody></table>",
        );
        let Node::Table { attrs, content } = &tree.content[0] else {
            panic!("expected table");
        };
        assert_eq!(attrs.caption.as_deref(), Some("Prices"));
        assert_eq!(content.len(), 2);
        assert!(matches!(content[0].content()[0], Node::TableHeader { .. }));
        let Node::TableCell { attrs, .. } = &content[1].content()[0] else {
            panic!("expected body cell");
        };
        assert_eq!(*attrs, CellAttrs { colspan: 2, rowspan: 1 });
    }

    #[test]
    fn test_blockquote_divider_and_image() {
        let tree = parse(r#"<blockquote><p>q</p></blockquote><hr><img src="a.png">"#);
        assert!(matches!(tree.content[0], Node::Blockquote { .. }));
        assert_eq!(tree.content[1], Node::Divider);
        assert!(tree.content[2].is_image());
    }

    #[test]
    fn test_heading_levels() {
        let tree = parse("<h1>a</h1><h6>b</h6>");
        assert!(matches!(tree.content[0], Node::Heading { attrs: HeadingAttrs { level: 1 }, .. }));
        assert!(matches!(tree.content[1], Node::Heading { attrs: HeadingAttrs { level: 6 }, .. }));
    }

    #[test]
    fn test_preformatted_lines_become_breaks() {
        let tree = parse("<pre>line one\nline two</pre>");
        assert_eq!(
            tree.content,
            vec![Node::paragraph(vec![
                Node::plain("line one"),
                Node::hard_break(),
                Node::plain("line two"),
            ])]
        );
    }

    #[test]
    fn test_normalize_inline_merges_and_trims() {
        let out = normalize_inline(vec![
            Node::plain(" a "),
            Node::plain(" b "),
            Node::text(" c ", vec![Mark::Bold]),
        ]);
        assert_eq!(out, vec![Node::plain("a b "), Node::text("c", vec![Mark::Bold])]);
    }
}
