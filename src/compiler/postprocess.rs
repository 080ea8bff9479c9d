//! Prose post-pass, run once after the fold.

use super::legacy_heading_level;
use crate::block::Block;
use crate::options::Options;
use crate::patterns::WHITESPACE_NORMALIZE;
use crate::tree::{HeadingAttrs, Node};

/// Tidy every prose block and drop the ones left empty. Content-picture
/// text gets the same nested rewrite.
pub(super) fn finish(blocks: Vec<Block>, options: &Options) -> Vec<Block> {
    blocks
        .into_iter()
        .filter_map(|block| match block {
            Block::Prose { content } => {
                let content = tidy_prose(content, options);
                (!content.is_empty()).then_some(Block::Prose { content })
            }
            Block::Contentpic { src, alt, content } => Some(Block::Contentpic {
                src,
                alt,
                content: content.into_iter().map(|n| tidy_node(n, options)).collect(),
            }),
            other => Some(other),
        })
        .collect()
}

/// Drop break-only paragraphs and dividers right before a heading.
fn tidy_prose(content: Vec<Node>, options: &Options) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(content.len());
    for node in content {
        let node = tidy_node(node, options);
        if matches!(node, Node::Heading { .. }) {
            while out.last().is_some_and(is_heading_lead_in) {
                out.pop();
            }
        }
        out.push(node);
    }
    out
}

/// Clamp heading levels and drop paragraph classes at every depth. Legacy
/// `class="h N"` paragraphs still waiting below the top level become headings.
fn tidy_node(node: Node, options: &Options) -> Node {
    match node {
        Node::Heading { attrs, content } => Node::Heading {
            attrs: HeadingAttrs {
                level: options.clamp_heading_level(attrs.level),
            },
            content,
        },
        Node::Paragraph { attrs, content } => {
            match attrs.class.as_deref().and_then(legacy_heading_level) {
                Some(level) => {
                    let text = Node::paragraph(content).plain_text();
                    let text = WHITESPACE_NORMALIZE.replace_all(&text, " ").trim().to_string();
                    Node::heading(options.clamp_heading_level(level), text)
                }
                None => Node::paragraph(content),
            }
        }
        other => other.map_content(|children| children.into_iter().map(|c| tidy_node(c, options)).collect()),
    }
}

fn is_heading_lead_in(node: &Node) -> bool {
    match node {
        Node::Divider => true,
        Node::Paragraph { .. } => node.is_blank(),
        _ => false,
    }
}
