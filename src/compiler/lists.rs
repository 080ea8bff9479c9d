//! List rebuilding.
//!
//! Lists are rebuilt item by item. Paragraphs inside an item are merged into
//! one (two breaks between them). A break-type node met directly in an item
//! closes the list built so far, is dispatched as its own block, and a fresh
//! list continues after it. Break types nested deeper, in sub-lists, are
//! pulled out and emitted right after the item that holds them.

use log::trace;

use super::{extract_break_types, is_break_type, prose_node, Compiler};
use crate::tree::{ListAttrs, Mark, Node};

pub(super) fn compile_list(compiler: &mut Compiler, list: Node) {
    let (ordered, start, items) = match list {
        Node::OrderedList { attrs, content } => (true, attrs.start, content),
        Node::UnorderedList { content } => (false, 1, content),
        other => {
            compiler.prose.push(other);
            return;
        }
    };

    let mut builder = ListBuilder {
        ordered,
        start,
        items: Vec::new(),
    };

    for item in items {
        let content = match item {
            Node::ListItem { content } => content,
            other => vec![other],
        };

        let mut segment = Vec::new();
        let mut nested = Vec::new();
        for child in content {
            if is_break_type(&child) {
                builder.push_item(std::mem::take(&mut segment));
                trace!("{} inside list item splits the list", child.type_name());
                builder.flush_into(compiler);
                compiler.dispatch(child);
            } else {
                segment.push(extract_break_types(child, &mut nested));
            }
        }
        builder.push_item(segment);

        if !nested.is_empty() {
            builder.flush_into(compiler);
            compiler.dispatch_all(nested);
        }
    }
    builder.flush_into(compiler);
}

/// Items of the list currently being rebuilt.
struct ListBuilder {
    ordered: bool,
    /// Number of the next list opened; ordered lists continue numbering.
    start: u32,
    items: Vec<Node>,
}

impl ListBuilder {
    fn push_item(&mut self, content: Vec<Node>) {
        let content = merge_paragraphs(content);
        if !content.is_empty() {
            self.items.push(Node::ListItem { content });
        }
    }

    fn flush_into(&mut self, compiler: &mut Compiler) {
        if self.items.is_empty() {
            return;
        }
        let items = std::mem::take(&mut self.items);
        let count = u32::try_from(items.len()).unwrap_or(u32::MAX);
        let list = if self.ordered {
            Node::OrderedList {
                attrs: ListAttrs { start: self.start },
                content: items,
            }
        } else {
            Node::UnorderedList { content: items }
        };
        self.start = self.start.saturating_add(count);
        compiler.prose.push(list);
    }
}

/// Merge consecutive paragraphs of an item and tidy nested lists.
///
/// Headings inside items become plain paragraphs and blockquotes are
/// unwrapped into italic content.
fn merge_paragraphs(content: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::new();
    let flattened = content.into_iter().flat_map(|node| match node {
        Node::Heading { content, .. } => vec![Node::paragraph(content)],
        Node::Blockquote { content } => content
            .into_iter()
            .flat_map(|c| prose_node(c.with_mark(&Mark::Italic)))
            .collect(),
        other => prose_node(other),
    });

    for node in flattened {
        let node = match node {
            Node::OrderedList { attrs, content } => Node::OrderedList {
                attrs,
                content: tidy_items(content),
            },
            Node::UnorderedList { content } => Node::UnorderedList {
                content: tidy_items(content),
            },
            Node::Heading { content, .. } => Node::paragraph(content),
            other => other,
        };

        if let (Some(Node::Paragraph { content: prev, .. }), Node::Paragraph { content, .. }) =
            (out.last_mut(), &node)
        {
            if !content.is_empty() {
                if !prev.is_empty() {
                    prev.push(Node::hard_break());
                    prev.push(Node::hard_break());
                }
                prev.extend(content.iter().cloned());
            }
            continue;
        }
        out.push(node);
    }
    out
}

fn tidy_items(items: Vec<Node>) -> Vec<Node> {
    items
        .into_iter()
        .filter_map(|item| {
            let content = merge_paragraphs(match item {
                Node::ListItem { content } => content,
                other => vec![other],
            });
            (!content.is_empty()).then_some(Node::ListItem { content })
        })
        .collect()
}
