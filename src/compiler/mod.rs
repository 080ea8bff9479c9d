//! Block compiler: cleaned tree → ordered content blocks.
//!
//! One left fold over the top-level nodes with explicit state: the blocks
//! emitted so far and the prose accumulator. Nodes that map to a dedicated
//! block ("break types": embeds, images, content pictures, cards, social
//! embeds, feedback infobars) flush the accumulator first, so blocks keep the
//! order of the first node that contributed to them.

mod cards;
mod embeds;
mod expand;
mod lists;
mod postprocess;

use log::{debug, trace};

use crate::alt_text::{resolve_alt, AltTextGenerator};
use crate::block::Block;
use crate::options::Options;
use crate::patterns::{LEGACY_HEADING_CLASS, WHITESPACE_NORMALIZE};
use crate::tree::{Mark, Node, ParagraphAttrs, Tree};

pub use expand::expand_composites;

/// Compile a cleaned tree into content blocks.
///
/// # Example
///
/// ```rust
/// use content_migrate::{alt_text::NoAltText, block::Block, compiler, tree::{Node, Tree}, Options};
///
/// let tree = Tree::new(vec![Node::paragraph(vec![Node::plain("Hi")])]);
/// let blocks = compiler::compile(tree, &Options::default(), &NoAltText);
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].type_name(), "prose");
/// ```
#[must_use]
pub fn compile(tree: Tree, options: &Options, alt: &dyn AltTextGenerator) -> Vec<Block> {
    let nodes = expand_composites(tree.content, options);

    let mut compiler = Compiler::new(options, alt);
    for node in nodes {
        compiler.dispatch(node);
    }
    let blocks = postprocess::finish(compiler.finish(), options);

    debug!("compiled {} blocks", blocks.len());
    blocks
}

/// Whether a node becomes a block of its own and may not stay inside prose.
#[must_use]
pub fn is_break_type(node: &Node) -> bool {
    matches!(
        node,
        Node::Image { .. }
            | Node::Iframe { .. }
            | Node::Contentpic { .. }
            | Node::CardsGroup { .. }
            | Node::Card { .. }
            | Node::SocialEmbed { .. }
    )
}

/// Fold state.
struct Compiler<'a> {
    options: &'a Options,
    alt: &'a dyn AltTextGenerator,
    blocks: Vec<Block>,
    prose: Vec<Node>,
}

impl<'a> Compiler<'a> {
    fn new(options: &'a Options, alt: &'a dyn AltTextGenerator) -> Self {
        Self {
            options,
            alt,
            blocks: Vec::new(),
            prose: Vec::new(),
        }
    }

    fn dispatch(&mut self, node: Node) {
        match node {
            Node::Iframe { attrs, content, title } => {
                let block = embeds::iframe_block(&attrs, content, title, self.options);
                self.emit(block);
            }
            Node::Image { attrs } => {
                let alt = resolve_alt(attrs.alt.as_deref(), &attrs.src, self.alt, self.options);
                self.emit(Block::Image { src: attrs.src, alt });
            }
            Node::Contentpic { attrs, content } => {
                let alt = resolve_alt(attrs.alt.as_deref(), &attrs.src, self.alt, self.options);
                let mut extracted = Vec::new();
                let content: Vec<Node> = content
                    .into_iter()
                    .flat_map(prose_node)
                    .filter_map(|child| {
                        if is_break_type(&child) {
                            extracted.push(child);
                            None
                        } else {
                            Some(extract_break_types(child, &mut extracted))
                        }
                    })
                    .collect();
                if content.is_empty() {
                    self.emit(Block::Image { src: attrs.src, alt });
                } else {
                    self.emit(Block::Contentpic {
                        src: attrs.src,
                        alt,
                        content,
                    });
                }
                self.dispatch_all(extracted);
            }
            Node::CardsGroup { content } => self.cards_group(content),
            Node::Card { attrs } => self.emit(cards::cards_block(vec![attrs])),
            Node::SocialEmbed { attrs } => {
                let block = embeds::social_block(&attrs, self.options);
                self.emit(block);
            }
            Node::Paragraph { attrs, content } => self.paragraph(attrs, content),
            Node::Heading { .. } => self.prose.push(node.without_marks()),
            Node::Blockquote { content } => {
                for child in content {
                    self.dispatch(child.with_mark(&Mark::Italic));
                }
            }
            list @ (Node::OrderedList { .. } | Node::UnorderedList { .. }) => {
                lists::compile_list(self, list);
            }
            Node::Table { .. } => {
                let mut extracted = Vec::new();
                let table = extract_break_types(node, &mut extracted);
                if !extracted.is_empty() {
                    trace!("{} break type(s) pulled out of a table", extracted.len());
                }
                self.prose.push(table);
                self.dispatch_all(extracted);
            }
            Node::Divider => self.prose.push(node),
            inline @ (Node::Text { .. } | Node::HardBreak { .. }) => {
                self.prose.push(Node::paragraph(vec![inline]));
            }
            // Wrappers that lost their parent: their children stand on their own.
            Node::ListItem { content }
            | Node::TableRow { content }
            | Node::TableHeader { content, .. }
            | Node::TableCell { content, .. }
            | Node::DetailsGroup { content }
            | Node::Details { content }
            | Node::DetailsSummary { content }
            | Node::DetailsContent { content } => {
                for child in content {
                    self.dispatch(child);
                }
            }
        }
    }

    fn dispatch_all(&mut self, nodes: Vec<Node>) {
        for node in nodes {
            self.dispatch(node);
        }
    }

    /// Paragraph conventions: feedback links become an infobar and `class="h N"`
    /// paragraphs become headings; everything else is plain prose.
    fn paragraph(&mut self, attrs: ParagraphAttrs, content: Vec<Node>) {
        let node = Node::paragraph(content);
        let text = WHITESPACE_NORMALIZE.replace_all(&node.plain_text(), " ").trim().to_string();

        if self.options.is_feedback_phrase(&text) {
            if let Some(href) = node.first_link() {
                trace!("feedback paragraph {text:?} -> infobar");
                let block = Block::Infobar {
                    title: self.options.infobar_title.clone(),
                    button_label: text,
                    button_url: href.to_string(),
                };
                self.emit(block);
                return;
            }
        }

        if let Some(level) = attrs.class.as_deref().and_then(legacy_heading_level) {
            trace!("legacy heading class -> level {level}");
            self.prose.push(Node::heading(level, text));
            return;
        }

        self.prose.push(node);
    }

    /// Cards are gathered into one block per run; other content in the group
    /// is dispatched in place.
    fn cards_group(&mut self, content: Vec<Node>) {
        let mut run = Vec::new();
        for child in content {
            match child {
                Node::Card { attrs } => run.push(attrs),
                other => {
                    if !run.is_empty() {
                        self.emit(cards::cards_block(std::mem::take(&mut run)));
                    }
                    self.dispatch(other);
                }
            }
        }
        if !run.is_empty() {
            self.emit(cards::cards_block(run));
        }
    }

    /// Flush prose, then append a dedicated block.
    fn emit(&mut self, block: Block) {
        self.flush_prose();
        if block.is_empty() {
            trace!("dropped empty {} block", block.type_name());
            return;
        }
        self.blocks.push(block);
    }

    fn flush_prose(&mut self) {
        if self.prose.is_empty() {
            return;
        }
        let content = std::mem::take(&mut self.prose);
        self.blocks.push(Block::Prose { content });
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_prose();
        self.blocks
    }
}

/// Heading level of a legacy `class="h N"` paragraph.
fn legacy_heading_level(class: &str) -> Option<u8> {
    LEGACY_HEADING_CLASS
        .captures(class)
        .and_then(|c| c[1].parse::<u8>().ok())
}

/// Remove break-type nodes from anywhere below `node`, collecting them in `out`.
fn extract_break_types(node: Node, out: &mut Vec<Node>) -> Node {
    node.map_content(|children| {
        children
            .into_iter()
            .filter_map(|child| {
                if is_break_type(&child) {
                    out.push(child);
                    None
                } else {
                    Some(extract_break_types(child, out))
                }
            })
            .collect()
    })
}

/// A node as it may appear inside prose content: paragraph classes dropped,
/// heading marks stripped, legacy heading paragraphs promoted.
fn prose_node(node: Node) -> Vec<Node> {
    match node {
        Node::Paragraph { attrs, content } => {
            let paragraph = Node::paragraph(content);
            match attrs.class.as_deref().and_then(legacy_heading_level) {
                Some(level) => {
                    let text = WHITESPACE_NORMALIZE.replace_all(&paragraph.plain_text(), " ").trim().to_string();
                    vec![Node::heading(level, text)]
                }
                None => vec![paragraph],
            }
        }
        Node::Heading { .. } => vec![node.without_marks()],
        Node::Blockquote { content } => content
            .into_iter()
            .flat_map(|c| prose_node(c.with_mark(&Mark::Italic)))
            .collect(),
        other => vec![other],
    }
}
