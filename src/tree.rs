//! Intermediate rich-text document tree.
//!
//! The parser produces a [`Tree`], the cleaner rewrites it and the block
//! compiler lowers it into blocks. Nodes serialize to the usual rich-text
//! editor JSON shape (`{"type": "paragraph", "content": [...]}`), and the
//! structural nodes are embedded as-is in `prose` blocks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root of the intermediate document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "doc")]
pub struct Tree {
    /// Top-level nodes in document order.
    #[serde(default)]
    pub content: Vec<Node>,
}

impl Tree {
    /// Create a tree from top-level nodes.
    #[must_use]
    pub fn new(content: Vec<Node>) -> Self {
        Self { content }
    }

    /// Check whether any node in the tree satisfies `pred`.
    #[must_use]
    pub fn any(&self, pred: &impl Fn(&Node) -> bool) -> bool {
        self.content.iter().any(|n| n.any(pred))
    }
}

/// Inline formatting attached to text and break nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strike,
    Subscript,
    Superscript,
    Link { attrs: LinkAttrs },
}

impl Mark {
    /// Whether both marks are of the same kind (links compare equal regardless of href).
    #[must_use]
    pub fn same_kind(&self, other: &Mark) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Build a link mark from an href.
    #[must_use]
    pub fn link(href: impl Into<String>) -> Self {
        Mark::Link {
            attrs: LinkAttrs {
                href: href.into(),
                ..LinkAttrs::default()
            },
        }
    }
}

/// Add `mark` unless a mark of the same kind is already present.
///
/// The first mark of a kind wins, so for nested links the outer one is kept.
pub fn add_mark(marks: &mut Vec<Mark>, mark: Mark) {
    if !marks.iter().any(|m| m.same_kind(&mark)) {
        marks.push(mark);
    }
}

/// Attributes of a link mark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAttrs {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphAttrs {
    /// Raw `class` attribute; only the legacy `h N` heading convention uses it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl ParagraphAttrs {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.class.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingAttrs {
    pub level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAttrs {
    pub start: u32,
}

impl Default for ListAttrs {
    fn default() -> Self {
        Self { start: 1 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellAttrs {
    pub colspan: u32,
    pub rowspan: u32,
}

impl Default for CellAttrs {
    fn default() -> Self {
        Self { colspan: 1, rowspan: 1 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttrs {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Fields of a legacy card, as found in the markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAttrs {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// A node of the intermediate tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Paragraph {
        #[serde(default, skip_serializing_if = "ParagraphAttrs::is_empty")]
        attrs: ParagraphAttrs,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        content: Vec<Node>,
    },
    Heading {
        attrs: HeadingAttrs,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        content: Vec<Node>,
    },
    OrderedList {
        #[serde(default)]
        attrs: ListAttrs,
        #[serde(default)]
        content: Vec<Node>,
    },
    UnorderedList {
        #[serde(default)]
        content: Vec<Node>,
    },
    ListItem {
        #[serde(default)]
        content: Vec<Node>,
    },
    Table {
        #[serde(default)]
        attrs: TableAttrs,
        #[serde(default)]
        content: Vec<Node>,
    },
    TableRow {
        #[serde(default)]
        content: Vec<Node>,
    },
    TableHeader {
        #[serde(default)]
        attrs: CellAttrs,
        #[serde(default)]
        content: Vec<Node>,
    },
    TableCell {
        #[serde(default)]
        attrs: CellAttrs,
        #[serde(default)]
        content: Vec<Node>,
    },
    Blockquote {
        #[serde(default)]
        content: Vec<Node>,
    },
    Image {
        attrs: ImageAttrs,
    },
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        marks: Vec<Mark>,
    },
    HardBreak {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        marks: Vec<Mark>,
    },
    Divider,
    /// Embedded frame. `content` holds the serialized `<iframe>` markup once
    /// the cleaner has run.
    Iframe {
        #[serde(default)]
        attrs: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    DetailsGroup {
        #[serde(default)]
        content: Vec<Node>,
    },
    Details {
        #[serde(default)]
        content: Vec<Node>,
    },
    DetailsSummary {
        #[serde(default)]
        content: Vec<Node>,
    },
    DetailsContent {
        #[serde(default)]
        content: Vec<Node>,
    },
    CardsGroup {
        #[serde(default)]
        content: Vec<Node>,
    },
    Card {
        attrs: CardAttrs,
    },
    SocialEmbed {
        #[serde(default)]
        attrs: SocialAttrs,
    },
    /// Legacy image-beside-text box.
    Contentpic {
        attrs: ImageAttrs,
        #[serde(default)]
        content: Vec<Node>,
    },
}

impl Node {
    /// Text node with marks.
    #[must_use]
    pub fn text(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Node::Text {
            text: text.into(),
            marks,
        }
    }

    /// Text node without marks.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::text(text, Vec::new())
    }

    /// Paragraph without attributes.
    #[must_use]
    pub fn paragraph(content: Vec<Node>) -> Self {
        Node::Paragraph {
            attrs: ParagraphAttrs::default(),
            content,
        }
    }

    /// Heading with plain text content.
    #[must_use]
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        let text = text.into();
        Node::Heading {
            attrs: HeadingAttrs { level },
            content: if text.is_empty() { Vec::new() } else { vec![Node::plain(text)] },
        }
    }

    /// Paragraph holding a single link.
    #[must_use]
    pub fn link_paragraph(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self::paragraph(vec![Node::text(label, vec![Mark::link(href)])])
    }

    #[must_use]
    pub fn hard_break() -> Self {
        Node::HardBreak { marks: Vec::new() }
    }

    /// The `type` tag this node serializes with.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Paragraph { .. } => "paragraph",
            Node::Heading { .. } => "heading",
            Node::OrderedList { .. } => "orderedList",
            Node::UnorderedList { .. } => "unorderedList",
            Node::ListItem { .. } => "listItem",
            Node::Table { .. } => "table",
            Node::TableRow { .. } => "tableRow",
            Node::TableHeader { .. } => "tableHeader",
            Node::TableCell { .. } => "tableCell",
            Node::Blockquote { .. } => "blockquote",
            Node::Image { .. } => "image",
            Node::Text { .. } => "text",
            Node::HardBreak { .. } => "hardBreak",
            Node::Divider => "divider",
            Node::Iframe { .. } => "iframe",
            Node::DetailsGroup { .. } => "detailsGroup",
            Node::Details { .. } => "details",
            Node::DetailsSummary { .. } => "detailsSummary",
            Node::DetailsContent { .. } => "detailsContent",
            Node::CardsGroup { .. } => "cardsGroup",
            Node::Card { .. } => "card",
            Node::SocialEmbed { .. } => "socialEmbed",
            Node::Contentpic { .. } => "contentpic",
        }
    }

    /// Child nodes; empty for leaves.
    #[must_use]
    pub fn content(&self) -> &[Node] {
        match self {
            Node::Paragraph { content, .. }
            | Node::Heading { content, .. }
            | Node::OrderedList { content, .. }
            | Node::UnorderedList { content }
            | Node::ListItem { content }
            | Node::Table { content, .. }
            | Node::TableRow { content }
            | Node::TableHeader { content, .. }
            | Node::TableCell { content, .. }
            | Node::Blockquote { content }
            | Node::DetailsGroup { content }
            | Node::Details { content }
            | Node::DetailsSummary { content }
            | Node::DetailsContent { content }
            | Node::CardsGroup { content }
            | Node::Contentpic { content, .. } => content,
            Node::Image { .. }
            | Node::Text { .. }
            | Node::HardBreak { .. }
            | Node::Divider
            | Node::Iframe { .. }
            | Node::Card { .. }
            | Node::SocialEmbed { .. } => &[],
        }
    }

    /// Mutable child list, or `None` for leaves.
    pub fn content_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Paragraph { content, .. }
            | Node::Heading { content, .. }
            | Node::OrderedList { content, .. }
            | Node::UnorderedList { content }
            | Node::ListItem { content }
            | Node::Table { content, .. }
            | Node::TableRow { content }
            | Node::TableHeader { content, .. }
            | Node::TableCell { content, .. }
            | Node::Blockquote { content }
            | Node::DetailsGroup { content }
            | Node::Details { content }
            | Node::DetailsSummary { content }
            | Node::DetailsContent { content }
            | Node::CardsGroup { content }
            | Node::Contentpic { content, .. } => Some(content),
            Node::Image { .. }
            | Node::Text { .. }
            | Node::HardBreak { .. }
            | Node::Divider
            | Node::Iframe { .. }
            | Node::Card { .. }
            | Node::SocialEmbed { .. } => None,
        }
    }

    /// Rebuild this node with its children passed through `f`. Leaves are returned unchanged.
    #[must_use]
    pub fn map_content(mut self, f: impl FnOnce(Vec<Node>) -> Vec<Node>) -> Node {
        if let Some(content) = self.content_mut() {
            let children = std::mem::take(content);
            *content = f(children);
        }
        self
    }

    /// Check whether this node or any descendant satisfies `pred`.
    #[must_use]
    pub fn any(&self, pred: &impl Fn(&Node) -> bool) -> bool {
        pred(self) || self.content().iter().any(|c| c.any(pred))
    }

    #[must_use]
    pub fn is_break(&self) -> bool {
        matches!(self, Node::HardBreak { .. })
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self, Node::Image { .. })
    }

    /// Whether this node carries no visible content.
    ///
    /// Paragraphs and headings are blank when they hold nothing but breaks;
    /// cells are blank when every child is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Node::Paragraph { content, .. } | Node::Heading { content, .. } => {
                content.iter().all(Node::is_break)
            }
            Node::TableHeader { content, .. } | Node::TableCell { content, .. } => {
                content.iter().all(Node::is_blank)
            }
            Node::Text { text, .. } => text.is_empty(),
            Node::HardBreak { .. } => true,
            _ => false,
        }
    }

    /// Concatenated text of this node and its descendants. Breaks count as a space.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text { text, .. } => out.push_str(text),
            Node::HardBreak { .. } => out.push(' '),
            _ => {
                for child in self.content() {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Remove all marks from this node and its descendants.
    #[must_use]
    pub fn without_marks(self) -> Node {
        match self {
            Node::Text { text, .. } => Node::Text {
                text,
                marks: Vec::new(),
            },
            Node::HardBreak { .. } => Node::hard_break(),
            other => other.map_content(|c| c.into_iter().map(Node::without_marks).collect()),
        }
    }

    /// Add `mark` to every text run in this node and its descendants.
    ///
    /// Headings are left alone since they never carry marks.
    #[must_use]
    pub fn with_mark(self, mark: &Mark) -> Node {
        match self {
            Node::Text { text, mut marks } => {
                add_mark(&mut marks, mark.clone());
                Node::Text { text, marks }
            }
            heading @ Node::Heading { .. } => heading,
            other => other.map_content(|c| c.into_iter().map(|n| n.with_mark(mark)).collect()),
        }
    }

    /// First link href found in this node or its descendants.
    #[must_use]
    pub fn first_link(&self) -> Option<&str> {
        match self {
            Node::Text { marks, .. } => marks.iter().find_map(|m| match m {
                Mark::Link { attrs } => Some(attrs.href.as_str()),
                _ => None,
            }),
            _ => self.content().iter().find_map(Node::first_link),
        }
    }
}
