//! Output content blocks.

use serde::{Deserialize, Serialize};

use crate::tree::{CardAttrs, Node};

/// A card inside a `cards` or `infocards` block.
pub type Card = CardAttrs;

/// A typed content block of the output page.
///
/// Serialized with a `type` tag and camelCase field names, matching the page
/// schema (`{"type": "infobar", "buttonLabel": …}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    /// Rich text: headings, paragraphs, lists, tables and dividers.
    Prose { content: Vec<Node> },
    Image { src: String, alt: String },
    Video { title: String, url: String },
    Map { title: String, url: String },
    #[serde(rename_all = "camelCase")]
    Infobar {
        title: String,
        button_label: String,
        button_url: String,
    },
    Contentpic {
        src: String,
        alt: String,
        content: Vec<Node>,
    },
    /// Cards that all carry an image.
    Cards { cards: Vec<Card> },
    /// Cards without images.
    Infocards { cards: Vec<Card> },
    /// Unrecognised embed kept as literal `<iframe>` markup.
    Iframe { title: String, content: String },
}

impl Block {
    /// The `type` tag this block serializes with.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Block::Prose { .. } => "prose",
            Block::Image { .. } => "image",
            Block::Video { .. } => "video",
            Block::Map { .. } => "map",
            Block::Infobar { .. } => "infobar",
            Block::Contentpic { .. } => "contentpic",
            Block::Cards { .. } => "cards",
            Block::Infocards { .. } => "infocards",
            Block::Iframe { .. } => "iframe",
        }
    }

    /// Whether the block carries nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Block::Prose { content } => content.is_empty(),
            Block::Image { src, .. } => src.is_empty(),
            Block::Video { url, .. } | Block::Map { url, .. } => url.is_empty(),
            Block::Infobar { button_url, .. } => button_url.is_empty(),
            Block::Contentpic { src, content, .. } => src.is_empty() || content.is_empty(),
            Block::Cards { cards } | Block::Infocards { cards } => cards.is_empty(),
            Block::Iframe { content, .. } => content.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infobar_serializes_camel_case() {
        let block = Block::Infobar {
            title: "T".to_string(),
            button_label: "Go".to_string(),
            button_url: "/go".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            serde_json::json!({"type": "infobar", "title": "T", "buttonLabel": "Go", "buttonUrl": "/go"})
        );
    }

    #[test]
    fn test_card_fields_serialize_camel_case() {
        let block = Block::Infocards {
            cards: vec![Card {
                title: "A".to_string(),
                link_url: Some("/a".to_string()),
                ..Card::default()
            }],
        };
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            serde_json::json!({"type": "infocards", "cards": [{"title": "A", "linkUrl": "/a"}]})
        );
    }

    #[test]
    fn test_is_empty() {
        assert!(Block::Prose { content: vec![] }.is_empty());
        assert!(!Block::Video {
            title: String::new(),
            url: "https://youtu.be/x".to_string()
        }
        .is_empty());
    }
}
