//! Card blocks.

use crate::block::{Block, Card};

/// `cards` when every card has an image, otherwise `infocards` with the image
/// fields dropped.
pub(super) fn cards_block(cards: Vec<Card>) -> Block {
    if !cards.is_empty() && cards.iter().all(|c| c.image.is_some()) {
        return Block::Cards { cards };
    }
    Block::Infocards {
        cards: cards
            .into_iter()
            .map(|card| Card {
                image: None,
                alt: None,
                fit: None,
                ..card
            })
            .collect(),
    }
}
