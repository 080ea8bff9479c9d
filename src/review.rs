//! Review-flag collection.
//!
//! Inspects a finished page document (and the raw page source) for things a
//! person should look at before publishing. Collection never fails and never
//! changes the page; each flag is raised at most once, in a fixed order.

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::block::{Block, Card};
use crate::dom;
use crate::options::Options;
use crate::page::PageDocument;
use crate::patterns::ACCORDION_SOURCE;
use crate::tree::{Mark, Node};
use crate::url_utils::matches_host_prefix;
use crate::validate::{SchemaValidator, Validation};

/// Something in a migrated page that needs a human decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Flag {
    /// Images whose alt text is missing or the placeholder.
    MissingAlt { count: usize },
    /// Images whose alt text is longer than the configured limit.
    OverlongAlt { count: usize },
    /// Images inside tables that were replaced by text.
    TableImages { count: usize },
    /// Tables were migrated with synthetic captions.
    Tables { count: usize },
    /// Cards were migrated.
    Cards { count: usize },
    /// A cards block exceeds the card count or text length limits.
    CardLimits,
    /// The source contains accordions, flattened into headings.
    Accordions,
    /// Slide-deck embeds replaced by a link.
    Slides { count: usize },
    /// Social-media embeds replaced by a link.
    Social { count: usize },
    /// Iframes passed through from hosts that are not trusted form hosts.
    UntrustedIframes { count: usize },
    /// The page failed schema validation.
    Invalid { errors: Vec<String> },
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flag::MissingAlt { count } => write!(f, "{count} image(s) need alt text"),
            Flag::OverlongAlt { count } => write!(f, "{count} image(s) have overlong alt text"),
            Flag::TableImages { count } => {
                write!(f, "{count} image(s) were removed from tables and replaced by text")
            }
            Flag::Tables { count } => write!(f, "{count} table(s) need a caption and a layout check"),
            Flag::Cards { count } => write!(f, "{count} card(s) need a content check"),
            Flag::CardLimits => write!(f, "cards exceed the count or text length limits"),
            Flag::Accordions => write!(f, "accordions were flattened into headings"),
            Flag::Slides { count } => write!(f, "{count} presentation(s) were replaced by a link"),
            Flag::Social { count } => write!(f, "{count} social media post(s) were replaced by a link"),
            Flag::UntrustedIframes { count } => {
                write!(f, "{count} embed(s) from untrusted hosts were kept as iframes")
            }
            Flag::Invalid { errors } => write!(f, "schema validation failed: {}", errors.join("; ")),
        }
    }
}

/// Validation outcome plus review flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub is_valid: bool,
    pub flags: Vec<Flag>,
}

impl Review {
    /// Human-readable review items, one per flag.
    #[must_use]
    pub fn items(&self) -> Vec<String> {
        self.flags.iter().map(ToString::to_string).collect()
    }

    #[must_use]
    pub fn needs_review(&self) -> bool {
        !self.is_valid || !self.flags.is_empty()
    }
}

/// Validate `page` and collect its review flags.
#[must_use]
pub fn review(
    page: &PageDocument,
    source: &str,
    validator: &dyn SchemaValidator,
    options: &Options,
) -> Review {
    let stats = Stats::collect(&page.content, options);
    let mut flags: Vec<Flag> = [
        counted(stats.missing_alt, |count| Flag::MissingAlt { count }),
        counted(stats.overlong_alt, |count| Flag::OverlongAlt { count }),
        counted(stats.table_images, |count| Flag::TableImages { count }),
        counted(stats.tables, |count| Flag::Tables { count }),
        counted(stats.cards, |count| Flag::Cards { count }),
        stats.card_limits.then_some(Flag::CardLimits),
        ACCORDION_SOURCE.is_match(source).then_some(Flag::Accordions),
        counted(stats.slides, |count| Flag::Slides { count }),
        counted(stats.social, |count| Flag::Social { count }),
        counted(stats.untrusted_iframes, |count| Flag::UntrustedIframes { count }),
    ]
    .into_iter()
    .flatten()
    .collect();

    let validation = match serde_json::to_value(page) {
        Ok(value) => validator.validate(&value),
        Err(err) => Validation::from_errors(vec![err.to_string()]),
    };
    if !validation.is_valid {
        flags.push(Flag::Invalid {
            errors: validation.errors,
        });
    }

    debug!("review: valid={} flags={}", validation.is_valid, flags.len());
    Review {
        is_valid: validation.is_valid,
        flags,
    }
}

fn counted(count: usize, flag: fn(usize) -> Flag) -> Option<Flag> {
    (count > 0).then(|| flag(count))
}

/// Counts gathered in one walk over the blocks.
#[derive(Debug, Default)]
struct Stats {
    missing_alt: usize,
    overlong_alt: usize,
    table_images: usize,
    tables: usize,
    cards: usize,
    card_limits: bool,
    slides: usize,
    social: usize,
    untrusted_iframes: usize,
}

impl Stats {
    fn collect(blocks: &[Block], options: &Options) -> Self {
        let mut stats = Stats::default();
        for block in blocks {
            match block {
                Block::Prose { content } => stats.walk_nodes(content, options),
                Block::Image { alt, .. } => stats.check_alt(alt, options),
                Block::Contentpic { alt, content, .. } => {
                    stats.check_alt(alt, options);
                    stats.walk_nodes(content, options);
                }
                Block::Cards { cards } | Block::Infocards { cards } => stats.check_cards(cards, options),
                Block::Iframe { content, .. } => {
                    let src = iframe_src(content);
                    if !matches_host_prefix(&src, &options.trusted_form_hosts) {
                        stats.untrusted_iframes += 1;
                    }
                }
                Block::Video { .. } | Block::Map { .. } | Block::Infobar { .. } => {}
            }
        }
        stats
    }

    fn check_alt(&mut self, alt: &str, options: &Options) {
        let alt = alt.trim();
        if alt.is_empty() || alt == options.image_alt_placeholder {
            self.missing_alt += 1;
        } else if alt.chars().count() > options.max_alt_length {
            self.overlong_alt += 1;
        }
    }

    fn check_cards(&mut self, cards: &[Card], options: &Options) {
        self.cards += cards.len();
        let too_long = |text: Option<&str>, max: usize| text.is_some_and(|t| t.chars().count() > max);
        if cards.len() > options.max_cards
            || cards.iter().any(|c| {
                too_long(Some(c.title.as_str()), options.max_card_title_length)
                    || too_long(c.description.as_deref(), options.max_card_description_length)
            })
        {
            self.card_limits = true;
        }
    }

    fn walk_nodes(&mut self, nodes: &[Node], options: &Options) {
        for node in nodes {
            match node {
                Node::Table { .. } => self.tables += 1,
                Node::Text { text, marks } => {
                    if text.starts_with(&options.table_image_prefix) {
                        self.table_images += 1;
                    }
                    let is_link = marks.iter().any(|m| matches!(m, Mark::Link { .. }));
                    if is_link && *text == options.slide_link_text {
                        self.slides += 1;
                    }
                    if *text == options.social_link_text {
                        self.social += 1;
                    }
                }
                _ => {}
            }
            self.walk_nodes(node.content(), options);
        }
    }
}

/// `src` of the first iframe in passthrough markup.
fn iframe_src(markup: &str) -> String {
    let doc = dom::parse(markup);
    dom::get_attribute(&doc.select("iframe"), "src").unwrap_or_default()
}
