//! Parser Rule Tables
//!
//! Node rules map an element to zero or more tree nodes; mark rules map an
//! inline element to a mark. Rules are plain predicate/builder function
//! pairs and are tried in table order, first match wins.

use dom_query::Selection;

use super::handlers;
use super::Context;
use crate::dom;
use crate::normalize::EMBED_MARKER_ATTR;
use crate::patterns::SOCIAL_EMBED_CLASS;
use crate::tree::{LinkAttrs, Mark, Node};

/// Predicate deciding whether a rule applies to an element.
pub type Matcher = fn(&Selection) -> bool;

/// Builds tree nodes from a matched element.
pub type Builder = fn(&Selection, &Context) -> Vec<Node>;

/// Maps a matching element to tree nodes.
#[derive(Clone, Copy)]
pub struct NodeRule {
    pub name: &'static str,
    pub matches: Matcher,
    pub build: Builder,
    /// When met inside inline content, the built nodes are lifted out and
    /// split the enclosing block. Other rules are flattened there.
    pub lifts: bool,
}

/// Maps a matching inline element to a mark.
#[derive(Clone, Copy)]
pub struct MarkRule {
    pub name: &'static str,
    pub matches: Matcher,
    pub build: fn(&Selection) -> Mark,
}

/// An ordered pair of node and mark rule tables.
#[derive(Clone, Copy)]
pub struct RuleSet {
    pub nodes: &'static [NodeRule],
    pub marks: &'static [MarkRule],
}

impl RuleSet {
    /// First node rule matching `sel`.
    #[must_use]
    pub fn node_rule(&self, sel: &Selection) -> Option<&NodeRule> {
        self.nodes.iter().find(|rule| (rule.matches)(sel))
    }

    /// Mark produced by the first mark rule matching `sel`.
    #[must_use]
    pub fn mark(&self, sel: &Selection) -> Option<Mark> {
        self.marks
            .iter()
            .find(|rule| (rule.matches)(sel))
            .map(|rule| (rule.build)(sel))
    }
}

/// The rule set used by [`super::parse`].
pub const DEFAULT_RULES: RuleSet = RuleSet {
    nodes: NODE_RULES,
    marks: MARK_RULES,
};

/// Node rules in priority order.
///
/// Custom markup comes first: card links must win over the link mark and
/// social embeds over the plain blockquote rule.
pub const NODE_RULES: &[NodeRule] = &[
    NodeRule { name: "cardsGroup", matches: is_cards_group, build: handlers::cards_group, lifts: false },
    NodeRule { name: "card", matches: is_card, build: handlers::card, lifts: true },
    NodeRule { name: "detailsGroup", matches: is_details_group, build: handlers::details_group, lifts: false },
    NodeRule { name: "details", matches: is_details, build: handlers::details, lifts: false },
    NodeRule { name: "socialEmbed", matches: is_social_embed, build: handlers::social_embed, lifts: false },
    NodeRule { name: "contentpic", matches: is_contentpic, build: handlers::contentpic, lifts: false },
    NodeRule { name: "embed", matches: is_embed_marker, build: handlers::embed, lifts: true },
    NodeRule { name: "iframe", matches: is_iframe, build: handlers::iframe, lifts: true },
    NodeRule { name: "heading", matches: is_heading, build: handlers::heading, lifts: false },
    NodeRule { name: "paragraph", matches: is_paragraph, build: handlers::paragraph, lifts: false },
    NodeRule { name: "preformatted", matches: is_preformatted, build: handlers::preformatted, lifts: false },
    NodeRule { name: "unorderedList", matches: is_unordered_list, build: handlers::unordered_list, lifts: false },
    NodeRule { name: "orderedList", matches: is_ordered_list, build: handlers::ordered_list, lifts: false },
    NodeRule { name: "table", matches: is_table, build: handlers::table, lifts: false },
    NodeRule { name: "blockquote", matches: is_blockquote, build: handlers::blockquote, lifts: false },
    NodeRule { name: "divider", matches: is_divider, build: handlers::divider, lifts: false },
    NodeRule { name: "image", matches: is_image, build: handlers::image, lifts: true },
];

/// Mark rules in priority order.
pub const MARK_RULES: &[MarkRule] = &[
    MarkRule { name: "bold", matches: is_bold, build: |_| Mark::Bold },
    MarkRule { name: "italic", matches: is_italic, build: |_| Mark::Italic },
    MarkRule { name: "underline", matches: is_underline, build: |_| Mark::Underline },
    MarkRule { name: "strike", matches: is_strike, build: |_| Mark::Strike },
    MarkRule { name: "subscript", matches: is_subscript, build: |_| Mark::Subscript },
    MarkRule { name: "superscript", matches: is_superscript, build: |_| Mark::Superscript },
    MarkRule { name: "link", matches: is_link, build: link_mark },
];

fn tag_is(sel: &Selection, tags: &[&str]) -> bool {
    dom::tag_name(sel).is_some_and(|t| tags.contains(&t.as_str()))
}

// === Custom markup ===

fn is_cards_group(sel: &Selection) -> bool {
    dom::has_class(sel, "cards") || dom::has_class(sel, "card-group")
}

fn is_card(sel: &Selection) -> bool {
    dom::has_class(sel, "card") && tag_is(sel, &["div", "a", "article", "section"])
}

fn is_details_group(sel: &Selection) -> bool {
    dom::has_class(sel, "accordion")
        || dom::get_attribute(sel, "data-type").as_deref() == Some("details-group")
}

fn is_details(sel: &Selection) -> bool {
    tag_is(sel, &["details"])
}

fn is_social_embed(sel: &Selection) -> bool {
    if sel.has_attr("data-social-embed") {
        return true;
    }
    tag_is(sel, &["blockquote"])
        && dom::get_attribute(sel, "class").is_some_and(|c| SOCIAL_EMBED_CLASS.is_match(&c))
}

fn is_contentpic(sel: &Selection) -> bool {
    dom::has_class(sel, "contentpic") || dom::has_class(sel, "content-pic")
}

fn is_embed_marker(sel: &Selection) -> bool {
    tag_is(sel, &["div"]) && sel.has_attr(EMBED_MARKER_ATTR)
}

fn is_iframe(sel: &Selection) -> bool {
    tag_is(sel, &["iframe"])
}

// === Standard blocks ===

fn is_heading(sel: &Selection) -> bool {
    tag_is(sel, &["h1", "h2", "h3", "h4", "h5", "h6"])
}

fn is_paragraph(sel: &Selection) -> bool {
    tag_is(sel, &["p"])
}

fn is_preformatted(sel: &Selection) -> bool {
    tag_is(sel, &["pre"])
}

fn is_unordered_list(sel: &Selection) -> bool {
    tag_is(sel, &["ul"])
}

fn is_ordered_list(sel: &Selection) -> bool {
    tag_is(sel, &["ol"])
}

fn is_table(sel: &Selection) -> bool {
    tag_is(sel, &["table"])
}

fn is_blockquote(sel: &Selection) -> bool {
    tag_is(sel, &["blockquote"])
}

fn is_divider(sel: &Selection) -> bool {
    tag_is(sel, &["hr"])
}

fn is_image(sel: &Selection) -> bool {
    tag_is(sel, &["img"])
}

// === Marks ===

fn is_bold(sel: &Selection) -> bool {
    tag_is(sel, &["b", "strong"])
}

fn is_italic(sel: &Selection) -> bool {
    tag_is(sel, &["i", "em"])
}

fn is_underline(sel: &Selection) -> bool {
    tag_is(sel, &["u", "ins"])
}

fn is_strike(sel: &Selection) -> bool {
    tag_is(sel, &["s", "del", "strike"])
}

fn is_subscript(sel: &Selection) -> bool {
    tag_is(sel, &["sub"])
}

fn is_superscript(sel: &Selection) -> bool {
    tag_is(sel, &["sup"])
}

fn is_link(sel: &Selection) -> bool {
    tag_is(sel, &["a"]) && dom::non_empty_attribute(sel, "href").is_some()
}

fn link_mark(sel: &Selection) -> Mark {
    Mark::Link {
        attrs: LinkAttrs {
            href: dom::non_empty_attribute(sel, "href").unwrap_or_default(),
            target: dom::non_empty_attribute(sel, "target"),
            rel: dom::non_empty_attribute(sel, "rel"),
            title: dom::non_empty_attribute(sel, "title"),
            class: dom::non_empty_attribute(sel, "class"),
        },
    }
}
