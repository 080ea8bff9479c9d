//! Node builders for the parser rule table.
//!
//! Each builder receives the matched element and the parsing context, and
//! returns the nodes it stands for. Builders never fail: an element missing
//! what its node needs falls back to its parsed children, or to nothing when
//! it has no content at all (an `<img>` without a source).

use std::collections::BTreeMap;

use log::trace;

use super::{collapse_whitespace, split_inline, Context, Inline};
use crate::dom::{self, NodeRef, Selection};
use crate::patterns::SOCIAL_EMBED_CLASS;
use crate::tree::{
    CardAttrs, CellAttrs, ImageAttrs, ListAttrs, Node, ParagraphAttrs, SocialAttrs, TableAttrs,
};

// === Custom markup ===

pub fn cards_group(sel: &Selection, ctx: &Context) -> Vec<Node> {
    vec![Node::CardsGroup {
        content: ctx.blocks(sel),
    }]
}

pub fn card(sel: &Selection, _ctx: &Context) -> Vec<Node> {
    vec![Node::Card {
        attrs: card_attrs(sel),
    }]
}

/// Read the card fields out of a `.card` element.
///
/// Title: `data-title`, else the first heading or `.card-title`. Description:
/// the first `.card-text`/`.card-description`/`p` whose text differs from the
/// title. Link: the card itself when it is an `<a>`, else its first link.
fn card_attrs(sel: &Selection) -> CardAttrs {
    let title = dom::non_empty_attribute(sel, "data-title")
        .or_else(|| first_text(sel, "h1, h2, h3, h4, h5, h6, .card-title"))
        .unwrap_or_default();

    let description = sel
        .select(".card-text, .card-description, p")
        .nodes()
        .iter()
        .map(|n| clean_text(&Selection::from(*n)))
        .find(|text| !text.is_empty() && *text != title);

    let (link_url, link_label) = if dom::tag_name(sel).as_deref() == Some("a") {
        (
            dom::non_empty_attribute(sel, "href"),
            dom::non_empty_attribute(sel, "data-link-label"),
        )
    } else {
        match sel.select("a[href]").nodes().first() {
            Some(node) => {
                let link = Selection::from(*node);
                let label = clean_text(&link);
                (
                    dom::non_empty_attribute(&link, "href"),
                    (!label.is_empty()).then_some(label),
                )
            }
            None => (None, None),
        }
    };

    let img = sel.select("img");
    let image_attrs = img.nodes().first().and_then(|n| image_attrs(&Selection::from(*n)));
    let fit = dom::non_empty_attribute(sel, "data-fit")
        .or_else(|| dom::non_empty_attribute(&img, "data-fit"))
        .or_else(|| {
            ["contain", "cover"]
                .into_iter()
                .find(|fit| dom::has_class(&img, fit))
                .map(str::to_string)
        });

    CardAttrs {
        title,
        description,
        link_label,
        link_url,
        alt: image_attrs.as_ref().and_then(|a| a.alt.clone()),
        image: image_attrs.map(|a| a.src),
        fit,
    }
}

pub fn details_group(sel: &Selection, ctx: &Context) -> Vec<Node> {
    vec![Node::DetailsGroup {
        content: ctx.blocks(sel),
    }]
}

/// `<details>`: the first `<summary>` becomes the plain-text summary, every
/// other child the details content.
pub fn details(sel: &Selection, ctx: &Context) -> Vec<Node> {
    let mut summary: Option<NodeRef> = None;
    let mut rest = Vec::new();
    for child in dom::child_nodes(sel) {
        if summary.is_none() && dom::node_tag(&child).as_deref() == Some("summary") {
            summary = Some(child);
        } else {
            rest.push(child);
        }
    }

    let (summary_text, mut lifted) = match summary {
        Some(node) => plain_inline(ctx.inline(&Selection::from(node), &[])),
        None => (String::new(), Vec::new()),
    };
    lifted.extend(ctx.blocks_of(&rest));

    vec![Node::Details {
        content: vec![
            Node::DetailsSummary {
                content: if summary_text.is_empty() {
                    Vec::new()
                } else {
                    vec![Node::plain(summary_text)]
                },
            },
            Node::DetailsContent { content: lifted },
        ],
    }]
}

pub fn social_embed(sel: &Selection, _ctx: &Context) -> Vec<Node> {
    let platform = dom::non_empty_attribute(sel, "data-social-embed").or_else(|| {
        dom::get_attribute(sel, "class")
            .and_then(|class| {
                SOCIAL_EMBED_CLASS
                    .captures(&class)
                    .map(|c| c[1].to_ascii_lowercase())
            })
            .map(|class| platform_name(&class).to_string())
    });

    let url = dom::non_empty_attribute(sel, "cite")
        .or_else(|| dom::non_empty_attribute(sel, "data-instgrm-permalink"))
        .or_else(|| dom::non_empty_attribute(sel, "data-url"))
        .or_else(|| {
            sel.select("a[href]")
                .nodes()
                .last()
                .and_then(|n| dom::non_empty_attribute(&Selection::from(*n), "href"))
        });

    trace!("social embed: platform={platform:?} url={url:?}");
    vec![Node::SocialEmbed {
        attrs: SocialAttrs { url, platform },
    }]
}

fn platform_name(class: &str) -> &str {
    match class {
        "twitter-tweet" | "twitter-timeline" => "twitter",
        "instagram-media" => "instagram",
        "tiktok-embed" => "tiktok",
        "fb-post" => "facebook",
        "linkedin-post" => "linkedin",
        other => other,
    }
}

/// Image-beside-text box: the first top-level image becomes the picture and
/// the rest its content. Without an image the box is flattened.
pub fn contentpic(sel: &Selection, ctx: &Context) -> Vec<Node> {
    let mut content = ctx.blocks(sel);
    let Some(index) = content.iter().position(Node::is_image) else {
        return content;
    };
    if let Node::Image { attrs } = content.remove(index) {
        return vec![Node::Contentpic { attrs, content }];
    }
    content
}

/// Embed marker wrapper: one iframe node per contained frame.
pub fn embed(sel: &Selection, ctx: &Context) -> Vec<Node> {
    let frames = sel.select("iframe");
    if !frames.exists() {
        return ctx.blocks(sel);
    }
    frames
        .nodes()
        .iter()
        .flat_map(|n| iframe(&Selection::from(*n), ctx))
        .collect()
}

pub fn iframe(sel: &Selection, _ctx: &Context) -> Vec<Node> {
    let attrs: BTreeMap<String, String> = dom::get_all_attributes(sel).into_iter().collect();
    vec![Node::Iframe {
        attrs,
        content: None,
        title: None,
    }]
}

// === Standard blocks ===

/// Headings hold plain text only; inline images split them.
pub fn heading(sel: &Selection, ctx: &Context) -> Vec<Node> {
    let level = dom::tag_name(sel)
        .and_then(|t| t.strip_prefix('h').and_then(|n| n.parse::<u8>().ok()))
        .unwrap_or(2);
    split_inline(
        ctx.inline(sel, &[]),
        |content| {
            let text = collapse_whitespace(&Node::paragraph(content).plain_text());
            Node::heading(level, text.trim())
        },
        true,
    )
}

pub fn paragraph(sel: &Selection, ctx: &Context) -> Vec<Node> {
    let attrs = ParagraphAttrs {
        class: dom::non_empty_attribute(sel, "class"),
    };
    split_inline(
        ctx.inline(sel, &[]),
        |content| Node::Paragraph {
            attrs: attrs.clone(),
            content,
        },
        true,
    )
}

/// Preformatted text: one paragraph, source lines separated by breaks.
pub fn preformatted(sel: &Selection, _ctx: &Context) -> Vec<Node> {
    let text = dom::text_content(sel);
    let text = text.trim_end();
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut content = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            content.push(Node::hard_break());
        }
        let line = line.trim_end();
        if !line.is_empty() {
            content.push(Node::plain(line));
        }
    }
    vec![Node::paragraph(content)]
}

pub fn unordered_list(sel: &Selection, ctx: &Context) -> Vec<Node> {
    vec![Node::UnorderedList {
        content: list_items(sel, ctx),
    }]
}

pub fn ordered_list(sel: &Selection, ctx: &Context) -> Vec<Node> {
    let start = dom::get_attribute(sel, "start")
        .and_then(|s| s.trim().parse::<u32>().ok())
        .unwrap_or(1);
    vec![Node::OrderedList {
        attrs: ListAttrs { start },
        content: list_items(sel, ctx),
    }]
}

/// `<li>` children become list items; stray content between them is kept
/// as an item of its own.
fn list_items(sel: &Selection, ctx: &Context) -> Vec<Node> {
    let mut items = Vec::new();
    let mut stray: Vec<NodeRef> = Vec::new();

    for child in dom::child_nodes(sel) {
        if dom::node_tag(&child).as_deref() == Some("li") {
            flush_stray(ctx, &mut stray, &mut items);
            items.push(Node::ListItem {
                content: ctx.blocks(&Selection::from(child)),
            });
        } else {
            stray.push(child);
        }
    }
    flush_stray(ctx, &mut stray, &mut items);
    items
}

fn flush_stray(ctx: &Context, stray: &mut Vec<NodeRef>, items: &mut Vec<Node>) {
    if stray.is_empty() {
        return;
    }
    let content = ctx.blocks_of(stray);
    stray.clear();
    if !content.is_empty() {
        items.push(Node::ListItem { content });
    }
}

pub fn table(sel: &Selection, ctx: &Context) -> Vec<Node> {
    let mut caption = None;
    let mut rows = Vec::new();
    collect_rows(sel, ctx, &mut caption, &mut rows);
    vec![Node::Table {
        attrs: TableAttrs { caption },
        content: rows,
    }]
}

fn collect_rows(parent: &Selection, ctx: &Context, caption: &mut Option<String>, rows: &mut Vec<Node>) {
    for child in dom::child_nodes(parent) {
        let child_sel = Selection::from(child);
        match dom::node_tag(&child).as_deref() {
            Some("caption") if caption.is_none() => {
                let text = clean_text(&child_sel);
                if !text.is_empty() {
                    *caption = Some(text);
                }
            }
            Some("thead" | "tbody" | "tfoot") => collect_rows(&child_sel, ctx, caption, rows),
            Some("tr") => rows.push(table_row(&child_sel, ctx)),
            _ => {}
        }
    }
}

fn table_row(sel: &Selection, ctx: &Context) -> Node {
    let mut cells = Vec::new();
    for child in dom::child_nodes(sel) {
        let cell = Selection::from(child);
        match dom::node_tag(&child).as_deref() {
            Some("th") => cells.push(Node::TableHeader {
                attrs: cell_attrs(&cell),
                content: ctx.blocks(&cell),
            }),
            Some("td") => cells.push(Node::TableCell {
                attrs: cell_attrs(&cell),
                content: ctx.blocks(&cell),
            }),
            _ => {}
        }
    }
    Node::TableRow { content: cells }
}

fn cell_attrs(sel: &Selection) -> CellAttrs {
    let span = |name: &str| {
        dom::get_attribute(sel, name)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(1)
            .max(1)
    };
    CellAttrs {
        colspan: span("colspan"),
        rowspan: span("rowspan"),
    }
}

pub fn blockquote(sel: &Selection, ctx: &Context) -> Vec<Node> {
    vec![Node::Blockquote {
        content: ctx.blocks(sel),
    }]
}

pub fn divider(_sel: &Selection, _ctx: &Context) -> Vec<Node> {
    vec![Node::Divider]
}

pub fn image(sel: &Selection, _ctx: &Context) -> Vec<Node> {
    image_attrs(sel)
        .map(|attrs| Node::Image { attrs })
        .into_iter()
        .collect()
}

/// Source (`src`, else lazy-loading `data-src`), alt and title of an `<img>`.
fn image_attrs(sel: &Selection) -> Option<ImageAttrs> {
    let src = dom::non_empty_attribute(sel, "src")
        .or_else(|| dom::non_empty_attribute(sel, "data-src"))?;
    Some(ImageAttrs {
        src,
        alt: dom::non_empty_attribute(sel, "alt"),
        title: dom::non_empty_attribute(sel, "title"),
    })
}

// === Text helpers ===

fn clean_text(sel: &Selection) -> String {
    collapse_whitespace(&dom::text_content(sel)).trim().to_string()
}

fn first_text(sel: &Selection, selector: &str) -> Option<String> {
    sel.select(selector)
        .nodes()
        .first()
        .map(|n| clean_text(&Selection::from(*n)))
        .filter(|t| !t.is_empty())
}

/// Plain text of inline pieces, plus the nodes lifted out of them.
fn plain_inline(pieces: Vec<Inline>) -> (String, Vec<Node>) {
    let mut text = String::new();
    let mut lifted = Vec::new();
    for piece in pieces {
        match piece {
            Inline::Run(node) => text.push_str(&node.plain_text()),
            Inline::Lifted(node) => lifted.push(node),
        }
    }
    (collapse_whitespace(&text).trim().to_string(), lifted)
}
