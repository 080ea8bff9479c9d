//! Embed classification: iframes and social posts.

use std::collections::BTreeMap;

use log::{trace, warn};

use crate::block::Block;
use crate::cleaner::iframe_markup;
use crate::options::Options;
use crate::patterns::{MAP_HOST, SLIDE_HOST, VIDEO_HOST};
use crate::tree::{Node, SocialAttrs};
use crate::url_utils::host_and_path;

/// Map an iframe to its block by host: video, map, slide-deck link, or the
/// passthrough iframe block.
pub(super) fn iframe_block(
    attrs: &BTreeMap<String, String>,
    content: Option<String>,
    title: Option<String>,
    options: &Options,
) -> Block {
    let src = attrs
        .get("src")
        .or_else(|| attrs.get("data-src"))
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let title = title
        .or_else(|| attrs.get("title").cloned())
        .map(|t| t.trim().to_string())
        .unwrap_or_default();
    let url = absolute_src(&src);

    if let Some(target) = host_and_path(&src) {
        if VIDEO_HOST.is_match(&target) {
            trace!("iframe {src} -> video");
            return Block::Video { title, url };
        }
        if MAP_HOST.is_match(&target) {
            trace!("iframe {src} -> map");
            return Block::Map { title, url };
        }
        if SLIDE_HOST.is_match(&target) {
            trace!("iframe {src} -> presentation link");
            return Block::Prose {
                content: vec![Node::link_paragraph(options.slide_link_text.clone(), url)],
            };
        }
    }

    warn!("unrecognised embed {src:?} kept as iframe");
    Block::Iframe {
        title,
        content: content.unwrap_or_else(|| iframe_markup(attrs)),
    }
}

/// Protocol-relative sources are given `https`.
fn absolute_src(src: &str) -> String {
    if src.starts_with("//") {
        format!("https:{src}")
    } else {
        src.to_string()
    }
}

/// Social posts become a single link to the post.
pub(super) fn social_block(attrs: &SocialAttrs, options: &Options) -> Block {
    let text = options.social_link_text.clone();
    let paragraph = match &attrs.url {
        Some(url) => Node::link_paragraph(text, url.clone()),
        None => {
            warn!("social embed without a post URL");
            Node::paragraph(vec![Node::plain(text)])
        }
    };
    Block::Prose {
        content: vec![paragraph],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(src: &str, title: Option<&str>) -> BTreeMap<String, String> {
        let mut attrs = BTreeMap::new();
        attrs.insert("src".to_string(), src.to_string());
        if let Some(title) = title {
            attrs.insert("title".to_string(), title.to_string());
        }
        attrs
    }

    #[test]
    fn test_video_embed() {
        let block = iframe_block(
            &frame("https://www.youtube.com/embed/xyz", Some("Demo")),
            None,
            Some("Demo".to_string()),
            &Options::default(),
        );
        assert_eq!(
            block,
            Block::Video {
                title: "Demo".to_string(),
                url: "https://www.youtube.com/embed/xyz".to_string()
            }
        );
    }

    #[test]
    fn test_protocol_relative_map() {
        let block = iframe_block(
            &frame("//www.google.com/maps/embed?pb=1", None),
            None,
            None,
            &Options::default(),
        );
        assert_eq!(
            block,
            Block::Map {
                title: String::new(),
                url: "https://www.google.com/maps/embed?pb=1".to_string()
            }
        );
    }

    #[test]
    fn test_slides_become_link() {
        let src = "https://docs.google.com/presentation/d/abc/embed";
        let block = iframe_block(&frame(src, None), None, None, &Options::default());
        assert_eq!(
            block,
            Block::Prose {
                content: vec![Node::link_paragraph("View the presentation", src)]
            }
        );
    }

    #[test]
    fn test_unknown_host_builds_markup_when_missing() {
        let block = iframe_block(&frame("/local/widget.html", None), None, None, &Options::default());
        assert_eq!(
            block,
            Block::Iframe {
                title: String::new(),
                content: r#"<iframe src="/local/widget.html"></iframe>"#.to_string()
            }
        );
    }

    #[test]
    fn test_social_without_url() {
        let block = social_block(&SocialAttrs::default(), &Options::default());
        assert_eq!(
            block,
            Block::Prose {
                content: vec![Node::paragraph(vec![Node::plain("View post")])]
            }
        );
    }
}
