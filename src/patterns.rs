//! Compiled regex patterns used across the migration pipeline.
//!
//! All patterns are compiled once using `LazyLock`. Host patterns are matched
//! against `host + path` strings produced by `url_utils::host_and_path`
//! (lowercase host, no scheme, no query).

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Embed Host Recognition
// =============================================================================

/// Video hosts rendered as `video` blocks.
pub static VIDEO_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:www\.|m\.)?(?:youtube\.com/(?:embed|watch|shorts|v)\b|youtube-nocookie\.com/embed\b|youtu\.be/|player\.vimeo\.com/video/|vimeo\.com/\d)",
    )
    .expect("VIDEO_HOST regex")
});

/// Map hosts (or map paths on general hosts) rendered as `map` blocks.
pub static MAP_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:www\.)?google\.[a-z.]+/maps\b|maps\.google\.[a-z.]+/|(?:www\.)?openstreetmap\.org/export/embed|umap\.openstreetmap\.[a-z]+/|(?:www\.)?bing\.com/maps\b)",
    )
    .expect("MAP_HOST regex")
});

/// Slide-deck hosts converted to a plain link.
pub static SLIDE_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:docs\.google\.com/presentation/|(?:www\.)?slideshare\.net/|(?:www\.)?speakerdeck\.com/|onedrive\.live\.com/embed\b.*\bpptx?\b)",
    )
    .expect("SLIDE_HOST regex")
});

/// Class names of blockquote-based social media embeds.
pub static SOCIAL_EMBED_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(twitter-tweet|twitter-timeline|instagram-media|tiktok-embed|fb-post|linkedin-post)\b")
        .expect("SOCIAL_EMBED_CLASS regex")
});

// =============================================================================
// Legacy Markup Conventions
// =============================================================================

/// Paragraph class of the legacy heading convention, e.g. `class="h 3"` or `class="h3"`.
pub static LEGACY_HEADING_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*h[\s_-]*([1-6])\s*$").expect("LEGACY_HEADING_CLASS regex")
});

/// Accordion markup in the original page source (raw text search).
pub static ACCORDION_SOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<details[\s>]|class\s*=\s*["'][^"']*\baccordion\b|\{%-?\s*include\s+accordion"#)
        .expect("ACCORDION_SOURCE regex")
});

/// `YYYY-MM-DD-` prefix of dated file names.
pub static DATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})-(.*)$").expect("DATE_PREFIX regex")
});

// =============================================================================
// Text Cleaning Patterns
// =============================================================================

/// Matches multiple whitespace characters for normalization.
pub static WHITESPACE_NORMALIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("WHITESPACE_NORMALIZE regex")
});

/// Characters that do not belong in a permalink slug.
pub static SLUG_INVALID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-z0-9]+").expect("SLUG_INVALID regex")
});
