//! Markdown → HTML rendering for markdown page bodies.
//!
//! Raw HTML inside markdown is passed through untouched; the pre-normalizer
//! and parser deal with it like any other markup.

use pulldown_cmark::{html, Options as MarkdownOptions, Parser};

/// Render a markdown body to HTML (tables and strikethrough enabled).
///
/// # Example
///
/// ```rust
/// use content_migrate::render::markdown_to_html;
///
/// let html = markdown_to_html("Hello **world**");
/// assert_eq!(html.trim(), "<p>Hello <strong>world</strong></p>");
/// ```
#[must_use]
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = MarkdownOptions::empty();
    options.insert(MarkdownOptions::ENABLE_TABLES);
    options.insert(MarkdownOptions::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
