//! # content-migrate
//!
//! Migration compiler for legacy static-site pages.
//!
//! Converts free-form HTML (rendered from hand-authored markdown/HTML pages)
//! into an ordered list of typed content blocks for a structured page schema,
//! and flags whatever a person should check before publishing.
//!
//! ## Quick Start
//!
//! ```rust
//! use content_migrate::{convert_html, Block, Options};
//!
//! let blocks = convert_html(
//!     r#"<p>Intro</p><iframe src="https://www.youtube.com/embed/xyz" title="Demo"></iframe>"#,
//!     &Options::default(),
//! );
//! assert_eq!(blocks.len(), 2);
//! assert!(matches!(&blocks[1], Block::Video { title, .. } if title == "Demo"));
//! ```
//!
//! ## Pipeline
//!
//! - **Pre-normalizer** ([`normalize`]): DOM fixups on the raw HTML
//! - **Parser** ([`parser`]): table-driven HTML → rich-text tree
//! - **Cleaner** ([`cleaner`]): ordered structural repair passes
//! - **Compiler** ([`compiler`]): tree → content blocks
//! - **Review** ([`review`], [`validate`]): schema checks and review flags
//!
//! [`migrate_page`] runs the whole thing for one source file, front matter
//! included.

mod error;
mod options;
mod patterns;
mod result;

/// DOM helpers over dom_query.
pub mod dom;

/// URL helpers for embed recognition.
pub mod url_utils;

/// Intermediate rich-text tree.
pub mod tree;

/// Output content blocks.
pub mod block;

/// HTML pre-normalizer.
pub mod normalize;

/// Table-driven HTML parser.
pub mod parser;

/// Tree cleaning passes.
pub mod cleaner;

/// Block compiler.
pub mod compiler;

/// Alt-text generation hook.
pub mod alt_text;

/// Page schema validation.
pub mod validate;

/// Review flags.
pub mod review;

/// YAML front matter.
pub mod frontmatter;

/// Markdown rendering.
pub mod render;

/// Page driver.
pub mod page;

use log::debug;

use crate::alt_text::{AltTextGenerator, NoAltText};

// Public API - re-exports
pub use block::Block;
pub use error::{Error, Result};
pub use options::Options;
pub use page::{migrate_page, migrate_page_with, PageDocument};
pub use result::{MigrationResult, Status};
pub use review::{Flag, Review};

/// Convert an HTML fragment into content blocks.
///
/// Images without alt text get the placeholder from `options`.
#[must_use]
pub fn convert_html(html: &str, options: &Options) -> Vec<Block> {
    convert_html_with(html, options, &NoAltText)
}

/// Convert an HTML fragment into content blocks, asking `alt` for missing
/// image descriptions.
#[must_use]
pub fn convert_html_with(html: &str, options: &Options, alt: &dyn AltTextGenerator) -> Vec<Block> {
    let normalized = normalize::normalize_html(html, options);
    let tree = parser::parse(&normalized);
    let tree = cleaner::clean_with(tree, options);
    let blocks = compiler::compile(tree, options, alt);
    debug!("converted {} bytes of HTML into {} blocks", html.len(), blocks.len());
    blocks
}
