//! Page driver: one source file in, one migration result out.
//!
//! Steps: format check, front matter, markdown rendering, page identity
//! (title, permalink, date), block conversion, page document, review.
//! Every failure along the way becomes a `not_converted` result; the driver
//! itself never returns an error.

use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::alt_text::{AltTextGenerator, NoAltText};
use crate::block::Block;
use crate::dom;
use crate::error::{Error, Result};
use crate::frontmatter::{self, FrontMatter};
use crate::options::Options;
use crate::patterns::{DATE_PREFIX, SLUG_INVALID, WHITESPACE_NORMALIZE};
use crate::render::markdown_to_html;
use crate::result::{MigrationResult, Status};
use crate::review::review;
use crate::validate::{BuiltinValidator, SchemaValidator};

/// Source formats the driver can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Markdown,
    Html,
}

impl SourceFormat {
    /// Detect the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &str) -> Result<Self> {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "md" | "markdown" => Ok(Self::Markdown),
            "html" | "htm" => Ok(Self::Html),
            _ => Err(Error::UnsupportedFormat(path.to_string())),
        }
    }
}

/// The output page document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDocument {
    pub version: String,
    pub layout: String,
    pub page: PageInfo,
    pub content: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub title: String,
    pub permalink: String,
}

/// Optional page metadata: front-matter date and description, and the source path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Path of the legacy source file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl PageMeta {
    fn from_parts(date: Option<String>, description: Option<String>, source: Option<String>) -> Option<Self> {
        (date.is_some() || description.is_some() || source.is_some()).then_some(Self {
            date,
            description,
            source,
        })
    }
}

/// Migrate one page with the default alt-text generator and validator.
///
/// # Example
///
/// ```rust
/// use content_migrate::{migrate_page, Options, Status};
///
/// let source = "---\ntitle: About us\n---\nWe make **things**.\n";
/// let result = migrate_page("_pages/about.md", source, &Options::default());
/// assert_eq!(result.status, Status::Converted);
/// assert_eq!(result.permalink, "/about/");
/// ```
#[must_use]
pub fn migrate_page(path: &str, source: &str, options: &Options) -> MigrationResult {
    migrate_page_with(path, source, options, &NoAltText, &BuiltinValidator::from_options(options))
}

/// Migrate one page with a caller-provided alt-text generator and validator.
#[must_use]
pub fn migrate_page_with(
    path: &str,
    source: &str,
    options: &Options,
    alt: &dyn AltTextGenerator,
    validator: &dyn SchemaValidator,
) -> MigrationResult {
    match build_page(path, source, options, alt) {
        Ok(page) => {
            let review = review(&page, source, validator, options);
            let status = if review.needs_review() {
                Status::ManualReview
            } else {
                Status::Converted
            };
            info!("{path}: {status:?} ({} blocks)", page.content.len());
            MigrationResult {
                status,
                title: page.page.title.clone(),
                permalink: page.page.permalink.clone(),
                review_items: review.items(),
                content: Some(page),
            }
        }
        Err(err) => {
            warn!("{path}: not converted: {err}");
            let stem = file_stem(path);
            MigrationResult::not_converted(humanize(&stem), slug_permalink(&stem), err.to_string())
        }
    }
}

fn build_page(
    path: &str,
    source: &str,
    options: &Options,
    alt: &dyn AltTextGenerator,
) -> Result<PageDocument> {
    let format = SourceFormat::from_path(path)?;
    let (front, body) = frontmatter::parse(source)?;

    let layout = front.layout.as_deref().unwrap_or("page");
    if !options.supports_layout(layout) {
        return Err(Error::UnsupportedLayout(layout.to_string()));
    }

    let html = match format {
        SourceFormat::Markdown => markdown_to_html(body),
        SourceFormat::Html => body.to_string(),
    };

    let stem = file_stem(path);
    let title = page_title(&front, &html, &stem);
    let permalink = front
        .permalink
        .as_deref()
        .map_or_else(|| slug_permalink(&stem), normalize_permalink);
    let date = front
        .date
        .as_deref()
        .and_then(frontmatter::normalize_date)
        .or_else(|| date_prefix(&stem));
    debug!("{path}: title={title:?} permalink={permalink:?} date={date:?}");

    let content = crate::convert_html_with(&html, options, alt);
    if content.is_empty() {
        return Err(Error::NoContent);
    }

    Ok(PageDocument {
        version: options.schema_version.clone(),
        layout: options.output_layout.clone(),
        page: PageInfo { title, permalink },
        content,
        meta: PageMeta::from_parts(
            date,
            front.description,
            Some(path.trim()).filter(|p| !p.is_empty()).map(str::to_string),
        ),
    })
}

/// File name without directories or extension.
fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

fn page_title(front: &FrontMatter, html: &str, stem: &str) -> String {
    if let Some(title) = &front.title {
        return title.clone();
    }
    let doc = dom::parse(html);
    let h1 = dom::text_content(&doc.select("h1").first());
    let h1 = WHITESPACE_NORMALIZE.replace_all(h1.trim(), " ");
    if h1.is_empty() {
        humanize(stem)
    } else {
        h1.into_owned()
    }
}

/// `2021-03-04-team-news` -> `Team news`
fn humanize(stem: &str) -> String {
    let stem = strip_date_prefix(stem);
    let words = stem.replace(['-', '_'], " ");
    let words = WHITESPACE_NORMALIZE.replace_all(words.trim(), " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Untitled".to_string(),
    }
}

fn strip_date_prefix(stem: &str) -> &str {
    DATE_PREFIX
        .captures(stem)
        .and_then(|c| c.get(2))
        .map_or(stem, |m| m.as_str())
}

fn date_prefix(stem: &str) -> Option<String> {
    let raw = DATE_PREFIX.captures(stem)?.get(1)?.as_str();
    frontmatter::normalize_date(raw)
}

/// `/<slug>/` from the file stem; `index` maps to the site root.
fn slug_permalink(stem: &str) -> String {
    let lower = strip_date_prefix(stem).to_lowercase();
    let slug = SLUG_INVALID.replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() || slug == "index" {
        "/".to_string()
    } else {
        format!("/{slug}/")
    }
}

fn normalize_permalink(permalink: &str) -> String {
    let permalink = permalink.trim();
    if permalink.starts_with('/') {
        permalink.to_string()
    } else {
        format!("/{permalink}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_format() {
        assert_eq!(SourceFormat::from_path("a/b.MD").unwrap(), SourceFormat::Markdown);
        assert_eq!(SourceFormat::from_path("b.htm").unwrap(), SourceFormat::Html);
        assert!(matches!(SourceFormat::from_path("b.txt"), Err(Error::UnsupportedFormat(_))));
        assert!(SourceFormat::from_path("README").is_err());
    }

    #[test]
    fn test_slug_and_title_from_stem() {
        assert_eq!(slug_permalink("2021-03-04-Team News!"), "/team-news/");
        assert_eq!(slug_permalink("index"), "/");
        assert_eq!(humanize("2021-03-04-team_news"), "Team news");
        assert_eq!(humanize(""), "Untitled");
        assert_eq!(date_prefix("2021-03-04-team-news"), Some("2021-03-04".to_string()));
        assert_eq!(date_prefix("team-news"), None);
    }

    #[test]
    fn test_title_falls_back_to_h1() {
        let front = FrontMatter::default();
        assert_eq!(page_title(&front, "<h1> Our\n team </h1><p>x</p>", "team"), "Our team");
        assert_eq!(page_title(&front, "<p>x</p>", "our-team"), "Our team");
    }

    #[test]
    fn test_permalink_gets_leading_slash() {
        assert_eq!(normalize_permalink("news/"), "/news/");
        assert_eq!(normalize_permalink("/news/"), "/news/");
    }

    #[test]
    fn test_meta_only_when_present() {
        assert_eq!(PageMeta::from_parts(None, None, None), None);
        let meta = PageMeta::from_parts(Some("2021-03-04".into()), None, Some("_posts/a.md".into()));
        let json = serde_json::to_value(meta).unwrap();
        assert_eq!(json, serde_json::json!({"date": "2021-03-04", "source": "_posts/a.md"}));
    }
}
