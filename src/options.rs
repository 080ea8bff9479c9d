//! Configuration options for page migration.
//!
//! The `Options` struct carries the placeholder texts, limits and layout
//! lists the converter works with. Host recognisers that never change live in
//! `patterns.rs` instead.

use serde::{Deserialize, Serialize};

/// Configuration options for page migration.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings. Missing fields fall back to their defaults when
/// deserializing, so a batch driver can keep a partial JSON config.
///
/// # Example
///
/// ```rust
/// use content_migrate::Options;
///
/// let options = Options {
///     max_heading_level: 3,
///     ..Options::default()
/// };
/// assert_eq!(options.min_heading_level, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Alt text used for images that have none and get none from the generator.
    ///
    /// Default: `"Image without description"`
    pub image_alt_placeholder: String,

    /// Link text used when an image is lifted out of a link that held nothing else.
    ///
    /// Default: `"Image link"`
    pub image_link_placeholder: String,

    /// Heading text for accordions whose summary is empty.
    ///
    /// Default: `"More information"`
    pub accordion_title_placeholder: String,

    /// Link text for slide-deck embeds converted to a plain link.
    ///
    /// Default: `"View the presentation"`
    pub slide_link_text: String,

    /// Link text for social-media embeds converted to a plain link.
    ///
    /// Default: `"View post"`
    pub social_link_text: String,

    /// Prefix of the paragraph that replaces an image found inside a table cell.
    ///
    /// Default: `"Image removed from table:"`
    pub table_image_prefix: String,

    /// Title of the infobar produced from a feedback link.
    ///
    /// Default: `"Have any thoughts and views on this?"`
    pub infobar_title: String,

    /// Link texts (compared case-insensitively) that turn a paragraph into an infobar.
    ///
    /// Default: `["Share your feedback", "Give us your feedback"]`
    pub feedback_phrases: Vec<String>,

    /// Lowest heading level the page schema accepts.
    ///
    /// Default: `2`
    pub min_heading_level: u8,

    /// Highest heading level the page schema accepts.
    ///
    /// Default: `4`
    pub max_heading_level: u8,

    /// Heading level given to expanded accordions.
    ///
    /// Default: `3`
    pub accordion_heading_level: u8,

    /// Front-matter layouts that can be migrated.
    ///
    /// Default: `["page", "post", "default", "article"]`
    pub supported_layouts: Vec<String>,

    /// Layout name written into the output page document.
    ///
    /// Default: `"content"`
    pub output_layout: String,

    /// Schema version written into the output page document.
    ///
    /// Default: `"1.0.0"`
    pub schema_version: String,

    /// Alt text longer than this many characters is flagged.
    ///
    /// Default: `125`
    pub max_alt_length: usize,

    /// A cards block with more cards than this is flagged.
    ///
    /// Default: `12`
    pub max_cards: usize,

    /// Card titles longer than this many characters are flagged.
    ///
    /// Default: `60`
    pub max_card_title_length: usize,

    /// Card descriptions longer than this many characters are flagged.
    ///
    /// Default: `200`
    pub max_card_description_length: usize,

    /// Host (optionally with a path prefix) of form providers whose iframes are not flagged.
    ///
    /// Default: `["forms.office.com", "docs.google.com/forms", "forms.gle"]`
    pub trusted_form_hosts: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            image_alt_placeholder: "Image without description".to_string(),
            image_link_placeholder: "Image link".to_string(),
            accordion_title_placeholder: "More information".to_string(),
            slide_link_text: "View the presentation".to_string(),
            social_link_text: "View post".to_string(),
            table_image_prefix: "Image removed from table:".to_string(),
            infobar_title: "Have any thoughts and views on this?".to_string(),
            feedback_phrases: vec![
                "Share your feedback".to_string(),
                "Give us your feedback".to_string(),
            ],
            min_heading_level: 2,
            max_heading_level: 4,
            accordion_heading_level: 3,
            supported_layouts: ["page", "post", "default", "article"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            output_layout: "content".to_string(),
            schema_version: "1.0.0".to_string(),
            max_alt_length: 125,
            max_cards: 12,
            max_card_title_length: 60,
            max_card_description_length: 200,
            trusted_form_hosts: ["forms.office.com", "docs.google.com/forms", "forms.gle"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl Options {
    /// Clamp a heading level into the range the page schema accepts.
    #[must_use]
    pub fn clamp_heading_level(&self, level: u8) -> u8 {
        level.clamp(self.min_heading_level, self.max_heading_level.max(self.min_heading_level))
    }

    /// Check whether a front-matter layout can be migrated.
    #[must_use]
    pub fn supports_layout(&self, layout: &str) -> bool {
        self.supported_layouts
            .iter()
            .any(|l| l.eq_ignore_ascii_case(layout.trim()))
    }

    /// Check whether a paragraph's text is one of the feedback phrases.
    #[must_use]
    pub fn is_feedback_phrase(&self, text: &str) -> bool {
        let text = text.trim();
        self.feedback_phrases
            .iter()
            .any(|p| p.eq_ignore_ascii_case(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_heading_range() {
        let opts = Options::default();
        assert_eq!(opts.clamp_heading_level(1), 2);
        assert_eq!(opts.clamp_heading_level(3), 3);
        assert_eq!(opts.clamp_heading_level(6), 4);
    }

    #[test]
    fn test_supports_layout_is_case_insensitive() {
        let opts = Options::default();
        assert!(opts.supports_layout("Page"));
        assert!(opts.supports_layout(" post "));
        assert!(!opts.supports_layout("redirect"));
    }

    #[test]
    fn test_feedback_phrase_matching() {
        let opts = Options::default();
        assert!(opts.is_feedback_phrase("share your FEEDBACK"));
        assert!(opts.is_feedback_phrase("  Give us your feedback "));
        assert!(!opts.is_feedback_phrase("Share your feedback today"));
    }

    #[test]
    fn test_partial_json_config_keeps_defaults() {
        let opts: Options = serde_json::from_str(r#"{"max_cards": 4}"#).unwrap();
        assert_eq!(opts.max_cards, 4);
        assert_eq!(opts.social_link_text, "View post");
    }
}
