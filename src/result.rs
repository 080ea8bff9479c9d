//! Result types for page migration output.

use serde::{Deserialize, Serialize};

use crate::page::PageDocument;

/// Outcome of migrating one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Usable content with no review flags.
    Converted,
    /// Usable content that a person should check before publishing.
    ManualReview,
    /// Nothing usable was produced; the page needs manual handling.
    #[default]
    NotConverted,
}

/// Result of migrating a single page.
///
/// `content` is present for `converted` and `manual_review` results.
/// `review_items` holds the human-readable flags, or the failure reason for
/// `not_converted` results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResult {
    pub status: Status,

    /// Page title (also filled in for failed pages, from the file name).
    pub title: String,

    /// Page permalink (also filled in for failed pages, from the file name).
    pub permalink: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<PageDocument>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub review_items: Vec<String>,
}

impl MigrationResult {
    /// A `not_converted` result carrying the failure reason.
    #[must_use]
    pub fn not_converted(title: String, permalink: String, reason: impl Into<String>) -> Self {
        Self {
            status: Status::NotConverted,
            title,
            permalink,
            content: None,
            review_items: vec![reason.into()],
        }
    }

    /// Returns true if the page produced content.
    #[must_use]
    pub fn is_converted(&self) -> bool {
        self.content.is_some()
    }
}
